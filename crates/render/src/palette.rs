use crate::surface::Rgba;

/// Colors for the globe layers. Defaults reproduce the classic
/// earthy-green-on-deep-ocean look; hosts may restyle field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Atmosphere glow at the limb, fading to transparent.
    pub atmosphere: Rgba,
    /// Ocean shading, center of the disc.
    pub ocean_inner: Rgba,
    /// Ocean shading at the limb (curvature darkening).
    pub ocean_outer: Rgba,
    pub graticule: Rgba,
    pub land_fill: Rgba,
    pub land_stroke: Rgba,
    /// Translucent overlay for the hovered country.
    pub hover: Rgba,
    /// Specular highlight center, fading to transparent.
    pub specular: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            atmosphere: Rgba::from_rgb8(52, 144, 220).with_alpha(0.4),
            ocean_inner: Rgba::from_rgb8(0x4f, 0x94, 0xd4),
            ocean_outer: Rgba::from_rgb8(0x0c, 0x2d, 0x48),
            graticule: Rgba::new(1.0, 1.0, 1.0, 0.15),
            land_fill: Rgba::from_rgb8(0x67, 0x7d, 0x42),
            land_stroke: Rgba::from_rgb8(0x28, 0x36, 0x18),
            hover: Rgba::from_rgb8(163, 230, 53).with_alpha(0.7),
            specular: Rgba::new(1.0, 1.0, 1.0, 0.6),
        }
    }
}
