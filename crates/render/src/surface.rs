/// Straight-alpha color, components in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            1.0,
        )
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// CSS `rgba(...)` string for canvas-style backends.
    pub fn css(&self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// Radial gradient between two concentric circles, canvas semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub cx: f64,
    pub cy: f64,
    pub r_inner: f64,
    pub r_outer: f64,
    /// (offset in [0, 1], color) pairs, in offset order.
    pub stops: Vec<(f64, Rgba)>,
}

/// Minimal 2D drawing backend for the globe pipeline.
///
/// The wasm app backs this with `CanvasRenderingContext2d`; tests use
/// [`crate::recording::RecordingSurface`]. Coordinates are CSS pixels;
/// backing-store scaling for device pixel ratio is the backend's job.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    /// Adds a full circle as a new subpath.
    fn circle(&mut self, cx: f64, cy: f64, radius: f64);

    fn set_fill_color(&mut self, color: Rgba);
    fn set_fill_gradient(&mut self, gradient: &RadialGradient);
    fn set_stroke_color(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f64);

    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

#[cfg(test)]
mod tests {
    use super::Rgba;

    #[test]
    fn css_strings_match_canvas_format() {
        assert_eq!(Rgba::from_rgb8(79, 148, 212).css(), "rgba(79,148,212,1)");
        assert_eq!(
            Rgba::from_rgb8(52, 144, 220).with_alpha(0.4).css(),
            "rgba(52,144,220,0.4)"
        );
        assert_eq!(Rgba::TRANSPARENT.css(), "rgba(0,0,0,0)");
    }
}
