use atlas::WorldGeometry;
use geo::{LonLat, Orthographic, Rotation, Vec3};
use once_cell::sync::Lazy;

use crate::palette::Palette;
use crate::surface::{RadialGradient, Rgba, Surface};
use crate::viewport::Viewport;

/// The grid never changes; compute it once instead of per frame.
static GRATICULE: Lazy<Vec<Vec<LonLat>>> = Lazy::new(geo::graticule::graticule);

/// Tunables for the pipeline that are not colors.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Disc radius = min(width, height) / margin_divisor.
    pub margin_divisor: f64,
    pub show_graticule: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            margin_divisor: 3.0,
            show_graticule: true,
        }
    }
}

/// Draw one frame, back to front: atmosphere glow, ocean, graticule,
/// countries, hover overlay, specular highlight.
///
/// Synchronous and idempotent: identical inputs produce an identical
/// command stream. A zero-sized viewport is a graceful no-op.
pub fn render(
    surface: &mut dyn Surface,
    viewport: Viewport,
    rotation: Rotation,
    world: Option<&WorldGeometry>,
    hovered: Option<usize>,
    palette: &Palette,
    options: &RenderOptions,
) {
    if !viewport.is_drawable() {
        return;
    }
    let scale = viewport.globe_scale(options.margin_divisor);
    if scale <= 0.0 {
        return;
    }
    let (w, h) = (viewport.width, viewport.height);
    let (cx, cy) = viewport.center();
    let proj = Orthographic::new(rotation, scale, (cx, cy));

    surface.clear(w, h);

    // Atmosphere: glow just beyond the disc, over the whole viewport.
    surface.set_fill_gradient(&RadialGradient {
        cx,
        cy,
        r_inner: scale,
        r_outer: scale * 1.1,
        stops: vec![
            (0.0, palette.atmosphere),
            (1.0, palette.atmosphere.with_alpha(0.0)),
        ],
    });
    surface.fill_rect(0.0, 0.0, w, h);

    // Ocean: curvature shading inside the sphere outline.
    surface.set_fill_gradient(&RadialGradient {
        cx,
        cy,
        r_inner: 0.0,
        r_outer: scale,
        stops: vec![(0.0, palette.ocean_inner), (1.0, palette.ocean_outer)],
    });
    surface.begin_path();
    surface.circle(cx, cy, scale);
    surface.fill();

    if options.show_graticule {
        surface.set_stroke_color(palette.graticule);
        surface.set_line_width(0.5);
        surface.begin_path();
        for line in GRATICULE.iter() {
            trace_polyline(surface, &proj, line);
        }
        surface.stroke();
    }

    if let Some(world) = world {
        surface.set_fill_color(palette.land_fill);
        surface.set_stroke_color(palette.land_stroke);
        surface.set_line_width(0.5);
        for country in &world.countries {
            if !trace_rings_begin(surface, &proj, &country.rings) {
                continue;
            }
            surface.fill();
            surface.stroke();
        }

        if let Some(index) = hovered {
            if let Some(country) = world.countries.get(index) {
                surface.set_fill_color(palette.hover);
                if trace_rings_begin(surface, &proj, &country.rings) {
                    surface.fill();
                }
            }
        }
    }

    // Specular highlight: off-center light reflection, clipped to the
    // disc by filling the sphere outline itself.
    surface.set_fill_gradient(&RadialGradient {
        cx: w * 0.4,
        cy: h * 0.4,
        r_inner: 0.0,
        r_outer: scale * 0.4,
        stops: vec![
            (0.0, palette.specular),
            (0.5, Rgba::TRANSPARENT),
        ],
    });
    surface.begin_path();
    surface.circle(cx, cy, scale);
    surface.fill();
}

/// Polyline with pen lifts across the limb: a segment is drawn only
/// while consecutive samples stay on the near hemisphere.
fn trace_polyline(surface: &mut dyn Surface, proj: &Orthographic, line: &[LonLat]) {
    let mut pen_down = false;
    for p in line {
        match proj.project(*p) {
            Some((x, y)) => {
                if pen_down {
                    surface.line_to(x, y);
                } else {
                    surface.move_to(x, y);
                    pen_down = true;
                }
            }
            None => pen_down = false,
        }
    }
}

/// Begin a path holding all rings of a shape, clamping far-hemisphere
/// vertices to the limb circle so partially visible shapes fill
/// correctly. Returns false (and starts no path) when every ring is
/// fully on the far hemisphere.
fn trace_rings_begin(
    surface: &mut dyn Surface,
    proj: &Orthographic,
    rings: &[Vec<LonLat>],
) -> bool {
    let mut any = false;
    for ring in rings {
        if ring.iter().any(|p| proj.view_vector(*p).x >= 0.0) {
            any = true;
            break;
        }
    }
    if !any {
        return false;
    }

    surface.begin_path();
    for ring in rings {
        if !ring.iter().any(|p| proj.view_vector(*p).x >= 0.0) {
            continue;
        }
        let mut first = true;
        for p in ring {
            let v = proj.view_vector(*p);
            let (x, y) = if v.x >= 0.0 {
                proj.view_to_screen(v)
            } else {
                // Clamp behind-the-horizon vertices onto the limb.
                let len = (v.y * v.y + v.z * v.z).sqrt();
                if len < 1e-12 {
                    continue;
                }
                proj.view_to_screen(Vec3::new(0.0, v.y / len, v.z / len))
            };
            if first {
                surface.move_to(x, y);
                first = false;
            } else {
                surface.line_to(x, y);
            }
        }
        surface.close_path();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{RenderOptions, render};
    use crate::palette::Palette;
    use crate::recording::{Op, RecordingSurface};
    use crate::viewport::Viewport;
    use atlas::{Country, WorldGeometry};
    use geo::{LonLat, Rotation};
    use pretty_assertions::assert_eq;

    fn square_country(name: &str, lon: f64, lat: f64) -> Country {
        let ring = vec![
            LonLat::new(lon - 5.0, lat - 5.0),
            LonLat::new(lon + 5.0, lat - 5.0),
            LonLat::new(lon + 5.0, lat + 5.0),
            LonLat::new(lon - 5.0, lat + 5.0),
            LonLat::new(lon - 5.0, lat - 5.0),
        ];
        Country::new(name.to_string(), vec![ring])
    }

    fn world() -> WorldGeometry {
        WorldGeometry {
            countries: vec![square_country("Front", 0.0, 0.0)],
        }
    }

    fn draw(viewport: Viewport, hovered: Option<usize>) -> RecordingSurface {
        let mut surface = RecordingSurface::default();
        render(
            &mut surface,
            viewport,
            Rotation::default(),
            Some(&world()),
            hovered,
            &Palette::default(),
            &RenderOptions::default(),
        );
        surface
    }

    #[test]
    fn zero_sized_viewport_is_a_no_op() {
        let surface = draw(Viewport::new(0.0, 600.0, 1.0), None);
        assert_eq!(surface.ops, vec![]);
    }

    #[test]
    fn layers_draw_back_to_front() {
        let palette = Palette::default();
        let surface = draw(Viewport::new(800.0, 600.0, 1.0), Some(0));
        let ops = &surface.ops;

        assert_eq!(ops.first(), Some(&Op::Clear(800.0, 600.0)));

        let atmosphere = surface
            .position(|op| matches!(op, Op::FillRect(..)))
            .expect("atmosphere rect");
        let ocean = surface
            .position(|op| matches!(op, Op::Circle(..)))
            .expect("ocean disc");
        let graticule = surface
            .position(|op| *op == Op::StrokeColor(palette.graticule))
            .expect("graticule stroke");
        let land = surface
            .position(|op| *op == Op::FillColor(palette.land_fill))
            .expect("land fill");
        let hover = surface
            .position(|op| *op == Op::FillColor(palette.hover))
            .expect("hover overlay");
        let specular = surface
            .position(|op| match op {
                Op::FillGradient(g) => g.stops.first().map(|s| s.1) == Some(palette.specular),
                _ => false,
            })
            .expect("specular gradient");

        assert!(atmosphere < ocean);
        assert!(ocean < graticule);
        assert!(graticule < land);
        assert!(land < hover);
        assert!(hover < specular);
    }

    #[test]
    fn graticule_cache_matches_generator() {
        assert_eq!(*super::GRATICULE, geo::graticule::graticule());
    }

    #[test]
    fn rendering_is_idempotent() {
        let a = draw(Viewport::new(800.0, 600.0, 1.0), Some(0));
        let b = draw(Viewport::new(800.0, 600.0, 1.0), Some(0));
        assert_eq!(a.ops, b.ops);
    }

    #[test]
    fn resize_rescales_the_disc() {
        let big = draw(Viewport::new(800.0, 600.0, 1.0), None);
        let small = draw(Viewport::new(400.0, 300.0, 1.0), None);

        let radius = |s: &RecordingSurface| {
            s.ops.iter().find_map(|op| match op {
                Op::Circle(_, _, r) => Some(*r),
                _ => None,
            })
        };
        assert_eq!(radius(&big), Some(200.0));
        assert_eq!(radius(&small), Some(100.0));
    }

    #[test]
    fn far_hemisphere_country_draws_no_path() {
        let mut surface = RecordingSurface::default();
        let world = WorldGeometry {
            countries: vec![square_country("Behind", 180.0, 0.0)],
        };
        render(
            &mut surface,
            Viewport::new(800.0, 600.0, 1.0),
            Rotation::default(),
            Some(&world),
            None,
            &Palette::default(),
            &RenderOptions::default(),
        );
        // The land fill color is set, but no country path is filled
        // after it (no MoveTo between the land color and the specular
        // gradient).
        let land = surface
            .position(|op| *op == Op::FillColor(Palette::default().land_fill))
            .unwrap();
        let specular_path = surface.ops[land..]
            .iter()
            .position(|op| matches!(op, Op::MoveTo(..)))
            .map(|i| land + i);
        assert_eq!(specular_path, None);
    }

    #[test]
    fn empty_world_still_draws_ocean_and_atmosphere() {
        let mut surface = RecordingSurface::default();
        render(
            &mut surface,
            Viewport::new(640.0, 480.0, 2.0),
            Rotation::new(0.0, -30.0, 0.0),
            None,
            None,
            &Palette::default(),
            &RenderOptions::default(),
        );
        assert!(surface.position(|op| matches!(op, Op::FillRect(..))).is_some());
        assert!(surface.position(|op| matches!(op, Op::Circle(..))).is_some());
        assert!(surface.position(|op| *op == Op::FillColor(Palette::default().land_fill)).is_none());
    }
}
