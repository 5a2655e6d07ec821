use crate::coords::{LonLat, lon_lat_from_unit, unit_from_lon_lat, wrap_deg_180};
use crate::vec::Vec3;

/// Geographic bounding box with an unwrapped longitude range: `lon_max`
/// may exceed 180 for shapes crossing the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoBounds {
    pub fn contains(&self, p: LonLat) -> bool {
        if p.lat_deg < self.lat_min || p.lat_deg > self.lat_max {
            return false;
        }
        [-360.0, 0.0, 360.0]
            .iter()
            .any(|k| p.lon_deg + k >= self.lon_min && p.lon_deg + k <= self.lon_max)
    }
}

/// Bounding box of a set of closed rings, unwrapping longitudes along
/// each ring. A ring that encircles a pole (full 360 longitude span)
/// gets its latitude range extended to that pole, since no vertex
/// reaches it.
pub fn rings_bounds(rings: &[Vec<LonLat>]) -> Option<GeoBounds> {
    let mut out: Option<GeoBounds> = None;

    for ring in rings {
        let Some(first) = ring.first() else {
            continue;
        };
        let mut lon = first.lon_deg;
        let mut b = GeoBounds {
            lon_min: lon,
            lon_max: lon,
            lat_min: first.lat_deg,
            lat_max: first.lat_deg,
        };
        for p in &ring[1..] {
            lon += wrap_deg_180(p.lon_deg - lon);
            b.lon_min = b.lon_min.min(lon);
            b.lon_max = b.lon_max.max(lon);
            b.lat_min = b.lat_min.min(p.lat_deg);
            b.lat_max = b.lat_max.max(p.lat_deg);
        }

        if b.lon_max - b.lon_min >= 355.0 {
            if (b.lat_min + b.lat_max) * 0.5 < 0.0 {
                b.lat_min = -90.0;
            } else {
                b.lat_max = 90.0;
            }
        }

        out = Some(match out {
            None => b,
            Some(acc) => GeoBounds {
                lon_min: acc.lon_min.min(b.lon_min),
                lon_max: acc.lon_max.max(b.lon_max),
                lat_min: acc.lat_min.min(b.lat_min),
                lat_max: acc.lat_max.max(b.lat_max),
            },
        });
    }

    out
}

/// Spherical point-in-polygon with even-odd semantics (holes work).
///
/// The rings are projected stereographically from the antipode of the
/// test point, which maps the test point to the plane origin; a planar
/// crossing count along the +x ray then decides containment. The
/// projection degenerates for ring vertices near the antipode and would
/// invert parity there, so points outside the [`rings_bounds`] box are
/// rejected up front.
pub fn contains(rings: &[Vec<LonLat>], p: LonLat) -> bool {
    match rings_bounds(rings) {
        Some(b) if b.contains(p) => {}
        _ => return false,
    }

    let t = unit_from_lon_lat(p);
    let helper = if t.z.abs() < 0.9 {
        Vec3::new(0.0, 0.0, 1.0)
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    };
    let Some(e1) = t.cross(helper).normalized() else {
        return false;
    };
    let e2 = t.cross(e1);

    let stereo = |v: Vec3| -> (f64, f64) {
        let d = (1.0 + v.dot(t)).max(1e-9);
        (v.dot(e1) / d, v.dot(e2) / d)
    };

    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut prev = stereo(unit_from_lon_lat(ring[n - 1]));
        for vertex in ring {
            let cur = stereo(unit_from_lon_lat(*vertex));
            if (prev.1 > 0.0) != (cur.1 > 0.0) {
                let frac = prev.1 / (prev.1 - cur.1);
                let x_int = prev.0 + frac * (cur.0 - prev.0);
                if x_int > 0.0 {
                    inside = !inside;
                }
            }
            prev = cur;
        }
    }
    inside
}

/// Area-weighted spherical centroid of a set of rings.
///
/// The vector-area sum `Σ vᵢ × vᵢ₊₁` points through the enclosed region;
/// its sign is fixed against the vertex mean so ring winding does not
/// matter. Falls back to the vertex mean for degenerate input.
pub fn centroid(rings: &[Vec<LonLat>]) -> Option<LonLat> {
    let mut area_sum = Vec3::ZERO;
    let mut vertex_sum = Vec3::ZERO;
    let mut count = 0usize;

    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut prev = unit_from_lon_lat(ring[n - 1]);
        for vertex in ring {
            let cur = unit_from_lon_lat(*vertex);
            area_sum = area_sum + prev.cross(cur);
            vertex_sum = vertex_sum + cur;
            count += 1;
            prev = cur;
        }
    }

    if count == 0 {
        return None;
    }

    let mean = vertex_sum.normalized()?;
    let dir = match area_sum.normalized() {
        Some(d) if d.dot(mean) < 0.0 => -d,
        Some(d) => d,
        None => mean,
    };
    Some(lon_lat_from_unit(dir))
}
