use crate::vec::Vec3;

/// A geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Projection orientation as a rotation triple
/// (longitude offset, latitude offset, roll), all in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rotation {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub roll_deg: f64,
}

impl Rotation {
    pub fn new(lon_deg: f64, lat_deg: f64, roll_deg: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            roll_deg,
        }
    }
}

/// Unit vector on the sphere: x toward (0°, 0°), y toward (90°E, 0°),
/// z toward the north pole.
pub fn unit_from_lon_lat(p: LonLat) -> Vec3 {
    let lon = p.lon_deg.to_radians();
    let lat = p.lat_deg.to_radians();
    Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

pub fn lon_lat_from_unit(v: Vec3) -> LonLat {
    LonLat::new(
        v.y.atan2(v.x).to_degrees(),
        v.z.clamp(-1.0, 1.0).asin().to_degrees(),
    )
}

/// Shortest signed angular difference, in (-180, 180].
pub fn wrap_deg_180(delta_deg: f64) -> f64 {
    let w = (delta_deg + 180.0).rem_euclid(360.0) - 180.0;
    if w == -180.0 { 180.0 } else { w }
}
