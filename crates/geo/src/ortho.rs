use crate::coords::{LonLat, Rotation, wrap_deg_180};
use crate::vec::Vec3;

/// Slack for the horizon test so points exactly on the limb stay visible.
const LIMB_EPSILON: f64 = 1e-9;

/// Orthographic projection of the unit sphere, oriented by a rotation
/// triple: the longitude offset is applied first, then the latitude and
/// roll offsets as axis rotations (`Rx(roll) · Ry(lat)` in view space).
///
/// Pure value type; rebuild it whenever rotation, scale, or the viewport
/// center changes.
#[derive(Debug, Copy, Clone)]
pub struct Orthographic {
    rotation: Rotation,
    scale: f64,
    tx: f64,
    ty: f64,
    cos_phi: f64,
    sin_phi: f64,
    cos_gamma: f64,
    sin_gamma: f64,
}

impl Orthographic {
    pub fn new(rotation: Rotation, scale: f64, translate: (f64, f64)) -> Self {
        let phi = rotation.lat_deg.to_radians();
        let gamma = rotation.roll_deg.to_radians();
        Self {
            rotation,
            scale,
            tx: translate.0,
            ty: translate.1,
            cos_phi: phi.cos(),
            sin_phi: phi.sin(),
            cos_gamma: gamma.cos(),
            sin_gamma: gamma.sin(),
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    /// Rotate a geographic coordinate into view space.
    ///
    /// View space: x out of the screen toward the viewer, y to the
    /// right, z up. The near hemisphere is `x >= 0`.
    pub fn view_vector(&self, p: LonLat) -> Vec3 {
        let lon = (p.lon_deg + self.rotation.lon_deg).to_radians();
        let lat = p.lat_deg.to_radians();
        let x = lat.cos() * lon.cos();
        let y = lat.cos() * lon.sin();
        let z = lat.sin();

        let x1 = x * self.cos_phi - z * self.sin_phi;
        let k = x * self.sin_phi + z * self.cos_phi;
        let y1 = y * self.cos_gamma - k * self.sin_gamma;
        let z1 = k * self.cos_gamma + y * self.sin_gamma;
        Vec3::new(x1, y1, z1)
    }

    /// Screen point for a view-space vector, ignoring visibility.
    pub fn view_to_screen(&self, v: Vec3) -> (f64, f64) {
        (self.tx + self.scale * v.y, self.ty - self.scale * v.z)
    }

    /// Geographic coordinate to screen pixels, `None` on the far
    /// hemisphere.
    pub fn project(&self, p: LonLat) -> Option<(f64, f64)> {
        let v = self.view_vector(p);
        if v.x < -LIMB_EPSILON {
            return None;
        }
        Some(self.view_to_screen(v))
    }

    /// Screen pixels back to a geographic coordinate, `None` outside the
    /// projected disc.
    pub fn invert(&self, sx: f64, sy: f64) -> Option<LonLat> {
        if self.scale <= 0.0 {
            return None;
        }
        let y1 = (sx - self.tx) / self.scale;
        let z1 = (self.ty - sy) / self.scale;
        let r2 = y1 * y1 + z1 * z1;
        if r2 > 1.0 {
            return None;
        }
        let x1 = (1.0 - r2).sqrt();

        // Undo the roll rotation, then the latitude rotation.
        let y = y1 * self.cos_gamma + z1 * self.sin_gamma;
        let k = z1 * self.cos_gamma - y1 * self.sin_gamma;
        let x = x1 * self.cos_phi + k * self.sin_phi;
        let z = k * self.cos_phi - x1 * self.sin_phi;

        let lon = y.atan2(x).to_degrees() - self.rotation.lon_deg;
        let lat = z.clamp(-1.0, 1.0).asin().to_degrees();
        Some(LonLat::new(wrap_deg_180(lon), lat))
    }
}

/// Radius at which the projected sphere fits a `width` x `height`
/// viewport without clipping. Callers divide by a margin factor for
/// breathing room around the disc.
pub fn fit_radius(width: f64, height: f64) -> f64 {
    (width.min(height) / 2.0).max(0.0)
}
