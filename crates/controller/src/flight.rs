use geo::{Rotation, wrap_deg_180};

/// Cubic ease-out: fast start, slow settle.
pub fn ease_out_cubic(t: f64) -> f64 {
    let u = 1.0 - t.clamp(0.0, 1.0);
    1.0 - u * u * u
}

/// One fly-to animation: interpolates the rotation triple from its
/// value at takeoff to the target, taking the shortest angular path per
/// component.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub country: usize,
    from: Rotation,
    delta: Rotation,
    duration_s: f64,
    elapsed_s: f64,
}

impl Flight {
    pub fn new(country: usize, from: Rotation, target: Rotation, duration_s: f64) -> Self {
        Self {
            country,
            from,
            delta: Rotation::new(
                wrap_deg_180(target.lon_deg - from.lon_deg),
                wrap_deg_180(target.lat_deg - from.lat_deg),
                wrap_deg_180(target.roll_deg - from.roll_deg),
            ),
            duration_s: duration_s.max(1e-3),
            elapsed_s: 0.0,
        }
    }

    /// Advance by `dt_s`; returns the rotation to apply and whether the
    /// flight has landed (exactly on target).
    pub fn advance(&mut self, dt_s: f64) -> (Rotation, bool) {
        self.elapsed_s += dt_s.max(0.0);
        let done = self.elapsed_s >= self.duration_s;
        let k = if done {
            1.0
        } else {
            ease_out_cubic(self.elapsed_s / self.duration_s)
        };
        let rotation = Rotation::new(
            self.from.lon_deg + self.delta.lon_deg * k,
            self.from.lat_deg + self.delta.lat_deg * k,
            self.from.roll_deg + self.delta.roll_deg * k,
        );
        (rotation, done)
    }
}
