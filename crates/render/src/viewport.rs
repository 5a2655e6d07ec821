/// Drawing surface extent in CSS pixels plus device pixel ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Projection scale (disc radius) leaving a visual margin:
    /// `min(width, height) / divisor`.
    pub fn globe_scale(&self, margin_divisor: f64) -> f64 {
        if margin_divisor <= 0.0 {
            return 0.0;
        }
        2.0 * geo::fit_radius(self.width, self.height) / margin_divisor
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}
