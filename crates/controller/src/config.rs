/// Interaction tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Idle spin rate. 6 deg/s is 0.1 degrees per 60 Hz tick.
    pub auto_rotate_speed_deg_per_s: f64,
    /// Pixel-to-degree drag factor, divided by the current projection
    /// scale so drag speed is resolution independent.
    pub drag_sensitivity: f64,
    /// Search fly-to duration.
    pub flight_duration_s: f64,
    /// Disc radius = min(viewport dimension) / margin_divisor.
    pub margin_divisor: f64,
    pub show_graticule: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            auto_rotate_speed_deg_per_s: 6.0,
            drag_sensitivity: 50.0,
            flight_duration_s: 1.25,
            margin_divisor: 3.0,
            show_graticule: true,
        }
    }
}
