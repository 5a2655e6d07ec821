use std::sync::Arc;

use atlas::WorldGeometry;
use geo::{Orthographic, Rotation};
use render::Viewport;

use crate::config::ControlConfig;
use crate::flight::Flight;

/// Starting orientation: prime meridian centered, tilted 30 degrees
/// toward the northern hemisphere.
const INITIAL_ROTATION: Rotation = Rotation {
    lon_deg: 0.0,
    lat_deg: -30.0,
    roll_deg: 0.0,
};

/// Per-tick time is capped so a background tab does not slingshot the
/// globe on resume.
const MAX_TICK_S: f64 = 0.1;

/// Whichever of these owns the rotation is the only writer; installing
/// a new driver is the cancellation of the previous one.
#[derive(Debug, Clone, PartialEq)]
pub enum Driver {
    AutoRotating,
    Dragging { last_x: f64, last_y: f64 },
    SearchAnimating(Flight),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

/// Hover carries its tooltip so the two are present or absent together.
#[derive(Debug, Clone, PartialEq)]
pub struct Hover {
    pub country: usize,
    pub tooltip: Tooltip,
}

/// Search completion signal, delivered exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    NotFound,
    Arrived { country: usize },
}

/// Result of one clock tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tick {
    /// True when the frame differs from the previous one; callers skip
    /// the render otherwise.
    pub redraw: bool,
    pub search: Option<SearchEvent>,
}

/// Owns the rotation triple, the hover/tooltip state, and the driver
/// state machine. One instance per mounted globe; all methods run on
/// the single event-processing thread.
#[derive(Debug)]
pub struct GlobeController {
    config: ControlConfig,
    viewport: Viewport,
    rotation: Rotation,
    driver: Driver,
    hover: Option<Hover>,
    world: Option<Arc<WorldGeometry>>,
}

impl GlobeController {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
            rotation: INITIAL_ROTATION,
            driver: Driver::AutoRotating,
            hover: None,
            world: None,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// External orientation override; does not change the active driver.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hover(&self) -> Option<&Hover> {
        self.hover.as_ref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.as_ref().map(|h| &h.tooltip)
    }

    pub fn world(&self) -> Option<&Arc<WorldGeometry>> {
        self.world.as_ref()
    }

    /// Adopt the published geometry. First call wins; the collection is
    /// immutable for the rest of the session.
    pub fn set_world(&mut self, world: Arc<WorldGeometry>) -> bool {
        if self.world.is_some() {
            return false;
        }
        self.hover = None;
        self.world = Some(world);
        true
    }

    /// Returns true when the viewport actually changed (callers then
    /// resize the backing store and re-render).
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    fn projection(&self) -> Orthographic {
        Orthographic::new(
            self.rotation,
            self.viewport.globe_scale(self.config.margin_divisor),
            self.viewport.center(),
        )
    }

    /// The cooperative clock: called once per animation frame.
    pub fn advance(&mut self, dt_s: f64) -> Tick {
        let dt = dt_s.clamp(0.0, MAX_TICK_S);
        match &mut self.driver {
            Driver::AutoRotating => {
                if dt <= 0.0 {
                    return Tick::default();
                }
                self.rotation.lon_deg += self.config.auto_rotate_speed_deg_per_s * dt;
                Tick {
                    redraw: true,
                    search: None,
                }
            }
            // Dragging rotates on pointer deltas, not on the clock.
            Driver::Dragging { .. } => Tick::default(),
            Driver::SearchAnimating(flight) => {
                let (rotation, done) = flight.advance(dt);
                let moved = rotation != self.rotation;
                self.rotation = rotation;
                if !done {
                    return Tick {
                        redraw: moved,
                        search: None,
                    };
                }
                let country = flight.country;
                self.driver = Driver::AutoRotating;
                self.hover = self.arrival_hover(country);
                Tick {
                    redraw: true,
                    search: Some(SearchEvent::Arrived { country }),
                }
            }
        }
    }

    /// Hover for a country reached by search: highlighted with the
    /// tooltip pinned at its projected centroid.
    fn arrival_hover(&self, country: usize) -> Option<Hover> {
        let world = self.world.as_ref()?;
        let record = world.countries.get(country)?;
        let (cx, cy) = self.viewport.center();
        let (x, y) = record
            .centroid()
            .and_then(|c| self.projection().project(c))
            .unwrap_or((cx, cy));
        Some(Hover {
            country,
            tooltip: Tooltip {
                x,
                y,
                name: record.name.clone(),
            },
        })
    }

    /// Pointer down: the drag preempts whichever driver is active and
    /// clears the hover state. Returns whether a hover was cleared and
    /// the frame needs repainting.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.driver = Driver::Dragging {
            last_x: x,
            last_y: y,
        };
        self.hover.take().is_some()
    }

    /// Pointer motion: drag rotation while a drag is active, hover
    /// hit-testing otherwise. Returns whether a redraw is needed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        if let Driver::Dragging { last_x, last_y } = &mut self.driver {
            let dx = x - *last_x;
            let dy = y - *last_y;
            *last_x = x;
            *last_y = y;

            let scale = self.viewport.globe_scale(self.config.margin_divisor);
            if scale <= 0.0 || (dx == 0.0 && dy == 0.0) {
                return false;
            }
            let k = self.config.drag_sensitivity / scale;
            self.rotation.lon_deg += dx * k;
            // Unclamped on purpose: the globe may flip over the poles.
            self.rotation.lat_deg -= dy * k;
            return true;
        }
        self.update_hover(x, y)
    }

    /// Drag end hands the rotation back to auto-rotation. A search
    /// animation in progress is unaffected.
    pub fn pointer_up(&mut self) {
        if matches!(self.driver, Driver::Dragging { .. }) {
            self.driver = Driver::AutoRotating;
        }
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.hover.take().is_some()
    }

    fn update_hover(&mut self, x: f64, y: f64) -> bool {
        let hit = match (&self.world, self.projection().invert(x, y)) {
            (Some(world), Some(coord)) => world.country_at(coord),
            // Off the disc, or nothing loaded yet: no hover target.
            _ => None,
        };
        match hit {
            Some(index) => {
                let changed = self.hover.as_ref().map(|h| h.country) != Some(index);
                let name = self
                    .world
                    .as_ref()
                    .and_then(|w| w.countries.get(index))
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                // The tooltip follows the pointer even when the hovered
                // country is unchanged; only a country change needs a
                // repaint.
                self.hover = Some(Hover {
                    country: index,
                    tooltip: Tooltip { x, y, name },
                });
                changed
            }
            None => self.hover.take().is_some(),
        }
    }

    /// Start a fly-to-country animation.
    ///
    /// A miss (unknown name, or nothing loaded) completes immediately
    /// with `NotFound` and leaves the rotation untouched. A hit installs
    /// a new flight from the current rotation, preempting any active
    /// driver; its completion is reported by a later [`advance`] tick.
    ///
    /// [`advance`]: GlobeController::advance
    pub fn fly_to(&mut self, name: &str) -> Option<SearchEvent> {
        let target = self.world.as_ref().and_then(|world| {
            let index = world.find_by_name(name)?;
            let centroid = world.countries[index].centroid()?;
            Some((index, centroid))
        });
        let Some((index, centroid)) = target else {
            return Some(SearchEvent::NotFound);
        };

        let target = Rotation::new(-centroid.lon_deg, -centroid.lat_deg, 0.0);
        self.driver = Driver::SearchAnimating(Flight::new(
            index,
            self.rotation,
            target,
            self.config.flight_duration_s,
        ));
        None
    }
}

impl Default for GlobeController {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Driver, GlobeController, SearchEvent};
    use atlas::{Country, WorldGeometry};
    use geo::{LonLat, Rotation};
    use pretty_assertions::assert_eq;
    use render::Viewport;
    use std::sync::Arc;

    const TICK: f64 = 1.0 / 60.0;

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

    fn controller_with_world() -> GlobeController {
        let mut ctrl = GlobeController::default();
        ctrl.set_viewport(Viewport::new(600.0, 600.0, 1.0));
        let world = WorldGeometry {
            countries: vec![
                square_country("Brazil", -52.0, -10.0),
                square_country("Chad", 18.0, 15.0),
                square_country("Frontland", 0.0, 0.0),
            ],
        };
        ctrl.set_world(Arc::new(world));
        ctrl
    }

    #[test]
    fn auto_rotation_advances_longitude() {
        let mut ctrl = GlobeController::default();
        let lon0 = ctrl.rotation().lon_deg;
        let tick = ctrl.advance(TICK);
        assert!(tick.redraw);
        // 6 deg/s at 60 Hz is the classic 0.1 deg per tick.
        assert!((ctrl.rotation().lon_deg - lon0 - 0.1).abs() < 1e-9);
    }

    #[test]
    fn rotation_runs_before_geometry_loads() {
        let mut ctrl = GlobeController::default();
        assert!(ctrl.world().is_none());
        assert!(ctrl.advance(TICK).redraw);
        assert!(!ctrl.pointer_move(10.0, 10.0));
        assert_eq!(ctrl.fly_to("Brazil"), Some(SearchEvent::NotFound));
    }

    #[test]
    fn drag_preempts_auto_rotation_until_release() {
        let mut ctrl = controller_with_world();
        ctrl.pointer_down(100.0, 100.0);
        assert!(matches!(ctrl.driver(), Driver::Dragging { .. }));

        let rot = ctrl.rotation();
        let tick = ctrl.advance(TICK);
        assert!(!tick.redraw);
        assert_eq!(ctrl.rotation(), rot);

        // scale = 600/3 = 200, so k = 50/200 = 0.25 deg per pixel.
        assert!(ctrl.pointer_move(110.0, 92.0));
        assert!((ctrl.rotation().lon_deg - rot.lon_deg - 2.5).abs() < 1e-9);
        assert!((ctrl.rotation().lat_deg - rot.lat_deg - 2.0).abs() < 1e-9);

        ctrl.pointer_up();
        assert!(matches!(ctrl.driver(), Driver::AutoRotating));
        assert!(ctrl.advance(TICK).redraw);
    }

    #[test]
    fn drag_start_clears_hover() {
        let mut ctrl = controller_with_world();
        ctrl.set_rotation(Rotation::default());
        assert!(ctrl.pointer_move(300.0, 300.0));
        assert!(ctrl.hover().is_some());

        // Repaint needed only when there was a hover to clear.
        assert!(ctrl.pointer_down(300.0, 300.0));
        assert!(ctrl.hover().is_none());
        assert!(ctrl.tooltip().is_none());

        ctrl.pointer_up();
        assert!(!ctrl.pointer_down(300.0, 300.0));
    }

    #[test]
    fn hover_and_tooltip_are_joined_at_the_hip() {
        let mut ctrl = controller_with_world();
        ctrl.set_rotation(Rotation::default());

        // Viewport center inverts to (0, 0), inside Frontland.
        let redraw = ctrl.pointer_move(300.0, 300.0);
        assert!(redraw);
        let hover = ctrl.hover().expect("hovering Frontland");
        assert_eq!(hover.country, 2);
        assert_eq!(hover.tooltip.name, "Frontland");
        assert_eq!((hover.tooltip.x, hover.tooltip.y), (300.0, 300.0));

        // Same country: tooltip follows the pointer, no repaint needed.
        let redraw = ctrl.pointer_move(302.0, 301.0);
        assert!(!redraw);
        let tooltip = ctrl.tooltip().expect("still hovering");
        assert_eq!((tooltip.x, tooltip.y), (302.0, 301.0));

        // On the disc but over open ocean: hover clears.
        let redraw = ctrl.pointer_move(360.0, 300.0);
        assert!(redraw);
        assert!(ctrl.hover().is_none() && ctrl.tooltip().is_none());

        // Off the disc entirely: still no hover, nothing to repaint.
        assert!(!ctrl.pointer_move(10.0, 10.0));
        assert!(ctrl.hover().is_none());

        // Hover again, then leave the canvas.
        assert!(ctrl.pointer_move(300.0, 300.0));
        assert!(ctrl.pointer_leave());
        assert!(ctrl.hover().is_none() && ctrl.tooltip().is_none());
        assert!(!ctrl.pointer_leave());
    }

    #[test]
    fn fly_to_matches_case_insensitively_and_lands_hovered() {
        let mut ctrl = controller_with_world();
        assert_eq!(ctrl.fly_to("bRaZiL"), None);
        assert!(matches!(ctrl.driver(), Driver::SearchAnimating(_)));

        let mut arrivals = Vec::new();
        let mut ticks = 0;
        while ticks < 200 {
            let tick = ctrl.advance(TICK);
            ticks += 1;
            if let Some(event) = tick.search {
                arrivals.push(event);
                break;
            }
        }
        // ~1.25 s at 60 Hz.
        assert!((74..=76).contains(&ticks), "landed after {ticks} ticks");
        assert_eq!(arrivals, vec![SearchEvent::Arrived { country: 0 }]);

        // Centroid negated: Brazil front and center.
        let rot = ctrl.rotation();
        assert!((rot.lon_deg - 52.0).abs() < 1.0);
        assert!((rot.lat_deg - 10.0).abs() < 1.0);

        // Landed hovered, back under auto-rotation, no second signal.
        assert_eq!(ctrl.hover().map(|h| h.country), Some(0));
        assert_eq!(ctrl.tooltip().map(|t| t.name.as_str()), Some("Brazil"));
        assert!(matches!(ctrl.driver(), Driver::AutoRotating));
        let tick = ctrl.advance(TICK);
        assert!(tick.redraw && tick.search.is_none());
    }

    #[test]
    fn fly_to_centers_centroid_on_screen() {
        let mut ctrl = controller_with_world();
        ctrl.fly_to("Brazil");
        for _ in 0..200 {
            if ctrl.advance(TICK).search.is_some() {
                break;
            }
        }
        let world = ctrl.world().unwrap().clone();
        let centroid = world.countries[0].centroid().unwrap();
        let proj = geo::Orthographic::new(ctrl.rotation(), 200.0, (300.0, 300.0));
        let (sx, sy) = proj.project(centroid).expect("centroid faces front");
        assert!((sx - 300.0).abs() < 1.0 && (sy - 300.0).abs() < 1.0);
        // And the front-center point inverts into Brazil.
        let inv = proj.invert(300.0, 300.0).unwrap();
        assert!(world.countries[0].contains(inv));
    }

    #[test]
    fn unknown_country_reports_not_found_without_moving() {
        let mut ctrl = controller_with_world();
        let rot = ctrl.rotation();
        assert_eq!(ctrl.fly_to("Atlantis"), Some(SearchEvent::NotFound));
        assert_eq!(ctrl.rotation(), rot);
        assert!(matches!(ctrl.driver(), Driver::AutoRotating));
    }

    #[test]
    fn second_search_preempts_the_first() {
        let mut ctrl = controller_with_world();
        assert_eq!(ctrl.fly_to("Brazil"), None);
        for _ in 0..10 {
            assert!(ctrl.advance(TICK).search.is_none());
        }

        assert_eq!(ctrl.fly_to("Chad"), None);
        let mut events = Vec::new();
        for _ in 0..200 {
            if let Some(event) = ctrl.advance(TICK).search {
                events.push(event);
                break;
            }
        }
        // Only the second flight ever completes.
        assert_eq!(events, vec![SearchEvent::Arrived { country: 1 }]);
        let rot = ctrl.rotation();
        assert!((rot.lon_deg - -18.0).abs() < 1.0);
        assert!((rot.lat_deg - -15.0).abs() < 1.0);
    }

    #[test]
    fn search_preempts_an_active_drag() {
        let mut ctrl = controller_with_world();
        ctrl.pointer_down(50.0, 50.0);
        assert_eq!(ctrl.fly_to("Chad"), None);
        assert!(matches!(ctrl.driver(), Driver::SearchAnimating(_)));
        // The stale pointer-up from the abandoned drag must not eject
        // the flight.
        ctrl.pointer_up();
        assert!(matches!(ctrl.driver(), Driver::SearchAnimating(_)));
    }

    #[test]
    fn resize_mid_rotation_keeps_rotating() {
        let mut ctrl = controller_with_world();
        ctrl.advance(TICK);
        let lon_before = ctrl.rotation().lon_deg;

        assert!(ctrl.set_viewport(Viewport::new(400.0, 300.0, 2.0)));
        assert!(!ctrl.set_viewport(Viewport::new(400.0, 300.0, 2.0)));

        let tick = ctrl.advance(TICK);
        assert!(tick.redraw);
        assert!(ctrl.rotation().lon_deg > lon_before);
        // Drag sensitivity tracks the new, smaller scale (300/3 = 100).
        ctrl.pointer_down(0.0, 0.0);
        ctrl.pointer_move(10.0, 0.0);
        let expected = 10.0 * 50.0 / 100.0;
        let drift = ctrl.rotation().lon_deg - lon_before - 0.1;
        assert!((drift - expected).abs() < 1e-9);
    }

    #[test]
    fn world_is_adopted_once() {
        let mut ctrl = controller_with_world();
        let replacement = WorldGeometry {
            countries: vec![square_country("Late", 0.0, 0.0)],
        };
        assert!(!ctrl.set_world(Arc::new(replacement)));
        assert_eq!(ctrl.world().unwrap().countries.len(), 3);
    }
}
