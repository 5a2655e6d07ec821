pub mod topology;

use std::sync::Arc;

use geo::{GeoBounds, LonLat};
use once_cell::sync::OnceCell;

pub use topology::{decode_topology, decode_topology_value};

/// Well-known public world map dataset (TopoJSON, 1:50m resolution,
/// one feature per country with a `name` property).
pub const WORLD_ATLAS_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-50m.json";

/// A named polygonal region on the sphere. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    /// Closed rings in geographic coordinates; outer rings and holes
    /// are distinguished by even-odd containment, not ordering.
    pub rings: Vec<Vec<LonLat>>,
    /// Load-time bounds, used as a hit-test prefilter.
    pub bounds: Option<GeoBounds>,
}

impl Country {
    pub fn new(name: String, rings: Vec<Vec<LonLat>>) -> Self {
        let bounds = geo::rings_bounds(&rings);
        Self {
            name,
            rings,
            bounds,
        }
    }

    pub fn contains(&self, p: LonLat) -> bool {
        match self.bounds {
            Some(b) if !b.contains(p) => false,
            None => false,
            _ => geo::contains(&self.rings, p),
        }
    }

    pub fn centroid(&self) -> Option<LonLat> {
        geo::centroid(&self.rings)
    }
}

/// The full set of loaded countries. Synthetic shapes (sphere outline,
/// graticule) are computed by `geo` independent of the data load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGeometry {
    pub countries: Vec<Country>,
}

impl WorldGeometry {
    /// Case-insensitive exact name match; first match in load order wins.
    /// Nameless countries are never matched.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.countries
            .iter()
            .position(|c| c.name.to_lowercase() == wanted)
    }

    /// Linear containment scan, in load order.
    pub fn country_at(&self, p: LonLat) -> Option<usize> {
        self.countries.iter().position(|c| c.contains(p))
    }
}

/// Publish-once store for the decoded world geometry.
///
/// A session loads at most once; on fetch or decode failure the store
/// stays empty forever and dependents degrade to an empty country set.
#[derive(Debug, Default)]
pub struct AtlasStore {
    world: OnceCell<Arc<WorldGeometry>>,
}

impl AtlasStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the geometry; returns false if a publication already
    /// happened (the first one stays).
    pub fn publish(&self, world: WorldGeometry) -> bool {
        self.world.set(Arc::new(world)).is_ok()
    }

    /// The same immutable reference for every call after publication.
    pub fn get(&self) -> Option<&Arc<WorldGeometry>> {
        self.world.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    NotATopology,
    Json(String),
    MissingCountries,
    InvalidArc { index: usize, reason: String },
    InvalidGeometry { index: usize, reason: String },
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasError::NotATopology => write!(f, "expected a TopoJSON Topology document"),
            AtlasError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            AtlasError::MissingCountries => write!(f, "topology has no countries object"),
            AtlasError::InvalidArc { index, reason } => {
                write!(f, "invalid arc at index {index}: {reason}")
            }
            AtlasError::InvalidGeometry { index, reason } => {
                write!(f, "invalid geometry at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for AtlasError {}

#[cfg(test)]
mod tests {
    use super::{AtlasStore, Country, WorldGeometry};
    use geo::LonLat;

    fn country(name: &str, lon: f64, lat: f64) -> Country {
        let ring = vec![
            LonLat::new(lon - 5.0, lat - 5.0),
            LonLat::new(lon + 5.0, lat - 5.0),
            LonLat::new(lon + 5.0, lat + 5.0),
            LonLat::new(lon - 5.0, lat + 5.0),
            LonLat::new(lon - 5.0, lat - 5.0),
        ];
        Country::new(name.to_string(), vec![ring])
    }

    #[test]
    fn find_by_name_is_case_insensitive_exact() {
        let world = WorldGeometry {
            countries: vec![country("Brazil", -52.0, -10.0), country("Chad", 18.0, 15.0)],
        };
        assert_eq!(world.find_by_name("brazil"), Some(0));
        assert_eq!(world.find_by_name("BRAZIL"), Some(0));
        assert_eq!(world.find_by_name("Chad"), Some(1));
        assert_eq!(world.find_by_name("Braz"), None);
        assert_eq!(world.find_by_name("Atlantis"), None);
    }

    #[test]
    fn country_at_scans_in_load_order() {
        let world = WorldGeometry {
            countries: vec![country("A", 0.0, 0.0), country("B", 2.0, 2.0)],
        };
        // Point inside both squares: first in load order wins.
        assert_eq!(world.country_at(LonLat::new(1.0, 1.0)), Some(0));
        assert_eq!(world.country_at(LonLat::new(6.5, 2.0)), Some(1));
        assert_eq!(world.country_at(LonLat::new(60.0, 0.0)), None);
    }

    #[test]
    fn store_publishes_exactly_once() {
        let store = AtlasStore::new();
        assert!(store.get().is_none());

        let first = WorldGeometry {
            countries: vec![country("First", 0.0, 0.0)],
        };
        assert!(store.publish(first));

        let second = WorldGeometry {
            countries: vec![country("Second", 10.0, 10.0)],
        };
        assert!(!store.publish(second));

        let world = store.get().expect("published");
        assert_eq!(world.countries[0].name, "First");
        // Repeated reads hand back the same allocation.
        assert!(std::sync::Arc::ptr_eq(world, store.get().unwrap()));
    }

    #[test]
    fn empty_store_misses_everything() {
        let world = WorldGeometry::default();
        assert_eq!(world.find_by_name("Brazil"), None);
        assert_eq!(world.country_at(LonLat::new(0.0, 0.0)), None);
    }
}
