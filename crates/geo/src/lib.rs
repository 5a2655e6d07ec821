pub mod coords;
pub mod graticule;
pub mod ortho;
pub mod polygon;
pub mod vec;

// Geo crate: pure spherical math only. No I/O, no drawing.
pub use coords::*;
pub use ortho::*;
pub use polygon::*;
pub use vec::*;
