pub mod palette;
pub mod pipeline;
pub mod recording;
pub mod surface;
pub mod viewport;

pub use palette::*;
pub use pipeline::*;
pub use surface::*;
pub use viewport::*;
