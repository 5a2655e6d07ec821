pub mod config;
pub mod controller;
pub mod flight;

pub use config::*;
pub use controller::*;
pub use flight::*;
