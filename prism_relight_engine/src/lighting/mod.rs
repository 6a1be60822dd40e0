/// Lighting module - virtual light controllers, light-space transforms,
/// and shadow-map generation

pub mod controller;
pub mod transforms;
pub mod shadow;

pub use controller::*;
pub use shadow::*;
pub use transforms::*;
