/// Resource module - proxy geometry and the per-dataset GPU resource bundle

pub mod geometry;
pub mod bundle;

pub use geometry::*;
pub use bundle::*;
