/*!
# Prism Relight Engine

Image-based relighting engine for calibrated photograph sets.

This crate renders novel views of a photographed object by projectively
blending the original photographs over a proxy mesh, optionally relit with
virtual shadow-mapped lights. It also estimates per-view fidelity: how much
reconstruction error grows when a view's angular neighbors are withheld,
which yields an importance ranking over an arbitrary target view set.

The GPU backend is consumed through trait-based dynamic polymorphism
(similar to C++ virtual inheritance). Backend implementations (Vulkan,
OpenGL, etc.) provide concrete types for the `graphics_device` traits and
are plugged in at runtime.

## Architecture

- **GraphicsDevice**: factory trait for GPU resources (opaque backend seam)
- **ViewSet / ResourceBundle**: calibrated views and their GPU-side data
- **RelightRenderer**: the per-frame multi-pass relighting pipeline
- **Resampler**: batch re-rendering into new camera poses
- **FidelityEstimator**: error-curve fitting and view-importance ranking
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod camera;
pub mod resource;
pub mod scene;
pub mod lighting;
pub mod rendering;
pub mod fidelity;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine facade (logging management)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // GPU backend seam
    pub mod gpu {
        pub use crate::graphics_device::*;
    }

    // Camera / view set types
    pub mod camera {
        pub use crate::camera::*;
    }

    // Resource bundle types
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene instance types
    pub mod scene {
        pub use crate::scene::*;
    }

    // Virtual lighting and shadow maps
    pub mod lighting {
        pub use crate::lighting::*;
    }

    // Render pipeline, resampler, requests
    pub mod rendering {
        pub use crate::rendering::*;
    }

    // Fidelity / view importance estimation
    pub mod fidelity {
        pub use crate::fidelity::*;
    }
}

// Re-export math library at crate root
pub use glam;
