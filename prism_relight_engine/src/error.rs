//! Error types for the Prism Relight engine
//!
//! This module defines the error types used throughout the engine,
//! including rendering, resource, and export failures, plus the
//! `engine_err!` / `engine_bail!` macros that log an error at its
//! point of origin before handing it to the caller.

use std::fmt;
use std::path::PathBuf;

/// Result type for Prism Relight engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism Relight engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, OpenGL, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, view set, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// A required input file could not be located, even after the
    /// alternate-extension fallback search
    ResourceNotFound(PathBuf),

    /// An export operation (resample, fidelity report, BTF) failed
    ExportFailed(String),

    /// A long operation was submitted while another is still in flight
    OperationInFlight,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ResourceNotFound(path) => write!(f, "Resource not found: {}", path.display()),
            Error::ExportFailed(msg) => write!(f, "Export failed: {}", msg),
            Error::OperationInFlight => write!(f, "Another long operation is already in flight"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::ExportFailed(error.to_string())
    }
}

/// Build a backend `Error` and log it with file:line information
///
/// # Example
///
/// ```no_run
/// return Err(engine_err!("prism::ShadowMapper", "layer {} out of range", layer));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::engine_error!($source, $($arg)*);
        $crate::prism::Error::BackendError(format!($($arg)*))
    }};
}

/// Log an error and return early with it
///
/// # Example
///
/// ```no_run
/// engine_bail!("prism::ShadowMapper", "layer {} out of range", layer);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
