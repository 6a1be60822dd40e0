/// Graphics device module - the opaque GPU backend seam
///
/// The engine never talks to a concrete graphics API. Everything it needs
/// from the GPU is expressed through the traits in this module; backend
/// crates implement them and hand the engine an `Arc<dyn GraphicsDevice>`.

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod shader;
pub mod framebuffer;
pub mod drawable;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use buffer::*;
pub use shader::*;
pub use framebuffer::*;
pub use drawable::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
