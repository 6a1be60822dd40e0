/// GraphicsDevice trait - main device interface for creating resources
/// and controlling fixed-function raster state

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, Drawable, Framebuffer, FramebufferDesc, ShaderProgram, ShaderProgramDesc,
    Texture, TextureDesc,
};

/// Main graphics device trait
///
/// This is the central factory interface for creating GPU resources.
/// Implemented by backend-specific devices; the engine holds it as an
/// `Arc<dyn GraphicsDevice>` and never sees the concrete type.
///
/// All created resources are scoped RAII handles: dropping the handle
/// releases the GPU object on every exit path, including error paths.
pub trait GraphicsDevice: Send + Sync {
    /// Create a texture
    ///
    /// # Arguments
    ///
    /// * `desc` - Texture descriptor
    fn create_texture(&self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor
    fn create_buffer(&self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a shader program
    ///
    /// # Arguments
    ///
    /// * `desc` - Program descriptor (stage source paths)
    fn create_shader_program(&self, desc: ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>>;

    /// Create an offscreen framebuffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Framebuffer descriptor
    fn create_framebuffer(&self, desc: FramebufferDesc) -> Result<Box<dyn Framebuffer>>;

    /// Create a drawable for a program
    ///
    /// # Arguments
    ///
    /// * `program` - The program the drawable renders with
    fn create_drawable(&self, program: &Arc<dyn ShaderProgram>) -> Result<Box<dyn Drawable>>;

    /// Create a vertex buffer holding a full-screen rectangle
    ///
    /// Used by background, blit, and billboard passes. The backend decides
    /// the exact vertex layout; drawables created from it are drawn with
    /// `PrimitiveTopology::TriangleFan`.
    fn create_rectangle(&self) -> Result<Arc<dyn Buffer>>;

    /// The default (window) framebuffer
    fn default_framebuffer(&self) -> Arc<dyn Framebuffer>;

    // ===== RASTER STATE =====

    /// Enable or disable multisampling
    fn set_multisampling(&self, enabled: bool);

    /// Enable or disable back-face culling
    fn set_back_face_culling(&self, enabled: bool);

    /// Enable or disable depth testing
    fn set_depth_testing(&self, enabled: bool);

    /// Enable or disable additive (one + one) alpha blending
    fn set_additive_blending(&self, enabled: bool);

    // ===== SUBMISSION =====

    /// Flush pending GPU commands
    fn flush(&self) -> Result<()>;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;
}
