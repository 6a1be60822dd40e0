/// Drawable trait - a shader program bound to named vertex streams
///
/// A Drawable pairs a program with the vertex buffers feeding its named
/// attributes. Drawing is parameterized only by primitive topology and
/// target framebuffer; everything else (uniforms, textures) lives on the
/// program.

use crate::error::Result;
use crate::graphics_device::{Buffer, Framebuffer, ShaderProgram};
use std::sync::Arc;

/// Primitive topology for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleFan,
    LineList,
    PointList,
}

/// Drawable trait
///
/// Implemented by backend-specific drawable types.
/// Vertex attributes are matched by the names declared in the vertex shader.
pub trait Drawable: Send + Sync {
    /// Bind a vertex buffer to a named vertex attribute
    fn add_vertex_buffer(&mut self, name: &str, buffer: &Arc<dyn Buffer>) -> Result<()>;

    /// The shader program this drawable renders with
    fn program(&self) -> &Arc<dyn ShaderProgram>;

    /// Issue a draw call into the target framebuffer
    ///
    /// # Arguments
    ///
    /// * `topology` - Primitive topology
    /// * `target` - Framebuffer receiving the output
    fn draw(&self, topology: PrimitiveTopology, target: &dyn Framebuffer) -> Result<()>;
}
