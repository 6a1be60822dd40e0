/// Framebuffer trait and descriptor
///
/// A framebuffer owns zero or more color attachments plus an optional depth
/// attachment. The depth attachment can be retargeted to a single layer of a
/// depth texture array, which is how the shadow subsystem renders one layer
/// per light into a shared framebuffer.

use crate::error::Result;
use crate::graphics_device::{Texture, TextureFormat};
use std::sync::Arc;

/// Descriptor for a single color attachment
#[derive(Debug, Clone)]
pub struct ColorAttachmentDesc {
    /// Pixel format
    pub format: TextureFormat,
    /// Enable linear filtering when the attachment is sampled later
    pub linear_filtering: bool,
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color attachments (may be empty for depth-only framebuffers)
    pub color_attachments: Vec<ColorAttachmentDesc>,
    /// Whether to create a depth attachment
    pub depth_attachment: bool,
}

impl FramebufferDesc {
    /// Descriptor for a single-color-attachment framebuffer with depth
    pub fn color_depth(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            color_attachments: vec![ColorAttachmentDesc {
                format,
                linear_filtering: false,
            }],
            depth_attachment: true,
        }
    }

    /// Descriptor for a depth-only framebuffer (shadow passes)
    pub fn depth_only(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_attachments: Vec::new(),
            depth_attachment: true,
        }
    }
}

/// Framebuffer trait
///
/// Implemented by backend-specific framebuffer types, including the default
/// (window) framebuffer. Offscreen framebuffers are automatically destroyed
/// when dropped; the default framebuffer outlives the engine.
pub trait Framebuffer: Send + Sync {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Clear one color attachment to the given RGBA value
    fn clear_color(&self, attachment: u32, color: [f32; 4]) -> Result<()>;

    /// Clear the depth attachment
    fn clear_depth(&self, depth: f32) -> Result<()>;

    /// Retarget the depth attachment to one layer of a depth texture array
    ///
    /// # Arguments
    ///
    /// * `texture` - Depth texture (must have `DepthStencil` usage)
    /// * `layer` - Array layer to attach (must be < `array_layers`)
    fn set_depth_attachment_layer(&self, texture: &Arc<dyn Texture>, layer: u32) -> Result<()>;

    /// Get a color attachment as a sampleable texture (for blit passes)
    fn color_attachment_texture(&self, attachment: u32) -> Result<Arc<dyn Texture>>;

    /// Read back a color attachment as tightly packed RGBA f32 pixels
    ///
    /// This is a synchronous barrier: the call blocks until the GPU has
    /// finished writing the attachment.
    fn read_color_f32(&self, attachment: u32) -> Result<Vec<f32>>;

    /// Read back a color attachment as tightly packed RGBA u8 pixels
    ///
    /// Synchronous barrier, like [`Framebuffer::read_color_f32`].
    fn read_color_u8(&self, attachment: u32) -> Result<Vec<u8>>;
}
