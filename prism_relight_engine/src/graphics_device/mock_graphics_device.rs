/// Mock graphics device for unit tests (no GPU required)
///
/// Records resource creation and draw traffic so the renderer, resampler,
/// and fidelity estimator can be exercised without a real backend. Readback
/// returns whatever a test wrote into the framebuffer (or the last clear
/// color), which is enough to drive every readback-dependent code path.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, ColorAttachmentDesc, Drawable, Framebuffer, FramebufferDesc,
    GraphicsDevice, PrimitiveTopology, ShaderProgram, ShaderProgramDesc, Texture, TextureDesc,
    TextureFormat, TextureInfo, TextureUsage, UniformValue,
};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub name: String,
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!(
                "prism::mock",
                "buffer update out of range: offset {} + {} bytes > size {}",
                offset,
                data.len(),
                self.size
            );
        }
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock ShaderProgram
// ============================================================================

/// Records every named assignment for later inspection
pub struct MockShaderProgram {
    pub label: String,
    pub uniforms: Mutex<FxHashMap<String, UniformValue>>,
    pub bound_textures: Mutex<FxHashMap<String, bool>>,
    pub bound_uniform_buffers: Mutex<Vec<String>>,
}

impl MockShaderProgram {
    pub fn new(label: String) -> Self {
        Self {
            label,
            uniforms: Mutex::new(FxHashMap::default()),
            bound_textures: Mutex::new(FxHashMap::default()),
            bound_uniform_buffers: Mutex::new(Vec::new()),
        }
    }

    /// Last value assigned to a uniform, if any
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.lock().unwrap().get(name).copied()
    }

    /// Whether a texture slot currently has a texture bound
    pub fn texture_bound(&self, name: &str) -> bool {
        *self.bound_textures.lock().unwrap().get(name).unwrap_or(&false)
    }
}

impl ShaderProgram for MockShaderProgram {
    fn set_uniform(&self, name: &str, value: UniformValue) -> Result<()> {
        self.uniforms.lock().unwrap().insert(name.to_string(), value);
        Ok(())
    }

    fn set_texture(&self, name: &str, texture: Option<&Arc<dyn Texture>>) -> Result<()> {
        self.bound_textures
            .lock()
            .unwrap()
            .insert(name.to_string(), texture.is_some());
        Ok(())
    }

    fn set_uniform_buffer(&self, name: &str, _buffer: &Arc<dyn Buffer>) -> Result<()> {
        self.bound_uniform_buffers.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

// ============================================================================
// Mock Framebuffer
// ============================================================================

pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
    pub color_attachments: Vec<ColorAttachmentDesc>,
    pub has_depth: bool,
    /// RGBA f32 pixel store per color attachment
    pixels: Vec<Mutex<Vec<f32>>>,
    /// Layer most recently attached as the depth target
    pub depth_layer: Mutex<Option<u32>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockFramebuffer {
    pub fn new(desc: &FramebufferDesc, log: Arc<Mutex<Vec<String>>>) -> Self {
        let pixel_count = (desc.width * desc.height * 4) as usize;
        Self {
            width: desc.width,
            height: desc.height,
            color_attachments: desc.color_attachments.clone(),
            has_depth: desc.depth_attachment,
            pixels: desc
                .color_attachments
                .iter()
                .map(|_| Mutex::new(vec![0.0; pixel_count]))
                .collect(),
            depth_layer: Mutex::new(None),
            log,
        }
    }

    /// Test hook: overwrite an attachment's pixel store
    pub fn write_pixels(&self, attachment: u32, data: Vec<f32>) {
        *self.pixels[attachment as usize].lock().unwrap() = data;
    }
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_color(&self, attachment: u32, color: [f32; 4]) -> Result<()> {
        if attachment as usize >= self.color_attachments.len() {
            engine_bail!(
                "prism::mock",
                "clear_color: attachment {} out of range ({} attachments)",
                attachment,
                self.color_attachments.len()
            );
        }
        let mut pixels = self.pixels[attachment as usize].lock().unwrap();
        for chunk in pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
        self.log.lock().unwrap().push(format!("clear_color {}", attachment));
        Ok(())
    }

    fn clear_depth(&self, _depth: f32) -> Result<()> {
        if !self.has_depth {
            engine_bail!("prism::mock", "clear_depth: framebuffer has no depth attachment");
        }
        self.log.lock().unwrap().push("clear_depth".to_string());
        Ok(())
    }

    fn set_depth_attachment_layer(&self, texture: &Arc<dyn Texture>, layer: u32) -> Result<()> {
        let info = texture.info();
        if info.usage != TextureUsage::DepthStencil {
            engine_bail!(
                "prism::mock",
                "set_depth_attachment_layer: incompatible texture usage {:?}",
                info.usage
            );
        }
        if layer >= info.array_layers {
            engine_bail!(
                "prism::mock",
                "set_depth_attachment_layer: layer {} out of range (array_layers = {})",
                layer,
                info.array_layers
            );
        }
        *self.depth_layer.lock().unwrap() = Some(layer);
        self.log
            .lock()
            .unwrap()
            .push(format!("set_depth_attachment_layer {}", layer));
        Ok(())
    }

    fn color_attachment_texture(&self, attachment: u32) -> Result<Arc<dyn Texture>> {
        let desc = match self.color_attachments.get(attachment as usize) {
            Some(desc) => desc,
            None => engine_bail!(
                "prism::mock",
                "color_attachment_texture: attachment {} out of range",
                attachment
            ),
        };
        Ok(Arc::new(MockTexture {
            info: TextureInfo {
                width: self.width,
                height: self.height,
                format: desc.format,
                usage: TextureUsage::SampledAndRenderTarget,
                array_layers: 1,
                mip_levels: 1,
            },
            name: format!("fb_color_{}", attachment),
        }))
    }

    fn read_color_f32(&self, attachment: u32) -> Result<Vec<f32>> {
        if attachment as usize >= self.pixels.len() {
            engine_bail!(
                "prism::mock",
                "read_color_f32: attachment {} out of range",
                attachment
            );
        }
        Ok(self.pixels[attachment as usize].lock().unwrap().clone())
    }

    fn read_color_u8(&self, attachment: u32) -> Result<Vec<u8>> {
        let pixels = self.read_color_f32(attachment)?;
        Ok(pixels
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect())
    }
}

// ============================================================================
// Mock Drawable
// ============================================================================

pub struct MockDrawable {
    program: Arc<dyn ShaderProgram>,
    pub vertex_buffers: Mutex<Vec<String>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Drawable for MockDrawable {
    fn add_vertex_buffer(&mut self, name: &str, _buffer: &Arc<dyn Buffer>) -> Result<()> {
        self.vertex_buffers.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn program(&self) -> &Arc<dyn ShaderProgram> {
        &self.program
    }

    fn draw(&self, topology: PrimitiveTopology, target: &dyn Framebuffer) -> Result<()> {
        self.log.lock().unwrap().push(format!(
            "draw {:?} -> {}x{}",
            topology,
            target.width(),
            target.height()
        ));
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks created resources and commands without a GPU
pub struct MockGraphicsDevice {
    /// Raster state changes and draw calls, in submission order
    pub command_log: Arc<Mutex<Vec<String>>>,
    /// Labels of created textures
    pub created_textures: Arc<Mutex<Vec<String>>>,
    /// Sizes of created buffers
    pub created_buffers: Arc<Mutex<Vec<String>>>,
    /// Labels of created shader programs
    pub created_programs: Arc<Mutex<Vec<String>>>,
    /// Concrete handles of created programs, for uniform inspection
    pub program_handles: Arc<Mutex<Vec<Arc<MockShaderProgram>>>>,
    default_framebuffer: Arc<MockFramebuffer>,
}

impl MockGraphicsDevice {
    /// Create a mock device with the given default framebuffer size
    pub fn new(width: u32, height: u32) -> Self {
        let command_log = Arc::new(Mutex::new(Vec::new()));
        let default_framebuffer = Arc::new(MockFramebuffer::new(
            &FramebufferDesc::color_depth(width, height, TextureFormat::R8G8B8A8_UNORM),
            Arc::clone(&command_log),
        ));
        Self {
            command_log,
            created_textures: Arc::new(Mutex::new(Vec::new())),
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            created_programs: Arc::new(Mutex::new(Vec::new())),
            program_handles: Arc::new(Mutex::new(Vec::new())),
            default_framebuffer,
        }
    }

    /// Snapshot of the command log
    pub fn commands(&self) -> Vec<String> {
        self.command_log.lock().unwrap().clone()
    }

    /// Last created program with the given label, if any
    pub fn program(&self, label: &str) -> Option<Arc<MockShaderProgram>> {
        self.program_handles
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|p| p.label == label)
            .map(Arc::clone)
    }

    fn log(&self, message: impl Into<String>) {
        self.command_log.lock().unwrap().push(message.into());
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        let name = format!("texture_{}x{}x{}", desc.width, desc.height, desc.array_layers);
        self.created_textures.lock().unwrap().push(name.clone());
        Ok(Arc::new(MockTexture {
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
                array_layers: desc.array_layers,
                mip_levels: desc.mip_levels,
            },
            name,
        }))
    }

    fn create_buffer(&self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if let Some(data) = &desc.data {
            if data.len() as u64 > desc.size {
                engine_bail!(
                    "prism::mock",
                    "create_buffer: initial data ({} bytes) exceeds size ({})",
                    data.len(),
                    desc.size
                );
            }
        }
        let name = format!("buffer_{}", desc.size);
        self.created_buffers.lock().unwrap().push(name.clone());
        Ok(Arc::new(MockBuffer {
            size: desc.size,
            name,
        }))
    }

    fn create_shader_program(&self, desc: ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>> {
        self.created_programs.lock().unwrap().push(desc.label.clone());
        let program = Arc::new(MockShaderProgram::new(desc.label));
        self.program_handles.lock().unwrap().push(Arc::clone(&program));
        Ok(program)
    }

    fn create_framebuffer(&self, desc: FramebufferDesc) -> Result<Box<dyn Framebuffer>> {
        self.log(format!("create_framebuffer {}x{}", desc.width, desc.height));
        Ok(Box::new(MockFramebuffer::new(&desc, Arc::clone(&self.command_log))))
    }

    fn create_drawable(&self, program: &Arc<dyn ShaderProgram>) -> Result<Box<dyn Drawable>> {
        Ok(Box::new(MockDrawable {
            program: Arc::clone(program),
            vertex_buffers: Mutex::new(Vec::new()),
            log: Arc::clone(&self.command_log),
        }))
    }

    fn create_rectangle(&self) -> Result<Arc<dyn Buffer>> {
        self.created_buffers.lock().unwrap().push("rectangle".to_string());
        Ok(Arc::new(MockBuffer {
            size: 64,
            name: "rectangle".to_string(),
        }))
    }

    fn default_framebuffer(&self) -> Arc<dyn Framebuffer> {
        Arc::clone(&self.default_framebuffer) as Arc<dyn Framebuffer>
    }

    fn set_multisampling(&self, enabled: bool) {
        self.log(format!("set_multisampling {}", enabled));
    }

    fn set_back_face_culling(&self, enabled: bool) {
        self.log(format!("set_back_face_culling {}", enabled));
    }

    fn set_depth_testing(&self, enabled: bool) {
        self.log(format!("set_depth_testing {}", enabled));
    }

    fn set_additive_blending(&self, enabled: bool) {
        self.log(format!("set_additive_blending {}", enabled));
    }

    fn flush(&self) -> Result<()> {
        self.log("flush");
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.log("wait_idle");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
