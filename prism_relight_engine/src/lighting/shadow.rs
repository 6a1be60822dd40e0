/// Shadow-map generation
///
/// One single-channel depth layer per virtual light, re-rendered every
/// frame: lights, instance transforms, and geometry may all change between
/// frames, so nothing is cached. The mapper owns the depth texture array,
/// a depth-only framebuffer whose attachment is retargeted per layer, and
/// the depth program fed by the proxy's position stream.

use glam::Mat4;
use std::sync::Arc;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    Drawable, Framebuffer, FramebufferDesc, GraphicsDevice, PrimitiveTopology, ShaderProgramDesc,
    Texture, TextureDesc, TextureFormat, TextureUsage,
};
use crate::lighting::MAX_VIRTUAL_LIGHTS;
use crate::resource::ProxyGeometry;

/// Shadow-map resolution (square), per light
pub const SHADOW_MAP_RESOLUTION: u32 = 2048;

/// Owns the shadow-map array and the depth-only pass that fills it
pub struct ShadowMapper {
    maps: Arc<dyn Texture>,
    framebuffer: Box<dyn Framebuffer>,
    drawable: Box<dyn Drawable>,
    layer_count: usize,
}

impl ShadowMapper {
    /// Create a mapper with one layer per light, capped at
    /// [`MAX_VIRTUAL_LIGHTS`]. At least one layer is always allocated so a
    /// light added later has somewhere to render.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        geometry: &ProxyGeometry,
        light_count: usize,
    ) -> Result<Self> {
        let layer_count = light_count.clamp(1, MAX_VIRTUAL_LIGHTS);

        let maps = device.create_texture(TextureDesc {
            width: SHADOW_MAP_RESOLUTION,
            height: SHADOW_MAP_RESOLUTION,
            format: TextureFormat::D32_FLOAT,
            usage: TextureUsage::DepthStencil,
            array_layers: layer_count as u32,
            mip_levels: 1,
            linear_filtering: false,
            data: None,
        })?;

        let framebuffer = device.create_framebuffer(FramebufferDesc::depth_only(
            SHADOW_MAP_RESOLUTION,
            SHADOW_MAP_RESOLUTION,
        ))?;

        let program = device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "shadow_depth",
            "shaders/common/depth.vert",
            "shaders/common/depth.frag",
        ))?;
        let mut drawable = device.create_drawable(&program)?;
        drawable.add_vertex_buffer("position", geometry.position_buffer())?;

        Ok(Self {
            maps,
            framebuffer,
            drawable,
            layer_count,
        })
    }

    /// The depth texture array sampled by the relit shader
    pub fn maps(&self) -> &Arc<dyn Texture> {
        &self.maps
    }

    /// Number of allocated layers
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Render one light's shadow map.
    ///
    /// Renders a depth-only pass into the given layer, one draw per entry
    /// of `model_views` (the light view composed with each instance
    /// transform).
    ///
    /// # Arguments
    ///
    /// * `layer` - Shadow-map layer (light index)
    /// * `projection` - Light projection framing the scene bounds
    /// * `model_views` - Light-space model-view matrix per instance
    pub fn render(&self, layer: usize, projection: &Mat4, model_views: &[Mat4]) -> Result<()> {
        if layer >= self.layer_count {
            engine_bail!(
                "prism::ShadowMapper",
                "shadow layer {} out of range ({} layers)",
                layer,
                self.layer_count
            );
        }

        let program = self.drawable.program();
        program.set_uniform("projection", (*projection).into())?;

        self.framebuffer
            .set_depth_attachment_layer(&self.maps, layer as u32)?;
        self.framebuffer.clear_depth(1.0)?;

        for model_view in model_views {
            program.set_uniform("model_view", (*model_view).into())?;
            self.drawable
                .draw(PrimitiveTopology::TriangleList, self.framebuffer.as_ref())?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "shadow_tests.rs"]
mod tests;
