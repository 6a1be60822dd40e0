/// BTF export - bidirectional-texture-function image sequence
///
/// Sweeps a tangent-space direction over the hemisphere (1 to 179 degrees
/// of inclination), rendering the proxy in texture space with one virtual
/// light that tracks the sweep, and writes a numbered PNG per step. The
/// simpler sibling of the resample export.

use std::fs;
use std::sync::Arc;

use glam::Vec3;

use crate::engine_info;
use crate::error::Result;
use crate::graphics_device::{
    ColorAttachmentDesc, FramebufferDesc, PrimitiveTopology, ShaderProgramDesc, TextureFormat,
};
use crate::rendering::resample::write_rgba_png;
use crate::rendering::{BtfRequest, RelightRenderer};

const SOURCE: &str = "prism::BtfExport";

/// Sweep steps: inclination angles 1..=179 out of 180
const SWEEP_STEPS: u32 = 180;

impl RelightRenderer {
    pub(crate) fn execute_btf(&mut self, request: BtfRequest) -> Result<()> {
        engine_info!(
            SOURCE,
            "Exporting BTF sweep at {}x{} into {}",
            request.width,
            request.height,
            request.export_dir.display()
        );

        fs::create_dir_all(&request.export_dir)?;

        let program = self.device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "btf_relight",
            "shaders/common/texspace.vert",
            "shaders/relight/relight.frag",
        ))?;
        let mut drawable = self.device.create_drawable(&program)?;
        let geometry = self.resources.geometry();
        drawable.add_vertex_buffer("position", geometry.position_buffer())?;
        if let Some(tex_coords) = geometry.tex_coord_buffer() {
            drawable.add_vertex_buffer("texCoord", tex_coords)?;
        }
        if let Some(normals) = geometry.normal_buffer() {
            drawable.add_vertex_buffer("normal", normals)?;
        }
        if let Some(tangents) = geometry.tangent_buffer() {
            drawable.add_vertex_buffer("tangent", tangents)?;
        }

        let framebuffer = self.device.create_framebuffer(FramebufferDesc {
            width: request.width,
            height: request.height,
            color_attachments: vec![ColorAttachmentDesc {
                format: TextureFormat::R8G8B8A8_UNORM,
                linear_filtering: false,
            }],
            depth_attachment: false,
        })?;

        let settings = self.settings_snapshot();
        self.bind_frame_uniforms(&program, &settings)?;
        self.bind_relighting_uniforms(&program, &settings)?;
        program.set_uniform("useTSOverrides", true.into())?;

        self.device.set_back_face_culling(false);

        let light_color = self.light_controller.light_color(0);
        for step in 1..SWEEP_STEPS {
            let theta = step as f32 / SWEEP_STEPS as f32 * std::f32::consts::PI;
            let direction = Vec3::new(theta.cos(), 0.0, theta.sin());

            program.set_uniform("virtualLightCount", 1i32.into())?;
            program.set_uniform("lightIntensityVirtual[0]", light_color.into())?;
            program.set_uniform("lightDirTSOverride", direction.into())?;
            program.set_uniform("viewDirTSOverride", direction.into())?;

            framebuffer.clear_color(0, [0.0, 0.0, 0.0, 0.0])?;
            drawable.draw(PrimitiveTopology::TriangleList, framebuffer.as_ref())?;

            let pixels = framebuffer.read_color_u8(0)?;
            let export_file = request.export_dir.join(format!("{:02}.png", step));
            write_rgba_png(&export_file, request.width, request.height, &pixels)?;

            request
                .progress
                .set_progress(step as f64 / SWEEP_STEPS as f64);
        }

        self.device.set_back_face_culling(true);
        request.progress.complete();
        engine_info!(SOURCE, "BTF export complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "btf_tests.rs"]
mod tests;
