/// Resample export - re-render the dataset into a target view set
///
/// Each target pose is rendered through the main pipeline exactly as a live
/// frame would be (relighting, shadow maps, environment background), into
/// an offscreen buffer, and written out as one PNG per view. The target
/// view-set description and the proxy-geometry file are copied alongside
/// the images so the export directory is self-describing. File-copy
/// failures are not masked: they stop the export.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::engine_info;
use crate::error::{Error, Result};
use crate::graphics_device::{FramebufferDesc, PrimitiveTopology, TextureFormat};
use crate::rendering::renderer::target_view_projection;
use crate::rendering::{RelightRenderer, ResampleRequest};

const SOURCE: &str = "prism::Resampler";

/// Encode tightly packed RGBA pixels as a PNG file
pub(crate) fn write_rgba_png(path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let image = image::RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        Error::ExportFailed(format!(
            "pixel buffer does not match {}x{} RGBA",
            width, height
        ))
    })?;
    image
        .save(path)
        .map_err(|error| Error::ExportFailed(format!("{}: {}", path.display(), error)))
}

impl RelightRenderer {
    pub(crate) fn execute_resample(&mut self, request: ResampleRequest) -> Result<()> {
        let view_count = request.target.view_count();
        engine_info!(
            SOURCE,
            "Resampling {} views at {}x{} into {}",
            view_count,
            request.width,
            request.height,
            request.export_dir.display()
        );

        fs::create_dir_all(&request.export_dir)?;

        let framebuffer = self.device.create_framebuffer(FramebufferDesc::color_depth(
            request.width,
            request.height,
            TextureFormat::R8G8B8A8_UNORM,
        ))?;

        let settings = self.settings_snapshot();
        let instances = self.instances_snapshot();
        let first_instance = instances.transforms()[0];
        let main = Arc::clone(self.main_drawable.program());

        let bindings = self.bind_relighting_uniforms(&main, &settings)?;
        self.bind_frame_uniforms(&main, &settings)?;

        for (index, view) in request.target.views().iter().enumerate() {
            let pose = *view.pose();
            let projection = target_view_projection(&request.target, index)?;

            main.set_uniform("model_view", pose.into())?;
            main.set_uniform("viewPos", view.camera_position().into())?;
            main.set_uniform("projection", projection.into())?;

            for light_index in 0..self.active_light_count() {
                self.generate_shadow_maps(light_index, &instances)?;
                self.bind_virtual_light(&main, light_index, &first_instance)?;
            }

            framebuffer.clear_color(0, [0.0, 0.0, 0.0, 0.0])?;
            framebuffer.clear_depth(1.0)?;

            if bindings.environment_active {
                self.configure_environment_background(&pose, &projection, bindings.clear_color)?;
                self.device.set_depth_testing(false);
                self.env_background_drawable
                    .draw(PrimitiveTopology::TriangleFan, framebuffer.as_ref())?;
                self.device.set_depth_testing(true);
            }

            framebuffer.clear_depth(1.0)?;
            self.main_drawable
                .draw(PrimitiveTopology::TriangleList, framebuffer.as_ref())?;

            let pixels = framebuffer.read_color_u8(0)?;
            let export_file = request
                .export_dir
                .join(format!("{}.png", view.name_stem()));
            write_rgba_png(&export_file, request.width, request.height, &pixels)?;

            request
                .progress
                .set_progress(index as f64 / view_count as f64);
        }

        // Copy the describing metadata next to the images. A missing source
        // file is a hard stop, not a skipped copy.
        let view_set_name = request.view_set_file.file_name().ok_or_else(|| {
            Error::ExportFailed(format!(
                "view set path has no file name: {}",
                request.view_set_file.display()
            ))
        })?;
        fs::copy(
            &request.view_set_file,
            request.export_dir.join(view_set_name),
        )?;

        let geometry_file = self
            .resources
            .view_set()
            .geometry_file()
            .ok_or_else(|| Error::ExportFailed("no geometry file recorded for the dataset".to_string()))?;
        let geometry_name = geometry_file.file_name().ok_or_else(|| {
            Error::ExportFailed(format!(
                "geometry path has no file name: {}",
                geometry_file.display()
            ))
        })?;
        fs::copy(geometry_file, request.export_dir.join(geometry_name))?;

        request.progress.complete();
        engine_info!(SOURCE, "Resample export complete ({} views)", view_count);
        Ok(())
    }
}

#[cfg(test)]
#[path = "resample_tests.rs"]
mod tests;
