/// Per-dataset GPU resource bundle
///
/// Everything the relighting shaders consume for one loaded dataset: the
/// view set, the proxy geometry, the photograph array texture, and the
/// per-view uniform buffers. The bundle is assembled once at load time by
/// the caller (who owns decoding and upload) and is read-only for the
/// lifetime of the renderer that consumes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::camera::ViewSet;
use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, Texture};
use crate::resource::ProxyGeometry;

/// Alternate extensions tried, in order, when a declared image file is
/// missing from disk.
const IMAGE_EXTENSION_FALLBACKS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

/// Locate an image file, falling back across known extensions.
///
/// The declared name is tried first; if it does not exist, the same stem is
/// retried with each fallback extension. The search is bounded: if nothing
/// matches, the dataset cannot be loaded and a fatal `ResourceNotFound` is
/// returned (not recoverable here).
pub fn resolve_image_file(directory: &Path, declared_name: &str) -> Result<PathBuf> {
    let declared = directory.join(declared_name);
    if declared.exists() {
        return Ok(declared);
    }

    let stem = declared_name.split('.').next().unwrap_or(declared_name);
    for extension in IMAGE_EXTENSION_FALLBACKS {
        let candidate = directory.join(format!("{}.{}", stem, extension));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(Error::ResourceNotFound(declared))
}

/// GPU-side data for one loaded dataset
#[derive(Clone)]
pub struct ResourceBundle {
    view_set: ViewSet,
    geometry: ProxyGeometry,

    /// Photograph array texture, one layer per view
    pub color_textures: Arc<dyn Texture>,
    /// Optional per-view depth maps (enables occlusion testing)
    pub depth_textures: Option<Arc<dyn Texture>>,
    /// Optional per-view shadow maps captured with the dataset
    pub shadow_textures: Option<Arc<dyn Texture>>,

    /// Per-view blending weights
    pub camera_weight_buffer: Arc<dyn Buffer>,
    /// Per-view camera poses
    pub camera_pose_buffer: Arc<dyn Buffer>,
    /// Projection table
    pub camera_projection_buffer: Arc<dyn Buffer>,
    /// Per-view projection indices
    pub camera_projection_index_buffer: Arc<dyn Buffer>,

    /// Calibrated light positions (present when the dataset was lit)
    pub light_position_buffer: Option<Arc<dyn Buffer>>,
    /// Calibrated light intensities
    pub light_intensity_buffer: Option<Arc<dyn Buffer>>,
    /// Per-view light indices
    pub light_index_buffer: Option<Arc<dyn Buffer>>,
    /// Shadow matrices matching `shadow_textures`
    pub shadow_matrix_buffer: Option<Arc<dyn Buffer>>,

    /// Luminance encoding map (tone calibration)
    pub luminance_map: Option<Arc<dyn Texture>>,
    /// Inverse luminance encoding map
    pub inverse_luminance_map: Option<Arc<dyn Texture>>,

    /// Material maps fitted for the proxy surface
    pub diffuse_texture: Option<Arc<dyn Texture>>,
    pub normal_texture: Option<Arc<dyn Texture>>,
    pub specular_texture: Option<Arc<dyn Texture>>,
    pub roughness_texture: Option<Arc<dyn Texture>>,
}

impl ResourceBundle {
    /// Assemble a bundle from its required parts.
    ///
    /// Optional parts (depth maps, light tables, luminance maps, material
    /// maps) start absent and are attached with the `with_*` methods.
    pub fn new(
        view_set: ViewSet,
        geometry: ProxyGeometry,
        color_textures: Arc<dyn Texture>,
        camera_weight_buffer: Arc<dyn Buffer>,
        camera_pose_buffer: Arc<dyn Buffer>,
        camera_projection_buffer: Arc<dyn Buffer>,
        camera_projection_index_buffer: Arc<dyn Buffer>,
    ) -> Result<Self> {
        let layers = color_textures.info().array_layers as usize;
        if layers < view_set.view_count() {
            return Err(Error::InvalidResource(format!(
                "color texture array has {} layers for {} views",
                layers,
                view_set.view_count()
            )));
        }
        Ok(Self {
            view_set,
            geometry,
            color_textures,
            depth_textures: None,
            shadow_textures: None,
            camera_weight_buffer,
            camera_pose_buffer,
            camera_projection_buffer,
            camera_projection_index_buffer,
            light_position_buffer: None,
            light_intensity_buffer: None,
            light_index_buffer: None,
            shadow_matrix_buffer: None,
            luminance_map: None,
            inverse_luminance_map: None,
            diffuse_texture: None,
            normal_texture: None,
            specular_texture: None,
            roughness_texture: None,
        })
    }

    /// Attach per-view depth maps
    pub fn with_depth_textures(mut self, textures: Arc<dyn Texture>) -> Self {
        self.depth_textures = Some(textures);
        self
    }

    /// Attach dataset shadow maps and their matrices
    pub fn with_dataset_shadows(
        mut self,
        textures: Arc<dyn Texture>,
        matrices: Arc<dyn Buffer>,
    ) -> Self {
        self.shadow_textures = Some(textures);
        self.shadow_matrix_buffer = Some(matrices);
        self
    }

    /// Attach the calibrated light tables
    pub fn with_light_buffers(
        mut self,
        positions: Arc<dyn Buffer>,
        intensities: Arc<dyn Buffer>,
        indices: Arc<dyn Buffer>,
    ) -> Self {
        self.light_position_buffer = Some(positions);
        self.light_intensity_buffer = Some(intensities);
        self.light_index_buffer = Some(indices);
        self
    }

    /// Attach luminance encoding maps
    pub fn with_luminance_maps(
        mut self,
        luminance: Arc<dyn Texture>,
        inverse: Arc<dyn Texture>,
    ) -> Self {
        self.luminance_map = Some(luminance);
        self.inverse_luminance_map = Some(inverse);
        self
    }

    /// Attach a fitted diffuse map
    pub fn with_diffuse_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    /// Attach a fitted normal map
    pub fn with_normal_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.normal_texture = Some(texture);
        self
    }

    /// Attach a fitted specular map
    pub fn with_specular_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.specular_texture = Some(texture);
        self
    }

    /// Attach a fitted roughness map
    pub fn with_roughness_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.roughness_texture = Some(texture);
        self
    }

    // ===== ACCESSORS =====

    /// The loaded view set
    pub fn view_set(&self) -> &ViewSet {
        &self.view_set
    }

    /// The proxy geometry
    pub fn geometry(&self) -> &ProxyGeometry {
        &self.geometry
    }

    /// Whether per-view depth maps are available for occlusion testing
    pub fn has_depth_textures(&self) -> bool {
        self.depth_textures.is_some()
    }
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
