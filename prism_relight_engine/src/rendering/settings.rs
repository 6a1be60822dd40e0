/// Render settings - the tunables read at the top of every frame
///
/// A passive data container. External callers (GUI bindings, scripts)
/// mutate a shared copy behind `Arc<RwLock<…>>`; the renderer clones a
/// snapshot once per frame so a frame never observes a half-written update.

/// Tunable rendering parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Display gamma applied to output colors
    pub gamma: f32,
    /// Exponent sharpening the angular view-blending weights
    pub weight_exponent: f32,
    /// Blend between isotropic and anisotropic reflectance weighting
    pub isotropy_factor: f32,
    /// Test per-view depth maps to reject occluded projections
    pub occlusion_enabled: bool,
    /// Depth bias applied during occlusion testing
    pub occlusion_bias: f32,
    /// Blend the original photographs (image-based rendering)
    pub image_based_rendering_enabled: bool,
    /// Shade with the virtual lights
    pub relighting_enabled: bool,
    /// Sample the virtual shadow maps
    pub shadows_enabled: bool,
    /// Sample the fitted material maps (diffuse/normal/specular/roughness)
    pub textures_enabled: bool,
    /// Fresnel reflectance factor in the relit shading
    pub fresnel_enabled: bool,
    /// Geometric attenuation term in the relit shading
    pub pbr_geometric_attenuation_enabled: bool,
    /// Draw billboard gizmos for visualized lights
    pub visible_lights_enabled: bool,
    /// Render at half resolution and upscale in a final blit
    pub half_resolution_enabled: bool,
    /// Multisampled rasterization
    pub multisampling_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            weight_exponent: 16.0,
            isotropy_factor: 0.0,
            occlusion_enabled: true,
            occlusion_bias: 0.0025,
            image_based_rendering_enabled: true,
            relighting_enabled: true,
            shadows_enabled: false,
            textures_enabled: false,
            fresnel_enabled: false,
            pbr_geometric_attenuation_enabled: false,
            visible_lights_enabled: true,
            half_resolution_enabled: false,
            multisampling_enabled: false,
        }
    }
}
