/// Light controller abstraction
///
/// The renderer never owns light state. An external controller (GUI
/// bindings, an animation system, a fixed rig) describes the virtual
/// lights each frame; the renderer converts that description into
/// light-space transforms and shader uniforms.

use glam::{Mat4, Vec3};

/// Abstract description of the virtual lights for a frame
///
/// Implementations must be cheap to query: the renderer reads every value
/// once per frame, and per instance during relit draws.
pub trait LightController: Send + Sync {
    /// Number of virtual lights. Values above the simultaneous-shading cap
    /// are allowed; the renderer shades at most [`MAX_VIRTUAL_LIGHTS`].
    fn light_count(&self) -> usize;

    /// Color (and relative intensity) of a light
    fn light_color(&self, index: usize) -> Vec3;

    /// Controller-space transform of a light
    fn light_matrix(&self, index: usize) -> Mat4;

    /// Ambient light color (also the frame clear color, gamma-corrected)
    fn ambient_color(&self) -> Vec3;

    /// Whether environment-mapped lighting is active
    fn environment_mapping_enabled(&self) -> bool;

    /// Whether a billboard gizmo should be drawn for a light
    fn light_visualization_enabled(&self, index: usize) -> bool;
}

/// Maximum number of simultaneously shaded virtual lights
pub const MAX_VIRTUAL_LIGHTS: usize = 4;

// ===== FIXED RIG =====

/// One light of a [`FixedLightRig`]
#[derive(Debug, Clone)]
pub struct RigLight {
    /// Light color / intensity
    pub color: Vec3,
    /// Controller-space transform
    pub matrix: Mat4,
    /// Draw a gizmo for this light
    pub visualized: bool,
}

/// A static light rig
///
/// The simplest controller: a fixed list of lights plus an ambient color.
/// Useful for batch exports and tests, where no interactive controller
/// exists.
#[derive(Debug, Clone, Default)]
pub struct FixedLightRig {
    lights: Vec<RigLight>,
    ambient: Vec3,
    environment_mapping: bool,
}

impl FixedLightRig {
    /// Create an empty rig (no lights, black ambient)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light
    pub fn with_light(mut self, light: RigLight) -> Self {
        self.lights.push(light);
        self
    }

    /// Set the ambient color
    pub fn with_ambient(mut self, ambient: Vec3) -> Self {
        self.ambient = ambient;
        self
    }

    /// Enable environment-mapped lighting
    pub fn with_environment_mapping(mut self, enabled: bool) -> Self {
        self.environment_mapping = enabled;
        self
    }
}

impl LightController for FixedLightRig {
    fn light_count(&self) -> usize {
        self.lights.len()
    }

    fn light_color(&self, index: usize) -> Vec3 {
        self.lights.get(index).map(|l| l.color).unwrap_or(Vec3::ZERO)
    }

    fn light_matrix(&self, index: usize) -> Mat4 {
        self.lights.get(index).map(|l| l.matrix).unwrap_or(Mat4::IDENTITY)
    }

    fn ambient_color(&self) -> Vec3 {
        self.ambient
    }

    fn environment_mapping_enabled(&self) -> bool {
        self.environment_mapping
    }

    fn light_visualization_enabled(&self, index: usize) -> bool {
        self.lights.get(index).map(|l| l.visualized).unwrap_or(false)
    }
}
