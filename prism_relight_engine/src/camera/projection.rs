/// Camera projection - per-view perspective parameters
///
/// A view set carries a table of distinct projections; each view references
/// one by index. Near/far planes are not part of the projection itself:
/// they are chosen per use (the view set's recommended range for resampling
/// and fidelity passes, a scene-scaled range for interactive framing).

use glam::Mat4;

/// Perspective projection parameters for one camera calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    vertical_field_of_view: f32,
    aspect_ratio: f32,
}

impl Projection {
    /// Create a projection from a vertical field of view (radians) and
    /// aspect ratio (width / height).
    pub fn new(vertical_field_of_view: f32, aspect_ratio: f32) -> Self {
        Self {
            vertical_field_of_view,
            aspect_ratio,
        }
    }

    /// Vertical field of view in radians
    pub fn vertical_field_of_view(&self) -> f32 {
        self.vertical_field_of_view
    }

    /// Aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Projection matrix for the given clip range
    pub fn matrix(&self, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.vertical_field_of_view, self.aspect_ratio, near, far)
    }
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
