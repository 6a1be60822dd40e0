/// Calibrated views and view sets
///
/// A View is one calibrated photograph: camera pose, projection index,
/// optional light index, and the declared image file name. Views are
/// immutable once constructed and addressed by their stable 0-based index
/// within a ViewSet; that index order is the identity used everywhere else
/// (angular-distance matrices, fidelity curves, importance rankings).

use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

use crate::camera::Projection;
use crate::engine_err;
use crate::error::{Error, Result};

// ===== VIEW =====

/// One calibrated photograph's camera metadata
#[derive(Debug, Clone)]
pub struct View {
    pose: Mat4,
    inverse_pose: Mat4,
    projection_index: usize,
    light_index: Option<usize>,
    image_file_name: String,
}

impl View {
    /// Create a view from its world-to-camera pose.
    ///
    /// The inverse pose is computed once here and cached; the pose must be
    /// a rigid transform (invertible by construction).
    pub fn new(
        pose: Mat4,
        projection_index: usize,
        light_index: Option<usize>,
        image_file_name: impl Into<String>,
    ) -> Self {
        Self {
            pose,
            inverse_pose: pose.inverse(),
            projection_index,
            light_index,
            image_file_name: image_file_name.into(),
        }
    }

    /// World-to-camera rigid transform
    pub fn pose(&self) -> &Mat4 {
        &self.pose
    }

    /// Camera-to-world transform (cached inverse of the pose)
    pub fn inverse_pose(&self) -> &Mat4 {
        &self.inverse_pose
    }

    /// Camera position in world space (translation of the inverse pose)
    pub fn camera_position(&self) -> Vec3 {
        self.inverse_pose.col(3).truncate()
    }

    /// Index into the view set's projection table
    pub fn projection_index(&self) -> usize {
        self.projection_index
    }

    /// Index into the view set's light tables, if this view was lit
    pub fn light_index(&self) -> Option<usize> {
        self.light_index
    }

    /// Declared image file name for this view
    pub fn image_file_name(&self) -> &str {
        &self.image_file_name
    }

    /// File-name stem (everything before the first '.')
    ///
    /// Used to match views across source and target view sets.
    pub fn name_stem(&self) -> &str {
        self.image_file_name
            .split('.')
            .next()
            .unwrap_or(&self.image_file_name)
    }
}

// ===== VIEW SET =====

/// An ordered collection of views with shared dataset-level metadata
#[derive(Debug, Clone)]
pub struct ViewSet {
    views: Vec<View>,
    projections: Vec<Projection>,
    light_positions: Vec<Vec3>,
    light_intensities: Vec<Vec3>,
    infinite_light_sources: bool,
    primary_view: usize,
    recommended_near: f32,
    recommended_far: f32,
    geometry_file: Option<PathBuf>,
}

impl ViewSet {
    /// Create a view set.
    ///
    /// # Arguments
    ///
    /// * `views` - Ordered views; index order is identity
    /// * `projections` - Projection table referenced by the views
    /// * `light_positions` / `light_intensities` - Calibrated light tables
    /// * `infinite_light_sources` - Whether dataset lights are directional
    /// * `primary_view` - Index of the view used for default framing
    /// * `recommended_near` / `recommended_far` - Recommended clip range
    ///
    /// # Errors
    ///
    /// Returns an error if the set is empty, the primary index is out of
    /// range, or any view references a missing projection or light entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        views: Vec<View>,
        projections: Vec<Projection>,
        light_positions: Vec<Vec3>,
        light_intensities: Vec<Vec3>,
        infinite_light_sources: bool,
        primary_view: usize,
        recommended_near: f32,
        recommended_far: f32,
    ) -> Result<Self> {
        if views.is_empty() {
            return Err(Error::InvalidResource("view set is empty".to_string()));
        }
        if primary_view >= views.len() {
            return Err(engine_err!(
                "prism::ViewSet",
                "primary view index {} out of range ({} views)",
                primary_view,
                views.len()
            ));
        }
        for (i, view) in views.iter().enumerate() {
            if view.projection_index() >= projections.len() {
                return Err(engine_err!(
                    "prism::ViewSet",
                    "view {} references projection {} but only {} exist",
                    i,
                    view.projection_index(),
                    projections.len()
                ));
            }
            if let Some(light) = view.light_index() {
                if light >= light_positions.len() || light >= light_intensities.len() {
                    return Err(engine_err!(
                        "prism::ViewSet",
                        "view {} references light {} but only {} exist",
                        i,
                        light,
                        light_positions.len().min(light_intensities.len())
                    ));
                }
            }
        }
        Ok(Self {
            views,
            projections,
            light_positions,
            light_intensities,
            infinite_light_sources,
            primary_view,
            recommended_near,
            recommended_far,
            geometry_file: None,
        })
    }

    /// Record the path of the proxy-geometry file this set was loaded with.
    ///
    /// Exports copy this file next to the rendered images so the output
    /// directory is self-describing.
    pub fn set_geometry_file(&mut self, path: impl Into<PathBuf>) {
        self.geometry_file = Some(path.into());
    }

    // ===== ACCESSORS =====

    /// Number of views
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Get a view by index
    pub fn view(&self, index: usize) -> Option<&View> {
        self.views.get(index)
    }

    /// All views in index order
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Resolve a view's projection through the projection table
    pub fn projection(&self, view_index: usize) -> Option<&Projection> {
        self.views
            .get(view_index)
            .and_then(|v| self.projections.get(v.projection_index()))
    }

    /// Calibrated light position for a light table index
    pub fn light_position(&self, light_index: usize) -> Option<Vec3> {
        self.light_positions.get(light_index).copied()
    }

    /// Calibrated light intensity for a light table index
    pub fn light_intensity(&self, light_index: usize) -> Option<Vec3> {
        self.light_intensities.get(light_index).copied()
    }

    /// Whether dataset light sources are treated as infinitely distant
    pub fn infinite_light_sources(&self) -> bool {
        self.infinite_light_sources
    }

    /// Index of the primary view (default framing)
    pub fn primary_view(&self) -> usize {
        self.primary_view
    }

    /// The primary view itself
    pub fn primary(&self) -> &View {
        &self.views[self.primary_view]
    }

    /// Recommended near clip plane
    pub fn recommended_near(&self) -> f32 {
        self.recommended_near
    }

    /// Recommended far clip plane
    pub fn recommended_far(&self) -> f32 {
        self.recommended_far
    }

    /// Path of the proxy-geometry file, if recorded
    pub fn geometry_file(&self) -> Option<&Path> {
        self.geometry_file.as_deref()
    }

    /// Unit direction from the given centroid to each camera position.
    ///
    /// This is the view-direction vector the fidelity estimator measures
    /// angular distances between.
    pub fn view_directions(&self, centroid: Vec3) -> Vec<Vec3> {
        self.views
            .iter()
            .map(|v| (v.camera_position() - centroid).normalize_or_zero())
            .collect()
    }
}

#[cfg(test)]
#[path = "view_set_tests.rs"]
mod tests;
