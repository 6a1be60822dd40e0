/// Transformation instance list and derived scene bounds
///
/// Each instance transform places one copy of the proxy geometry in world
/// space. The list is ordered, never empty (the identity transform is the
/// default), and the scene-level centroid and bounding radius are derived
/// from it whenever it changes.

use glam::{Mat4, Vec3, Vec4};

/// Ordered list of rigid instance transforms
#[derive(Debug, Clone)]
pub struct InstanceList {
    transforms: Vec<Mat4>,
}

impl InstanceList {
    /// A single identity instance
    pub fn identity() -> Self {
        Self {
            transforms: vec![Mat4::IDENTITY],
        }
    }

    /// Create from explicit transforms; an empty input collapses to the
    /// identity instance so the list is never empty.
    pub fn new(transforms: Vec<Mat4>) -> Self {
        if transforms.is_empty() {
            Self::identity()
        } else {
            Self { transforms }
        }
    }

    /// Replace the transforms; an empty input is ignored.
    pub fn set_transforms(&mut self, transforms: Vec<Mat4>) {
        if !transforms.is_empty() {
            self.transforms = transforms;
        }
    }

    /// Number of instances (always >= 1)
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Always false; the list holds at least the identity transform
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Instance transform by index
    pub fn transform(&self, index: usize) -> Option<&Mat4> {
        self.transforms.get(index)
    }

    /// All transforms in order
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }
}

impl Default for InstanceList {
    fn default() -> Self {
        Self::identity()
    }
}

// ===== SCENE BOUNDS =====

/// Scene-level centroid and bounding radius derived from the instance list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    /// Mean of the instance-transformed proxy centroids
    pub centroid: Vec3,
    /// Maximum instance-to-mean distance plus the proxy radius
    pub bounding_radius: f32,
}

impl SceneBounds {
    /// Derive scene bounds for a proxy placed by the given instances.
    ///
    /// With the identity transform only, the result equals the proxy's own
    /// centroid and radius exactly.
    pub fn derive(proxy_centroid: Vec3, proxy_radius: f32, instances: &InstanceList) -> Self {
        let mut sum = Vec4::ZERO;
        for m in instances.transforms() {
            sum += *m * proxy_centroid.extend(1.0);
        }
        let centroid = (sum / sum.w).truncate();

        let mut bounding_radius = proxy_radius;
        for m in instances.transforms() {
            let position = (*m * proxy_centroid.extend(1.0)).truncate();
            let distance = position.distance(centroid);
            bounding_radius = bounding_radius.max(distance + proxy_radius);
        }

        Self {
            centroid,
            bounding_radius,
        }
    }
}

#[cfg(test)]
#[path = "instance_list_tests.rs"]
mod tests;
