/// Proxy geometry - the approximate mesh of the photographed object
///
/// Mesh loading is an external concern: the caller decodes the mesh file,
/// uploads the vertex streams, and hands this struct the resulting GPU
/// buffers plus the precomputed centroid and bounding radius. The engine
/// reads it but never mutates it during a render.

use glam::Vec3;
use std::sync::Arc;

use crate::graphics_device::Buffer;

/// Shared, read-only proxy mesh
#[derive(Clone)]
pub struct ProxyGeometry {
    centroid: Vec3,
    bounding_radius: f32,
    position_buffer: Arc<dyn Buffer>,
    normal_buffer: Option<Arc<dyn Buffer>>,
    tex_coord_buffer: Option<Arc<dyn Buffer>>,
    tangent_buffer: Option<Arc<dyn Buffer>>,
}

impl ProxyGeometry {
    /// Create a proxy geometry from uploaded vertex streams.
    ///
    /// # Arguments
    ///
    /// * `centroid` - Mesh centroid in object space
    /// * `bounding_radius` - Radius of the bounding sphere around the centroid
    /// * `position_buffer` - Required position stream
    pub fn new(centroid: Vec3, bounding_radius: f32, position_buffer: Arc<dyn Buffer>) -> Self {
        Self {
            centroid,
            bounding_radius,
            position_buffer,
            normal_buffer: None,
            tex_coord_buffer: None,
            tangent_buffer: None,
        }
    }

    /// Attach an optional per-vertex normal stream
    pub fn with_normals(mut self, buffer: Arc<dyn Buffer>) -> Self {
        self.normal_buffer = Some(buffer);
        self
    }

    /// Attach an optional per-vertex texture-coordinate stream
    pub fn with_tex_coords(mut self, buffer: Arc<dyn Buffer>) -> Self {
        self.tex_coord_buffer = Some(buffer);
        self
    }

    /// Attach an optional per-vertex tangent stream
    pub fn with_tangents(mut self, buffer: Arc<dyn Buffer>) -> Self {
        self.tangent_buffer = Some(buffer);
        self
    }

    // ===== ACCESSORS =====

    /// Mesh centroid in object space
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Bounding-sphere radius around the centroid
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Position vertex stream
    pub fn position_buffer(&self) -> &Arc<dyn Buffer> {
        &self.position_buffer
    }

    /// Normal vertex stream, if present
    pub fn normal_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.normal_buffer.as_ref()
    }

    /// Texture-coordinate vertex stream, if present
    pub fn tex_coord_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.tex_coord_buffer.as_ref()
    }

    /// Tangent vertex stream, if present
    pub fn tangent_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.tangent_buffer.as_ref()
    }
}
