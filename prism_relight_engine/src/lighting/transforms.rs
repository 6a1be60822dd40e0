/// Light-space transform math
///
/// Converts a controller-space light description into world-space view and
/// projection matrices. The projection always frames the scene's bounding
/// sphere: its field of view is exactly twice the arctangent of the rotated
/// bounding radius over the light-to-centroid distance, and its clip planes
/// bracket that distance by the radius. A far-away light therefore wastes
/// shadow-map resolution but never clips the scene.

use glam::{Mat3, Mat4, Vec3};

/// Scale factor normalizing controller space to the scene.
///
/// Distance from the first calibrated camera to the proxy centroid, grown
/// by the ratio of the scene bounding radius to the proxy radius.
pub fn scene_scale(
    first_pose: &Mat4,
    proxy_centroid: Vec3,
    proxy_radius: f32,
    scene_radius: f32,
) -> f32 {
    (*first_pose * proxy_centroid.extend(1.0)).truncate().length() * scene_radius / proxy_radius
}

/// World-space view transform of a virtual light.
///
/// The controller matrix is conjugated by the scene scale, composed with
/// the first calibrated camera's orientation, and translated so the scene
/// centroid becomes the origin of light space.
pub fn light_view_matrix(
    controller_matrix: &Mat4,
    scale: f32,
    first_pose: &Mat4,
    scene_centroid: Vec3,
) -> Mat4 {
    Mat4::from_scale(Vec3::splat(scale))
        * *controller_matrix
        * Mat4::from_scale(Vec3::splat(1.0 / scale))
        * Mat4::from_mat3(Mat3::from_mat4(*first_pose))
        * Mat4::from_translation(-scene_centroid)
}

/// Bounding radius as seen under the first camera's rotation.
///
/// The radius is pushed through the rotation as a uniform vector and the
/// result's length is divided by sqrt(3).
pub fn rotated_radius(first_pose: &Mat4, radius: f32) -> f32 {
    (Mat3::from_mat4(*first_pose) * Vec3::splat(radius)).length() / 3.0_f32.sqrt()
}

/// Perspective projection framing the scene's bounding sphere from a light.
///
/// Field of view = 2 * atan(radius / distance); aspect 1; near/far at
/// distance -/+ radius.
pub fn light_projection_matrix(
    light_view: &Mat4,
    scene_centroid: Vec3,
    rotated_radius: f32,
) -> Mat4 {
    let light_distance = (*light_view * scene_centroid.extend(1.0)).truncate().length();
    Mat4::perspective_rh(
        2.0 * (rotated_radius / light_distance).atan(),
        1.0,
        light_distance - rotated_radius,
        light_distance + rotated_radius,
    )
}

#[cfg(test)]
#[path = "transforms_tests.rs"]
mod tests;
