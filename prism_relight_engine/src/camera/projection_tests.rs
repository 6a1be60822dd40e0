use super::*;
use approx::assert_relative_eq;
use glam::Vec4;

#[test]
fn test_projection_accessors() {
    let projection = Projection::new(std::f32::consts::FRAC_PI_4, 16.0 / 9.0);
    assert_eq!(projection.vertical_field_of_view(), std::f32::consts::FRAC_PI_4);
    assert_eq!(projection.aspect_ratio(), 16.0 / 9.0);
}

#[test]
fn test_projection_matrix_matches_glam() {
    let projection = Projection::new(std::f32::consts::FRAC_PI_3, 1.5);
    let expected = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.5, 0.1, 100.0);
    assert_eq!(projection.matrix(0.1, 100.0), expected);
}

#[test]
fn test_projection_maps_near_plane_center_to_near_depth() {
    let projection = Projection::new(std::f32::consts::FRAC_PI_2, 1.0);
    let matrix = projection.matrix(1.0, 10.0);

    // A point on the optical axis at the near plane projects to depth 0
    let clip = matrix * Vec4::new(0.0, 0.0, -1.0, 1.0);
    assert_relative_eq!(clip.z / clip.w, 0.0, epsilon = 1e-6);
}
