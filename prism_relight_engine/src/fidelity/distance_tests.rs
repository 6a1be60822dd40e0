use super::*;
use approx::assert_relative_eq;

fn create_ring_directions(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / count as f32;
            Vec3::new(angle.sin(), 0.0, angle.cos())
        })
        .collect()
}

// ============================================================================
// angular_distance
// ============================================================================

#[test]
fn test_known_angles() {
    let forward = Vec3::Z;
    let right = Vec3::X;
    let back = -Vec3::Z;

    assert_relative_eq!(angular_distance(forward, forward), 0.0, epsilon = 1e-6);
    assert_relative_eq!(
        angular_distance(forward, right),
        std::f64::consts::FRAC_PI_2,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        angular_distance(forward, back),
        std::f64::consts::PI,
        epsilon = 1e-6
    );
}

#[test]
fn test_clamps_rounding_overshoot() {
    // Nearly identical normalized vectors can dot to just above 1.0
    let a = Vec3::new(0.6, 0.8, 0.0).normalize();
    let distance = angular_distance(a, a);
    assert!(distance.is_finite());
    assert!(distance >= 0.0);
}

// ============================================================================
// angular_distance_matrix
// ============================================================================

#[test]
fn test_matrix_diagonal_is_exactly_zero() {
    let matrix = angular_distance_matrix(&create_ring_directions(7));
    for (i, row) in matrix.iter().enumerate() {
        assert_eq!(row[i], 0.0);
    }
}

#[test]
fn test_matrix_is_symmetric() {
    let matrix = angular_distance_matrix(&create_ring_directions(9));
    for i in 0..matrix.len() {
        for j in 0..matrix.len() {
            assert_relative_eq!(matrix[i][j], matrix[j][i], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_matrix_values_in_range() {
    let matrix = angular_distance_matrix(&create_ring_directions(11));
    for row in &matrix {
        for value in row {
            assert!(*value >= 0.0);
            assert!(*value <= std::f64::consts::PI + 1e-9);
        }
    }
}
