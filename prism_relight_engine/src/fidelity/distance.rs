/// Angular distances between view directions
///
/// The distance between two views is the angle between their unit
/// view-direction vectors (camera position minus scene centroid). The full
/// pairwise matrix is symmetric with a zero diagonal and values in [0, pi].

use glam::Vec3;

/// Angle in radians between two unit directions, clamped against rounding
pub fn angular_distance(a: Vec3, b: Vec3) -> f64 {
    (a.dot(b) as f64).clamp(-1.0, 1.0).acos()
}

/// Pairwise angular-distance matrix for a set of unit view directions
///
/// The diagonal is exactly zero (not subject to rounding in the dot
/// product).
pub fn angular_distance_matrix(directions: &[Vec3]) -> Vec<Vec<f64>> {
    (0..directions.len())
        .map(|i| {
            (0..directions.len())
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        angular_distance(directions[i], directions[j])
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "distance_tests.rs"]
mod tests;
