use super::*;
use approx::assert_relative_eq;

/// Samples on the exact quadratic error = 4d - d^2 (slope 4, peak 4 at d=2)
fn create_quadratic_samples() -> (Vec<f64>, Vec<f64>) {
    let distances: Vec<f64> = vec![0.0, 0.3, 0.6, 0.9, 1.2, 1.5];
    let errors = distances.iter().map(|d| 4.0 * d - d * d).collect();
    (distances, errors)
}

// ============================================================================
// FidelityCurve model
// ============================================================================

#[test]
fn test_error_at_origin_is_zero() {
    let quadratic = FidelityCurve { slope: 3.0, peak: 1.5 };
    let linear = FidelityCurve::linear(2.0);
    assert_eq!(quadratic.predicted_error(0.0), 0.0);
    assert_eq!(linear.predicted_error(0.0), 0.0);
}

#[test]
fn test_linear_model_scales_without_clamp() {
    let curve = FidelityCurve::linear(2.0);
    assert!(curve.is_linear());
    assert_eq!(curve.peak_distance(), f64::INFINITY);
    assert_relative_eq!(curve.predicted_error(0.5), 1.0);
    assert_relative_eq!(curve.predicted_error(50.0), 100.0);
}

#[test]
fn test_quadratic_clamps_beyond_peak_distance() {
    let curve = FidelityCurve { slope: 4.0, peak: 4.0 };
    assert_relative_eq!(curve.peak_distance(), 2.0);
    // At the peak distance the quadratic reaches the peak exactly
    assert_relative_eq!(curve.predicted_error(2.0), 4.0, epsilon = 1e-12);
    // Beyond it, the prediction is clamped
    assert_relative_eq!(curve.predicted_error(5.0), 4.0);
}

#[test]
fn test_prediction_is_monotonically_non_decreasing() {
    let curve = FidelityCurve { slope: 2.5, peak: 1.25 };
    let mut previous = 0.0;
    for step in 0..200 {
        let error = curve.predicted_error(step as f64 * 0.02);
        assert!(error + 1e-12 >= previous);
        previous = error;
    }
}

// ============================================================================
// fit_error_curve
// ============================================================================

#[test]
fn test_fit_recovers_quadratic_slope() {
    let (distances, errors) = create_quadratic_samples();
    let curve = fit_error_curve(&distances, &errors);

    assert_relative_eq!(curve.slope, 4.0, epsilon = 1e-6);
    // The last sample sits on the excluded boundary, so the peak is the
    // weighted blend of the least-squares peak (4.0) with that sample
    assert_relative_eq!(
        curve.peak,
        (4.0 * 5.0 + (4.0 * 1.5 - 1.5 * 1.5)) / 6.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_fit_satisfies_invariants() {
    let (distances, errors) = create_quadratic_samples();
    let curve = fit_error_curve(&distances, &errors);

    assert!(curve.slope.is_finite());
    assert!(curve.slope >= 0.0);
    assert!(curve.peak.is_finite());
    assert!(curve.peak >= 0.0);
    assert_eq!(curve.predicted_error(0.0), 0.0);
}

#[test]
fn test_fit_with_too_few_samples_degrades_to_linear() {
    let curve = fit_error_curve(&[0.0, 0.3], &[0.0, 0.6]);
    assert!(curve.is_linear());
    assert!(curve.slope >= 0.0);
    assert!(curve.slope.is_finite());
}

#[test]
fn test_fit_with_empty_samples() {
    let curve = fit_error_curve(&[], &[]);
    assert_eq!(curve.slope, 0.0);
    assert_eq!(curve.peak, 0.0);
}

#[test]
fn test_fit_with_all_zero_errors() {
    let distances = vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    let errors = vec![0.0; 6];
    let curve = fit_error_curve(&distances, &errors);
    assert_eq!(curve.slope, 0.0);
    assert_eq!(curve.peak, 0.0);
}

#[test]
fn test_fit_terminates_on_noisy_samples() {
    // Adversarial: oscillating errors never settle on a clean quadratic;
    // the iteration cap still guarantees a finite, valid result.
    let distances: Vec<f64> = (0..24).map(|i| i as f64 * 0.05).collect();
    let errors: Vec<f64> = (0..24)
        .map(|i| if i % 2 == 0 { i as f64 } else { 0.1 })
        .collect();
    let curve = fit_error_curve(&distances, &errors);
    assert!(curve.slope.is_finite());
    assert!(curve.slope >= 0.0);
    assert!(curve.peak.is_finite());
    assert!(curve.peak >= 0.0);
}

#[test]
fn test_fit_is_deterministic() {
    let (distances, errors) = create_quadratic_samples();
    let first = fit_error_curve(&distances, &errors);
    let second = fit_error_curve(&distances, &errors);
    assert_eq!(first, second);
}
