/// Constrained error-curve fitting
///
/// Fits per-view (angular distance, error) samples to a quadratic of the
/// form `error = a*d^2 + slope*d`, forced through the origin, subject to:
///
/// - the slope at the origin must be finite and non-negative;
/// - samples at or beyond the quadratic's own peak distance
///   (`2*peak/slope`) are excluded from the least-squares fit and instead
///   folded into a revised, clamped peak estimate;
/// - the fit-and-reclassify step iterates until the excluded set
///   stabilizes, with a hard iteration cap to guarantee termination.
///
/// Only the rising half of the quadratic is ever used: beyond the peak
/// distance the predicted error is clamped to the peak value, so the model
/// is monotonically non-decreasing. `peak = 0` designates a pure linear
/// model with no clamp.

/// Hard cap on fit-and-reclassify iterations
pub const MAX_FIT_ITERATIONS: usize = 32;

/// Minimum number of samples that must remain in the least-squares fit
const MIN_FIT_SAMPLES: usize = 5;

/// A fitted error-vs-distance model for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FidelityCurve {
    /// Slope at the origin (always finite and >= 0 after fitting)
    pub slope: f64,
    /// Peak error value; 0 designates a pure linear model
    pub peak: f64,
}

impl FidelityCurve {
    /// A linear model through the origin
    pub fn linear(slope: f64) -> Self {
        Self { slope, peak: 0.0 }
    }

    /// Whether this curve is the unclamped linear model
    pub fn is_linear(&self) -> bool {
        self.peak <= 0.0
    }

    /// Distance at which the quadratic reaches its peak
    /// (infinite for linear models)
    pub fn peak_distance(&self) -> f64 {
        if self.peak > 0.0 {
            2.0 * self.peak / self.slope
        } else {
            f64::INFINITY
        }
    }

    /// Predicted error at an angular distance.
    ///
    /// Quadratic on the rising half, clamped to the peak beyond the peak
    /// distance; linear models scale without bound. Always 0 at distance 0.
    pub fn predicted_error(&self, distance: f64) -> f64 {
        if self.peak > 0.0 {
            if distance > self.peak_distance() {
                self.peak
            } else {
                self.slope * distance
                    - self.slope * self.slope * distance * distance / (4.0 * self.peak)
            }
        } else {
            self.slope * distance
        }
    }
}

/// Linear least-squares slope through the origin
fn linear_slope(sum_error_distance: f64, sum_square_distances: f64) -> f64 {
    if sum_square_distances > 0.0 {
        sum_error_distance / sum_square_distances
    } else {
        0.0
    }
}

/// Fit (distance, error) samples to the constrained quadratic.
///
/// Degenerate solves (zero denominator, non-finite or non-positive slope,
/// too few retained samples) fall back to the previous iteration's fit, or
/// on the first iteration to the pure linear fit through the origin. The
/// samples are expected to start at (0, 0) with distances non-decreasing.
pub fn fit_error_curve(distances: &[f64], errors: &[f64]) -> FidelityCurve {
    debug_assert_eq!(distances.len(), errors.len());
    let sample_count = errors.len();

    let mut peak = -1.0f64;
    let mut slope = -1.0f64;
    let mut max_distance = distances.last().copied().unwrap_or(0.0);

    // Samples that would land on the downward half of the quadratic distort
    // the fit; each pass excludes them from the least squares and folds
    // them into the peak estimate instead, until the split stabilizes.
    for _ in 0..MAX_FIT_ITERATIONS {
        let mut sum_square_distances = 0.0;
        let mut sum_cube_distances = 0.0;
        let mut sum_fourth_distances = 0.0;
        let mut sum_error_distance = 0.0;
        let mut sum_error_square_distance = 0.0;

        let mut sum_high_errors = 0.0;
        let mut count_high_errors = 0usize;

        for k in 0..sample_count {
            let distance = distances[k];
            let error = errors[k];

            if distance < max_distance {
                let distance_sq = distance * distance;
                sum_square_distances += distance_sq;
                sum_cube_distances += distance * distance_sq;
                sum_fourth_distances += distance_sq * distance_sq;
                sum_error_distance += error * distance;
                sum_error_square_distance += error * distance_sq;
            } else {
                sum_high_errors += error;
                count_high_errors += 1;
            }
        }

        let prev_peak = peak;
        let prev_slope = slope;

        let denominator =
            sum_cube_distances * sum_cube_distances - sum_fourth_distances * sum_square_distances;
        let a = (sum_cube_distances * sum_error_distance
            - sum_square_distances * sum_error_square_distance)
            / denominator;
        slope = (sum_cube_distances * sum_error_square_distance
            - sum_fourth_distances * sum_error_distance)
            / denominator;

        if slope <= 0.0 || !slope.is_finite() || count_high_errors + MIN_FIT_SAMPLES > sample_count
        {
            if prev_slope < 0.0 {
                // First iteration: degrade to the linear model.
                // peak = 0 designates a linear function.
                peak = 0.0;
                slope = linear_slope(sum_error_distance, sum_square_distances);
            } else {
                // Revert to the previous peak and slope
                slope = prev_slope;
                peak = prev_peak;
            }
        } else {
            // The peak follows from the leading coefficient and the slope
            let least_squares_peak = slope * slope / (-4.0 * a);

            if least_squares_peak.is_finite() && least_squares_peak > 0.0 {
                if count_high_errors == 0 {
                    peak = least_squares_peak;
                } else {
                    // Weighted average of the least-squares peak with the
                    // mean of the clamped samples; the least-squares
                    // contribution is capped at twice that mean.
                    let mean_high = sum_high_errors / count_high_errors as f64;
                    peak = ((2.0 * mean_high).min(least_squares_peak)
                        * (sample_count - count_high_errors) as f64
                        + sum_high_errors)
                        / sample_count as f64;
                }
            } else if prev_peak < 0.0 {
                peak = 0.0;
                slope = linear_slope(sum_error_distance, sum_square_distances);
            } else {
                slope = prev_slope;
                peak = prev_peak;
            }
        }

        let prev_max_distance = max_distance;
        max_distance = 2.0 * peak / slope;

        if !(max_distance < prev_max_distance && peak > 0.0) {
            break;
        }
    }

    if !slope.is_finite() || slope < 0.0 {
        slope = 0.0;
        peak = 0.0;
    }
    if !peak.is_finite() || peak < 0.0 {
        peak = 0.0;
    }

    FidelityCurve { slope, peak }
}

#[cfg(test)]
#[path = "curve_tests.rs"]
mod tests;
