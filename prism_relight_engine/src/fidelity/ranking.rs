/// Target-set blending and greedy importance ranking
///
/// Given fitted curves for every source view, an arbitrary target view set
/// is assessed by blending the source curves toward each target direction,
/// then greedily picking the view with the highest predicted error,
/// updating every remaining view's minimum distance to the picked set after
/// each step. Views present in both sets are ranked first (retiring their
/// source counterparts), then the target-only remainder.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::camera::ViewSet;
use crate::fidelity::{angular_distance, FidelityCurve};

/// Weight floor preventing division blowup for perfectly aligned views
const WEIGHT_EPSILON: f64 = 1e-6;

/// Angular blending weight between a target and a source direction.
///
/// `1 / max(eps, 1 - max(0, cos)^exponent) - 1`: angularly near source
/// views dominate, opposite-facing views contribute nothing.
pub fn blend_weight(target_direction: Vec3, source_direction: Vec3, weight_exponent: f64) -> f64 {
    let cosine = (target_direction.dot(source_direction) as f64).max(0.0);
    1.0 / (1.0 - cosine.powf(weight_exponent)).max(WEIGHT_EPSILON) - 1.0
}

/// Blend source curves toward each target direction.
///
/// Slopes blend over all source views; peaks blend only over source views
/// with a positive peak (if none exist, the blended curve is linear).
pub fn blend_target_curves(
    source_curves: &[FidelityCurve],
    source_directions: &[Vec3],
    target_directions: &[Vec3],
    weight_exponent: f64,
) -> Vec<FidelityCurve> {
    target_directions
        .iter()
        .map(|target_direction| {
            let mut weighted_slope_sum = 0.0;
            let mut weight_sum = 0.0;
            let mut weighted_peak_sum = 0.0;
            let mut peak_weight_sum = 0.0;

            for (curve, source_direction) in source_curves.iter().zip(source_directions) {
                let weight = blend_weight(*target_direction, *source_direction, weight_exponent);

                if curve.peak > 0.0 {
                    weighted_peak_sum += weight * curve.peak;
                    peak_weight_sum += weight;
                }

                weighted_slope_sum += weight * curve.slope;
                weight_sum += weight;
            }

            FidelityCurve {
                slope: if weight_sum > 0.0 {
                    weighted_slope_sum / weight_sum
                } else {
                    0.0
                },
                peak: if peak_weight_sum > 0.0 {
                    weighted_peak_sum / peak_weight_sum
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Match views across two sets by file-name stem.
///
/// Returns, for each view of `from`, the index of the view in `to` with the
/// same stem (first occurrence wins on duplicates).
pub fn match_views(from: &ViewSet, to: &ViewSet) -> Vec<Option<usize>> {
    let mut stems: FxHashMap<&str, usize> = FxHashMap::default();
    for (index, view) in to.views().iter().enumerate() {
        stems.entry(view.name_stem()).or_insert(index);
    }
    from.views()
        .iter()
        .map(|view| stems.get(view.name_stem()).copied())
        .collect()
}

/// One step of the greedy importance order
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPick {
    /// Index of the picked view in the target set
    pub target_index: usize,
    /// The picked view's minimum distance to any previously kept view
    pub distance: f64,
    /// The picked view's predicted error at that distance
    pub error: f64,
    /// Sum of the remaining unranked views' predicted errors after the pick
    pub expected_cumulative: f64,
}

/// Greedily rank a target view set by predicted error.
///
/// Phase one ranks views whose file-name stem matches an unretired source
/// view (retiring it); phase two ranks the target-only remainder. Each pick
/// takes the unranked view with the strictly highest predicted error (ties
/// resolve to the lowest index), then every remaining view's running
/// minimum distance and predicted error are updated against the pick. The
/// result is a permutation of the target indices.
pub fn greedy_rank(
    target_directions: &[Vec3],
    curves: &[FidelityCurve],
    mut distances: Vec<f64>,
    target_to_source: &[Option<usize>],
    mut source_used: Vec<bool>,
) -> Vec<RankedPick> {
    let count = target_directions.len();
    let mut errors: Vec<f64> = (0..count)
        .map(|i| curves[i].predicted_error(distances[i]))
        .collect();
    let mut target_used = vec![false; count];
    let mut picks = Vec::with_capacity(count);

    // Phase one: views present in both sets, most-erroneous first. Ends
    // when no unranked target matches an unretired source view.
    loop {
        let mut best: Option<usize> = None;
        let mut best_error = -1.0;
        for i in 0..count {
            if target_used[i] {
                continue;
            }
            if let Some(source) = target_to_source[i] {
                if !source_used[source] && errors[i] > best_error {
                    best_error = errors[i];
                    best = Some(i);
                }
            }
        }
        let Some(pick) = best else { break };
        if let Some(source) = target_to_source[pick] {
            source_used[source] = true;
        }
        picks.push(apply_pick(
            pick,
            target_directions,
            curves,
            &mut distances,
            &mut errors,
            &mut target_used,
        ));
    }

    // Phase two: the target-only remainder
    loop {
        let mut best: Option<usize> = None;
        let mut best_error = -1.0;
        for i in 0..count {
            if !target_used[i] && errors[i] > best_error {
                best_error = errors[i];
                best = Some(i);
            }
        }
        let Some(pick) = best else { break };
        picks.push(apply_pick(
            pick,
            target_directions,
            curves,
            &mut distances,
            &mut errors,
            &mut target_used,
        ));
    }

    picks
}

/// Mark a pick used and refresh every unranked view's distance and error
fn apply_pick(
    pick: usize,
    target_directions: &[Vec3],
    curves: &[FidelityCurve],
    distances: &mut [f64],
    errors: &mut [f64],
    target_used: &mut [bool],
) -> RankedPick {
    let pick_distance = distances[pick];
    let pick_error = errors[pick];
    target_used[pick] = true;

    let mut expected_cumulative = 0.0;
    for i in 0..target_directions.len() {
        if target_used[i] {
            continue;
        }
        distances[i] = distances[i].min(angular_distance(
            target_directions[i],
            target_directions[pick],
        ));
        errors[i] = curves[i].predicted_error(distances[i]);
        expected_cumulative += errors[i];
    }

    RankedPick {
        target_index: pick,
        distance: pick_distance,
        error: pick_error,
        expected_cumulative,
    }
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod tests;
