/// Fidelity module - view-importance estimation
///
/// Predicts, per input view, how reconstruction error grows as that view's
/// angular neighbors are withheld, fits a constrained error-vs-distance
/// curve per view, and uses the fitted curves to rank an arbitrary target
/// view set by predicted importance.

pub mod distance;
pub mod curve;
pub mod estimator;
pub mod ranking;
pub mod report;

pub use curve::*;
pub use distance::*;
pub use estimator::*;
pub use ranking::*;
pub use report::*;
