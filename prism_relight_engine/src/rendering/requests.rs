/// Long-operation requests and progress reporting
///
/// Resampling, fidelity estimation, and BTF export are long, blocking
/// operations. Callers submit a typed request into the queue; the renderer
/// drains it at the start of its next update tick. The queue holds at most
/// one request and rejects submissions while one is pending or executing,
/// so single-in-flight is enforced by the type, not by convention. There is
/// no cancellation: a caller can only decline to start an operation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::camera::ViewSet;
use crate::error::{Error, Result};

// ===== PROGRESS SINK =====

/// Progress reporting for long operations
///
/// Invoked synchronously from inside the operation, so implementations must
/// be cheap and must never block the calling thread (forward into an atomic,
/// a bounded channel, or similar).
pub trait ProgressSink: Send + Sync {
    /// Announce the maximum progress value (0 = indeterminate)
    fn set_maximum(&self, maximum: f64);

    /// Report current progress
    fn set_progress(&self, progress: f64);

    /// Announce completion
    fn complete(&self);
}

/// Progress sink that discards all reports
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn set_maximum(&self, _maximum: f64) {}
    fn set_progress(&self, _progress: f64) {}
    fn complete(&self) {}
}

/// Progress sink backed by atomics, readable from any thread
#[derive(Default)]
pub struct AtomicProgressSink {
    maximum: AtomicU64,
    progress: AtomicU64,
    completed: AtomicBool,
}

impl AtomicProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported maximum
    pub fn maximum(&self) -> f64 {
        f64::from_bits(self.maximum.load(Ordering::Relaxed))
    }

    /// Last reported progress
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Relaxed))
    }

    /// Whether the operation has completed
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for AtomicProgressSink {
    fn set_maximum(&self, maximum: f64) {
        self.maximum.store(maximum.to_bits(), Ordering::Relaxed);
    }

    fn set_progress(&self, progress: f64) {
        self.progress.store(progress.to_bits(), Ordering::Relaxed);
    }

    fn complete(&self) {
        self.completed.store(true, Ordering::Relaxed);
    }
}

// ===== REQUESTS =====

/// Re-render the dataset into every pose of a target view set
pub struct ResampleRequest {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Target poses to render
    pub target: ViewSet,
    /// Path of the target view-set description file (copied into the export)
    pub view_set_file: PathBuf,
    /// Directory receiving the images and metadata copies
    pub export_dir: PathBuf,
    /// Progress reporting
    pub progress: Arc<dyn ProgressSink>,
}

/// Estimate per-view fidelity and rank a target view set by importance
pub struct FidelityRequest {
    /// Path of the tab-separated report to write
    pub export_path: PathBuf,
    /// Optional target view set to blend and rank
    pub target: Option<ViewSet>,
    /// Progress reporting
    pub progress: Arc<dyn ProgressSink>,
}

/// Export a bidirectional-texture-function image sequence
pub struct BtfRequest {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Directory receiving the numbered images
    pub export_dir: PathBuf,
    /// Progress reporting
    pub progress: Arc<dyn ProgressSink>,
}

/// A pending long operation
pub enum RenderRequest {
    Resample(ResampleRequest),
    Fidelity(FidelityRequest),
    Btf(BtfRequest),
}

// ===== QUEUE =====

/// Single-slot request queue with single-in-flight enforcement
#[derive(Default)]
pub struct RequestQueue {
    pending: Mutex<Option<RenderRequest>>,
    in_flight: AtomicBool,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInFlight`] if a request is already pending
    /// or executing.
    pub fn submit(&self, request: RenderRequest) -> Result<()> {
        if self.in_flight.load(Ordering::Acquire) {
            return Err(Error::OperationInFlight);
        }
        let mut pending = self.pending.lock().unwrap();
        if pending.is_some() {
            return Err(Error::OperationInFlight);
        }
        *pending = Some(request);
        Ok(())
    }

    /// Whether a request is pending or executing
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) || self.pending.lock().unwrap().is_some()
    }

    /// Take the pending request and mark the queue as executing.
    ///
    /// The caller must pair this with [`RequestQueue::finish`] on every
    /// path once execution ends.
    pub(crate) fn begin(&self) -> Option<RenderRequest> {
        let request = self.pending.lock().unwrap().take();
        if request.is_some() {
            self.in_flight.store(true, Ordering::Release);
        }
        request
    }

    /// Mark execution as finished, allowing new submissions
    pub(crate) fn finish(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
