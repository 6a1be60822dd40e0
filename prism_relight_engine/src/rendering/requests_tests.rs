use super::*;
use std::path::PathBuf;

fn create_btf_request() -> RenderRequest {
    RenderRequest::Btf(BtfRequest {
        width: 64,
        height: 64,
        export_dir: PathBuf::from("/tmp/out"),
        progress: Arc::new(NullProgressSink),
    })
}

// ============================================================================
// Queue discipline
// ============================================================================

#[test]
fn test_submit_then_begin_then_finish() {
    let queue = RequestQueue::new();
    assert!(!queue.is_busy());

    queue.submit(create_btf_request()).unwrap();
    assert!(queue.is_busy());

    let request = queue.begin();
    assert!(request.is_some());
    assert!(queue.is_busy());

    queue.finish();
    assert!(!queue.is_busy());
}

#[test]
fn test_second_submit_rejected_while_pending() {
    let queue = RequestQueue::new();
    queue.submit(create_btf_request()).unwrap();

    match queue.submit(create_btf_request()) {
        Err(Error::OperationInFlight) => {}
        other => panic!("expected OperationInFlight, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_submit_rejected_while_executing() {
    let queue = RequestQueue::new();
    queue.submit(create_btf_request()).unwrap();
    let _request = queue.begin();

    assert!(queue.submit(create_btf_request()).is_err());

    queue.finish();
    assert!(queue.submit(create_btf_request()).is_ok());
}

#[test]
fn test_begin_on_empty_queue() {
    let queue = RequestQueue::new();
    assert!(queue.begin().is_none());
    // begin() without a pending request must not mark the queue busy
    assert!(!queue.is_busy());
}

// ============================================================================
// Atomic progress sink
// ============================================================================

#[test]
fn test_atomic_progress_sink_round_trip() {
    let sink = AtomicProgressSink::new();
    assert_eq!(sink.progress(), 0.0);
    assert!(!sink.is_complete());

    sink.set_maximum(10.0);
    sink.set_progress(3.5);
    sink.complete();

    assert_eq!(sink.maximum(), 10.0);
    assert_eq!(sink.progress(), 3.5);
    assert!(sink.is_complete());
}
