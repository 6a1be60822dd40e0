use super::*;

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display_backend_error() {
    let error = Error::BackendError("device lost".to_string());
    assert_eq!(format!("{}", error), "Backend error: device lost");
}

#[test]
fn test_display_out_of_memory() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_display_resource_not_found() {
    let error = Error::ResourceNotFound(PathBuf::from("/data/missing.png"));
    assert_eq!(
        format!("{}", error),
        "Resource not found: /data/missing.png"
    );
}

#[test]
fn test_display_operation_in_flight() {
    assert_eq!(
        format!("{}", Error::OperationInFlight),
        "Another long operation is already in flight"
    );
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn test_io_error_converts_to_export_failed() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: Error = io_error.into();
    match error {
        Error::ExportFailed(message) => assert!(message.contains("gone")),
        other => panic!("expected ExportFailed, got {:?}", other),
    }
}

#[test]
fn test_error_is_std_error() {
    fn assert_std_error<E: std::error::Error>(_: &E) {}
    assert_std_error(&Error::OutOfMemory);
}

// ============================================================================
// Macros
// ============================================================================

#[test]
fn test_engine_err_builds_backend_error() {
    let error = crate::engine_err!("prism::test", "value {} out of range", 7);
    match error {
        Error::BackendError(message) => assert_eq!(message, "value 7 out of range"),
        other => panic!("expected BackendError, got {:?}", other),
    }
}

#[test]
fn test_engine_bail_returns_early() {
    fn failing() -> Result<()> {
        crate::engine_bail!("prism::test", "always fails");
    }
    assert!(failing().is_err());
}
