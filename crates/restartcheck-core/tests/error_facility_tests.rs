use restartcheck_core::config::{ExclusionSet, Tolerance};
use restartcheck_core::errors::{ExError, ExErrorKind, LvArrayError};
use restartcheck_core_types::RunId;

#[test]
fn test_invalid_tolerance_verifiable_by_kind() {
    let err = Tolerance::new(-0.5, 0.0).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidTolerance);
    assert_eq!(err.code(), "ERR_INVALID_TOLERANCE");
    assert_eq!(err.op(), Some("tolerance_new"));
    assert!(err.message().contains("absolute"));
}

#[test]
fn test_invalid_pattern_names_the_pattern() {
    let err = ExclusionSet::new(["/ok", "[unclosed"]).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
    assert!(err.message().contains("[unclosed"));
}

#[test]
fn test_lvarray_errors_keep_their_description() {
    let err: ExError = LvArrayError::SizeMismatch {
        dimensions: vec![2, 3],
        expected: 6,
        actual: 5,
    }
    .into();
    assert_eq!(err.kind(), ExErrorKind::InvalidLvArray);
    assert!(err.message().contains("total size of 6"));
    assert!(err.message().contains("real size is 5"));
}

#[test]
fn test_run_id_context_is_carried() {
    let run_id = RunId::new();
    let err = ExError::new(ExErrorKind::Concurrency)
        .with_op("dispatch")
        .with_run_id(run_id.clone());
    assert_eq!(err.run_id(), Some(&run_id));
    assert_eq!(err.code(), "ERR_CONCURRENCY");
}
