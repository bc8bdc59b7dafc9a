//! Configuration integration tests

use coalesce_rs::{Batcher, BatcherConfig, CoalesceError, Validate};
use crate::common::RecordingExecutor;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_file_config_drives_batcher() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "max_batch_size: 3\ndelay_window_ms: 10").unwrap();

    let config = BatcherConfig::from_file(file.path()).await.unwrap();
    assert_eq!(config.delay_window(), Duration::from_millis(10));

    let batcher = Batcher::try_with_config(RecordingExecutor::new(), config).unwrap();
    assert_eq!(batcher.config().max_batch_size, 3);
}

#[tokio::test]
async fn test_zero_batch_size_file_is_rejected() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    write!(file, r#"{{"max_batch_size": 0}}"#).unwrap();

    let err = BatcherConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(err, CoalesceError::Validation(_)));
}

#[test]
fn test_defaults_are_valid() {
    let config = BatcherConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_batch_size, 25);
    assert_eq!(config.delay_window_ms, 0);
}

#[test]
fn test_try_with_config_rejects_zero() {
    let result = Batcher::try_with_config(
        RecordingExecutor::new(),
        BatcherConfig::new().with_max_batch_size(0),
    );
    assert!(matches!(result, Err(CoalesceError::Validation(_))));
}
