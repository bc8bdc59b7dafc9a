//! Test fixtures

use async_trait::async_trait;
use coalesce_rs::{BatchExecutor, BatchOutcomes, Batcher, BatcherConfig};
use parking_lot::Mutex;
use std::sync::Arc;

/// Error returned by fixture executors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FixtureError(pub String);

/// Executor that records every call.
///
/// Answers `<key>-index-<i>`; the key `error` fails on its own and the key
/// `throw` fails the whole batch.
#[derive(Debug, Default, Clone)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys received by each call, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BatchExecutor<String, String> for RecordingExecutor {
    type Error = FixtureError;

    async fn execute(&self, keys: Vec<String>) -> BatchOutcomes<String, FixtureError> {
        self.calls.lock().push(keys.clone());

        let mut outcomes = Vec::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            match key.as_str() {
                "throw" => return Err(FixtureError(format!("throw-index-{}", index))),
                "error" => outcomes.push(Err(FixtureError(format!("error-index-{}", index)))),
                _ => outcomes.push(Ok(format!("{}-index-{}", key, index))),
            }
        }
        Ok(outcomes)
    }
}

/// Batcher over a [`RecordingExecutor`], plus a handle to inspect its calls
pub fn recording_batcher(
    config: BatcherConfig,
) -> (Batcher<String, String, RecordingExecutor>, RecordingExecutor) {
    let executor = RecordingExecutor::new();
    (Batcher::with_config(executor.clone(), config), executor)
}

/// Owned keys from string literals
pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
