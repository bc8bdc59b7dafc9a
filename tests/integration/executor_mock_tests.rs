//! Executor contract tests driven through a mockall mock

use crate::common::FixtureError;
use crate::common::fixtures::keys;
use async_trait::async_trait;
use coalesce_rs::{BatchError, BatchExecutor, BatchOutcomes, Batcher, BatcherConfig};
use futures::future::join_all;
use mockall::mock;
use mockall::predicate::eq;

mock! {
    pub Backend {}

    #[async_trait]
    impl BatchExecutor<String, String> for Backend {
        type Error = FixtureError;

        async fn execute(&self, keys: Vec<String>) -> BatchOutcomes<String, FixtureError>;
    }
}

fn echo(keys: Vec<String>) -> BatchOutcomes<String, FixtureError> {
    Ok(keys.into_iter().map(|k| Ok(k.to_uppercase())).collect())
}

#[tokio::test]
async fn test_mock_receives_deduplicated_keys() {
    let mut backend = MockBackend::new();
    backend
        .expect_execute()
        .with(eq(keys(&["a", "b"])))
        .times(1)
        .returning(echo);

    let batcher = Batcher::new(backend);
    let outcomes = join_all(vec![
        batcher.enqueue("a".to_string()),
        batcher.enqueue("b".to_string()),
        batcher.enqueue("a".to_string()),
    ])
    .await;

    let values: Vec<String> = outcomes.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, keys(&["A", "B", "A"]));
}

#[tokio::test]
async fn test_mock_called_once_per_batch() {
    let mut backend = MockBackend::new();
    backend
        .expect_execute()
        .withf(|keys| keys.len() <= 2)
        .times(2)
        .returning(echo);

    let batcher = Batcher::with_config(backend, BatcherConfig::new().with_max_batch_size(2));
    let outcomes = join_all(
        ["a", "b", "c"]
            .iter()
            .map(|k| batcher.enqueue(k.to_string()))
            .collect::<Vec<_>>(),
    )
    .await;

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(batcher.stats().batches_dispatched, 2);
}

#[tokio::test]
async fn test_short_outcome_list_rejects_every_caller() {
    let mut backend = MockBackend::new();
    backend
        .expect_execute()
        .times(1)
        .returning(|_| Ok(vec![Ok("only-one".to_string())]));

    let batcher = Batcher::new(backend);
    let outcomes = join_all(vec![
        batcher.enqueue("a".to_string()),
        batcher.enqueue("b".to_string()),
    ])
    .await;

    for outcome in outcomes {
        assert!(matches!(
            outcome,
            Err(BatchError::ContractViolation {
                expected: 2,
                actual: 1
            })
        ));
    }
}

#[tokio::test]
async fn test_mock_failure_is_shared() {
    let mut backend = MockBackend::new();
    backend
        .expect_execute()
        .times(1)
        .returning(|_| Err(FixtureError("backend down".to_string())));

    let batcher = Batcher::new(backend);
    let outcomes = join_all(vec![
        batcher.enqueue("a".to_string()),
        batcher.enqueue("b".to_string()),
    ])
    .await;

    crate::common::assertions::assert_shared_batch_failure(&outcomes);
    let err = outcomes[0].as_ref().unwrap_err();
    assert_eq!(
        err.source_error(),
        Some(&FixtureError("backend down".to_string()))
    );
}
