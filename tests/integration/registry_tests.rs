//! Method registry integration tests

use coalesce_rs::{BatcherConfig, MethodBatchers, MethodError};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct UserStore {
    lookups: Mutex<Vec<Vec<u32>>>,
}

impl UserStore {
    async fn names(self: Arc<Self>, ids: Vec<u32>) -> Result<Vec<String>, String> {
        self.lookups.lock().push(ids.clone());
        if ids.contains(&0) {
            return Err("id 0 is reserved".to_string());
        }
        Ok(ids.iter().map(|id| format!("user-{}", id)).collect())
    }

    fn lookups(&self) -> Vec<Vec<u32>> {
        self.lookups.lock().clone()
    }
}

fn load_name(
    registry: &MethodBatchers<UserStore>,
    store: &Arc<UserStore>,
    id: u32,
) -> coalesce_rs::Enqueued<String, MethodError<String>> {
    registry
        .enqueue(
            store,
            "names",
            &BatcherConfig::default(),
            UserStore::names,
            id,
        )
        .unwrap()
}

#[tokio::test]
async fn test_single_key_calls_share_one_bulk_call() {
    let registry = MethodBatchers::new();
    let store = Arc::new(UserStore::default());

    let names = join_all(vec![
        load_name(&registry, &store, 1),
        load_name(&registry, &store, 2),
        load_name(&registry, &store, 1),
    ])
    .await;

    let names: Vec<String> = names.into_iter().map(|n| n.unwrap()).collect();
    assert_eq!(names, vec!["user-1", "user-2", "user-1"]);
    assert_eq!(store.lookups(), vec![vec![1, 2]]);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_instances_are_batched_separately() {
    let registry = MethodBatchers::new();
    let first = Arc::new(UserStore::default());
    let second = Arc::new(UserStore::default());

    join_all(vec![
        load_name(&registry, &first, 1),
        load_name(&registry, &second, 2),
        load_name(&registry, &first, 3),
    ])
    .await;

    assert_eq!(first.lookups(), vec![vec![1, 3]]);
    assert_eq!(second.lookups(), vec![vec![2]]);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_bulk_failure_reaches_every_caller() {
    let registry = MethodBatchers::new();
    let store = Arc::new(UserStore::default());

    let outcomes = join_all(vec![
        load_name(&registry, &store, 0),
        load_name(&registry, &store, 5),
    ])
    .await;

    for outcome in outcomes {
        let err = outcome.unwrap_err();
        assert!(err.is_batch_failure());
        assert!(matches!(err.source_error(), Some(MethodError::Method(msg)) if msg == "id 0 is reserved"));
    }
}

#[tokio::test]
async fn test_prune_after_instances_drop() {
    let registry = MethodBatchers::new();
    let kept = Arc::new(UserStore::default());

    load_name(&registry, &kept, 1).await.unwrap();
    {
        let dropped = Arc::new(UserStore::default());
        load_name(&registry, &dropped, 2).await.unwrap();
    }

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.prune(), 1);
    assert_eq!(registry.len(), 1);
    assert!(!registry.is_empty());
}
