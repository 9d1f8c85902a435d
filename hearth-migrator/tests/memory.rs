mod migrator;

use async_trait::async_trait;
use hearth_migrator::{MemoryLedger, Migration, MigrationState, Migrator, MigratorError};
use hearth_schema::{
    Catalog, Change, CollectionSchema, Engine, MemorySchema, Outcome, Schema, SchemaError,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Memory store whose `apply` calls listed in `failing` time out.
#[derive(Clone, Default)]
struct FlakySchema {
    inner: MemorySchema,
    calls: Arc<AtomicUsize>,
    failing: Vec<usize>,
}

#[async_trait]
impl Engine for FlakySchema {
    async fn apply(&self, change: Change) -> hearth_schema::Result<Outcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.failing.contains(&call) {
            return Err(SchemaError::Any(anyhow::anyhow!("store timeout on call {call}")));
        }

        self.inner.apply(change).await
    }

    async fn catalog(&self) -> hearth_schema::Result<Catalog> {
        self.inner.catalog().await
    }
}

fn flaky(failing: Vec<usize>) -> Schema {
    Schema::new(FlakySchema {
        failing,
        ..FlakySchema::default()
    })
}

fn two_collections() -> Migration {
    Migration::new(7, "created_a_and_b")
        .create_collection(CollectionSchema::new("pbc_a", "a"))
        .create_collection(CollectionSchema::new("pbc_b", "b"))
}

#[tokio::test]
async fn preferences_rollback() {
    migrator::test_preferences_rollback(&MemorySchema::new(), MemoryLedger::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn round_trip() {
    migrator::test_round_trip(&MemorySchema::new(), MemoryLedger::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn double_apply_fails() {
    migrator::test_double_apply_fails(&MemorySchema::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn failure_keeps_prefix() {
    migrator::test_failure_keeps_prefix(&MemorySchema::new(), MemoryLedger::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn rollback_failure_keeps_record() {
    migrator::test_rollback_failure_keeps_record(&MemorySchema::new(), MemoryLedger::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn ledger_must_be_prefix() {
    migrator::test_ledger_must_be_prefix(&MemorySchema::new(), MemoryLedger::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_field_keeps_position() {
    migrator::test_remove_field_keeps_position(&MemorySchema::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_revert_is_reported() {
    let schema = flaky(vec![2, 3]);

    let err = two_collections().up(&schema).await.unwrap_err();
    let MigratorError::Compensation {
        key,
        source,
        revert,
    } = err
    else {
        panic!("expected a compensation error, got {err}");
    };

    assert_eq!(key, 7);
    assert!(source.to_string().contains("call 2"));
    assert!(revert.to_string().contains("call 3"));

    let left = schema
        .collections()
        .await
        .unwrap()
        .into_iter()
        .map(|collection| collection.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(left, vec!["a".to_owned()]);
}

#[tokio::test]
async fn successful_revert_returns_step_error() {
    let schema = flaky(vec![2]);

    let err = two_collections().up(&schema).await.unwrap_err();
    assert!(matches!(err, MigratorError::Step { key: 7, .. }));
    assert!(schema.collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn apply_all_surfaces_failed_revert() {
    let schema = flaky(vec![2, 3]);
    let mut migrator = Migrator::new(MemoryLedger::new());
    migrator.add_migration(two_collections()).unwrap();

    assert!(matches!(
        migrator.apply_all(&schema).await.unwrap_err(),
        MigratorError::Compensation { key: 7, .. }
    ));

    let status = migrator.status().await.unwrap();
    assert_eq!(status[0].state, MigrationState::Pending);
}

#[tokio::test]
async fn multi_operation_step() {
    migrator::test_multi_operation_step(&MemorySchema::new())
        .await
        .unwrap();
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut migrator = Migrator::new(MemoryLedger::new());
    migrator
        .add_migration(Migration::new(2, "second"))
        .unwrap()
        .add_migration(Migration::new(1, "first"))
        .unwrap();

    let err = migrator
        .add_migration(Migration::new(2, "again"))
        .unwrap_err();
    assert!(matches!(
        err,
        MigratorError::DuplicateMigration(2)
    ));

    let keys = migrator
        .migrations()
        .iter()
        .map(|migration| migration.key())
        .collect::<Vec<_>>();
    assert_eq!(keys, vec![1, 2]);
}

#[tokio::test]
#[tracing_test::traced_test]
async fn apply_all_logs_each_step() {
    let mut migrator = Migrator::new(MemoryLedger::new());
    migrator
        .add_migration(Migration::new(1, "empty"))
        .unwrap();

    migrator.apply_all(&MemorySchema::new()).await.unwrap();

    assert!(logs_contain("applying migration"));
}
