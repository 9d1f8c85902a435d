use hearth_migrator::{
    AppliedMigration, Ledger, Migration, MigrationState, Migrator, MigratorError, Operation,
};
use hearth_schema::{
    CollectionSchema, FieldDefinition, JsonOptions, RelationOptions, Schema, SchemaError,
    TextOptions,
};

const USERS: &str = "_pb_users_auth_";
const PREFERENCES: &str = "pbc_preferences";
const PROFILES: &str = "pbc_user_profiles";

fn created_users() -> Migration {
    Migration::new(1731540000, "created_users").create_collection(
        CollectionSchema::new(USERS, "users").field(
            FieldDefinition::text("text_email", "email", TextOptions::default().max(255))
                .unwrap()
                .required(true),
        ),
    )
}

fn user_id() -> FieldDefinition {
    FieldDefinition::relation(
        "relation_user_id",
        "userID",
        RelationOptions::new(USERS).max_select(1),
    )
    .unwrap()
}

fn created_preferences() -> Migration {
    Migration::new(1731540100, "created_preferences")
        .create_collection(CollectionSchema::new(PREFERENCES, "preferences").field(user_id()))
}

fn preferences_json() -> FieldDefinition {
    FieldDefinition::json("json_preferences", "preferences", JsonOptions::default()).unwrap()
}

fn updated_preferences() -> Migration {
    Migration::new(1731540200, "updated_preferences").add_field(PREFERENCES, preferences_json())
}

fn created_user_profiles() -> Migration {
    Migration::new(1731540300, "created_user_profiles").create_collection(
        CollectionSchema::new(PROFILES, "user_profiles")
            .field(
                FieldDefinition::relation(
                    "relation_user",
                    "user",
                    RelationOptions::new(USERS).cascade_delete(true).max_select(1),
                )
                .unwrap()
                .required(true),
            )
            .field(
                FieldDefinition::text(
                    "text_display_name",
                    "display_name",
                    TextOptions::default().max(100),
                )
                .unwrap()
                .required(true),
            ),
    )
}

fn removed_display_name() -> Migration {
    Migration::new(1731540400, "removed_display_name").remove_field(
        PROFILES,
        FieldDefinition::text(
            "text_display_name",
            "display_name",
            TextOptions::default().max(100),
        )
        .unwrap()
        .required(true),
        1,
    )
}

fn deleted_preferences() -> Migration {
    Migration::new(1731540500, "deleted_preferences").delete_collection(
        CollectionSchema::new(PREFERENCES, "preferences")
            .field(user_id())
            .field(preferences_json()),
    )
}

fn all() -> Vec<Migration> {
    vec![
        created_users(),
        created_preferences(),
        updated_preferences(),
        created_user_profiles(),
        removed_display_name(),
        deleted_preferences(),
    ]
}

fn migrator<L: Ledger + 'static>(ledger: L, migrations: Vec<Migration>) -> Migrator {
    let mut migrator = Migrator::new(ledger);

    for migration in migrations {
        migrator.add_migration(migration).unwrap();
    }

    migrator
}

pub async fn test_preferences_rollback<L: Ledger + 'static>(
    schema: &Schema,
    ledger: L,
) -> anyhow::Result<()> {
    let migrator = migrator(
        ledger,
        vec![created_users(), created_preferences(), updated_preferences()],
    );

    let applied = migrator.apply_all(schema).await?;
    assert_eq!(applied, vec![1731540000, 1731540100, 1731540200]);

    let preferences = schema.find_by_name("preferences").await?.unwrap();
    assert_eq!(preferences.fields().len(), 2);

    assert_eq!(migrator.rollback_last(schema).await?, 1731540200);

    let preferences = schema.find_by_name("preferences").await?.unwrap();
    assert_eq!(preferences.fields(), &[user_id()]);
    assert!(!preferences.fields()[0].is_required());

    Ok(())
}

pub async fn test_round_trip<L: Ledger + Clone + 'static>(
    schema: &Schema,
    ledger: L,
) -> anyhow::Result<()> {
    let pristine = schema.catalog().await?;
    let mut snapshots = vec![pristine.clone()];
    let mut registered = Vec::new();

    for migration in all() {
        registered.push(migration);
        let applied = migrator(ledger.clone(), registered.clone())
            .apply_all(schema)
            .await?;
        assert_eq!(applied.len(), 1);
        snapshots.push(schema.catalog().await?);
    }

    let migrator = migrator(ledger, all());
    assert!(migrator.apply_all(schema).await?.is_empty());

    snapshots.pop();
    while let Some(expected) = snapshots.pop() {
        migrator.rollback_last(schema).await?;
        assert_eq!(schema.catalog().await?, expected);
    }

    assert_eq!(schema.catalog().await?, pristine);
    assert!(matches!(
        migrator.rollback_last(schema).await.unwrap_err(),
        MigratorError::NoAppliedMigrations
    ));

    Ok(())
}

pub async fn test_double_apply_fails(schema: &Schema) -> anyhow::Result<()> {
    created_users().up(schema).await?;
    created_preferences().up(schema).await?;
    updated_preferences().up(schema).await?;

    let err = created_preferences().up(schema).await.unwrap_err();
    assert!(matches!(
        err,
        MigratorError::Step {
            key: 1731540100,
            source: SchemaError::DuplicateCollection(_)
        }
    ));

    let err = updated_preferences().up(schema).await.unwrap_err();
    assert!(matches!(
        err,
        MigratorError::Step {
            key: 1731540200,
            source: SchemaError::DuplicateField { .. }
        }
    ));

    Ok(())
}

pub async fn test_failure_keeps_prefix<L: Ledger + 'static>(
    schema: &Schema,
    ledger: L,
) -> anyhow::Result<()> {
    let broken = Migration::new(1731540100, "broken_preferences")
        .create_collection(CollectionSchema::new(PREFERENCES, "preferences"))
        .add_field(
            PREFERENCES,
            FieldDefinition::relation("relation_team", "team", RelationOptions::new("pbc_teams"))?,
        );

    let migrator = migrator(ledger, vec![created_users(), broken, updated_preferences()]);

    let err = migrator.apply_all(schema).await.unwrap_err();
    assert!(matches!(
        err,
        MigratorError::Step {
            key: 1731540100,
            source: SchemaError::UnknownRelationTarget { .. }
        }
    ));

    let states = migrator
        .status()
        .await?
        .into_iter()
        .map(|status| (status.key, status.state))
        .collect::<Vec<_>>();
    assert_eq!(
        states,
        vec![
            (1731540000, MigrationState::Applied),
            (1731540100, MigrationState::Pending),
            (1731540200, MigrationState::Pending),
        ]
    );

    // the partially executed step was reverted
    assert_eq!(schema.find(PREFERENCES).await?, None);
    assert!(schema.find(USERS).await?.is_some());

    // re-running skips what is already applied and fails on the same step
    let err = migrator.apply_all(schema).await.unwrap_err();
    assert!(matches!(err, MigratorError::Step { key: 1731540100, .. }));

    Ok(())
}

pub async fn test_rollback_failure_keeps_record<L: Ledger + 'static>(
    schema: &Schema,
    ledger: L,
) -> anyhow::Result<()> {
    let migrator = migrator(ledger, vec![created_users(), created_preferences()]);
    migrator.apply_all(schema).await?;

    // drift outside of any migration
    schema.add_field(PREFERENCES, preferences_json()).await?;

    let err = migrator.rollback_last(schema).await.unwrap_err();
    assert!(matches!(
        err,
        MigratorError::SnapshotMismatch {
            key: 1731540100,
            ..
        }
    ));

    let status = migrator.status().await?;
    assert_eq!(status[1].state, MigrationState::Applied);
    assert!(status[1].applied_at.is_some());
    assert!(schema.find(PREFERENCES).await?.is_some());

    Ok(())
}

pub async fn test_ledger_must_be_prefix<L: Ledger + Clone + 'static>(
    schema: &Schema,
    ledger: L,
) -> anyhow::Result<()> {
    ledger
        .record(AppliedMigration::new(1731540100, "created_preferences"))
        .await?;

    let migrator = migrator(
        ledger.clone(),
        vec![created_users(), created_preferences()],
    );

    assert!(matches!(
        migrator.apply_all(schema).await.unwrap_err(),
        MigratorError::LedgerGap {
            applied: 1731540100,
            pending: 1731540000
        }
    ));
    assert!(schema.collections().await?.is_empty());

    ledger.remove(1731540100).await?;
    ledger
        .record(AppliedMigration::new(42, "unknown"))
        .await?;

    assert!(matches!(
        migrator.status().await.unwrap_err(),
        MigratorError::UnknownAppliedMigration(42)
    ));

    Ok(())
}

pub async fn test_multi_operation_step(schema: &Schema) -> anyhow::Result<()> {
    created_users().up(schema).await?;
    let pristine = schema.catalog().await?;

    let migration = Migration::new(1731540600, "profiles_and_presets")
        .create_collection(created_user_profiles_schema())
        .operation(Operation::CreateCollection(CollectionSchema::new(
            "pbc_presets",
            "presets",
        )))
        .add_field(
            "pbc_presets",
            FieldDefinition::json("json_content_types", "content_types", JsonOptions::default())?,
        );

    migration.up(schema).await?;
    assert_eq!(schema.collections().await?.len(), 3);

    migration.down(schema).await?;
    assert_eq!(schema.catalog().await?, pristine);

    Ok(())
}

fn created_user_profiles_schema() -> CollectionSchema {
    match &created_user_profiles().operations()[0] {
        Operation::CreateCollection(schema) => schema.clone(),
        operation => panic!("unexpected operation {operation:?}"),
    }
}

pub async fn test_remove_field_keeps_position(schema: &Schema) -> anyhow::Result<()> {
    created_users().up(schema).await?;
    created_preferences().up(schema).await?;
    updated_preferences().up(schema).await?;

    let before = schema.catalog().await?;

    // `userID` sits in front of `preferences`, the step captured a wrong slot
    let misplaced =
        Migration::new(1731540600, "removed_user_id").remove_field(PREFERENCES, user_id(), 1);

    assert!(matches!(
        misplaced.up(schema).await.unwrap_err(),
        MigratorError::SnapshotMismatch {
            key: 1731540600,
            ..
        }
    ));
    assert_eq!(schema.catalog().await?, before);

    let removed =
        Migration::new(1731540600, "removed_user_id").remove_field(PREFERENCES, user_id(), 0);

    removed.up(schema).await?;
    let preferences = schema.find(PREFERENCES).await?.unwrap();
    assert_eq!(preferences.fields(), &[preferences_json()]);

    removed.down(schema).await?;
    assert_eq!(schema.catalog().await?, before);

    Ok(())
}
