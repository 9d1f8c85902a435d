use hearth_schema::{
    FieldDefinition, Outcome, RelationOptions, Schema, SchemaError, TextOptions,
};

use crate::common::{display_name, init, preferences_json, users, PREFERENCES, PROFILES, USERS};

pub async fn test_duplicate_collection(schema: &Schema) -> anyhow::Result<()> {
    init(schema, true).await?;

    let err = schema
        .create_collection(USERS, "accounts", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateCollection(_)));

    let err = schema
        .create_collection("pbc_accounts", "users", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateCollection(_)));

    assert_eq!(schema.collections().await?.len(), 2);
    assert_eq!(schema.find(USERS).await?, Some(users()));

    Ok(())
}

pub async fn test_add_field_errors(schema: &Schema) -> anyhow::Result<()> {
    init(schema, true).await?;

    schema.add_field(PROFILES, display_name()).await?;

    let same_id = FieldDefinition::bool("text_display_name", "visible")?;
    assert!(matches!(
        schema.add_field(PROFILES, same_id).await.unwrap_err(),
        SchemaError::DuplicateField { .. }
    ));

    let same_name = FieldDefinition::bool("bool_display_name", "display_name")?;
    assert!(matches!(
        schema.add_field(PROFILES, same_name).await.unwrap_err(),
        SchemaError::DuplicateField { .. }
    ));

    let unknown_target =
        FieldDefinition::relation("relation_team", "team", RelationOptions::new("pbc_teams"))?;
    assert!(matches!(
        schema.add_field(PROFILES, unknown_target).await.unwrap_err(),
        SchemaError::UnknownRelationTarget { .. }
    ));

    assert!(matches!(
        schema
            .add_field(PREFERENCES, preferences_json())
            .await
            .unwrap_err(),
        SchemaError::CollectionNotFound(_)
    ));

    let profiles = schema.find(PROFILES).await?.unwrap();
    assert_eq!(profiles.fields().len(), 2);

    Ok(())
}

pub async fn test_remove_field_wrong_id(schema: &Schema) -> anyhow::Result<()> {
    init(schema, true).await?;

    schema.add_field(PROFILES, display_name()).await?;
    let before = schema.catalog().await?;

    let err = schema
        .remove_field(PROFILES, "text_missing")
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::FieldNotFound { .. }));
    assert_eq!(schema.catalog().await?, before);

    schema.remove_field(PROFILES, "text_display_name").await?;
    let err = schema
        .remove_field(PROFILES, "text_display_name")
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::FieldNotFound { .. }));

    Ok(())
}

pub async fn test_relation_constraint(schema: &Schema) -> anyhow::Result<()> {
    init(schema, false).await?;
    let before = schema.catalog().await?;

    let err = schema.delete_collection(USERS).await.unwrap_err();
    assert!(matches!(err, SchemaError::RelationConstraint { .. }));
    assert_eq!(schema.catalog().await?, before);

    assert!(matches!(
        schema.delete_collection("pbc_missing").await.unwrap_err(),
        SchemaError::CollectionNotFound(_)
    ));

    schema.delete_collection(PROFILES).await?;
    schema.delete_collection(USERS).await?;
    assert!(schema.collections().await?.is_empty());

    Ok(())
}

pub async fn test_cascade_delete(schema: &Schema) -> anyhow::Result<()> {
    init(schema, true).await?;

    let outcome = schema.delete_collection(USERS).await?;
    assert_eq!(
        outcome,
        Outcome::Deleted {
            id: USERS.to_owned(),
            cascaded: vec![(PROFILES.to_owned(), "relation_user".to_owned())],
        }
    );
    assert_eq!(schema.find_by_name("users").await?, None);
    assert_eq!(schema.catalog().await?.dangling_relations().len(), 1);

    schema.create_collection(USERS, "users", users().fields().to_vec()).await?;
    assert!(schema.catalog().await?.dangling_relations().is_empty());

    Ok(())
}

pub async fn test_field_position(schema: &Schema) -> anyhow::Result<()> {
    init(schema, true).await?;

    schema.add_field(PROFILES, display_name()).await?;
    schema
        .add_field(
            PROFILES,
            FieldDefinition::text("text_bio", "bio", TextOptions::default().max(500))?,
        )
        .await?;
    let before = schema.catalog().await?;

    schema.remove_field(PROFILES, "text_display_name").await?;
    schema.add_field_at(PROFILES, display_name(), 1).await?;

    assert_eq!(schema.catalog().await?, before);

    Ok(())
}
