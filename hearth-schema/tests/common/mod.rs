use hearth_schema::{
    CollectionSchema, FieldDefinition, JsonOptions, RelationOptions, Schema, TextOptions,
};

pub const USERS: &str = "_pb_users_auth_";
pub const PROFILES: &str = "pbc_user_profiles";
pub const PREFERENCES: &str = "pbc_preferences";

pub fn users() -> CollectionSchema {
    CollectionSchema::new(USERS, "users").field(
        FieldDefinition::text("text_email", "email", TextOptions::default().max(255))
            .unwrap()
            .required(true),
    )
}

pub fn user_profiles(cascade_delete: bool) -> CollectionSchema {
    CollectionSchema::new(PROFILES, "user_profiles").field(
        FieldDefinition::relation(
            "relation_user",
            "user",
            RelationOptions::new(USERS)
                .cascade_delete(cascade_delete)
                .max_select(1),
        )
        .unwrap()
        .required(true),
    )
}

pub fn display_name() -> FieldDefinition {
    FieldDefinition::text("text_display_name", "display_name", TextOptions::default().max(100))
        .unwrap()
        .required(true)
}

pub fn preferences_json() -> FieldDefinition {
    FieldDefinition::json("json_preferences", "preferences", JsonOptions::default()).unwrap()
}

pub async fn init(schema: &Schema, cascade_delete: bool) -> anyhow::Result<()> {
    schema.apply(hearth_schema::Change::CreateCollection(users())).await?;
    schema
        .apply(hearth_schema::Change::CreateCollection(user_profiles(
            cascade_delete,
        )))
        .await?;

    Ok(())
}
