use hearth_migrator::Migration;
use hearth_schema::{CollectionSchema, FieldDefinition, RelationOptions, SchemaError};

use super::{USERS_ID, USER_PROFILES, USER_PROFILES_ID};

pub fn migration() -> Result<Migration, SchemaError> {
    let profiles = CollectionSchema::new(USER_PROFILES_ID, USER_PROFILES).field(
        FieldDefinition::relation(
            "relation2375276105",
            "user",
            RelationOptions::new(USERS_ID)
                .cascade_delete(true)
                .max_select(1),
        )?
        .required(true),
    );

    Ok(Migration::new(1731540300, "created_user_profiles").create_collection(profiles))
}
