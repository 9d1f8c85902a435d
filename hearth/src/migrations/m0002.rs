use hearth_migrator::Migration;
use hearth_schema::{CollectionSchema, FieldDefinition, RelationOptions, SchemaError};

use super::{PREFERENCES, PREFERENCES_ID, USERS_ID};

pub fn migration() -> Result<Migration, SchemaError> {
    let preferences = CollectionSchema::new(PREFERENCES_ID, PREFERENCES).field(
        FieldDefinition::relation(
            "relation2809058197",
            "userID",
            RelationOptions::new(USERS_ID).max_select(1),
        )?,
    );

    Ok(Migration::new(1731540100, "created_preferences").create_collection(preferences))
}
