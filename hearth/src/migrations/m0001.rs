use hearth_migrator::Migration;
use hearth_schema::{CollectionSchema, FieldDefinition, SchemaError, TextOptions};

use super::{USERS, USERS_ID};

pub fn migration() -> Result<Migration, SchemaError> {
    let users = CollectionSchema::new(USERS_ID, USERS)
        .field(
            FieldDefinition::text("email3885137012", "email", TextOptions::default().max(255))?
                .required(true),
        )
        .field(FieldDefinition::text(
            "text1579384326",
            "name",
            TextOptions::default().max(255),
        )?);

    Ok(Migration::new(1731540000, "created_users").create_collection(users))
}
