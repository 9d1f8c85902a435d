use hearth_migrator::Migration;
use hearth_schema::{FieldDefinition, JsonOptions, SchemaError};

use super::PREFERENCES_ID;

pub fn migration() -> Result<Migration, SchemaError> {
    Ok(Migration::new(1731540200, "updated_preferences").add_field(
        PREFERENCES_ID,
        FieldDefinition::json("json3132869180", "preferences", JsonOptions::default())?,
    ))
}
