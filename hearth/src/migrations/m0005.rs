use hearth_migrator::Migration;
use hearth_schema::{FieldDefinition, JsonOptions, SchemaError, TextOptions};

use super::USER_PROFILES_ID;

pub fn migration() -> Result<Migration, SchemaError> {
    Ok(Migration::new(1731540400, "updated_user_profiles")
        .add_field(
            USER_PROFILES_ID,
            FieldDefinition::text(
                "text1579384327",
                "display_name",
                TextOptions::default().max(100),
            )?
            .required(true),
        )
        .add_field(
            USER_PROFILES_ID,
            FieldDefinition::text("text3709889147", "bio", TextOptions::default().max(500))?,
        )
        .add_field(
            USER_PROFILES_ID,
            FieldDefinition::bool("bool2410561322", "onboarding_completed")?,
        )
        .add_field(
            USER_PROFILES_ID,
            FieldDefinition::json("json1874629670", "content_types", JsonOptions::default())?,
        )
        .add_field(
            USER_PROFILES_ID,
            FieldDefinition::json("json3132869181", "preferences", JsonOptions::default())?,
        ))
}
