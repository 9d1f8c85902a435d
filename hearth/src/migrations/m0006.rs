use hearth_migrator::Migration;
use hearth_schema::{CollectionSchema, FieldDefinition, JsonOptions, SchemaError, TextOptions};

use super::{PRESETS, PRESETS_ID};

pub fn migration() -> Result<Migration, SchemaError> {
    let presets = CollectionSchema::new(PRESETS_ID, PRESETS)
        .field(
            FieldDefinition::text("text1579384328", "name", TextOptions::default().max(100))?
                .required(true),
        )
        .field(FieldDefinition::text(
            "text1843675174",
            "description",
            TextOptions::default().max(500),
        )?)
        .field(FieldDefinition::json(
            "json1874629671",
            "content_types",
            JsonOptions::default(),
        )?);

    Ok(Migration::new(1731540500, "created_presets").create_collection(presets))
}
