use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl TextOptions {
    pub fn min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JsonOptions {
    /// Maximum serialized size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

impl JsonOptions {
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationOptions {
    pub collection_id: String,
    #[serde(default)]
    pub cascade_delete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_select: Option<u32>,
}

impl RelationOptions {
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            cascade_delete: false,
            max_select: None,
        }
    }

    pub fn cascade_delete(mut self, cascade_delete: bool) -> Self {
        self.cascade_delete = cascade_delete;
        self
    }

    pub fn max_select(mut self, max_select: u32) -> Self {
        self.max_select = Some(max_select);
        self
    }
}

/// Field type together with the only constraints that type accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum FieldKind {
    Text(TextOptions),
    Bool,
    Json(JsonOptions),
    Relation(RelationOptions),
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::Bool => "bool",
            FieldKind::Json(_) => "json",
            FieldKind::Relation(_) => "relation",
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        let invalid = |reason: String| SchemaError::InvalidFieldOptions {
            field: field.to_owned(),
            reason,
        };

        match self {
            FieldKind::Text(options) => {
                if let (Some(min), Some(max)) = (options.min, options.max) {
                    if min > max {
                        return Err(invalid(format!("min {min} is greater than max {max}")));
                    }
                }

                if let Some(pattern) = &options.pattern {
                    Regex::new(pattern).map_err(|e| invalid(format!("pattern: {e}")))?;
                }
            }
            FieldKind::Bool => {}
            FieldKind::Json(options) => {
                if options.max_size == Some(0) {
                    return Err(invalid("max size must be positive".to_owned()));
                }
            }
            FieldKind::Relation(options) => {
                if options.collection_id.is_empty() {
                    return Err(invalid("relation target is empty".to_owned()));
                }

                if options.max_select == Some(0) {
                    return Err(invalid("max select must be positive".to_owned()));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    id: String,
    name: String,
    #[serde(default)]
    required: bool,
    kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Result<Self> {
        let field = Self {
            id: id.into(),
            name: name.into(),
            required: false,
            kind,
        };

        field.validate()?;

        Ok(field)
    }

    pub fn text(id: impl Into<String>, name: impl Into<String>, options: TextOptions) -> Result<Self> {
        Self::new(id, name, FieldKind::Text(options))
    }

    pub fn bool(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(id, name, FieldKind::Bool)
    }

    pub fn json(id: impl Into<String>, name: impl Into<String>, options: JsonOptions) -> Result<Self> {
        Self::new(id, name, FieldKind::Json(options))
    }

    pub fn relation(
        id: impl Into<String>,
        name: impl Into<String>,
        options: RelationOptions,
    ) -> Result<Self> {
        Self::new(id, name, FieldKind::Relation(options))
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn as_relation(&self) -> Option<&RelationOptions> {
        match &self.kind {
            FieldKind::Relation(options) => Some(options),
            _ => None,
        }
    }

    /// Checks identifiers and type options. Definitions coming from storage
    /// skip the constructors, so the catalog calls this again on every write.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::InvalidIdentifier(self.id.to_owned()));
        }

        if self.name.trim().is_empty() {
            return Err(SchemaError::InvalidIdentifier(self.name.to_owned()));
        }

        self.kind.validate(&self.name)
    }
}
