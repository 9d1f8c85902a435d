#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("collection `{0}` already exists")]
    DuplicateCollection(String),

    #[error("field `{field}` already exists on collection `{collection}`")]
    DuplicateField { collection: String, field: String },

    #[error("invalid options for field `{field}`: {reason}")]
    InvalidFieldOptions { field: String, reason: String },

    #[error("relation field `{field}` targets unknown collection `{target}`")]
    UnknownRelationTarget { field: String, target: String },

    #[error("field `{field}` not found on collection `{collection}`")]
    FieldNotFound { collection: String, field: String },

    #[error("collection `{0}` not found")]
    CollectionNotFound(String),

    #[error("collection `{target}` is referenced by `{collection}.{field}` without cascade delete")]
    RelationConstraint {
        collection: String,
        field: String,
        target: String,
    },

    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    #[cfg(feature = "pg")]
    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
