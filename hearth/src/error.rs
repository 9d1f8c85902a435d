#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input `{0}`")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("not authenticated")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    #[error("backend responded {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("transport `{0}`")]
    Transport(String),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("config `{0}`")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("session `{0}`")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
