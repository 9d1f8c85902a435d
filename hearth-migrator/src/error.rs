use hearth_schema::SchemaError;

use crate::state::MigrationState;

#[derive(Debug, thiserror::Error)]
pub enum MigratorError {
    #[error("no applied migrations")]
    NoAppliedMigrations,

    #[error("migration {key} failed: {source}")]
    Step { key: u64, source: SchemaError },

    /// The step failed and undoing its partial effect failed too, so the
    /// schema store holds changes the ledger does not record.
    #[error("migration {key} failed: {source}; reverting it failed as well, schema store left partially migrated: {revert}")]
    Compensation {
        key: u64,
        source: Box<MigratorError>,
        revert: Box<MigratorError>,
    },

    #[error("migration {key}: live definition of `{target}` differs from its snapshot")]
    SnapshotMismatch { key: u64, target: String },

    #[error("migration {0} is registered twice")]
    DuplicateMigration(u64),

    #[error("applied migration {0} is not registered")]
    UnknownAppliedMigration(u64),

    #[error("migration {applied} is applied while {pending} is not")]
    LedgerGap { applied: u64, pending: u64 },

    #[error("migration {0} is already recorded as applied")]
    AlreadyRecorded(u64),

    #[error("migration {0} is not recorded as applied")]
    NotRecorded(u64),

    #[error("migration {key} cannot go from {from} to {to}")]
    InvalidTransition {
        key: u64,
        from: MigrationState,
        to: MigrationState,
    },

    #[error("schema `{0}`")]
    Schema(#[from] SchemaError),

    #[cfg(feature = "pg")]
    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),

    #[error("std::num `{0}`")]
    TryFromInt(#[from] std::num::TryFromIntError),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MigratorError>;
