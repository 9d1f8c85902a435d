use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "pg")]
mod pg;

#[cfg(feature = "memory")]
pub use memory::*;
#[cfg(feature = "pg")]
pub use pg::*;

/// Durable marker that a migration ran against this environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub key: u64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

impl AppliedMigration {
    pub fn new(key: u64, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            applied_at: Utc::now(),
        }
    }
}

/// Store of applied migration records, keyed by migration key.
#[async_trait]
pub trait Ledger: DynClone + Send + Sync {
    /// Every record, ascending by key.
    async fn applied(&self) -> Result<Vec<AppliedMigration>>;

    async fn record(&self, migration: AppliedMigration) -> Result<()>;

    async fn remove(&self, key: u64) -> Result<()>;
}

dyn_clone::clone_trait_object!(Ledger);
