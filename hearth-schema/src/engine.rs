use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{
    catalog::{Catalog, Change, Outcome},
    error::Result,
};

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "pg")]
mod pg;

#[cfg(feature = "memory")]
pub use memory::*;
#[cfg(feature = "pg")]
pub use pg::*;

/// Persistent schema service. Each call succeeds or fails atomically.
#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    async fn apply(&self, change: Change) -> Result<Outcome>;

    async fn catalog(&self) -> Result<Catalog>;
}

dyn_clone::clone_trait_object!(Engine);
