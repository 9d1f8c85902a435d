use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    catalog::{Catalog, Change, Outcome},
    engine::Engine,
    error::Result,
    schema::Schema,
};

#[derive(Debug, Clone, Default)]
pub struct MemorySchema(Arc<RwLock<Catalog>>);

impl MemorySchema {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Schema {
        Schema::new(Self::default())
    }

    pub fn with_catalog(catalog: Catalog) -> Schema {
        Schema::new(Self(Arc::new(RwLock::new(catalog))))
    }
}

#[async_trait]
impl Engine for MemorySchema {
    async fn apply(&self, change: Change) -> Result<Outcome> {
        self.0.write().apply(change)
    }

    async fn catalog(&self) -> Result<Catalog> {
        Ok(self.0.read().clone())
    }
}
