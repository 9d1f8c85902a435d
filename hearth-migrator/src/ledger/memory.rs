use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::{MigratorError, Result},
    ledger::{AppliedMigration, Ledger},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger(Arc<RwLock<BTreeMap<u64, AppliedMigration>>>);

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn applied(&self) -> Result<Vec<AppliedMigration>> {
        Ok(self.0.read().values().cloned().collect())
    }

    async fn record(&self, migration: AppliedMigration) -> Result<()> {
        let mut records = self.0.write();

        if records.contains_key(&migration.key) {
            return Err(MigratorError::AlreadyRecorded(migration.key));
        }

        records.insert(migration.key, migration);

        Ok(())
    }

    async fn remove(&self, key: u64) -> Result<()> {
        match self.0.write().remove(&key) {
            Some(_) => Ok(()),
            _ => Err(MigratorError::NotRecorded(key)),
        }
    }
}
