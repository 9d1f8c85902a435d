use chrono::{DateTime, Utc};
use hearth_schema::Schema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::{
    error::{MigratorError, Result},
    ledger::{AppliedMigration, Ledger},
    migration::Migration,
    state::{MigrationState, Tracker},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub key: u64,
    pub name: String,
    pub state: MigrationState,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Applies registered migrations in key order and rolls them back tail
/// first. Only one migrator may run against a given schema store at a time.
#[derive(Clone)]
pub struct Migrator {
    migrations: Vec<Migration>,
    ledger: Box<dyn Ledger>,
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

impl Migrator {
    pub fn new<L: Ledger + 'static>(ledger: L) -> Self {
        Self {
            migrations: Vec::new(),
            ledger: Box::new(ledger),
        }
    }

    pub fn add_migration(&mut self, migration: Migration) -> Result<&mut Self> {
        let at = self
            .migrations
            .partition_point(|registered| registered.key() < migration.key());

        if self
            .migrations
            .get(at)
            .is_some_and(|registered| registered.key() == migration.key())
        {
            return Err(MigratorError::DuplicateMigration(migration.key()));
        }

        self.migrations.insert(at, migration);

        Ok(self)
    }

    /// Registered migrations, ascending by key.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// State as recorded in the ledger: `Applied` or `Pending`. The
    /// transient `Applying` and `RollingBack` states only exist inside a
    /// running `apply_all` or `rollback_last` call and are never reported.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        let applied = self.applied().await?;

        Ok(self
            .migrations
            .iter()
            .map(|migration| {
                let record = applied.get(&migration.key());

                MigrationStatus {
                    key: migration.key(),
                    name: migration.name().to_owned(),
                    state: match record {
                        Some(_) => MigrationState::Applied,
                        _ => MigrationState::Pending,
                    },
                    applied_at: record.map(|record| record.applied_at),
                }
            })
            .collect())
    }

    /// Runs every pending migration in order and returns the keys applied by
    /// this call. Stops at the first failure; earlier steps stay applied.
    pub async fn apply_all(&self, schema: &Schema) -> Result<Vec<u64>> {
        let applied = self.applied().await?;
        let mut tracker = self.tracker(&applied);
        let mut keys = Vec::new();

        for migration in self
            .migrations
            .iter()
            .filter(|migration| !applied.contains_key(&migration.key()))
        {
            let key = migration.key();
            tracker.transition(key, MigrationState::Applying)?;
            info!(key, name = migration.name(), "applying migration");

            if let Err(e) = migration.up(schema).await {
                tracker.transition(key, MigrationState::Pending)?;
                error!(key, name = migration.name(), error = %e, "migration failed");

                return Err(e);
            }

            if let Err(e) = self
                .ledger
                .record(AppliedMigration::new(key, migration.name()))
                .await
            {
                error!(key, error = %e, "failed to record migration, reverting it");

                let reverted = migration.down(schema).await;
                tracker.transition(key, MigrationState::Pending)?;

                if let Err(revert) = reverted {
                    error!(key, error = %revert, "failed to revert unrecorded migration");

                    return Err(MigratorError::Compensation {
                        key,
                        source: Box::new(e),
                        revert: Box::new(revert),
                    });
                }

                return Err(e);
            }

            tracker.transition(key, MigrationState::Applied)?;
            keys.push(key);
        }

        if keys.is_empty() {
            info!("no pending migrations");
        }

        Ok(keys)
    }

    /// Reverts the most recently applied migration and returns its key.
    pub async fn rollback_last(&self, schema: &Schema) -> Result<u64> {
        let applied = self.applied().await?;
        let mut tracker = self.tracker(&applied);

        let Some(&key) = applied.keys().next_back() else {
            return Err(MigratorError::NoAppliedMigrations);
        };

        let Some(migration) = self.find(key) else {
            return Err(MigratorError::UnknownAppliedMigration(key));
        };

        tracker.transition(key, MigrationState::RollingBack)?;
        info!(key, name = migration.name(), "rolling back migration");

        if let Err(e) = migration.down(schema).await {
            tracker.transition(key, MigrationState::Applied)?;
            error!(key, name = migration.name(), error = %e, "rollback failed");

            return Err(e);
        }

        if let Err(e) = self.ledger.remove(key).await {
            error!(key, error = %e, "failed to remove migration record, re-applying it");

            let reapplied = migration.up(schema).await;
            tracker.transition(key, MigrationState::Applied)?;

            if let Err(reapply) = reapplied {
                error!(key, error = %reapply, "failed to re-apply migration");

                return Err(MigratorError::Compensation {
                    key,
                    source: Box::new(e),
                    revert: Box::new(reapply),
                });
            }

            return Err(e);
        }

        tracker.transition(key, MigrationState::Pending)?;

        Ok(key)
    }

    /// Rolls back up to `steps` migrations, newest first.
    pub async fn rollback(&self, schema: &Schema, steps: usize) -> Result<Vec<u64>> {
        let mut keys = Vec::new();

        for _ in 0..steps {
            match self.rollback_last(schema).await {
                Ok(key) => keys.push(key),
                Err(MigratorError::NoAppliedMigrations) if !keys.is_empty() => {
                    warn!(requested = steps, rolled_back = keys.len(), "nothing left to roll back");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(keys)
    }

    fn find(&self, key: u64) -> Option<&Migration> {
        self.migrations
            .binary_search_by_key(&key, Migration::key)
            .ok()
            .map(|index| &self.migrations[index])
    }

    fn tracker(&self, applied: &BTreeMap<u64, AppliedMigration>) -> Tracker {
        Tracker::new(self.migrations.iter().map(|migration| {
            let state = if applied.contains_key(&migration.key()) {
                MigrationState::Applied
            } else {
                MigrationState::Pending
            };

            (migration.key(), state)
        }))
    }

    /// Loads the ledger and checks it is a prefix of the registered
    /// migrations.
    async fn applied(&self) -> Result<BTreeMap<u64, AppliedMigration>> {
        let applied = self
            .ledger
            .applied()
            .await?
            .into_iter()
            .map(|record| (record.key, record))
            .collect::<BTreeMap<_, _>>();

        if let Some(&key) = applied.keys().find(|key| self.find(**key).is_none()) {
            return Err(MigratorError::UnknownAppliedMigration(key));
        }

        let mut pending = None;

        for migration in self.migrations.iter() {
            match (applied.contains_key(&migration.key()), pending) {
                (false, None) => pending = Some(migration.key()),
                (true, Some(pending)) => {
                    return Err(MigratorError::LedgerGap {
                        applied: migration.key(),
                        pending,
                    })
                }
                _ => {}
            }
        }

        Ok(applied)
    }
}
