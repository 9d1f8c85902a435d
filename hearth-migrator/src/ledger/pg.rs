use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::{MigratorError, Result},
    ledger::{AppliedMigration, Ledger},
};

#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
    prefix: Option<String>,
}

impl PgLedger {
    pub fn new(pool: &PgPool) -> Self {
        Self {
            pool: pool.clone(),
            prefix: None,
        }
    }

    pub fn with_prefix(pool: &PgPool, prefix: impl Into<String>) -> Self {
        Self {
            pool: pool.clone(),
            prefix: Some(prefix.into()),
        }
    }

    pub fn table(&self, name: impl Into<String>) -> String {
        format!(
            "{}_{}",
            self.prefix.as_deref().unwrap_or("hearth"),
            name.into()
        )
    }

    pub fn table_migrations(&self) -> String {
        self.table("migration")
    }
}

#[derive(sqlx::FromRow)]
struct MigrationRow {
    key: i64,
    name: String,
    applied_at: DateTime<Utc>,
}

impl TryFrom<MigrationRow> for AppliedMigration {
    type Error = MigratorError;

    fn try_from(row: MigrationRow) -> Result<Self> {
        Ok(Self {
            key: u64::try_from(row.key)?,
            name: row.name,
            applied_at: row.applied_at,
        })
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn applied(&self) -> Result<Vec<AppliedMigration>> {
        let table = self.table_migrations();
        let rows = sqlx::query_as::<_, MigrationRow>(
            format!("SELECT key, name, applied_at FROM {table} ORDER BY key ASC").as_str(),
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AppliedMigration::try_from).collect()
    }

    async fn record(&self, migration: AppliedMigration) -> Result<()> {
        let table = self.table_migrations();
        let result = sqlx::query(
            format!(
                "INSERT INTO {table} (key, name, applied_at) VALUES ($1, $2, $3) ON CONFLICT (key) DO NOTHING"
            )
            .as_str(),
        )
        .bind(i64::try_from(migration.key)?)
        .bind(&migration.name)
        .bind(migration.applied_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(MigratorError::AlreadyRecorded(migration.key));
        }

        Ok(())
    }

    async fn remove(&self, key: u64) -> Result<()> {
        let table = self.table_migrations();
        let result = sqlx::query(format!("DELETE FROM {table} WHERE key = $1").as_str())
            .bind(i64::try_from(key)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MigratorError::NotRecorded(key));
        }

        Ok(())
    }
}
