use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, PgPool, Postgres, Transaction};

use crate::{
    catalog::{Catalog, Change, Outcome},
    collection::CollectionSchema,
    engine::Engine,
    error::Result,
    field::FieldDefinition,
    schema::Schema,
};

#[derive(Debug, Clone)]
pub struct PgSchema {
    pool: PgPool,
    prefix: Option<String>,
}

impl PgSchema {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(pool: &PgPool) -> Schema {
        Schema::new(Self {
            pool: pool.clone(),
            prefix: None,
        })
    }

    pub fn with_prefix(pool: &PgPool, prefix: impl Into<String>) -> Schema {
        Schema::new(Self {
            pool: pool.clone(),
            prefix: Some(prefix.into()),
        })
    }

    pub fn table(&self, name: impl Into<String>) -> String {
        format!(
            "{}_{}",
            self.prefix.as_deref().unwrap_or("hearth"),
            name.into()
        )
    }

    pub fn table_collections(&self) -> String {
        self.table("collection")
    }

    async fn load(&self, tx: &mut Transaction<'_, Postgres>) -> Result<Catalog> {
        let table = self.table_collections();
        let rows = sqlx::query_as::<_, CollectionRow>(
            format!("SELECT id, name, fields FROM {table}").as_str(),
        )
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(CollectionRow::into_schema).collect())
    }
}

#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: String,
    name: String,
    fields: Json<Vec<FieldDefinition>>,
}

impl CollectionRow {
    fn into_schema(self) -> CollectionSchema {
        CollectionSchema::new(self.id, self.name).fields_from(self.fields.0)
    }
}

#[async_trait]
impl Engine for PgSchema {
    async fn apply(&self, change: Change) -> Result<Outcome> {
        let table = self.table_collections();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&table)
            .execute(&mut *tx)
            .await?;

        let mut catalog = self.load(&mut tx).await?;

        let outcome = match catalog.apply(change) {
            Ok(outcome) => outcome,
            Err(e) => {
                tx.rollback().await?;

                return Err(e);
            }
        };

        match &outcome {
            Outcome::Created(schema) | Outcome::Updated(schema) => {
                sqlx::query(
                    format!(
                        r#"
                        INSERT INTO {table} (id, name, fields, updated_at)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (id) DO UPDATE
                        SET name = EXCLUDED.name, fields = EXCLUDED.fields, updated_at = EXCLUDED.updated_at
                        "#
                    )
                    .as_str(),
                )
                .bind(schema.id())
                .bind(schema.name())
                .bind(Json(schema.fields().to_vec()))
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            }
            Outcome::Deleted { id, .. } => {
                sqlx::query(format!("DELETE FROM {table} WHERE id = $1").as_str())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(outcome)
    }

    async fn catalog(&self) -> Result<Catalog> {
        let mut tx = self.pool.begin().await?;
        let catalog = self.load(&mut tx).await?;
        tx.commit().await?;

        Ok(catalog)
    }
}
