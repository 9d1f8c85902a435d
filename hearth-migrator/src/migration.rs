use hearth_schema::{CollectionSchema, FieldDefinition, Schema};

use crate::{
    error::{MigratorError, Result},
    operation::Operation,
};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// A registered, append-only migration step ordered by `key`.
#[derive(Debug, Clone)]
pub struct Migration {
    key: u64,
    name: String,
    operations: Vec<Operation>,
}

impl Migration {
    pub fn new(key: u64, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn create_collection(self, schema: CollectionSchema) -> Self {
        self.operation(Operation::CreateCollection(schema))
    }

    pub fn add_field(self, collection_id: impl Into<String>, field: FieldDefinition) -> Self {
        self.operation(Operation::AddField {
            collection_id: collection_id.into(),
            field,
        })
    }

    pub fn remove_field(
        self,
        collection_id: impl Into<String>,
        field: FieldDefinition,
        index: usize,
    ) -> Self {
        self.operation(Operation::RemoveField {
            collection_id: collection_id.into(),
            field,
            index,
        })
    }

    pub fn delete_collection(self, schema: CollectionSchema) -> Self {
        self.operation(Operation::DeleteCollection(schema))
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Runs every operation in order. If one fails, the operations already
    /// executed by this call are reverted before the error is returned. A
    /// revert that fails too surfaces as [`MigratorError::Compensation`].
    pub async fn up(&self, schema: &Schema) -> Result<()> {
        for (done, operation) in self.operations.iter().enumerate() {
            if let Err(e) = self.execute(schema, operation, Direction::Up).await {
                let reverted = self
                    .compensate(schema, self.operations[..done].iter().rev(), Direction::Down)
                    .await;

                return Err(self.with_revert(e, reverted));
            }
        }

        Ok(())
    }

    /// Exact inverse of [`Migration::up`].
    pub async fn down(&self, schema: &Schema) -> Result<()> {
        for (done, operation) in self.operations.iter().rev().enumerate() {
            if let Err(e) = self.execute(schema, operation, Direction::Down).await {
                let undone = self.operations.len() - done;
                let reapplied = self
                    .compensate(schema, self.operations[undone..].iter(), Direction::Up)
                    .await;

                return Err(self.with_revert(e, reapplied));
            }
        }

        Ok(())
    }

    async fn execute(&self, schema: &Schema, operation: &Operation, direction: Direction) -> Result<()> {
        let (change, snapshot) = match direction {
            Direction::Up => (operation.up(), operation.snapshot_before_up()),
            Direction::Down => (operation.down(), operation.snapshot_before_down()),
        };

        if let Some(snapshot) = snapshot {
            let catalog = schema.catalog().await.map_err(|source| self.failed(source))?;

            if snapshot.matches(&catalog) == Some(false) {
                return Err(MigratorError::SnapshotMismatch {
                    key: self.key,
                    target: snapshot.target(),
                });
            }
        }

        schema
            .apply(change)
            .await
            .map_err(|source| self.failed(source))?;

        Ok(())
    }

    /// Best effort: every operation is tried, the first failure is returned.
    async fn compensate<'a>(
        &self,
        schema: &Schema,
        operations: impl Iterator<Item = &'a Operation>,
        direction: Direction,
    ) -> Result<()> {
        let mut first = None;

        for operation in operations {
            let change = match direction {
                Direction::Up => operation.up(),
                Direction::Down => operation.down(),
            };

            if let Err(e) = schema.apply(change).await {
                tracing::error!(
                    key = self.key,
                    name = %self.name,
                    error = %e,
                    "failed to revert partially executed migration"
                );

                if first.is_none() {
                    first = Some(e);
                }
            }
        }

        match first {
            Some(source) => Err(self.failed(source)),
            _ => Ok(()),
        }
    }

    fn with_revert(&self, error: MigratorError, reverted: Result<()>) -> MigratorError {
        match reverted {
            Ok(()) => error,
            Err(revert) => MigratorError::Compensation {
                key: self.key,
                source: Box::new(error),
                revert: Box::new(revert),
            },
        }
    }

    fn failed(&self, source: hearth_schema::SchemaError) -> MigratorError {
        MigratorError::Step {
            key: self.key,
            source,
        }
    }
}
