//! Reversible schema migrations for hearth collections.
//!
//! A [`Migration`] is a value object: a key (the creation timestamp of the
//! step), a name, and a list of [`Operation`]s. Each operation knows its
//! inverse, so every migration can be rolled back exactly.
//!
//! The [`Migrator`] owns the list of registered migrations and a [`Ledger`]
//! recording which of them ran against the target environment. Applied
//! migrations always form a prefix of the registered list when sorted by key.
//!
//! # Features
//!
//! - **`memory`** (default) - in-memory [`MemoryLedger`], paired with
//!   `hearth_schema::MemorySchema`
//! - **`pg`** - PostgreSQL [`PgLedger`], paired with `hearth_schema::PgSchema`
//!
//! # Usage
//!
//! ```rust,ignore
//! use hearth_migrator::{MemoryLedger, Migration, Migrator};
//! use hearth_schema::{CollectionSchema, FieldDefinition, JsonOptions, MemorySchema};
//!
//! let schema = MemorySchema::new();
//! let mut migrator = Migrator::new(MemoryLedger::new());
//!
//! migrator.add_migration(
//!     Migration::new(1731540100, "created_preferences")
//!         .create_collection(CollectionSchema::new("pbc_preferences", "preferences")),
//! )?;
//!
//! migrator.apply_all(&schema).await?;
//! migrator.rollback_last(&schema).await?;
//! ```
//!
//! # Operations
//!
//! | up | down |
//! |----|------|
//! | create collection | delete collection |
//! | add field | remove field by id |
//! | remove field | re-add the captured definition at its index |
//! | delete collection | re-create the captured schema |
//!
//! Destructive operations compare the live definition with their snapshot
//! before running and fail with [`MigratorError::SnapshotMismatch`] when they
//! differ.
//!
//! # Concurrency
//!
//! Steps run strictly one after another. Nothing here locks across
//! processes: deployments must serialize migration runs themselves.

#![forbid(unsafe_code)]

mod error;
mod ledger;
mod migration;
mod migrator;
mod operation;
mod state;

pub use error::*;
pub use ledger::*;
pub use migration::*;
pub use migrator::*;
pub use operation::*;
pub use state::MigrationState;
