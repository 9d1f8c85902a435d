//! Profile and preference backend of the hearth application.
//!
//! Collections are declared as migrations in [`migrations`] and applied with
//! [`hearth_migrator`] against a [`hearth_schema`] store. Records are read and
//! written through [`Client`], a thin client of the hosted collections REST
//! API, and the [`ProfileService`] built on it.
//!
//! ```rust,ignore
//! let config = hearth::HearthConfig::from_env()?;
//! hearth::logging::init(&config.log_filter)?;
//!
//! let service = hearth::ProfileService::new(hearth::Client::from_config(&config));
//! service.login("jane@example.com", "correct horse battery")?;
//! let presets = service.list_presets(1, 20)?;
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod record;
mod service;
mod session;

pub mod logging;
pub mod migrations;

pub use client::*;
pub use config::*;
pub use error::*;
pub use record::*;
pub use service::*;
pub use session::*;

pub use hearth_migrator as migrator;
pub use hearth_schema as schema;
