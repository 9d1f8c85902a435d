#![forbid(unsafe_code)]

mod catalog;
mod collection;
mod engine;
mod error;
mod field;
mod schema;

pub use catalog::*;
pub use collection::*;
pub use engine::*;
pub use error::*;
pub use field::*;
pub use schema::*;
