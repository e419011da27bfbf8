//! Record source module
//!
//! The append-only store the engine paginates over.
//!
//! # Overview
//!
//! The source module provides:
//! - `Entry` - One immutable audit record (`id`, `timestamp`, free-form fields)
//! - `RecordSource` - The single call the engine needs from the store
//! - `MemorySource` - In-process append-only source
//! - `JsonFileSource` - Source backed by a JSON array or JSON Lines file

mod sources;
mod types;

pub use sources::{JsonFileSource, MemorySource};
pub use types::{Entry, RecordSource};
