//! CLI module
//!
//! Command-line driver over the library: loads entries from a file, runs one
//! request through a `PaginationEngine`, prints the response as JSON.
//!
//! # Commands
//!
//! - `page` - Fetch one page of entries (optionally prefetching the next)
//! - `config` - Print the effective pagination config

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PageArgs};
pub use runner::Runner;
