//! CLI commands and argument parsing

use crate::pagination::PaginationRequest;
use crate::types::{Direction, JsonValue, SortDirection, Strategy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Trailpager CLI
#[derive(Parser, Debug)]
#[command(name = "trailpager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pagination config file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one page of entries
    Page(PageArgs),

    /// Show the effective pagination config
    Config,
}

/// Arguments of the `page` command
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Entries file (JSON array or JSON Lines)
    #[arg(short, long)]
    pub entries: PathBuf,

    /// Pagination strategy (overrides the config)
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Page number (offset strategy)
    #[arg(long)]
    pub page: Option<usize>,

    /// Page size
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Explicit offset (offset strategy)
    #[arg(long)]
    pub offset: Option<usize>,

    /// Entries to take from the offset
    #[arg(long)]
    pub limit: Option<usize>,

    /// Continuation token (cursor strategy)
    #[arg(long)]
    pub cursor: Option<String>,

    /// RFC 3339 or epoch-millisecond anchor (time strategy)
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Entry id anchor (id strategy)
    #[arg(long)]
    pub id: Option<String>,

    /// Direction of travel from the anchor
    #[arg(long, value_enum, default_value = "forward")]
    pub direction: Direction,

    /// Sort field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort order
    #[arg(long, value_enum)]
    pub sort_direction: Option<SortDirection>,

    /// Filter as key=value (repeatable; JSON values are parsed)
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, JsonValue)>,

    /// Include response metadata
    #[arg(long)]
    pub metadata: bool,

    /// Also prefetch the next page
    #[arg(long)]
    pub prefetch: bool,
}

impl PageArgs {
    /// Build the pagination request these arguments describe
    pub fn to_request(&self) -> PaginationRequest {
        let mut request = PaginationRequest {
            page: self.page,
            page_size: self.page_size,
            offset: self.offset,
            limit: self.limit,
            cursor: self.cursor.clone(),
            timestamp: self.timestamp.clone(),
            id: self.id.clone(),
            direction: self.direction,
            sort_by: self.sort_by.clone(),
            sort_direction: self.sort_direction.unwrap_or_default(),
            include_metadata: self.metadata,
            ..PaginationRequest::default()
        };
        for (key, value) in &self.filters {
            request.filters.insert(key.clone(), value.clone());
        }
        request
    }
}

/// Parse `key=value`; the value is JSON if it parses, a string otherwise
fn parse_filter(raw: &str) -> std::result::Result<(String, JsonValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}
