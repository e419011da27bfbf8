//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs};
use crate::config::{ConfigOverrides, PaginationConfig};
use crate::engine::PaginationEngine;
use crate::error::Result;
use crate::source::JsonFileSource;
use anyhow::Context;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    ///
    /// Library errors are wrapped with the command that hit them; the
    /// underlying `Error` stays reachable through `downcast_ref`.
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Page(args) => self
                .page(args)
                .await
                .with_context(|| format!("Failed to page through {}", args.entries.display())),
            Commands::Config => self
                .show_config()
                .context("Failed to load pagination config"),
        }
    }

    /// Load the config file, or defaults if none was given
    fn load_config(&self) -> Result<PaginationConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading pagination config");
                PaginationConfig::from_file(path)
            }
            None => Ok(PaginationConfig::default()),
        }
    }

    async fn page(&self, args: &PageArgs) -> Result<()> {
        let config = self.load_config()?;
        let source = Arc::new(JsonFileSource::new(&args.entries));
        let engine = PaginationEngine::new(source, config);

        let mut overrides = ConfigOverrides::new();
        if let Some(strategy) = args.strategy {
            overrides = overrides.strategy(strategy);
        }
        if args.prefetch {
            overrides = overrides.prefetch_enabled(true);
        }

        let result = self.print_pages(&engine, args, &overrides).await;
        engine.shutdown().await;
        result
    }

    async fn print_pages(
        &self,
        engine: &PaginationEngine,
        args: &PageArgs,
        overrides: &ConfigOverrides,
    ) -> Result<()> {
        let request = args.to_request();
        let response = engine.paginate(&request, Some(overrides)).await?;
        self.output(&response)?;

        if args.prefetch {
            if let Some(next) = engine.prefetch_next_page(&request, Some(overrides)).await? {
                self.output(&json!({ "prefetched": next.pagination }))?;
            }
        }
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?.sanitized();
        print!("{}", config.to_yaml()?);
        Ok(())
    }

    fn output(&self, value: &impl Serialize) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}
