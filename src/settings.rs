use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::output::Delimiter;

/// Run settings. Defaults, then `wikitables.toml` if present, then
/// `WIKITABLES_*` environment variables. CLI flags override all of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sections_output: PathBuf,
    pub chunk_size: usize,
    pub delimiter: Delimiter,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("wikitables").required(false))
                .add_source(Environment::with_prefix("WIKITABLES").try_parsing(true)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings: Settings = defaults(builder)?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        if settings.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        debug!(settings = ?settings, "Settings loaded");
        Ok(settings)
    }
}

fn defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("input", "enwiki-articles.xml")?
        .set_default("output", "wikitables.tsv")?
        .set_default("sections_output", "wikitables-sections.tsv")?
        .set_default("chunk_size", 500_i64)?
        .set_default("delimiter", "tab")?)
}
