use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::boundary::TABLE_BOUNDARY_VERSION;

/// Counters threaded through a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub articles: usize,
    /// Sections holding at least one targeted table.
    pub sections: usize,
    pub tables: usize,
    pub records: usize,
    pub malformed_tables: usize,
    pub empty_tables: usize,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.articles += other.articles;
        self.sections += other.sections;
        self.tables += other.tables;
        self.records += other.records;
        self.malformed_tables += other.malformed_tables;
        self.empty_tables += other.empty_tables;
    }

    pub fn failures(&self) -> usize {
        self.malformed_tables + self.empty_tables
    }

    pub fn print(&self) {
        println!("Articles:  {}", self.articles);
        println!("Sections:  {}", self.sections);
        println!("Tables:    {}", self.tables);
        println!("Records:   {}", self.records);
        println!(
            "Failures:  {} ({} malformed, {} empty)",
            self.failures(),
            self.malformed_tables,
            self.empty_tables
        );
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub boundary_version: u32,
    pub input: &'a Path,
    pub elapsed_secs: f64,
    #[serde(flatten)]
    pub stats: &'a RunStats,
}

impl<'a> RunReport<'a> {
    pub fn new(input: &'a Path, stats: &'a RunStats, elapsed_secs: f64) -> Self {
        let generated_at = Utc::now();
        RunReport {
            run_id: new_run_id(&generated_at),
            generated_at,
            boundary_version: TABLE_BOUNDARY_VERSION,
            input,
            elapsed_secs,
            stats,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

pub fn new_run_id(at: &DateTime<Utc>) -> String {
    format!("run-{}", at.timestamp())
}
