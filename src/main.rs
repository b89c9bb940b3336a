mod boundary;
mod dump;
mod error;
mod output;
mod parser;
mod pipeline;
mod report;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::output::{Delimiter, Layout, RecordWriter};
use crate::report::{RunReport, RunStats};
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "wikitables", about = "Linearize wikitables from a Wikipedia XML dump")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one row per table: id, article title, linearized text
    Linearize {
        /// Dump file (default: settings `input`)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (default: settings `output`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        delimiter: Option<Delimiter>,
        /// Max articles to read (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Also write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write one row per table with its caption and section prose
    Sections {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        delimiter: Option<Delimiter>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Parse and assemble without writing, then print counts
    Stats {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Linearize {
            input,
            output,
            delimiter,
            limit,
            report,
        } => {
            let input = input.unwrap_or_else(|| settings.input.clone());
            let output = output.unwrap_or_else(|| settings.output.clone());
            let delimiter = delimiter.unwrap_or(settings.delimiter);
            let stats = write_records(&settings, &input, &output, Layout::Linearized, delimiter, limit)?;
            stats.print();
            if let Some(path) = report {
                RunReport::new(&input, &stats, t0.elapsed().as_secs_f64())
                    .write(&path)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
            Ok(())
        }
        Commands::Sections {
            input,
            output,
            delimiter,
            limit,
        } => {
            let input = input.unwrap_or_else(|| settings.input.clone());
            let output = output.unwrap_or_else(|| settings.sections_output.clone());
            let delimiter = delimiter.unwrap_or(settings.delimiter);
            let stats = write_records(&settings, &input, &output, Layout::Sections, delimiter, limit)?;
            stats.print();
            Ok(())
        }
        Commands::Stats { input, limit } => {
            let input = input.unwrap_or_else(|| settings.input.clone());
            let articles = dump::read_articles(&input, limit)?;
            if articles.is_empty() {
                println!("No articles in {}.", input.display());
                return Ok(());
            }
            let stats = pipeline::process_articles(&articles, settings.chunk_size, |_| Ok(()))?;
            stats.print();
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn write_records(
    settings: &Settings,
    input: &Path,
    output: &Path,
    layout: Layout,
    delimiter: Delimiter,
    limit: Option<usize>,
) -> anyhow::Result<RunStats> {
    let articles = dump::read_articles(input, limit)?;
    let mut writer = RecordWriter::create(output, layout, delimiter)?;
    let stats = pipeline::process_articles(&articles, settings.chunk_size, |record| writer.write(record))?;
    let rows = writer.written();
    writer.finish()?;
    info!("Wrote {} rows to {}", rows, output.display());
    Ok(stats)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
