pub mod assemble;
pub mod context;
pub mod linearize;
pub mod normalize;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::dump::Article;
use crate::report::RunStats;
use assemble::{assemble_article, Assembler, Record};

/// Assemble every article and hand each record to `sink` in id order.
///
/// Articles within a chunk are parsed in parallel; ids are assigned
/// afterwards in article order, so output is identical to a sequential run.
pub fn process_articles<F>(articles: &[Article], chunk_size: usize, mut sink: F) -> Result<RunStats>
where
    F: FnMut(&Record) -> Result<()>,
{
    let pb = ProgressBar::new(articles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut assembler = Assembler::new();
    for chunk in articles.chunks(chunk_size.max(1)) {
        let results: Vec<_> = chunk.par_iter().map(assemble_article).collect();
        for tables in results {
            for record in assembler.absorb(tables?) {
                sink(&record)?;
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    let stats = assembler.into_stats();
    info!(
        articles = stats.articles,
        tables = stats.tables,
        records = stats.records,
        "Assembly finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::read_articles;
    use std::path::Path;

    fn fixture() -> Vec<Article> {
        read_articles(Path::new("tests/fixtures/sample.xml"), None).unwrap()
    }

    #[test]
    fn chunking_does_not_change_output() {
        let articles = fixture();
        let collect = |chunk_size| {
            let mut rows = Vec::new();
            let stats = process_articles(&articles, chunk_size, |r| {
                rows.push(r.linearized());
                Ok(())
            })
            .unwrap();
            (rows, stats)
        };
        let (whole, whole_stats) = collect(500);
        let (single, single_stats) = collect(1);
        assert_eq!(whole, single);
        assert_eq!(whole_stats, single_stats);
    }

    #[test]
    fn fixture_records() {
        let articles = fixture();
        let mut rows = Vec::new();
        let stats = process_articles(&articles, 2, |r| {
            rows.push(r.linearized());
            Ok(())
        })
        .unwrap();

        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..rows.len() as u64).collect::<Vec<_>>());
        assert_eq!(stats.articles, 3);
        assert_eq!(stats.records, rows.len());
        assert_eq!(stats.tables, stats.records + stats.failures());
        assert_eq!(stats.malformed_tables, 1);
        assert_eq!(stats.empty_tables, 0);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].linearized_text,
            "Arsenal Stadium ; Capacity ; The record attendance is listed below ; \
             Attendance records ; Season: 1935, Attendance: 73,295, . Season: 1950, Attendance: 72,408, . ; \
             The ground closed in 2006"
        );
        assert!(rows.iter().all(|r| r.article_title != "Stub"));
    }

    #[test]
    fn sink_error_stops_the_run() {
        let articles = fixture();
        let err = process_articles(&articles, 500, |_| anyhow::bail!("disk full")).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
