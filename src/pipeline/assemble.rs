use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, warn};

use super::context::{section_prose, split_context, ContextPair};
use super::linearize::linearize;
use super::normalize::normalize;
use crate::dump::Article;
use crate::error::PipelineError;
use crate::parser::parse_sections;
use crate::report::RunStats;

pub const FIELD_SEPARATOR: &str = " ; ";

/// Everything known about one successfully linearized table.
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub article_title: String,
    pub section_title: String,
    pub section_content: String,
    pub caption: String,
    pub context: ContextPair,
    pub table_text: String,
}

impl TableEntry {
    /// Title, section, preceding prose, caption, table, following prose.
    pub fn linearized_text(&self) -> String {
        [
            self.article_title.as_str(),
            self.section_title.as_str(),
            self.context.preceding.as_str(),
            self.caption.as_str(),
            self.table_text.as_str(),
            self.context.following.as_str(),
        ]
        .iter()
        .join(FIELD_SEPARATOR)
    }
}

/// A table entry with its run-wide id.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: u64,
    pub entry: TableEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearizedRecord {
    pub id: u64,
    pub article_title: String,
    pub linearized_text: String,
}

impl Record {
    pub fn linearized(&self) -> LinearizedRecord {
        LinearizedRecord {
            id: self.id,
            article_title: self.entry.article_title.clone(),
            linearized_text: self.entry.linearized_text(),
        }
    }
}

/// One article's entries, in section and table order, before ids are assigned.
#[derive(Debug, Default)]
pub struct ArticleTables {
    pub entries: Vec<TableEntry>,
    pub stats: RunStats,
}

/// Parse one article and build an entry for every table that linearizes.
///
/// Independent of every other article, so it can run on any worker. Malformed
/// and empty tables are counted and skipped; a boundary mismatch is fatal.
pub fn assemble_article(article: &Article) -> Result<ArticleTables, PipelineError> {
    let mut out = ArticleTables::default();
    out.stats.articles = 1;

    for section in parse_sections(&article.markup) {
        if section.tables.is_empty() {
            continue;
        }
        let section_title = normalize(section.title.as_deref()).trim().to_string();
        let contexts = split_context(&section.raw_content, section.tables.len()).map_err(|source| {
            PipelineError::Boundary {
                article: article.title.clone(),
                section: section_title.clone(),
                source,
            }
        })?;
        out.stats.sections += 1;
        debug!(
            article = %article.title,
            section = %section_title,
            level = section.level,
            tables = section.tables.len(),
            "Section with tables"
        );
        let section_content = section_prose(&section.raw_content);

        for (index, (table, context)) in section.tables.iter().zip(contexts).enumerate() {
            out.stats.tables += 1;
            let table_text = match linearize(table) {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => {
                    debug!(article = %article.title, section = %section_title, index, "Empty table skipped");
                    out.stats.empty_tables += 1;
                    continue;
                }
                Err(e) => {
                    warn!(article = %article.title, section = %section_title, index, "Skipping table: {}", e);
                    out.stats.malformed_tables += 1;
                    continue;
                }
            };
            let caption = table
                .caption
                .as_deref()
                .map(|c| normalize(Some(c.trim())).trim().to_string())
                .unwrap_or_default();

            out.entries.push(TableEntry {
                article_title: article.title.clone(),
                section_title: section_title.clone(),
                section_content: section_content.clone(),
                caption,
                context,
                table_text,
            });
        }
    }

    out.stats.records = out.entries.len();
    Ok(out)
}

/// Assigns ids in emission order and accumulates run statistics.
///
/// Skipped tables never reach the assembler, so ids stay contiguous.
#[derive(Debug, Default)]
pub struct Assembler {
    next_id: u64,
    stats: RunStats,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, tables: ArticleTables) -> Vec<Record> {
        self.stats.merge(&tables.stats);
        tables
            .entries
            .into_iter()
            .map(|entry| {
                let id = self.next_id;
                self.next_id += 1;
                Record { id, entry }
            })
            .collect()
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }
}
