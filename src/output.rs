use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::assemble::Record;

/// Field delimiter of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// Which columns each output row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `id, article_title, linearized_text`
    Linearized,
    /// `table_title, table_content, section_title, section_content, article_title`
    Sections,
}

impl Layout {
    fn header(self) -> &'static [&'static str] {
        match self {
            Layout::Linearized => &["id", "article_title", "linearized_text"],
            Layout::Sections => &[
                "table_title",
                "table_content",
                "section_title",
                "section_content",
                "article_title",
            ],
        }
    }
}

const UNTITLED_TABLE: &str = "No Title";

#[derive(Debug, Serialize)]
struct SectionRecord<'a> {
    table_title: &'a str,
    table_content: &'a str,
    section_title: &'a str,
    section_content: &'a str,
    article_title: &'a str,
}

impl<'a> SectionRecord<'a> {
    fn from_record(record: &'a Record) -> Self {
        let entry = &record.entry;
        SectionRecord {
            table_title: if entry.caption.is_empty() {
                UNTITLED_TABLE
            } else {
                &entry.caption
            },
            table_content: &entry.table_text,
            section_title: &entry.section_title,
            section_content: &entry.section_content,
            article_title: &entry.article_title,
        }
    }
}

/// Appends one delimited row per record after a header row.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
    layout: Layout,
    written: usize,
}

impl RecordWriter<BufWriter<File>> {
    pub fn create(path: &Path, layout: Layout, delimiter: Delimiter) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output {}", path.display()))?;
        RecordWriter::from_writer(BufWriter::new(file), layout, delimiter)
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn from_writer(writer: W, layout: Layout, delimiter: Delimiter) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(writer);
        inner.write_record(layout.header())?;
        Ok(RecordWriter {
            inner,
            layout,
            written: 0,
        })
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        match self.layout {
            Layout::Linearized => self.inner.serialize(record.linearized())?,
            Layout::Sections => self.inner.serialize(SectionRecord::from_record(record))?,
        }
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush output: {}", e.error()))
    }
}
