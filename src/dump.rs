use std::path::Path;

use anyhow::{Context, Result};
use deunicode::deunicode;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;

use crate::error::PipelineError;

/// One page of the dump.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    /// Page body, still XML-escaped (`&quot;`, `&lt;ref&gt;`, ...).
    pub markup: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Text,
}

#[derive(Default)]
struct PageBuilder {
    title: Option<String>,
    markup: String,
}

/// Read every `<page>` of a dump file, up to `limit` articles.
pub fn read_articles(path: &Path, limit: Option<usize>) -> Result<Vec<Article>> {
    info!("Reading dump: {}", path.display());
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dump {}", path.display()))?;
    let articles = parse_dump(&xml, limit)?;
    info!("Articles in dump: {}", articles.len());
    Ok(articles)
}

/// Parse `<page>` elements, keeping each body escaped and decoding each title.
pub fn parse_dump(xml: &str, limit: Option<usize>) -> Result<Vec<Article>, PipelineError> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();
    let mut page: Option<PageBuilder> = None;
    let mut field = Field::None;
    let mut pages_seen = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => page = Some(PageBuilder::default()),
                b"title" if page.is_some() => field = Field::Title,
                b"text" if page.is_some() => field = Field::Text,
                _ => {}
            },
            Event::Text(e) => {
                if let Some(p) = page.as_mut() {
                    match field {
                        Field::Title => {
                            let text = e.unescape().map_err(quick_xml::Error::from)?;
                            p.title.get_or_insert_with(String::new).push_str(&text);
                        }
                        Field::Text => p.markup.push_str(std::str::from_utf8(&e)?),
                        Field::None => {}
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"title" | b"text" => field = Field::None,
                b"page" => {
                    let index = pages_seen;
                    pages_seen += 1;
                    if let Some(done) = page.take() {
                        let title = done.title.ok_or(PipelineError::MissingTitle { index })?;
                        articles.push(Article {
                            title: decode_title(&title),
                            markup: done.markup,
                        });
                    }
                    if limit.is_some_and(|n| articles.len() >= n) {
                        break;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(articles)
}

/// Canonical title form: trimmed and transliterated to ASCII.
pub fn decode_title(raw: &str) -> String {
    deunicode(raw.trim()).trim().to_string()
}
