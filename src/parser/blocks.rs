use std::sync::LazyLock;

use regex::Regex;

use super::table::{split_outside_brackets, strip_attributes};
use crate::boundary;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={1,6})\s*(.+?)\s*(={1,6})\s*$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// `{|`; `targeted` when the table carries the recognized style class.
    TableOpen { targeted: bool },
    TableClose,
    Caption(String),
    RowBreak,
    HeaderCells(Vec<String>),
    DataCells(Vec<String>),
    Text(String),
    Empty,
}

/// A classified markup line, keeping the raw text for section content.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub raw: &'a str,
    pub block: Block,
}

pub fn classify_lines(markup: &str) -> Vec<Line<'_>> {
    markup
        .lines()
        .map(|raw| Line {
            raw,
            block: classify(raw),
        })
        .collect()
}

fn classify(raw: &str) -> Block {
    let line = boundary::trim_indent(raw);

    if line.trim().is_empty() {
        return Block::Empty;
    }

    // ── Table syntax ──
    if line.starts_with("{|") {
        return Block::TableOpen {
            targeted: boundary::opens_table(line),
        };
    }
    if line.starts_with("|}") {
        return Block::TableClose;
    }
    if let Some(rest) = line.strip_prefix("|+") {
        return Block::Caption(strip_attributes(rest).trim().to_string());
    }
    if line.starts_with("|-") {
        return Block::RowBreak;
    }
    if let Some(rest) = line.strip_prefix('!') {
        let cells = split_outside_brackets(rest, "!!")
            .into_iter()
            .flat_map(|part| split_outside_brackets(part, "||"))
            .map(cell_text)
            .collect();
        return Block::HeaderCells(cells);
    }
    if let Some(rest) = line.strip_prefix('|') {
        let cells = split_outside_brackets(rest, "||")
            .into_iter()
            .map(cell_text)
            .collect();
        return Block::DataCells(cells);
    }

    // ── Heading: == text == ──
    if let Some(caps) = HEADING_RE.captures(line.trim_end()) {
        let level = caps[1].len().min(caps[3].len());
        return Block::Heading {
            level: level as u8,
            text: caps[2].to_string(),
        };
    }

    Block::Text(line.trim().to_string())
}

fn cell_text(part: &str) -> String {
    strip_attributes(part).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(line: &str) -> Block {
        classify_lines(line).remove(0).block
    }

    #[test]
    fn heading() {
        assert_eq!(
            block("== Career statistics =="),
            Block::Heading { level: 2, text: "Career statistics".into() }
        );
        assert!(matches!(block("===Sub==="), Block::Heading { level: 3, .. }));
    }

    #[test]
    fn targeted_and_plain_tables() {
        assert_eq!(
            block("{| class=&quot;wikitable sortable&quot;"),
            Block::TableOpen { targeted: true }
        );
        assert_eq!(
            block("{| class=&quot;infobox&quot;"),
            Block::TableOpen { targeted: false }
        );
        assert_eq!(block("|}"), Block::TableClose);
    }

    #[test]
    fn caption_without_attributes() {
        assert_eq!(
            block("|+ style=&quot;font-size:90%&quot; | Results by year"),
            Block::Caption("Results by year".into())
        );
    }

    #[test]
    fn header_cells() {
        assert_eq!(
            block("! Year !! Team || Goals"),
            Block::HeaderCells(vec!["Year".into(), "Team".into(), "Goals".into()])
        );
    }

    #[test]
    fn data_cells_drop_attributes() {
        assert_eq!(
            block("| align=center | 2001 || [[Arsenal F.C.|Arsenal]] || 12"),
            Block::DataCells(vec!["2001".into(), "[[Arsenal F.C.|Arsenal]]".into(), "12".into()])
        );
    }

    #[test]
    fn empty_and_text() {
        let lines = classify_lines("Some prose.\n\n  indented");
        assert_eq!(lines[0].block, Block::Text("Some prose.".into()));
        assert_eq!(lines[1].block, Block::Empty);
        assert_eq!(lines[2].block, Block::Text("indented".into()));
        assert_eq!(lines[2].raw, "  indented");
    }
}
