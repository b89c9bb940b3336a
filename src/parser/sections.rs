use super::blocks::{classify_lines, Block};
use super::table::{Table, TableBuilder};

#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text; `None` for the lead section before the first heading.
    pub title: Option<String>,
    /// Heading depth (`==` is 2); 0 for the lead section.
    pub level: u8,
    /// The section's raw lines, heading excluded.
    pub raw_content: String,
    pub tables: Vec<Table>,
}

impl Section {
    fn new(title: Option<String>, level: u8) -> Self {
        Section {
            title,
            level,
            raw_content: String::new(),
            tables: Vec::new(),
        }
    }

    fn push_line(&mut self, raw: &str) {
        if !self.raw_content.is_empty() {
            self.raw_content.push('\n');
        }
        self.raw_content.push_str(raw);
    }
}

/// Split an article body into non-overlapping sections with their tables.
///
/// Only tables opened with the recognized style class are collected; other
/// tables stay in the prose. Headings inside a collected table do not start a
/// new section.
pub fn parse_sections(markup: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section::new(None, 0);
    let mut table: Option<TableBuilder> = None;

    for line in classify_lines(markup) {
        if let Some(builder) = table.as_mut() {
            current.push_line(line.raw);
            match &line.block {
                Block::TableOpen { .. } => builder.open_nested(),
                Block::TableClose => {
                    if builder.close() {
                        if let Some(done) = table.take() {
                            current.tables.push(done.finish(true));
                        }
                    }
                }
                Block::Caption(text) => builder.caption(text),
                Block::RowBreak => builder.row_break(),
                Block::HeaderCells(cells) | Block::DataCells(cells) => builder.cells(cells.clone()),
                Block::Text(text) => builder.continue_cell(text),
                Block::Heading { .. } => builder.continue_cell(line.raw.trim()),
                Block::Empty => {}
            }
            continue;
        }

        match line.block {
            Block::Heading { level, text } => {
                sections.push(std::mem::replace(&mut current, Section::new(Some(text), level)));
            }
            Block::TableOpen { targeted: true } => {
                current.push_line(line.raw);
                table = Some(TableBuilder::new());
            }
            _ => current.push_line(line.raw),
        }
    }

    if let Some(open) = table {
        current.tables.push(open.finish(false));
    }
    sections.push(current);
    sections
}

// ── Tests ──
