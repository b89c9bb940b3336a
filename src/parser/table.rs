use crate::error::GridError;

/// One cell; `None` when the position exists in the grid but holds no cell.
pub type Cell = Option<String>;
pub type Row = Vec<Cell>;
pub type Grid = Vec<Row>;

#[derive(Debug, Clone)]
pub struct Table {
    pub caption: Option<String>,
    grid: Result<Grid, GridError>,
}

impl Table {
    pub fn new(caption: Option<String>, grid: Grid) -> Self {
        Table {
            caption,
            grid: Ok(grid),
        }
    }

    pub fn malformed(caption: Option<String>, err: GridError) -> Self {
        Table {
            caption,
            grid: Err(err),
        }
    }

    /// The cell grid, or the reason it could not be read.
    pub fn grid(&self) -> Result<&Grid, GridError> {
        self.grid.as_ref().map_err(|e| *e)
    }
}

/// Accumulates table lines between `{|` and `|}`.
#[derive(Debug)]
pub struct TableBuilder {
    caption: Option<String>,
    rows: Grid,
    current: Row,
    depth: usize,
    nested: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        TableBuilder {
            caption: None,
            rows: Vec::new(),
            current: Vec::new(),
            depth: 1,
            nested: false,
        }
    }

    fn is_inner(&self) -> bool {
        self.depth > 1
    }

    pub fn open_nested(&mut self) {
        self.depth += 1;
        self.nested = true;
    }

    /// Returns true once the outermost table is closed.
    pub fn close(&mut self) -> bool {
        self.depth -= 1;
        self.depth == 0
    }

    pub fn caption(&mut self, text: &str) {
        if !self.is_inner() {
            self.caption = Some(text.to_string());
        }
    }

    pub fn row_break(&mut self) {
        if self.is_inner() {
            return;
        }
        if !self.current.is_empty() {
            self.rows.push(std::mem::take(&mut self.current));
        }
    }

    pub fn cells(&mut self, cells: Vec<String>) {
        if !self.is_inner() {
            self.current.extend(cells.into_iter().map(Some));
        }
    }

    /// A line that is not table syntax continues the last open cell.
    pub fn continue_cell(&mut self, text: &str) {
        if self.is_inner() || text.is_empty() {
            return;
        }
        let last = match self.current.last_mut() {
            Some(cell) => cell,
            None => return,
        };
        match last {
            Some(value) => {
                value.push('\n');
                value.push_str(text);
            }
            None => *last = Some(text.to_string()),
        }
    }

    pub fn finish(mut self, closed: bool) -> Table {
        self.row_break();
        if !closed {
            Table::malformed(self.caption, GridError::Unterminated)
        } else if self.nested {
            Table::malformed(self.caption, GridError::Nested)
        } else {
            Table::new(self.caption, self.rows)
        }
    }
}

/// Byte offsets of `sep` outside `[[…]]` and `{{…}}`.
fn separator_positions(line: &str, sep: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < line.len() {
        let rest = &line[i..];
        if rest.starts_with("[[") || rest.starts_with("{{") {
            depth += 1;
            i += 2;
        } else if (rest.starts_with("]]") || rest.starts_with("}}")) && depth > 0 {
            depth -= 1;
            i += 2;
        } else if depth == 0 && rest.starts_with(sep) {
            positions.push(i);
            i += sep.len();
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    positions
}

/// Split a cell line on `sep`, ignoring separators inside links and templates.
pub fn split_outside_brackets<'a>(line: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in separator_positions(line, sep) {
        parts.push(&line[start..pos]);
        start = pos + sep.len();
    }
    parts.push(&line[start..]);
    parts
}

/// Drop a leading `attributes |` segment from a cell or caption.
pub fn strip_attributes(cell: &str) -> &str {
    match separator_positions(cell, "|").first() {
        Some(&pos) => &cell[pos + 1..],
        None => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_split_on_breaks() {
        let mut b = TableBuilder::new();
        b.cells(vec!["A".into(), "B".into()]);
        b.row_break();
        b.cells(vec!["1".into()]);
        b.cells(vec!["2".into()]);
        assert!(b.close());
        let table = b.finish(true);
        let grid = table.grid().unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1], vec![Some("1".to_string()), Some("2".to_string())]);
    }

    #[test]
    fn leading_row_break_adds_no_empty_row() {
        let mut b = TableBuilder::new();
        b.row_break();
        b.cells(vec!["x".into()]);
        b.close();
        assert_eq!(b.finish(true).grid().unwrap().len(), 1);
    }

    #[test]
    fn continuation_lines_join_last_cell() {
        let mut b = TableBuilder::new();
        b.cells(vec!["first".into()]);
        b.continue_cell("second");
        b.close();
        let table = b.finish(true);
        assert_eq!(table.grid().unwrap()[0][0].as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn nested_table_is_malformed() {
        let mut b = TableBuilder::new();
        b.cells(vec!["outer".into()]);
        b.open_nested();
        b.cells(vec!["inner".into()]);
        assert!(!b.close());
        assert!(b.close());
        assert_eq!(b.finish(true).grid().unwrap_err(), GridError::Nested);
    }

    #[test]
    fn unclosed_table_is_malformed() {
        let mut b = TableBuilder::new();
        b.cells(vec!["x".into()]);
        let table = b.finish(false);
        assert_eq!(table.grid().unwrap_err(), GridError::Unterminated);
    }

    #[test]
    fn split_respects_links_and_templates() {
        assert_eq!(
            split_outside_brackets(" [[a||b]] || {{x||y}} ", "||"),
            vec![" [[a||b]] ", " {{x||y}} "]
        );
    }

    #[test]
    fn attributes_are_stripped() {
        assert_eq!(strip_attributes(" style=&quot;color:red&quot; | Red"), " Red");
        assert_eq!(strip_attributes(" [[Paris|the capital]]"), " [[Paris|the capital]]");
        assert_eq!(strip_attributes("plain"), "plain");
    }
}
