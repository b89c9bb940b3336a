//! Table boundary recognition.
//!
//! The line classifier decides which tables the structural parser yields, and
//! the context splitter cuts section prose around the same tables. Both read
//! the pattern and span rules below so the two views of a section cannot
//! drift apart: any change here must bump [`TABLE_BOUNDARY_VERSION`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

pub const TABLE_BOUNDARY_VERSION: u32 = 2;

/// Matches a line (leading spaces/tabs already stripped) that opens a table
/// classed `wikitable`, quoted raw or XML-escaped.
pub static TABLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\{\|[ \t]*class=(?:"|&quot;)?[^"&\n]*\bwikitable\b"#).unwrap()
});

/// Strip the indentation tolerated before `{|` / `|}`.
pub fn trim_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

pub fn opens_table(line: &str) -> bool {
    TABLE_OPEN_RE.is_match(trim_indent(line))
}

/// Byte ranges of the targeted tables in `text`.
///
/// A span runs from the start of the opening line through the `|}` that
/// balances it; any `{|` inside, targeted or not, nests one level deeper.
/// A table that is never closed runs to the end of the text.
pub fn table_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open_at: Option<usize> = None;
    let mut depth = 0usize;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let body = trim_indent(line);

        match open_at {
            None => {
                if TABLE_OPEN_RE.is_match(body) {
                    open_at = Some(line_start);
                    depth = 1;
                }
            }
            Some(table_start) => {
                if body.starts_with("{|") {
                    depth += 1;
                } else if body.starts_with("|}") {
                    depth -= 1;
                    if depth == 0 {
                        let close_end = line_start + (line.len() - body.len()) + 2;
                        spans.push(table_start..close_end);
                        open_at = None;
                    }
                }
            }
        }
    }

    if let Some(table_start) = open_at {
        spans.push(table_start..text.len());
    }
    spans
}

/// The text between targeted tables: always `table_spans(text).len() + 1` pieces.
pub fn split_around_tables(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for span in table_spans(text) {
        pieces.push(&text[last..span.start]);
        last = span.end;
    }
    pieces.push(&text[last..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_and_raw_quotes() {
        assert!(opens_table("{| class=&quot;wikitable&quot;"));
        assert!(opens_table("{| class=\"wikitable sortable\" style=\"x\""));
        assert!(opens_table("  {|class=&quot;sortable wikitable&quot;"));
    }

    #[test]
    fn other_classes_are_not_targeted() {
        assert!(!opens_table("{| class=&quot;infobox&quot;"));
        assert!(!opens_table("{|"));
        assert!(!opens_table("{| class=&quot;wikitablex&quot;"));
        assert!(!opens_table("text {| class=&quot;wikitable&quot;"));
    }

    #[test]
    fn span_covers_open_through_close() {
        let text = "before\n{| class=&quot;wikitable&quot;\n|-\n| a || b\n|}\nafter";
        assert_eq!(split_around_tables(text), vec!["before\n", "\nafter"]);
    }

    #[test]
    fn unclosed_span_runs_to_end() {
        let text = "before\n{| class=\"wikitable\"\n| a\n";
        assert_eq!(split_around_tables(text), vec!["before\n", ""]);
    }

    #[test]
    fn untargeted_tables_stay_in_text() {
        let text = "a\n{| class=\"infobox\"\n| x\n|}\nb";
        assert!(table_spans(text).is_empty());
        assert_eq!(split_around_tables(text), vec![text]);
    }

    #[test]
    fn nested_tables_stay_inside_the_outer_span() {
        let text = "a\n{| class=&quot;wikitable&quot;\n|\n{| class=&quot;wikitable&quot;\n| x\n|}\n|\n\
                    {| class=&quot;wikitable&quot;\n| y\n|}\n  |}\nb";
        let spans = table_spans(text);
        assert_eq!(spans.len(), 1);
        assert!(text[spans[0].clone()].ends_with("| y\n|}\n  |}"));
        assert_eq!(split_around_tables(text), vec!["a\n", "\nb"]);
    }

    #[test]
    fn indented_table_and_trailing_text() {
        let text = "  {| class=&quot;wikitable&quot;\n| x\n|} tail";
        assert_eq!(table_spans(text), vec![0..text.len() - 5]);
        assert_eq!(split_around_tables(text), vec!["", " tail"]);
    }
}
