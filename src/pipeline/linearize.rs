use std::sync::LazyLock;

use regex::Regex;

use super::normalize::normalize;
use crate::error::GridError;
use crate::parser::{Row, Table};

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").unwrap());

/// Label used when a header cell is absent or blank.
const FALLBACK_LABEL: &str = "Category";
const VALUE_END: &str = ", ";
const ROW_END: &str = ". ";

/// Flatten a table into `header: value, ` text, one `. ` per row.
///
/// An empty string is a valid result; callers treat it as a failed table.
pub fn linearize(table: &Table) -> Result<String, GridError> {
    let grid = table.grid()?;
    let text = finish(&flatten_grid(grid));
    if has_values(&text) {
        Ok(text)
    } else {
        Ok(String::new())
    }
}

/// Row terminators alone carry nothing.
fn has_values(text: &str) -> bool {
    text.chars().any(|c| c != '.' && !c.is_whitespace())
}

/// The raw linearization, before emphasis stripping and normalization.
pub fn flatten_grid(grid: &[Row]) -> String {
    let mut out = String::new();
    let mut rows = grid;

    if has_preamble(rows) {
        push_values(&mut out, &rows[0]);
        rows = &rows[1..];
    }

    match rows {
        [] => {}
        [only] => push_values(&mut out, only),
        [header, body @ ..] => {
            for row in body {
                for (value, label) in row.iter().zip(header.iter()) {
                    let Some(value) = non_empty(value) else {
                        continue;
                    };
                    let label = non_empty(label).unwrap_or(FALLBACK_LABEL);
                    out.push_str(&format!("{label}: {value}{VALUE_END}"));
                }
                out.push_str(ROW_END);
            }
        }
    }
    out
}

/// A short first row above a wider one reads as a caption, not as headers.
fn has_preamble(rows: &[Row]) -> bool {
    match rows {
        [first, second, ..] => {
            let filled = first.iter().filter(|c| non_empty(c).is_some()).count();
            // Strictly shorter, so `[A, B]` above `[A, B, C]` is a preamble.
            filled <= 2 && first.len() < second.len()
        }
        _ => false,
    }
}

fn push_values(out: &mut String, row: &Row) {
    for value in row.iter().filter_map(non_empty) {
        out.push_str(value);
        out.push_str(VALUE_END);
    }
    out.push_str(ROW_END);
}

fn non_empty(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn finish(raw: &str) -> String {
    let text = EMPHASIS_RE.replace_all(raw, "");
    let text = text.replace('|', " | ");
    normalize(Some(&text)).trim().to_string()
}
