use super::normalize::normalize;
use crate::boundary::split_around_tables;
use crate::error::BoundaryMismatch;

const SENTENCE_BREAK: &str = ". ";

/// Prose immediately around one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPair {
    pub preceding: String,
    pub following: String,
}

/// Pair every table in a section with the sentence before and after it.
///
/// The section is cut at each table span, which must give exactly
/// `table_count + 1` fragments.
pub fn split_context(raw: &str, table_count: usize) -> Result<Vec<ContextPair>, BoundaryMismatch> {
    let padded = format!(" {raw} ");
    let fragments: Vec<String> = split_around_tables(&padded)
        .into_iter()
        .map(|fragment| normalize(Some(fragment)))
        .collect();

    if fragments.len() != table_count + 1 {
        return Err(BoundaryMismatch {
            tables: table_count,
            fragments: fragments.len(),
        });
    }

    Ok(fragments
        .windows(2)
        .map(|pair| ContextPair {
            preceding: last_sentence(&pair[0]),
            following: first_sentence(&pair[1]),
        })
        .collect())
}

fn last_sentence(text: &str) -> String {
    let pieces: Vec<&str> = text.split(SENTENCE_BREAK).collect();
    merge_empty_tail(&pieces).trim().to_string()
}

fn first_sentence(text: &str) -> String {
    text.split(SENTENCE_BREAK)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Text before a table usually ends with `". "`, leaving a blank last piece;
/// fall back to joining it with the sentence before.
fn merge_empty_tail(pieces: &[&str]) -> String {
    match pieces {
        [.., before, last] if last.trim().is_empty() => format!("{before}{last}"),
        [.., last] => last.to_string(),
        [] => String::new(),
    }
}

/// Section prose with every targeted table removed, normalized.
pub fn section_prose(raw: &str) -> String {
    let without_tables = split_around_tables(raw).join(" ");
    normalize(Some(&without_tables)).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const TABLE: &str = "{| class=&quot;wikitable&quot;\n! A !! B\n|-\n| 1 || 2\n|}";

    fn section(parts: &[&str]) -> String {
        parts.join(&format!("\n{TABLE}\n"))
    }

    #[test]
    fn one_table() {
        let raw = section(&[
            "Arsenal were founded in 1886. They won the league in 2002.",
            "The club later moved stadium. It now plays in London.",
        ]);
        let pairs = split_context(&raw, 1).unwrap();
        assert_eq!(
            pairs,
            vec![ContextPair {
                preceding: "They won the league in 2002".into(),
                following: "The club later moved stadium".into(),
            }]
        );
    }

    #[test]
    fn adjacent_tables_share_fragments() {
        let raw = section(&["Intro. First.", "Middle text. More.", "End."]);
        let pairs = split_context(&raw, 2).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].following, "Middle text");
        assert_eq!(pairs[1].preceding, "More");
        assert_eq!(pairs[1].following, "End");
    }

    #[test]
    fn blank_tail_merges_previous_sentence() {
        assert_eq!(merge_empty_tail(&["One", "Two", " "]), "Two ");
        assert_eq!(merge_empty_tail(&["Only"]), "Only");
        assert_eq!(merge_empty_tail(&[" "]), " ");
    }

    #[test]
    fn table_at_section_start_has_empty_preceding() {
        let raw = format!("{TABLE}\nAfter it.");
        let pairs = split_context(&raw, 1).unwrap();
        assert_eq!(pairs[0].preceding, "");
        assert_eq!(pairs[0].following, "After it");
    }

    #[test]
    fn prose_markup_is_normalized() {
        let raw = section(&["'''Bold''' [[link|text]] here.{{cite web|x}}", "Next."]);
        let pairs = split_context(&raw, 1).unwrap();
        assert_eq!(pairs[0].preceding, "Bold link|text here");
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let raw = section(&["a", "b"]);
        assert_eq!(
            split_context(&raw, 2),
            Err(BoundaryMismatch { tables: 2, fragments: 2 })
        );
        assert_eq!(
            split_context("no tables here", 1),
            Err(BoundaryMismatch { tables: 1, fragments: 1 })
        );
    }

    #[test]
    fn wrapper_table_is_one_boundary() {
        let raw = "Intro.\n{| class=&quot;wikitable&quot;\n|-\n|\n{| class=&quot;wikitable&quot;\n| a\n|}\n|\n\
                   {| class=&quot;wikitable&quot;\n| b\n|}\n|}\nAfter.";
        let pairs = split_context(raw, 1).unwrap();
        assert_eq!(pairs[0].preceding, "Intro");
        assert_eq!(pairs[0].following, "After");
        assert_eq!(section_prose(raw), "Intro. After.");
    }

    #[test]
    fn no_tables_no_pairs() {
        assert_eq!(split_context("just prose", 0).unwrap(), vec![]);
    }

    #[test]
    fn prose_without_tables() {
        let raw = section(&["Before.", "After."]);
        assert_eq!(section_prose(&raw), "Before. After.");
    }

    proptest! {
        #[test]
        fn pair_count_matches_table_count(
            parts in prop::collection::vec("[a-z .]{0,30}", 1..6),
            claimed in 0usize..6,
        ) {
            let raw = section(&parts.iter().map(String::as_str).collect::<Vec<_>>());
            let actual = parts.len() - 1;
            match split_context(&raw, claimed) {
                Ok(pairs) => {
                    prop_assert_eq!(claimed, actual);
                    prop_assert_eq!(pairs.len(), claimed);
                }
                Err(e) => {
                    prop_assert_ne!(claimed, actual);
                    prop_assert_eq!(e.fragments, actual + 1);
                }
            }
        }
    }
}
