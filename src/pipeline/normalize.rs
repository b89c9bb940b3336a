//! Markup noise removal.
//!
//! Normalization is an ordered table of rules. Each rule either replaces every
//! match of a regex or every occurrence of a literal. Order matters: later
//! families assume the noise removed by earlier ones is gone.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Pattern(&'static str),
    Literal(&'static str),
}

use Matcher::{Literal, Pattern};

/// (name, matcher, replacement), applied top to bottom.
const RULE_TABLE: &[(&str, Matcher, &str)] = &[
    // 1. citation and footnote templates
    ("cite", Pattern(r"\{\{[Cc]ite .*?\}\}"), " "),
    ("citation_needed", Pattern(r"\{\{[Cc]itation needed.*?\}\}"), " "),
    ("sfn", Pattern(r"\{\{sfn.*?\}\}"), " "),
    // 2. presentational templates and style fragments
    ("break", Literal("{{break}}"), " "),
    ("clear", Literal("{{clear}}"), ""),
    ("background", Pattern(r"background(?:-color)?: ?#?[0-9A-Za-z]+;?"), " "),
    ("bartable", Literal("bartable"), ""),
    ("placeholder", Literal("TABLETOREPLACE"), " "),
    // 3. structural delimiters
    ("bold", Literal("'''"), " "),
    ("link_open", Literal("[["), " "),
    ("link_close", Literal("]]"), " "),
    ("template_open", Literal("{{"), " "),
    ("template_close", Literal("}}"), " "),
    ("empty_parens", Literal("( )"), " "),
    // 4. tags
    ("line_break", Pattern(r"(?i)<br\s*/?>|&lt;br\s*/?&gt;"), " "),
    ("escaped_ref", Pattern(r"&lt;ref&gt;.*?&lt;/ref&gt;"), " "),
    ("escaped_tag", Pattern(r"&lt;.*?&gt;"), " "),
    ("self_closing_tag", Pattern(r"<[^<>]*/>"), " "),
    // 5. table and cell styling attributes
    (
        "element_style",
        Pattern(r"\| ?(?:(?:item|col|row|body|header|frame|data|label|list|title|ul|li)[_-]?style|border-style) ?= ?\S*"),
        " ",
    ),
    (
        "quoted_attribute",
        Pattern(r#"\|? ?(?:style|rowspan|colspan|scope|align|valign|lang|bgcolor|bg|width|height)=(?:"|&quot;).*?(?:"|&quot;)"#),
        " ",
    ),
    ("numeric_attribute", Pattern(r"\|? ?(?:width|height|rowspan|colspan)=[0-9]+"), " "),
    ("keyword_attribute", Pattern(r"\|? ?(?:align|valign|scope)=[a-z]+"), " "),
    // 6. layout whitespace, file embeds, inline sources
    ("newline_tab", Pattern(r"[\n\t]+"), " "),
    ("file_embed", Pattern(r"File:[A-Za-z0-9 ]+\.[a-z]{3,4}(?:\|[0-9]+px)?"), ""),
    ("source_citation", Pattern(r"Source: \[.*?\]"), ""),
    // 7. entities and stray flags
    ("amp", Literal("&amp;"), "&"),
    ("spaced_amp", Literal("& amp;"), "&"),
    ("quot", Literal("&quot;"), "\""),
    ("nbsp", Pattern(r"&?nbsp;"), " "),
    ("formatnum", Literal("formatnum:"), ""),
    ("lc_flag", Pattern(r"\|\s*lc=y"), ""),
    // 8. flag templates and no-op attributes
    ("country_flag", Literal("Country flag |"), "country:"),
    ("flagicon", Literal("flagicon |"), "country:"),
    ("flagcountry", Literal("flagcountry |"), "country:"),
    ("flagu", Literal("Flagu |"), "country:"),
    ("flag", Literal("flag |"), "country:"),
    ("display_inline", Literal("display=inline"), ""),
    ("display_it", Literal("display=it"), ""),
    ("abbr_on", Literal("abbr=on"), ""),
    ("disp_table", Literal("disp=table"), ""),
    ("sortname", Literal("sortname |"), ""),
    // 9. whitespace
    ("whitespace", Pattern(r"\s+"), " "),
];

#[derive(Debug)]
enum Compiled {
    Pattern(Regex),
    Literal(&'static str),
}

#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    matcher: Compiled,
    replacement: &'static str,
}

impl Rule {
    pub fn apply(&self, text: &str) -> String {
        match &self.matcher {
            Compiled::Pattern(re) => re.replace_all(text, self.replacement).into_owned(),
            Compiled::Literal(lit) => text.replace(lit, self.replacement),
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(name, matcher, replacement)| Rule {
            name,
            matcher: match matcher {
                Pattern(p) => Compiled::Pattern(Regex::new(p).unwrap()),
                Literal(l) => Compiled::Literal(l),
            },
            replacement,
        })
        .collect()
});

pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Upper bound on rule-table passes for one input.
const MAX_PASSES: usize = 16;

fn apply_all(text: &str) -> String {
    rules()
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Strip markup noise from `text`. Absent input normalizes to `""`.
///
/// A pass can expose new matches for earlier rules (`&amp;lt;br&amp;gt;`
/// decodes into a break tag, collapsed whitespace forms `( )`), so the table
/// is re-applied until the text stops changing.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let mut current = apply_all(text);
    for _ in 1..MAX_PASSES {
        let next = apply_all(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    let unsettled: Vec<&str> = rules()
        .iter()
        .filter(|r| r.apply(&current) != current)
        .map(|r| r.name)
        .collect();
    debug!(rules = ?unsettled, "Normalization stopped at the pass limit");
    current
}
