use thiserror::Error;

/// Why a table's cell grid could not be read. Such tables are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("table is never closed with |}}")]
    Unterminated,
    #[error("table contains a nested table")]
    Nested,
}

/// The structural table count and the text split disagree for one section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fragments} text fragments around {tables} tables (expected {})", .tables + 1)]
pub struct BoundaryMismatch {
    pub tables: usize,
    pub fragments: usize,
}

/// Conditions that stop a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("page #{index} has no <title>")]
    MissingTitle { index: usize },

    #[error("article {article:?}, section {section:?}: {source}")]
    Boundary {
        article: String,
        section: String,
        #[source]
        source: BoundaryMismatch,
    },

    #[error("malformed dump: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("dump text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
