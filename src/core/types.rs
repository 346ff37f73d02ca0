use serde::{Deserialize, Serialize};

/// Structured content pulled out of one fetched page.
///
/// This is the flat map every output format serializes. `fields()` fixes the
/// key order so CSV/TSV columns and XML children stay stable across formats.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub publication_date: String,
    pub content: String,
}

impl PageContent {
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("url", &self.url),
            ("title", &self.title),
            ("publication_date", &self.publication_date),
            ("content", &self.content),
        ]
    }
}

/// Response body for `POST /extract/{url}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Final accumulated result, unwrapped from its fenced JSON block when
    /// the model honored the fencing instruction. Not guaranteed to parse
    /// as JSON — callers own validation.
    pub result: String,
    /// `false` when the chunk loop exhausted the source without an
    /// affirmative completeness verdict. The result is then best-effort.
    pub complete: bool,
    pub chunks_processed: usize,
    pub model_calls: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Serialization formats served by `GET /scrape/{format}/{url}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Xml,
    Tsv,
    Markdown,
}

impl OutputFormat {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::Xml),
            "tsv" => Some(Self::Tsv),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Tsv => "tsv",
            Self::Markdown => "markdown",
        }
    }
}
