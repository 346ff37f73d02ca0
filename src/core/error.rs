use thiserror::Error;

/// Failure kinds surfaced by the scrape + extraction pipeline.
///
/// A model response without the expected fenced JSON block is deliberately
/// not represented here: `extraction::response::unwrap_fenced_json` degrades
/// to passing the raw text through, and downstream consumers own JSON
/// validation.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Browser launch or navigation failed. Fatal for the request, never
    /// retried internally.
    #[error("page fetch failed: {0}")]
    Fetch(String),

    /// A language-model call failed. Aborts the in-progress chunk loop;
    /// no partial accumulated result is returned.
    #[error("model invocation failed: {0}")]
    Model(String),

    /// The chunker only accepts positive chunk sizes.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// The HTTP layer was asked for a format it does not serve.
    #[error("unsupported output format: {0}")]
    UnknownFormat(String),
}
