pub mod chunker;
pub mod engine;
pub mod prompt;
pub mod response;

pub use chunker::Chunker;
pub use engine::{run_extraction, EngineConfig, ExtractionOutcome};
pub use response::unwrap_fenced_json;
