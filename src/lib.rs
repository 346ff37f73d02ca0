pub mod core;
pub mod extraction;
pub mod formats;
pub mod llm;
pub mod scraping;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::AppState;
pub use crate::core::SiftError;
