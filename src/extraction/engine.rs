//! The incremental extraction engine.
//!
//! Chunks are processed strictly in order: each chunk's prompt embeds the
//! accumulated result produced by the previous chunk, so there is nothing to
//! parallelize within one request. Independent requests share nothing and
//! run concurrently on the runtime.

use tracing::{debug, info, warn};

use crate::core::config::SiftConfig;
use crate::core::error::SiftError;
use crate::extraction::chunker::{Chunker, DEFAULT_CHUNK_SIZE};
use crate::extraction::prompt::{build_completeness_prompt, build_extraction_prompt, is_affirmative};
use crate::llm::ModelClient;

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chunk_size: usize,
    pub max_output_tokens: u32,
    /// Sampling temperature for the extraction calls. The completeness check
    /// always runs at 0.0.
    pub temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_output_tokens: 1000,
            temperature: 1.2,
        }
    }
}

impl EngineConfig {
    pub fn from_config(config: &SiftConfig) -> Self {
        Self {
            chunk_size: config.extraction.resolve_chunk_size(),
            max_output_tokens: config.llm.resolve_max_output_tokens(),
            temperature: config.extraction.resolve_temperature(),
        }
    }
}

/// What one extraction run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// The last accumulated result, as raw model output. Callers unwrap the
    /// fenced payload and own JSON validation.
    pub result: String,
    /// `true` only when a completeness verdict said "yes". `false` means the
    /// chunks ran out first and `result` is best-effort.
    pub complete: bool,
    pub chunks_processed: usize,
    pub model_calls: usize,
}

impl ExtractionOutcome {
    fn empty() -> Self {
        Self {
            result: String::new(),
            complete: false,
            chunks_processed: 0,
            model_calls: 0,
        }
    }
}

/// Run the chunked extraction loop over `source_text`.
///
/// Two model calls per chunk: one to extract into a fresh candidate, one to
/// ask whether the candidate already satisfies the schema. The candidate
/// replaces the accumulated result wholesale each iteration — the extraction
/// prompt obliges the model to carry earlier fields forward, so replacement
/// is the merge. The loop stops at the first affirmative verdict; on
/// exhaustion the last candidate is returned with `complete = false`.
///
/// Any model failure aborts the whole run. No per-chunk retry, no partial
/// result.
pub async fn run_extraction(
    model: &dyn ModelClient,
    source_text: &str,
    schema: &serde_json::Value,
    config: &EngineConfig,
) -> Result<ExtractionOutcome, SiftError> {
    let chunker = Chunker::new(config.chunk_size)?;
    let chunks = chunker.split(source_text);
    if chunks.is_empty() {
        debug!("extraction source is empty — returning without model calls");
        return Ok(ExtractionOutcome::empty());
    }

    let schema_json = schema.to_string();
    info!(
        "running incremental extraction: {} chunk(s) of ≤{} chars",
        chunks.len(),
        config.chunk_size
    );

    let mut accumulated = String::new();
    let mut model_calls = 0usize;

    for (idx, chunk) in chunks.iter().enumerate() {
        let previous = (!accumulated.is_empty()).then_some(accumulated.as_str());
        let prompt = build_extraction_prompt(chunk, &schema_json, previous);
        let candidate = model
            .invoke(&prompt, config.max_output_tokens, config.temperature)
            .await?;
        model_calls += 1;

        let check = build_completeness_prompt(&candidate, &schema_json);
        let verdict = model.invoke(&check, config.max_output_tokens, 0.0).await?;
        model_calls += 1;

        // The candidate supersedes the previous accumulated result even when
        // the verdict says "keep going" — see the prompt contract above.
        accumulated = candidate;

        if is_affirmative(&verdict) {
            debug!(
                "completeness verdict affirmative after chunk {}/{}",
                idx + 1,
                chunks.len()
            );
            return Ok(ExtractionOutcome {
                result: accumulated,
                complete: true,
                chunks_processed: idx + 1,
                model_calls,
            });
        }
    }

    warn!(
        "chunks exhausted without an affirmative completeness verdict — returning best-effort result"
    );
    Ok(ExtractionOutcome {
        result: accumulated,
        complete: false,
        chunks_processed: chunks.len(),
        model_calls,
    })
}
