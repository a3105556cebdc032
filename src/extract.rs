//! Pulling the article array out of a model completion.
//!
//! Extraction runs in two independent stages:
//!
//! 1. [`locate_fence`] finds the body of the first ```` ```json ```` block in
//!    free-form text.
//! 2. [`decode_array`] strictly decodes a JSON document that must be an array.
//!
//! [`extract_records`] chains them according to the configured
//! [`PayloadFormat`]. An empty array is a successful result; only a missing
//! fence, invalid JSON, or a non-array top level are failures.

use crate::error::PipelineError;
use crate::models::json_kind;
use crate::utils::{looks_truncated, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Body of the first fenced block tagged `json`. An unterminated fence runs
/// to the end of the text.
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json(.*?)(?:```|\z)").expect("fence pattern is valid"));

/// How the generation API wraps its JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// JSON inside a markdown code fence, surrounded by prose.
    Fenced,
    /// The whole completion is JSON (schema-constrained output).
    Direct,
}

/// Find the contents of the first ```` ```json ```` fence, if any.
pub fn locate_fence(text: &str) -> Option<&str> {
    JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Decode `payload` as a JSON array, returning its elements in order.
pub fn decode_array(payload: &str) -> Result<Vec<Value>, PipelineError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| {
        if looks_truncated(&e) {
            warn!(error = %e, "Completion JSON ends early; output looks truncated");
        }
        PipelineError::MalformedResponse(format!("invalid JSON: {e}"))
    })?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(PipelineError::MalformedResponse(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Extract the raw article values from a completion's text.
pub fn extract_records(text: &str, format: PayloadFormat) -> Result<Vec<Value>, PipelineError> {
    let payload = match format {
        PayloadFormat::Direct => text.trim(),
        PayloadFormat::Fenced => locate_fence(text).ok_or_else(|| {
            debug!(preview = %truncate_for_log(text, 300), "No json fence in completion");
            PipelineError::MalformedResponse("no ```json fence in completion".to_string())
        })?,
    };
    decode_array(payload)
}
