//! Data models for generated articles.
//!
//! - [`RawArticleRecord`]: one untrusted entry decoded from the model's JSON
//! - [`Article`]: the canonical, fully populated record handed to callers
//! - [`NewsFeed`]: a snapshot of the article list as written to disk
//!
//! Raw records only live for the duration of a single aggregation run.
//! Articles are owned by the result cache afterwards.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used when the model omits a title.
pub const NO_TITLE: &str = "No Title Available";
/// Placeholder used when the model omits a summary.
pub const NO_SUMMARY: &str = "No Summary Available";
/// Placeholder used when the model omits a date.
pub const NO_DATE: &str = "Date Not Available";
/// Image URL given to an article whose photo lookup failed.
pub const NO_IMAGE_URL: &str = "";

/// A news article ready for display.
///
/// Every field is always populated, either with a value from upstream or with
/// one of the placeholder constants in this module. `date` is free-form text
/// and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub date: String,
    pub image_url: String,
}

/// The article list at one point in time, as rendered by the outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsFeed {
    /// RFC 3339 local timestamp of when the feed was written.
    pub generated_at: String,
    pub articles: Vec<Article>,
}

/// An article as the generation API produced it, before any validation.
///
/// Only JSON objects are accepted. Field values stay loosely typed and
/// unknown keys are carried along but never read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArticleRecord {
    fields: Map<String, Value>,
}

impl RawArticleRecord {
    /// Return a field as text if it is present, a string, and not blank.
    ///
    /// The returned slice is the original value, untrimmed.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

impl TryFrom<Value> for RawArticleRecord {
    type Error = PipelineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PipelineError::MalformedRecord(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Short name of a JSON value's type, for log and error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
