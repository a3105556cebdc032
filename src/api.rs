//! Generation API interaction.
//!
//! This module talks to the Gemini `generateContent` endpoint. It is split the
//! same way as the rest of the pipeline's upstream code:
//!
//! - [`GenerationRequest`]: the immutable request body, built once at startup
//! - [`GenerationClient`]: the async seam the aggregator depends on
//! - [`GeminiClient`]: the `reqwest` implementation
//! - [`completion_text`]: pulls the model's text out of the response envelope
//!
//! No retry is attempted. A failed call is reported as
//! [`PipelineError::UpstreamUnavailable`] and the aggregator fails open.

use crate::config::GeminiSettings;
use crate::error::PipelineError;
use crate::extract::PayloadFormat;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Trait for async text generation.
///
/// Implementors send the fixed request upstream and return the model's raw
/// completion text. Tests substitute an in-memory fake.
pub trait GenerationClient {
    /// Send `request` and return the completion text.
    ///
    /// # Arguments
    ///
    /// * `request` - The request body to send
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The text of the first candidate's first part
    /// * `Err(PipelineError::UpstreamUnavailable)` - Transport failure, timeout or non-2xx status
    /// * `Err(PipelineError::MalformedResponse)` - A 2xx body without completion text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError>;
}

/// Request body for `models/{model}:generateContent`.
///
/// Built once from [`GeminiSettings`] and shared read-only for the life of the
/// process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    system_instruction: Content,
    contents: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
enum Tool {
    #[serde(rename = "google_search_retrieval")]
    GoogleSearchRetrieval {
        dynamic_retrieval_config: DynamicRetrievalConfig,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct DynamicRetrievalConfig {
    mode: String,
    dynamic_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

/// Schema for structured output: an array of article objects.
fn article_array_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "description": "A news article for the specified topic.",
            "properties": {
                "title": { "type": "STRING" },
                "summary": { "type": "STRING" },
                "image_url": { "type": "STRING" },
                "date": { "type": "STRING" }
            }
        }
    })
}

impl GenerationRequest {
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        let tools = settings
            .search_retrieval
            .iter()
            .map(|retrieval| Tool::GoogleSearchRetrieval {
                dynamic_retrieval_config: DynamicRetrievalConfig {
                    mode: retrieval.mode.clone(),
                    dynamic_threshold: retrieval.dynamic_threshold,
                },
            })
            .collect();

        let generation_config = settings.structured_output.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: article_array_schema(),
        });

        Self {
            system_instruction: Content::text(&settings.system_instruction),
            contents: Content::text(&settings.prompt),
            tools,
            generation_config,
        }
    }

    /// How the completion text for this request wraps its JSON.
    pub fn payload_format(&self) -> PayloadFormat {
        if self.generation_config.is_some() {
            PayloadFormat::Direct
        } else {
            PayloadFormat::Fenced
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Read `candidates[0].content.parts[0].text` from a response body.
pub fn completion_text(body: &str) -> Result<String, PipelineError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        PipelineError::MalformedResponse(format!("invalid generateContent envelope: {e}"))
    })?;

    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            PipelineError::MalformedResponse(
                "response has no candidates[0].content.parts[0].text".to_string(),
            )
        })
}

/// Header carrying the Gemini API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// `reqwest`-backed client for the Gemini API.
///
/// The key is sent as a header, never in the URL.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    /// Build a client for `models/{model}:generateContent`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client; its timeout bounds every call
    /// * `settings` - API base URL and model name
    /// * `api_key` - Gemini API key
    ///
    /// # Returns
    ///
    /// The client, or a parse error if the endpoint is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        settings: &GeminiSettings,
        api_key: String,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            settings.api_base.trim_end_matches('/'),
            settings.model
        ))?;
        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }
}

impl GenerationClient for GeminiClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        let t0 = Instant::now();
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::from_transport("gemini", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::from_transport("gemini", e))?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                %status,
                elapsed_ms,
                body_preview = %truncate_for_log(&body, 300),
                "Gemini returned an error status"
            );
            return Err(PipelineError::UpstreamUnavailable(format!(
                "gemini: HTTP {status}"
            )));
        }

        info!(%status, elapsed_ms, bytes = body.len(), "Gemini call succeeded");
        let text = completion_text(&body)?;
        debug!(preview = %truncate_for_log(&text, 500), "Completion text");
        Ok(text)
    }
}
