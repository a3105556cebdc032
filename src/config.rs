//! Static pipeline configuration and API credentials.
//!
//! [`NewsConfig`] holds everything that shapes the upstream requests: prompt
//! text, model, tools, photo collection, cache TTL and HTTP timeout. Every
//! field has a built-in default, so the YAML file is optional and may set any
//! subset of keys:
//!
//! ```yaml
//! cache_ttl_secs: 300
//! gemini:
//!   model: gemini-1.5-flash
//!   prompt: Show me 4 articles about Rust news from the last week.
//!   structured_output: true
//! unsplash:
//!   collection: DR5Mh4ituPY
//! ```
//!
//! [`Credentials`] are never read from the file; they come from the CLI or
//! the environment and are checked once at startup.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are a journalist for a tech article.
The article caters to people with a technical background like engineers.
When prompted with a topic, and number of articles, respond with the following JSON schema:

[
  {
    "title": string,
    "summary": string,
    "date": string,
    "image_url": string
  }
]

where:
- image_url is a thumbnail image for the article."#;

const DEFAULT_PROMPT: &str = "Show me 6 articles about tech news from the last month.";

/// Top-level configuration, deserialized from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub gemini: GeminiSettings,
    pub unsplash: UnsplashSettings,
    /// How long a fetched article list is served before refetching.
    pub cache_ttl_secs: u64,
    /// Per-call timeout applied to every upstream HTTP request.
    pub request_timeout_secs: u64,
    /// Maximum number of photo lookups in flight at once.
    pub image_concurrency: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiSettings::default(),
            unsplash: UnsplashSettings::default(),
            cache_ttl_secs: 600,
            request_timeout_secs: 10,
            image_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
    /// Grounding with Google Search; `None` disables the tool.
    pub search_retrieval: Option<SearchRetrieval>,
    /// Ask for schema-constrained JSON instead of prose with a fenced block.
    pub structured_output: bool,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash-8b".to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            search_retrieval: Some(SearchRetrieval::default()),
            structured_output: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchRetrieval {
    pub mode: String,
    pub dynamic_threshold: f64,
}

impl Default for SearchRetrieval {
    fn default() -> Self {
        Self {
            mode: "MODE_DYNAMIC".to_string(),
            dynamic_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnsplashSettings {
    pub api_base: String,
    pub collection: String,
}

impl Default for UnsplashSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.unsplash.com".to_string(),
            collection: "DR5Mh4ituPY".to_string(),
        }
    }
}

impl NewsConfig {
    /// Load configuration from an optional YAML file, falling back to defaults.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_string(),
                    source,
                })?;
                let config = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_string(),
                    source,
                })?;
                info!(path, "Loaded configuration file");
                config
            }
            None => {
                info!("No config file given; using built-in defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::Invalid("gemini.model must not be empty".to_string()));
        }
        if self.gemini.prompt.trim().is_empty() {
            return Err(ConfigError::Invalid("gemini.prompt must not be empty".to_string()));
        }
        if self.unsplash.collection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "unsplash.collection must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.image_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "image_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// API keys for the two upstream services.
pub struct Credentials {
    pub gemini_api_key: String,
    pub unsplash_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"<redacted>")
            .field("unsplash_access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Require both keys, reporting every missing or blank one at once.
    pub fn new(gemini: Option<String>, unsplash: Option<String>) -> Result<Self, ConfigError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        let mut missing = Vec::new();
        if !present(&gemini) {
            missing.push("GEMINI_API_KEY");
        }
        if !present(&unsplash) {
            missing.push("UNSPLASH_ACCESS_KEY");
        }

        match (gemini, unsplash) {
            (Some(gemini_api_key), Some(unsplash_access_key)) if missing.is_empty() => Ok(Self {
                gemini_api_key,
                unsplash_access_key,
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }
}
