//! Error types for the news pipeline and process bootstrap.
//!
//! [`PipelineError`] enumerates every way an aggregation run can go wrong.
//! None of these ever reach the presentation layer: the aggregator matches on
//! them and fails open (empty list, skipped record or placeholder image).
//! [`ConfigError`] is the only error allowed to stop the process, and only at
//! startup.

use thiserror::Error;

/// Failures observed inside one aggregation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The generation or photo API could not be reached, timed out, or
    /// answered with a non-2xx status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The generation API answered, but its text does not contain the
    /// expected JSON array.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A single entry of an otherwise valid article array is unusable.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl PipelineError {
    /// Map a transport error from `reqwest` onto the pipeline taxonomy.
    ///
    /// Timeouts, connection failures and error statuses all count as the
    /// upstream being unavailable. Body decode failures mean the upstream did
    /// answer, so they are reported as malformed.
    ///
    /// The request URL is stripped before formatting so nothing from the
    /// query string ends up in logs.
    pub fn from_transport(service: &str, e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_decode() {
            PipelineError::MalformedResponse(format!("{service}: {e}"))
        } else if e.is_timeout() {
            PipelineError::UpstreamUnavailable(format!("{service}: timed out"))
        } else {
            PipelineError::UpstreamUnavailable(format!("{service}: {e}"))
        }
    }
}

/// Bootstrap failures: missing credentials or an unusable config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing API credential(s): {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}
