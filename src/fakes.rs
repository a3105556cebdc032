//! In-process stand-ins for the upstream APIs and the clock.
//!
//! Each fake is cheap to clone; clones share their counters so a test can
//! hand one copy to the pipeline and keep another to inspect calls.

use crate::api::{GenerationClient, GenerationRequest};
use crate::cache::Clock;
use crate::error::PipelineError;
use crate::images::PhotoSearch;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FakeGenerator {
    reply: Arc<Mutex<Result<String, PipelineError>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeGenerator {
    /// Reply with `text` verbatim.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Ok(text.into()))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reply with `json` wrapped in prose and a ```` ```json ```` fence.
    pub fn fenced(json: &str) -> Self {
        Self::replying(fence(json))
    }

    pub fn failing(error: PipelineError) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Err(error))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_fenced(&self, json: &str) {
        *self.reply.lock().unwrap() = Ok(fence(json));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn fence(json: &str) -> String {
    format!("Here are the latest stories:\n```json\n{json}\n```\nLet me know if you need more.")
}

impl GenerationClient for FakeGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone)]
pub struct FakePhotoSearch {
    result: Result<String, PipelineError>,
    calls: Arc<AtomicUsize>,
    collections: Arc<Mutex<Vec<String>>>,
}

impl FakePhotoSearch {
    pub fn ok(url: &str) -> Self {
        Self::with_result(Ok(url.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_result(Err(PipelineError::UpstreamUnavailable(
            "unsplash: HTTP 503 Service Unavailable".to_string(),
        )))
    }

    fn with_result(result: Result<String, PipelineError>) -> Self {
        Self {
            result,
            calls: Arc::new(AtomicUsize::new(0)),
            collections: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn collections(&self) -> Vec<String> {
        self.collections.lock().unwrap().clone()
    }
}

impl PhotoSearch for FakePhotoSearch {
    async fn random_photo(&self, collection: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.collections.lock().unwrap().push(collection.to_string());
        self.result.clone()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
