//! The news aggregation pipeline.
//!
//! One run goes through four steps:
//!
//! 1. **Issue** the fixed [`GenerationRequest`]
//! 2. **Extract** the JSON array from the completion text
//! 3. **Normalize + resolve** every record, in upstream order
//! 4. **Assemble** the ordered article list
//!
//! Every failure is recovered here. A failed call or unreadable completion
//! ends the run with no articles; a malformed record is skipped on its own;
//! a failed image lookup only costs that article its picture. The outcome is
//! reported as an [`Aggregation`] so callers and tests can tell these cases
//! apart even though the public list looks the same.

use crate::api::{GenerationClient, GenerationRequest};
use crate::error::PipelineError;
use crate::extract::extract_records;
use crate::images::{ImageResolver, PhotoSearch};
use crate::models::{Article, RawArticleRecord};
use crate::normalize::normalize;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// The model returned a non-empty array. `skipped` counts entries that
    /// were not objects and were dropped.
    Articles { articles: Vec<Article>, skipped: usize },
    /// The model returned a valid, empty array.
    NoArticles,
    /// The completion did not contain a usable JSON array.
    Malformed(PipelineError),
    /// The generation API could not be reached or refused the request.
    Unavailable(PipelineError),
}

impl Aggregation {
    /// Flatten to the list shown to readers. Failures become an empty list.
    pub fn into_articles(self) -> Vec<Article> {
        match self {
            Aggregation::Articles { articles, .. } => articles,
            Aggregation::NoArticles | Aggregation::Malformed(_) | Aggregation::Unavailable(_) => {
                Vec::new()
            }
        }
    }

    fn from_error(e: PipelineError) -> Self {
        match e {
            PipelineError::MalformedResponse(_) => Aggregation::Malformed(e),
            _ => Aggregation::Unavailable(e),
        }
    }
}

pub struct NewsAggregator<G, P> {
    generator: G,
    resolver: ImageResolver<P>,
    request: GenerationRequest,
    image_concurrency: usize,
}

impl<G, P> NewsAggregator<G, P>
where
    G: GenerationClient,
    P: PhotoSearch,
{
    /// Assemble a pipeline from its parts.
    ///
    /// # Arguments
    ///
    /// * `generator` - Client used for the single generation call per run
    /// * `resolver` - Fills in missing images
    /// * `request` - The fixed request sent on every run
    /// * `image_concurrency` - Maximum overlapping image lookups (at least 1)
    pub fn new(
        generator: G,
        resolver: ImageResolver<P>,
        request: GenerationRequest,
        image_concurrency: usize,
    ) -> Self {
        Self {
            generator,
            resolver,
            request,
            image_concurrency: image_concurrency.max(1),
        }
    }

    /// Run the full pipeline once.
    #[instrument(level = "info", skip_all)]
    pub async fn aggregate(&self) -> Aggregation {
        let t0 = Instant::now();

        let text = match self.generator.generate(&self.request).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Generation request failed; serving no articles");
                return Aggregation::from_error(e);
            }
        };

        let values = match extract_records(&text, self.request.payload_format()) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Could not extract articles from completion");
                return Aggregation::from_error(e);
            }
        };

        if values.is_empty() {
            info!("Model returned an empty article list");
            return Aggregation::NoArticles;
        }

        let total = values.len();
        let records: Vec<RawArticleRecord> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match RawArticleRecord::try_from(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unusable article record");
                    None
                }
            })
            .collect();
        let skipped = total - records.len();

        // `buffered` keeps upstream order while lookups overlap.
        let articles: Vec<Article> = stream::iter(records.iter())
            .map(|raw| self.resolver.resolve(normalize(raw), raw))
            .buffered(self.image_concurrency)
            .collect()
            .await;

        info!(
            total,
            built = articles.len(),
            skipped,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregated articles"
        );
        Aggregation::Articles { articles, skipped }
    }
}
