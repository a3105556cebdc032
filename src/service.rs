//! The one operation offered to the presentation layer.
//!
//! [`NewsService::get_articles`] never fails: it returns whatever the cache
//! holds, refreshing it through the aggregator when stale.

use crate::aggregator::NewsAggregator;
use crate::api::GenerationClient;
use crate::cache::{Clock, ResultCache, SystemClock};
use crate::images::PhotoSearch;
use crate::models::Article;
use tracing::instrument;

pub struct NewsService<G, P, C = SystemClock> {
    aggregator: NewsAggregator<G, P>,
    cache: ResultCache<C>,
}

impl<G, P, C> NewsService<G, P, C>
where
    G: GenerationClient,
    P: PhotoSearch,
    C: Clock,
{
    pub fn new(aggregator: NewsAggregator<G, P>, cache: ResultCache<C>) -> Self {
        Self { aggregator, cache }
    }

    /// Current article list, possibly empty.
    #[instrument(level = "info", skip_all)]
    pub async fn get_articles(&self) -> Vec<Article> {
        let aggregator = &self.aggregator;
        self.cache
            .get_or_refresh(|| async move { aggregator.aggregate().await.into_articles() })
            .await
            .as_ref()
            .clone()
    }
}
