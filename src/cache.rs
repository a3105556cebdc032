//! Time-bounded memoization of the aggregated article list.
//!
//! There is exactly one entry, keyed implicitly: the pipeline's request is
//! fixed, so every caller wants the same list. The entry is replaced whole
//! on refresh and never edited in place. Empty results are cached like any
//! other, so a failing upstream is asked at most once per TTL window.

use crate::models::Article;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Source of monotonic time for expiry checks.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The most recent article list and when it was stored.
#[derive(Debug)]
pub struct CacheEntry {
    pub articles: Arc<Vec<Article>>,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) < ttl
    }
}

/// Single-entry cache with a fixed TTL.
///
/// The slot's lock is held while a refresh runs, so concurrent callers on a
/// miss wait for the one in-flight refresh instead of starting their own,
/// and nobody observes a partially built entry.
#[derive(Debug)]
pub struct ResultCache<C = SystemClock> {
    ttl: Duration,
    clock: C,
    slot: Mutex<Option<CacheEntry>>,
}

impl<C: Clock> ResultCache<C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached list if still fresh, otherwise run `refresh`, store
    /// its result, and return that.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Arc<Vec<Article>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Article>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh(self.clock.now(), self.ttl) {
                debug!(count = entry.articles.len(), "Article cache hit");
                return Arc::clone(&entry.articles);
            }
            debug!("Article cache entry expired");
        }

        let articles = Arc::new(refresh().await);
        info!(
            count = articles.len(),
            ttl_secs = self.ttl.as_secs(),
            "Stored fresh article list"
        );
        *slot = Some(CacheEntry {
            articles: Arc::clone(&articles),
            created_at: self.clock.now(),
        });
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            summary: "s".to_string(),
            date: "d".to_string(),
            image_url: "i".to_string(),
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_refresh() {
        let clock = ManualClock::new();
        let cache = ResultCache::new(Duration::from_secs(600), clock.clone());
        let counter = AtomicUsize::new(0);
        let refreshes = &counter;

        let first = cache
            .get_or_refresh(|| async move {
                refreshes.fetch_add(1, Ordering::SeqCst);
                vec![article("a")]
            })
            .await;
        clock.advance(Duration::from_secs(599));
        let second = cache
            .get_or_refresh(|| async move {
                refreshes.fetch_add(1, Ordering::SeqCst);
                vec![article("b")]
            })
            .await;

        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_expired_entry_is_replaced() {
        let clock = ManualClock::new();
        let cache = ResultCache::new(Duration::from_secs(600), clock.clone());

        cache.get_or_refresh(|| async { vec![article("old")] }).await;
        clock.advance(Duration::from_secs(600));
        let fresh = cache.get_or_refresh(|| async { vec![article("new")] }).await;

        assert_eq!(fresh[0].title, "new");
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let clock = ManualClock::new();
        let cache = ResultCache::new(Duration::from_secs(60), clock.clone());

        let first = cache.get_or_refresh(|| async { Vec::new() }).await;
        let second = cache.get_or_refresh(|| async { vec![article("late")] }).await;

        assert!(first.is_empty());
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refreshes() {
        let cache = ResultCache::new(Duration::ZERO, ManualClock::new());
        let counter = AtomicUsize::new(0);
        let refreshes = &counter;
        for _ in 0..3 {
            cache
                .get_or_refresh(|| async move {
                    refreshes.fetch_add(1, Ordering::SeqCst);
                    Vec::new()
                })
                .await;
        }
        assert_eq!(refreshes.load(Ordering::SeqCst), 3);
    }
}
