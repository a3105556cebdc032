//! # Tech News
//!
//! Asks a generative model for a handful of recent tech news summaries,
//! fills in missing thumbnails from a curated photo collection, and serves
//! the result from a time-bounded cache.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... UNSPLASH_ACCESS_KEY=... tech_news -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Generation**: one `generateContent` call with a fixed prompt
//! 2. **Extraction**: the article array is pulled out of the completion text
//! 3. **Normalization**: each record gets placeholders for missing fields
//! 4. **Images**: records without a thumbnail get one from Unsplash
//! 5. **Caching**: the finished list is reused until its TTL runs out
//!
//! Any failure along the way degrades to fewer (or no) articles; it never
//! stops the process once startup has succeeded.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod api;
mod cache;
mod cli;
mod config;
mod error;
mod extract;
#[cfg(test)]
mod fakes;
mod images;
mod models;
mod normalize;
mod outputs;
mod service;
mod utils;

use aggregator::NewsAggregator;
use api::{GeminiClient, GenerationClient, GenerationRequest};
use cache::{Clock, ResultCache, SystemClock};
use cli::Cli;
use config::{Credentials, NewsConfig};
use images::{ImageResolver, PhotoSearch, UnsplashClient};
use models::NewsFeed;
use outputs::{json, markdown};
use service::NewsService;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("tech_news starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.markdown_output_dir, watch = args.watch, "Parsed CLI arguments");

    // ---- Configuration & credentials (fail fast) ----
    let config = NewsConfig::load(args.config.as_deref())?;
    let credentials = Credentials::new(
        args.gemini_api_key.clone(),
        args.unsplash_access_key.clone(),
    )
    .inspect_err(|e| error!(error = %e, "Cannot start without API credentials"))?;

    for dir in [&args.json_output_dir, &args.markdown_output_dir]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    // ---- Pipeline wiring ----
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("tech_news/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let generator = GeminiClient::new(http.clone(), &config.gemini, credentials.gemini_api_key)?;
    let photos = UnsplashClient::new(http, &config.unsplash, credentials.unsplash_access_key)?;
    let aggregator = NewsAggregator::new(
        generator,
        ImageResolver::new(photos, config.unsplash.collection.clone()),
        GenerationRequest::from_settings(&config.gemini),
        config.image_concurrency,
    );
    let service = NewsService::new(aggregator, ResultCache::new(config.cache_ttl(), SystemClock));
    info!(
        model = %config.gemini.model,
        collection = %config.unsplash.collection,
        cache_ttl_secs = config.cache_ttl_secs,
        timeout_secs = config.request_timeout_secs,
        "Pipeline ready"
    );

    if !args.watch {
        return publish(&service, &args).await;
    }

    // ---- Watch mode ----
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = publish(&service, &args).await {
                    error!(error = %e, "Failed to write outputs");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C; shutting down");
                break;
            }
        }
    }
    Ok(())
}

/// Fetch the current articles and write every configured output.
///
/// Without a JSON output directory the feed is printed to stdout.
#[instrument(level = "info", skip_all)]
async fn publish<G, P, C>(service: &NewsService<G, P, C>, args: &Cli) -> Result<(), Box<dyn Error>>
where
    G: GenerationClient,
    P: PhotoSearch,
    C: Clock,
{
    let feed = NewsFeed {
        generated_at: Local::now().to_rfc3339(),
        articles: service.get_articles().await,
    };
    info!(count = feed.articles.len(), "Publishing feed");

    match &args.json_output_dir {
        Some(dir) => json::write_feed(&feed, dir).await?,
        None => println!("{}", serde_json::to_string_pretty(&feed)?),
    }
    if let Some(dir) = &args.markdown_output_dir {
        markdown::write_feed(&feed, dir).await?;
    }
    Ok(())
}
