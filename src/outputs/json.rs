//! JSON output of the article feed.

use crate::models::NewsFeed;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

pub const JSON_FILENAME: &str = "news.json";

/// Write `feed` to `{json_output_dir}/news.json`, replacing any previous file.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_feed(feed: &NewsFeed, json_output_dir: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(feed)?;
    fs::create_dir_all(json_output_dir).await?;

    let path = format!("{}/{}", json_output_dir.trim_end_matches('/'), JSON_FILENAME);
    fs::write(&path, json).await?;
    info!(%path, count = feed.articles.len(), "Wrote JSON feed");
    Ok(())
}
