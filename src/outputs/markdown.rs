//! Markdown rendering of the article feed.
//!
//! The page has a table of contents followed by one section per article:
//!
//! ```text
//! # Tech News
//!
//! _Updated 2025-05-06T08:00:00+00:00_
//!
//! ## Contents
//!
//! - [Chip shortage eases](#chip-shortage-eases)
//!
//! ## Chip shortage eases
//!
//! *June 2*
//!
//! ![Chip shortage eases](https://images.unsplash.com/...)
//!
//! Foundries report spare capacity.
//! ```
//!
//! Articles without an image simply omit the image line.

use crate::models::{NO_IMAGE_URL, NewsFeed};
use crate::utils::slugify_title;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

pub const MARKDOWN_FILENAME: &str = "news.md";

pub fn feed_to_markdown(feed: &NewsFeed) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Tech News\n");
    let _ = writeln!(md, "_Updated {}_\n", feed.generated_at);

    if feed.articles.is_empty() {
        let _ = writeln!(md, "No news right now. Check back later.");
        return md;
    }

    let _ = writeln!(md, "## Contents\n");
    for article in &feed.articles {
        let _ = writeln!(md, "- [{}](#{})", article.title, slugify_title(&article.title));
    }
    let _ = writeln!(md);

    for article in &feed.articles {
        let _ = writeln!(md, "## {}\n", article.title);
        let _ = writeln!(md, "*{}*\n", article.date);
        if article.image_url != NO_IMAGE_URL {
            let _ = writeln!(md, "![{}]({})\n", article.title, article.image_url);
        }
        let _ = writeln!(md, "{}\n", article.summary);
    }
    md
}

/// Render `feed` to `{markdown_output_dir}/news.md`, replacing any previous file.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_feed(feed: &NewsFeed, markdown_output_dir: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = format!(
        "{}/{}",
        markdown_output_dir.trim_end_matches('/'),
        MARKDOWN_FILENAME
    );
    fs::write(&path, feed_to_markdown(feed)).await?;
    info!(%path, "Wrote Markdown feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;

    fn feed(articles: Vec<Article>) -> NewsFeed {
        NewsFeed {
            generated_at: "2025-05-06T08:00:00+00:00".to_string(),
            articles,
        }
    }

    #[test]
    fn test_markdown_lists_articles_in_order() {
        let md = feed_to_markdown(&feed(vec![
            Article {
                title: "Chip shortage eases".to_string(),
                summary: "Foundries report spare capacity.".to_string(),
                date: "June 2".to_string(),
                image_url: "https://images.unsplash.com/chip".to_string(),
            },
            Article {
                title: "New LTS kernel".to_string(),
                summary: "Six years of support.".to_string(),
                date: "June 3".to_string(),
                image_url: NO_IMAGE_URL.to_string(),
            },
        ]));

        assert!(md.contains("- [Chip shortage eases](#chip-shortage-eases)"));
        assert!(md.contains("![Chip shortage eases](https://images.unsplash.com/chip)"));
        assert!(!md.contains("![New LTS kernel]"));
        assert!(md.contains("*June 3*"));
        let first = md.find("## Chip shortage eases").unwrap();
        let second = md.find("## New LTS kernel").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_markdown_empty_feed() {
        let md = feed_to_markdown(&feed(vec![]));
        assert!(md.contains("No news right now"));
        assert!(!md.contains("## Contents"));
    }
}
