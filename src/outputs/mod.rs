//! Output generation for the article feed.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`NewsFeed`](crate::models::NewsFeed) as JSON
//! - [`markdown`]: renders the feed as a readable Markdown page
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── news.json
//!
//! markdown_output_dir/
//! └── news.md
//! ```
//!
//! Both files are overwritten on every write.

pub mod json;
pub mod markdown;
