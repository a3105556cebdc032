//! Command-line interface definitions for Tech News.
//!
//! Credentials can be passed as flags or through the environment. They are
//! optional at the parser level so that startup can report every missing key
//! in one message (see [`crate::config::Credentials::new`]).

use clap::Parser;

/// Command-line arguments for the Tech News application.
///
/// # Examples
///
/// ```sh
/// # Print the current feed as JSON
/// GEMINI_API_KEY=... UNSPLASH_ACCESS_KEY=... tech_news
///
/// # Write JSON and Markdown, refreshing every minute
/// tech_news -j ./json -m ./markdown --watch --interval-secs 60
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Unsplash access key
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub unsplash_access_key: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for news.json (prints to stdout when omitted)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for news.md
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Keep running and rewrite the outputs on every tick
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between ticks in watch mode
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
}
