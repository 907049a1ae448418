//! Command-line interface definitions for SheldonNews.
//!
//! All network settings can also come from environment variables.

use crate::api::DEFAULT_API_BASE_URL;
use crate::models::DEFAULT_STORY_LIMIT;
use crate::theme::Theme;
use clap::Parser;
use std::time::Duration;

/// Command-line arguments for SheldonNews.
///
/// # Examples
///
/// ```sh
/// # Interactive feed
/// sheldon_news
///
/// # Load once, print as JSON, exit
/// sheldon_news --once --json
///
/// # Against a local mirror of the API
/// HN_API_BASE_URL=http://localhost:8080/v0/ sheldon_news --theme dark
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the Hacker News API
    #[arg(long, env = "HN_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Number of top stories to show (at most 10)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_STORY_LIMIT as u64,
        value_parser = clap::value_parser!(u64).range(0..=DEFAULT_STORY_LIMIT as u64)
    )]
    pub limit: u64,

    /// Per-request timeout in seconds (transport default when unset)
    #[arg(long, env = "HN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Initial colour mode
    #[arg(short, long, value_enum, default_value_t = Theme::Light)]
    pub theme: Theme,

    /// Load the feed once, render it and exit
    #[arg(long)]
    pub once: bool,

    /// Render the page as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Disable ANSI colours in text output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// The story limit as a count; `--limit` is already bounded by clap.
    pub fn story_limit(&self) -> usize {
        usize::try_from(self.limit).map_or(DEFAULT_STORY_LIMIT, |n| n.min(DEFAULT_STORY_LIMIT))
    }

    /// Per-request timeout, or `None` to keep the transport default.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
