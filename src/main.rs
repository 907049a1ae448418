//! # SheldonNews
//!
//! A terminal front page for the current top Hacker News stories, with
//! per-story like counters, a light/dark colour mode and a one-time cookie
//! consent banner.
//!
//! ## Usage
//!
//! ```sh
//! sheldon_news                 # interactive
//! sheldon_news --once --json   # load, print as JSON, exit
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`api`]): ranked ids, then every story detail
//!    concurrently, joined all-or-nothing in ranked order
//! 2. **Coordination** ([`coordinator`]): owns the displayed list and the
//!    like counters; only the latest-started load may replace them
//! 3. **Rendering** ([`view`], [`outputs`]): snapshot of the page drawn as
//!    text or JSON
//!
//! Likes, theme and consent live only for the session.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cli;
mod consent;
mod coordinator;
mod error;
mod models;
mod outputs;
mod theme;
mod utils;
mod view;

use api::HackerNewsClient;
use app::{App, OutputFormat};
use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // stdout carries the rendered page, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sheldon_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let client = match HackerNewsClient::new(&args.api_base_url, args.timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!(base_url = %args.api_base_url, error = %e, "Could not build API client");
            return Err(e.into());
        }
    };
    info!(base_url = %client.base_url(), limit = args.story_limit(), "API client ready");

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text {
            color: !args.no_color,
        }
    };
    let app = App::new(client, args.story_limit(), args.theme, format);

    if args.once {
        app.run_once().await?;
    } else {
        app.run().await?;
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Session complete");
    Ok(())
}
