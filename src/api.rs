//! Two-stage retrieval of top stories from the Hacker News API.
//!
//! # Architecture
//!
//! - [`StorySource`]: the two read-only endpoints as a trait, so the
//!   coordinator can be driven by the real API or by an in-memory fake
//! - [`HackerNewsClient`]: `reqwest` implementation against the Firebase API
//! - [`fetch_top_stories`]: ranked ids first, then every detail request
//!   concurrently, joined as one all-or-nothing batch
//!
//! # Ordering
//!
//! Detail requests complete in any order. The joined result follows the
//! ranked id list, never completion order.
//!
//! There is deliberately no retry here. A caller that wants resilience wraps
//! the call.

use crate::error::FetchError;
use crate::models::{Story, StoryId, StoryList};
use crate::utils::truncate_for_log;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Public Firebase endpoint of the Hacker News API.
pub const DEFAULT_API_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

/// The two endpoints the fetcher consumes.
///
/// Implementors must be cheap to call concurrently: [`fetch_top_stories`]
/// issues every `story` request at once.
pub trait StorySource {
    /// Full ranked list of story ids from the top-stories endpoint.
    fn top_story_ids(&self) -> impl Future<Output = Result<Vec<StoryId>, FetchError>> + Send;

    /// A single story from the detail endpoint.
    fn story(&self, id: StoryId) -> impl Future<Output = Result<Story, FetchError>> + Send;
}

/// `reqwest`-backed [`StorySource`].
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HackerNewsClient {
    /// Build a client rooted at `base_url`.
    ///
    /// A missing trailing slash is added so that endpoint paths join below
    /// the base instead of replacing its last segment. `timeout` of `None`
    /// leaves the transport defaults in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| FetchError::Transport {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self { http, base_url })
    }

    /// The root every endpoint path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.base_url.join(path)?;
        let t0 = Instant::now();

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success status from API");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched API body"
        );

        serde_json::from_str(&body).map_err(|source| {
            warn!(
                %url,
                error = %source,
                body_preview = %truncate_for_log(&body, 200),
                "API returned malformed JSON"
            );
            FetchError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}

impl StorySource for HackerNewsClient {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>, FetchError> {
        self.get_json("topstories.json").await
    }

    async fn story(&self, id: StoryId) -> Result<Story, FetchError> {
        // Deleted or unknown items come back as a literal `null`.
        let item: Option<Story> = self.get_json(&format!("item/{id}.json")).await?;
        item.ok_or(FetchError::MissingItem(id))
    }
}

/// Fetch the first `limit` top stories in ranked order.
///
/// # Errors
///
/// Fails with the first [`FetchError`] from either stage. A single failed
/// detail request fails the whole batch; remaining requests are dropped.
#[instrument(level = "info", skip(source))]
pub async fn fetch_top_stories<S>(source: &S, limit: usize) -> Result<StoryList, FetchError>
where
    S: StorySource + Sync,
{
    let t0 = Instant::now();

    let mut ids = source.top_story_ids().await?;
    let available = ids.len();
    ids.truncate(limit);
    debug!(available, kept = ids.len(), "Truncated ranked id list");

    let stories = try_join_all(ids.iter().map(|&id| source.story(id))).await?;

    info!(
        count = stories.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched top stories"
    );
    Ok(stories)
}
