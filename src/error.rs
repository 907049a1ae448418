//! Errors raised while talking to the Hacker News API.

use crate::models::StoryId;
use thiserror::Error;

/// Failure of either fetch stage.
///
/// The coordinator catches every variant at its boundary; none of them
/// reach the rendering surface as a crash.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("story {0} does not exist or was deleted")]
    MissingItem(StoryId),

    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
