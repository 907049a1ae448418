//! Data models for stories as delivered by the Hacker News API.
//!
//! - [`StoryId`]: opaque identifier issued by the API
//! - [`Story`]: one fetched item, immutable once fetched
//! - [`StoryList`]: the ranked, truncated sequence shown to the reader
//!
//! Fields the feed does not use are kept in [`Story::extra`] so a story
//! round-trips without losing anything the API sent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of stories shown when no explicit limit is configured.
pub const DEFAULT_STORY_LIMIT: usize = 10;

/// Identifier of a story, as issued by the top-stories endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StoryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A story returned by the detail endpoint.
///
/// A new fetch always produces new `Story` values; nothing in the crate
/// mutates one after deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Story {
    /// Identifier issued by the API.
    pub id: StoryId,
    /// Headline. Some item kinds omit it, so it defaults to empty.
    #[serde(default)]
    pub title: String,
    /// Upstream points at fetch time. Seeds the local like counter.
    #[serde(default)]
    pub score: i64,
    /// Submission time in seconds since the Unix epoch.
    pub time: i64,
    /// Every other field the API returned (`by`, `url`, `kids`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Ranked stories, capped at the fetch limit.
pub type StoryList = Vec<Story>;
