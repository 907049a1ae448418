//! Read-only snapshot of everything a renderer needs.
//!
//! Views are rebuilt from the [`Coordinator`], [`ConsentGate`] and [`Theme`]
//! after every event. The actions a renderer offers (like, refresh, accept)
//! are carried out by calling back into those owners with the ids exposed
//! here, never by mutating a view.

use crate::consent::ConsentGate;
use crate::coordinator::Coordinator;
use crate::models::{Story, StoryId};
use crate::theme::Theme;
use chrono::DateTime;
use serde::Serialize;

/// One card in the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryCard {
    pub id: StoryId,
    pub title: String,
    pub formatted_date: String,
    pub like_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub cards: Vec<StoryCard>,
    pub loading: bool,
    /// Set when the latest load failed. The cards are from the last good load.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsentView {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub theme: Theme,
    pub feed: FeedView,
    pub consent: ConsentView,
}

impl PageView {
    pub fn build(coordinator: &Coordinator, consent: &ConsentGate, theme: Theme) -> Self {
        Self {
            theme,
            feed: FeedView::build(coordinator),
            consent: ConsentView {
                visible: consent.is_visible(),
            },
        }
    }
}

impl FeedView {
    pub fn build(coordinator: &Coordinator) -> Self {
        let cards = coordinator
            .stories()
            .iter()
            .map(|story| StoryCard::build(story, coordinator.like_count(story.id).unwrap_or(0)))
            .collect();
        Self {
            cards,
            loading: coordinator.is_loading(),
            error: coordinator.last_error().map(str::to_string),
        }
    }
}

impl StoryCard {
    fn build(story: &Story, like_count: u64) -> Self {
        Self {
            id: story.id,
            title: story.title.clone(),
            formatted_date: format_date(story.time),
            like_count,
        }
    }
}

/// Render Unix seconds as a UTC calendar date, `M/D/YYYY`.
pub fn format_date(unix_seconds: i64) -> String {
    match DateTime::from_timestamp(unix_seconds, 0) {
        Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
        None => "unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::LoadOutcome;

    fn populated() -> Coordinator {
        let mut coordinator = Coordinator::new();
        let ticket = coordinator.begin_load();
        let stories = vec![
            Story {
                id: StoryId(1),
                title: "A".to_string(),
                score: 5,
                time: 1700000000,
                extra: serde_json::Map::new(),
            },
            Story {
                id: StoryId(2),
                title: "B".to_string(),
                score: 3,
                time: 1700000100,
                extra: serde_json::Map::new(),
            },
        ];
        assert_eq!(coordinator.complete_load(ticket, Ok(stories)), LoadOutcome::Applied);
        coordinator
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(1700000000), "11/14/2023");
        assert_eq!(format_date(0), "1/1/1970");
        assert_eq!(format_date(i64::MAX), "unknown date");
    }

    #[test]
    fn test_page_view_reflects_likes_and_consent() {
        let mut coordinator = populated();
        coordinator.like_story(StoryId(1));
        let mut consent = ConsentGate::new();

        let page = PageView::build(&coordinator, &consent, Theme::Dark);
        assert_eq!(page.theme, Theme::Dark);
        assert!(page.consent.visible);
        assert!(!page.feed.loading);
        assert_eq!(page.feed.cards.len(), 2);
        assert_eq!(page.feed.cards[0].like_count, 6);
        assert_eq!(page.feed.cards[0].formatted_date, "11/14/2023");
        assert_eq!(page.feed.cards[1].like_count, 3);

        consent.accept();
        let page = PageView::build(&coordinator, &consent, Theme::Dark);
        assert!(!page.consent.visible);
    }

    #[test]
    fn test_feed_view_loading_flag() {
        let mut coordinator = populated();
        coordinator.begin_load();
        let feed = FeedView::build(&coordinator);
        assert!(feed.loading);
        assert_eq!(feed.cards.len(), 2);
    }
}
