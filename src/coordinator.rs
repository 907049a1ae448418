//! View-state coordination for the story feed.
//!
//! The [`Coordinator`] owns the authoritative [`StoryList`] and the like
//! counters shown next to each story. Counters live in a map keyed by
//! [`StoryId`] rather than inside the stories, so replacing the list resets
//! every counter in one place.
//!
//! # Loading
//!
//! ```text
//! Empty ──begin──▶ Loading ──ok──▶ Populated ──begin──▶ Loading ──ok──▶ Populated
//!                     │                                    │
//!                     └──err──▶ Empty                      └──err──▶ Populated (list kept)
//! ```
//!
//! Every load is tagged with a [`LoadTicket`]. Only the most recently issued
//! ticket may write, so overlapping refreshes resolve as last-initiated-wins
//! regardless of which response arrives first. After [`Coordinator::teardown`]
//! nothing writes at all.

use crate::api::{StorySource, fetch_top_stories};
use crate::error::FetchError;
use crate::models::{DEFAULT_STORY_LIMIT, Story, StoryId, StoryList};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Where the feed is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Populated,
}

/// Token identifying one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Ordinal of the attempt; later attempts have larger values.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`Coordinator::complete_load`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list was replaced and counters reseeded.
    Applied,
    /// The fetch failed; the previous list is still shown.
    Failed,
    /// A newer load was started after this one; the result was dropped.
    Stale,
    /// The coordinator was torn down; the result was dropped.
    Discarded,
}

/// Owner of the displayed story list and its like counters.
///
/// All mutation happens through `&mut self` on the session's single control
/// flow; fetches run elsewhere and hand their results back through
/// [`Coordinator::complete_load`] with the ticket they were started with.
///
/// # Invariants
///
/// - The list never holds more than [`DEFAULT_STORY_LIMIT`] stories.
/// - Every displayed story has exactly one counter, and no other story does.
/// - A list is only ever replaced by one complete fetch, never patched.
#[derive(Debug)]
pub struct Coordinator {
    stories: StoryList,
    likes: HashMap<StoryId, u64>,
    state: LoadState,
    generation: u64,
    in_flight: Option<u64>,
    initialized: bool,
    torn_down: bool,
    last_error: Option<String>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    /// Create an empty, uninitialized coordinator in [`LoadState::Empty`].
    pub fn new() -> Self {
        Self {
            stories: Vec::new(),
            likes: HashMap::new(),
            state: LoadState::Empty,
            generation: 0,
            in_flight: None,
            initialized: false,
            torn_down: false,
            last_error: None,
        }
    }

    /// Stories currently on display, in ranked order.
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Current phase of the load cycle.
    ///
    /// # Returns
    ///
    /// [`LoadState::Loading`] from [`Self::begin_load`] until the newest
    /// attempt completes, then [`LoadState::Populated`] once any list has
    /// been applied.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// `true` while a load started with [`Self::begin_load`] is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Message of the most recent failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current like count for a displayed story.
    ///
    /// # Returns
    ///
    /// `None` when `id` is not part of the current list.
    pub fn like_count(&self, id: StoryId) -> Option<u64> {
        self.likes.get(&id).copied()
    }

    /// Start a load attempt and supersede any attempt still in flight.
    ///
    /// This is the refresh operation: the caller fetches with
    /// [`fetch_top_stories`] and passes the result, with the returned ticket,
    /// to [`Self::complete_load`]. Results carrying an older ticket are
    /// dropped, so the most recently started load wins.
    ///
    /// # Returns
    ///
    /// The ticket that must accompany this attempt's result.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.initialized = true;
        self.generation += 1;
        if let Some(previous) = self.in_flight.replace(self.generation) {
            debug!(previous, current = self.generation, "Superseding in-flight load");
        }
        if !self.torn_down {
            self.state = LoadState::Loading;
        }
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Never propagates the error: a failure keeps whatever list was shown
    /// before the attempt and records the message in [`Self::last_error`].
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket [`Self::begin_load`] issued for this attempt
    /// * `result` - What [`fetch_top_stories`] returned
    ///
    /// # Returns
    ///
    /// The [`LoadOutcome`] saying whether the result was applied, failed, or
    /// dropped as stale or post-teardown.
    #[instrument(level = "info", skip(self, result), fields(generation = ticket.generation))]
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<StoryList, FetchError>,
    ) -> LoadOutcome {
        if self.torn_down {
            debug!("Dropping load result after teardown");
            return LoadOutcome::Discarded;
        }
        if self.in_flight != Some(ticket.generation) {
            debug!(current = ?self.in_flight, "Dropping stale load result");
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(stories) => {
                self.replace_stories(stories);
                self.last_error = None;
                self.state = LoadState::Populated;
                info!(count = self.stories.len(), "Story list replaced");
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, kept = self.stories.len(), "Story fetch failed; keeping previous list");
                self.last_error = Some(e.to_string());
                self.state = if self.stories.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Populated
                };
                LoadOutcome::Failed
            }
        }
    }

    /// Ticket for the startup load, or `None` if any load already started.
    pub fn begin_initialize(&mut self) -> Option<LoadTicket> {
        if self.initialized {
            debug!("initialize() called twice; ignoring");
            return None;
        }
        Some(self.begin_load())
    }

    /// First load after startup, fetched in the foreground.
    ///
    /// Later calls are ignored; refresh with [`Self::begin_load`].
    ///
    /// # Arguments
    ///
    /// * `source` - Where the stories come from
    /// * `limit` - Number of top stories to request, capped at [`DEFAULT_STORY_LIMIT`]
    ///
    /// # Returns
    ///
    /// `None` if a load already happened, otherwise the load's outcome.
    pub async fn initialize<S>(&mut self, source: &S, limit: usize) -> Option<LoadOutcome>
    where
        S: StorySource + Sync,
    {
        let ticket = self.begin_initialize()?;
        let result = fetch_top_stories(source, limit.min(DEFAULT_STORY_LIMIT)).await;
        Some(self.complete_load(ticket, result))
    }

    /// Add one like to a displayed story.
    ///
    /// Touches neither the fetched [`Story`] nor anything remote.
    ///
    /// # Returns
    ///
    /// The new count, or `None` (and no change) when `id` is not displayed.
    pub fn like_story(&mut self, id: StoryId) -> Option<u64> {
        match self.likes.get_mut(&id) {
            Some(count) => {
                *count += 1;
                debug!(%id, likes = *count, "Liked story");
                Some(*count)
            }
            None => {
                debug!(%id, "Like for a story not on display; ignoring");
                None
            }
        }
    }

    /// Stop accepting results. Loads still in flight are dropped on arrival.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
        info!("Coordinator torn down");
    }

    fn replace_stories(&mut self, mut stories: StoryList) {
        if stories.len() > DEFAULT_STORY_LIMIT {
            warn!(
                received = stories.len(),
                cap = DEFAULT_STORY_LIMIT,
                "Load returned more stories than the feed shows; truncating"
            );
            stories.truncate(DEFAULT_STORY_LIMIT);
        }
        self.likes = stories
            .iter()
            .map(|story| (story.id, u64::try_from(story.score).unwrap_or(0)))
            .collect();
        self.stories = stories;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn story(id: u64, title: &str, score: i64, time: i64) -> Story {
        Story {
            id: StoryId(id),
            title: title.to_string(),
            score,
            time,
            extra: serde_json::Map::new(),
        }
    }

    /// Serves queued batches; each batch is one full `fetch_top_stories`.
    /// A story id listed in `fail_ids` fails its detail request.
    #[derive(Default)]
    struct FakeSource {
        batches: Mutex<VecDeque<Vec<Story>>>,
        current: Mutex<Vec<Story>>,
        fail_ids: Mutex<Vec<u64>>,
    }

    impl FakeSource {
        fn with_batches(batches: Vec<Vec<Story>>) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                ..Self::default()
            }
        }

        fn fail_on(self, id: u64) -> Self {
            self.fail_ids.lock().unwrap().push(id);
            self
        }
    }

    impl StorySource for FakeSource {
        async fn top_story_ids(&self) -> Result<Vec<StoryId>, FetchError> {
            let batch = self.batches.lock().unwrap().pop_front().unwrap_or_default();
            let ids = batch.iter().map(|s| s.id).collect();
            *self.current.lock().unwrap() = batch;
            Ok(ids)
        }

        async fn story(&self, id: StoryId) -> Result<Story, FetchError> {
            if self.fail_ids.lock().unwrap().contains(&id.0) {
                return Err(FetchError::MissingItem(id));
            }
            self.current
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or(FetchError::MissingItem(id))
        }
    }

    async fn refresh(coordinator: &mut Coordinator, source: &FakeSource, limit: usize) -> LoadOutcome {
        let ticket = coordinator.begin_load();
        let result = fetch_top_stories(source, limit).await;
        coordinator.complete_load(ticket, result)
    }

    fn scenario_batch() -> Vec<Story> {
        vec![story(1, "A", 5, 1700000000), story(2, "B", 3, 1700000100)]
    }

    #[tokio::test]
    async fn test_initialize_seeds_counters_from_score() {
        let source = FakeSource::with_batches(vec![scenario_batch()]);
        let mut coordinator = Coordinator::new();

        let outcome = coordinator.initialize(&source, 2).await;
        assert_eq!(outcome, Some(LoadOutcome::Applied));
        assert_eq!(coordinator.state(), LoadState::Populated);

        let titles: Vec<&str> = coordinator.stories().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(coordinator.like_count(StoryId(1)), Some(5));
        assert_eq!(coordinator.like_count(StoryId(2)), Some(3));

        assert_eq!(coordinator.like_story(StoryId(1)), Some(6));
        assert_eq!(coordinator.like_count(StoryId(1)), Some(6));
        assert_eq!(coordinator.like_count(StoryId(2)), Some(3));
    }

    #[tokio::test]
    async fn test_likes_count_exactly_and_leave_others_alone() {
        let source = FakeSource::with_batches(vec![scenario_batch()]);
        let mut coordinator = Coordinator::new();
        coordinator.initialize(&source, 10).await;

        for _ in 0..7 {
            coordinator.like_story(StoryId(2));
        }
        assert_eq!(coordinator.like_count(StoryId(2)), Some(10));
        assert_eq!(coordinator.like_count(StoryId(1)), Some(5));
        // The fetched record is untouched.
        assert_eq!(coordinator.stories()[1].score, 3);
    }

    #[tokio::test]
    async fn test_like_unknown_story_is_noop() {
        let source = FakeSource::with_batches(vec![scenario_batch()]);
        let mut coordinator = Coordinator::new();
        coordinator.initialize(&source, 10).await;

        assert_eq!(coordinator.like_story(StoryId(99)), None);
        assert_eq!(coordinator.like_count(StoryId(99)), None);
        assert_eq!(coordinator.stories().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list_and_resets_counters() {
        let second = vec![story(2, "B again", 40, 1700000200), story(3, "C", 1, 1700000300)];
        let source = FakeSource::with_batches(vec![scenario_batch(), second]);
        let mut coordinator = Coordinator::new();
        coordinator.initialize(&source, 10).await;
        coordinator.like_story(StoryId(1));
        coordinator.like_story(StoryId(2));

        assert_eq!(refresh(&mut coordinator, &source, 10).await, LoadOutcome::Applied);

        let ids: Vec<u64> = coordinator.stories().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(coordinator.like_count(StoryId(1)), None);
        assert_eq!(coordinator.like_count(StoryId(2)), Some(40));
        assert_eq!(coordinator.like_count(StoryId(3)), Some(1));
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_list_empty() {
        let source = FakeSource::with_batches(vec![scenario_batch()]).fail_on(2);
        let mut coordinator = Coordinator::new();

        assert_eq!(coordinator.initialize(&source, 2).await, Some(LoadOutcome::Failed));
        assert!(coordinator.stories().is_empty());
        assert_eq!(coordinator.state(), LoadState::Empty);
        assert_eq!(
            coordinator.last_error(),
            Some("story 2 does not exist or was deleted")
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let second = vec![story(8, "X", 1, 1), story(9, "Y", 1, 1)];
        let source = FakeSource::with_batches(vec![scenario_batch(), second]).fail_on(9);
        let mut coordinator = Coordinator::new();
        coordinator.initialize(&source, 10).await;
        coordinator.like_story(StoryId(1));

        assert_eq!(refresh(&mut coordinator, &source, 10).await, LoadOutcome::Failed);
        assert_eq!(coordinator.state(), LoadState::Populated);
        let ids: Vec<u64> = coordinator.stories().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(coordinator.like_count(StoryId(1)), Some(6));
        assert!(coordinator.last_error().is_some());
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let source = FakeSource::with_batches(vec![vec![story(5, "bad", 0, 0)], scenario_batch()])
            .fail_on(5);
        let mut coordinator = Coordinator::new();
        coordinator.initialize(&source, 10).await;
        assert!(coordinator.last_error().is_some());

        refresh(&mut coordinator, &source, 10).await;
        assert_eq!(coordinator.last_error(), None);
        assert_eq!(coordinator.stories().len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let source = FakeSource::with_batches(vec![scenario_batch(), vec![story(3, "C", 1, 1)]]);
        let mut coordinator = Coordinator::new();

        assert!(coordinator.initialize(&source, 10).await.is_some());
        assert_eq!(coordinator.initialize(&source, 10).await, None);
        assert_eq!(coordinator.stories().len(), 2);
    }

    #[test]
    fn test_begin_initialize_only_before_any_load() {
        let mut coordinator = Coordinator::new();
        assert!(coordinator.begin_initialize().is_some());
        assert!(coordinator.begin_initialize().is_none());

        let mut refreshed_first = Coordinator::new();
        refreshed_first.begin_load();
        assert!(refreshed_first.begin_initialize().is_none());
    }

    #[test]
    fn test_last_initiated_load_wins() {
        let mut coordinator = Coordinator::new();
        let first = coordinator.begin_load();
        let second = coordinator.begin_load();
        assert!(coordinator.is_loading());

        // The newer request resolves first, the older one straggles in later.
        let newer = vec![story(2, "new", 9, 0)];
        let older = vec![story(1, "old", 1, 0)];
        assert_eq!(coordinator.complete_load(second, Ok(newer)), LoadOutcome::Applied);
        assert_eq!(coordinator.complete_load(first, Ok(older)), LoadOutcome::Stale);

        assert_eq!(coordinator.stories()[0].title, "new");
        assert_eq!(coordinator.like_count(StoryId(1)), None);
        assert_eq!(coordinator.state(), LoadState::Populated);
    }

    #[test]
    fn test_stale_result_does_not_end_newer_load() {
        let mut coordinator = Coordinator::new();
        let first = coordinator.begin_load();
        let _second = coordinator.begin_load();

        let outcome = coordinator.complete_load(first, Ok(vec![story(1, "old", 1, 0)]));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(coordinator.is_loading());
        assert!(coordinator.stories().is_empty());
    }

    #[test]
    fn test_results_after_teardown_are_discarded() {
        let mut coordinator = Coordinator::new();
        let ticket = coordinator.begin_load();
        coordinator.teardown();

        let outcome = coordinator.complete_load(ticket, Ok(scenario_batch()));
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(coordinator.stories().is_empty());
    }

    #[test]
    fn test_list_is_capped_at_default_limit() {
        let mut coordinator = Coordinator::new();
        let ticket = coordinator.begin_load();
        let many: Vec<Story> = (1..=25).map(|id| story(id, "S", 1, 0)).collect();

        assert_eq!(coordinator.complete_load(ticket, Ok(many)), LoadOutcome::Applied);
        assert_eq!(coordinator.stories().len(), DEFAULT_STORY_LIMIT);
        assert_eq!(coordinator.stories().last().map(|s| s.id), Some(StoryId(10)));
        assert_eq!(coordinator.like_count(StoryId(10)), Some(1));
        assert_eq!(coordinator.like_count(StoryId(11)), None);
    }

    #[tokio::test]
    async fn test_initialize_caps_requested_limit() {
        let many: Vec<Story> = (1..=25).map(|id| story(id, "S", 1, 0)).collect();
        let source = FakeSource::with_batches(vec![many]);
        let mut coordinator = Coordinator::new();

        coordinator.initialize(&source, 25).await;
        assert_eq!(coordinator.stories().len(), DEFAULT_STORY_LIMIT);
    }

    #[test]
    fn test_negative_score_seeds_zero() {
        let mut coordinator = Coordinator::new();
        let ticket = coordinator.begin_load();
        coordinator.complete_load(ticket, Ok(vec![story(1, "A", -4, 0)]));
        assert_eq!(coordinator.like_count(StoryId(1)), Some(0));
    }
}
