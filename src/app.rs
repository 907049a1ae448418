//! Interactive driver: the composition root for one reading session.
//!
//! [`App`] owns the coordinator, the consent gate and the theme, and passes
//! them explicitly to the renderer. Fetches run as spawned tasks and report
//! back over a channel tagged with their [`LoadTicket`], so the input loop
//! never waits on the network.

use crate::api::{HackerNewsClient, StorySource, fetch_top_stories};
use crate::consent::ConsentGate;
use crate::coordinator::{Coordinator, LoadOutcome, LoadTicket};
use crate::error::FetchError;
use crate::models::{DEFAULT_STORY_LIMIT, StoryId, StoryList};
use crate::outputs::{json, text};
use crate::theme::{Palette, Theme};
use crate::view::PageView;
use std::error::Error;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

pub const HELP: &str = "\
commands:
  r, refresh      reload the top stories
  l, like <id>    like a story
  a, accept       accept cookies and hide the banner
  t, theme        toggle light/dark
  p, print        redraw the page
  h, help         show this help
  q, quit         exit
";

/// A line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Like(StoryId),
    Accept,
    ToggleTheme,
    Print,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),
    #[error("`like` needs a story id")]
    MissingId,
    #[error("`{0}` is not a story id")]
    BadId(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_ascii_lowercase();
        let command = match verb.as_str() {
            "r" | "refresh" => Command::Refresh,
            "l" | "like" => {
                let raw = words.next().ok_or(CommandError::MissingId)?;
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| CommandError::BadId(raw.to_string()))?;
                Command::Like(StoryId(id))
            }
            "a" | "accept" => Command::Accept,
            "t" | "theme" => Command::ToggleTheme,
            "p" | "print" | "" => Command::Print,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(verb)),
        };
        Ok(command)
    }
}

/// How the page is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text { color: bool },
    Json,
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Render,
    Say(String),
    Quit,
}

struct LoadDone {
    ticket: LoadTicket,
    result: Result<StoryList, FetchError>,
}

/// One reading session.
///
/// Owns every piece of session state and is the only thing that mutates it.
/// The type parameter is the story backend; the binary uses
/// [`HackerNewsClient`].
pub struct App<S = HackerNewsClient> {
    source: S,
    limit: usize,
    coordinator: Coordinator,
    consent: ConsentGate,
    theme: Theme,
    format: OutputFormat,
    done_tx: mpsc::UnboundedSender<LoadDone>,
    done_rx: mpsc::UnboundedReceiver<LoadDone>,
}

impl<S> App<S>
where
    S: StorySource + Clone + Send + Sync + 'static,
{
    /// Create a session that has not loaded anything yet.
    ///
    /// # Arguments
    ///
    /// * `source` - Story backend, cloned into every fetch task
    /// * `limit` - Number of top stories per load, capped at [`DEFAULT_STORY_LIMIT`]
    /// * `theme` - Initial colour mode
    /// * `format` - How pages are written to stdout
    pub fn new(source: S, limit: usize, theme: Theme, format: OutputFormat) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            source,
            limit: limit.min(DEFAULT_STORY_LIMIT),
            coordinator: Coordinator::new(),
            consent: ConsentGate::new(),
            theme,
            format,
            done_tx,
            done_rx,
        }
    }

    /// Snapshot of the page as it should be drawn right now.
    pub fn page(&self) -> PageView {
        PageView::build(&self.coordinator, &self.consent, self.theme)
    }

    /// Render the current page in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization or text formatting fails.
    pub fn render(&self) -> Result<String, Box<dyn Error>> {
        let page = self.page();
        match self.format {
            OutputFormat::Json => {
                let mut json = json::render_page(&page)?;
                json.push('\n');
                Ok(json)
            }
            OutputFormat::Text { color } => {
                let palette = if color { self.theme.palette() } else { Palette::PLAIN };
                Ok(text::render_page(&page, palette)?)
            }
        }
    }

    /// Load once in the foreground, print the page and return.
    ///
    /// # Errors
    ///
    /// Fails only when stdout cannot be written; fetch failures are shown
    /// on the page.
    #[instrument(level = "info", skip_all, fields(limit = self.limit))]
    pub async fn run_once(mut self) -> Result<(), Box<dyn Error>> {
        if let Some(outcome) = self.coordinator.initialize(&self.source, self.limit).await {
            info!(?outcome, "Initial load finished");
        }
        self.emit().await?;
        self.coordinator.teardown();
        Ok(())
    }

    /// Interactive session over stdin until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Fails when stdin cannot be read or stdout cannot be written.
    #[instrument(level = "info", skip_all, fields(limit = self.limit))]
    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        self.start();
        self.emit().await?;
        if matches!(self.format, OutputFormat::Text { .. }) {
            self.say(HELP).await?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                Some(done) = self.done_rx.recv() => {
                    let outcome = self.apply_done(done);
                    if matches!(outcome, LoadOutcome::Applied | LoadOutcome::Failed) {
                        self.emit().await?;
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("stdin closed");
                        break;
                    };
                    match self.handle_line(&line) {
                        Flow::Render => self.emit().await?,
                        Flow::Say(message) => self.say(&message).await?,
                        Flow::Quit => break,
                    }
                }
            }
        }

        self.coordinator.teardown();
        Ok(())
    }

    /// Kick off the startup load in the background.
    fn start(&mut self) {
        if let Some(ticket) = self.coordinator.begin_initialize() {
            self.spawn_fetch(ticket);
        }
    }

    /// Hand a finished fetch to the coordinator.
    fn apply_done(&mut self, done: LoadDone) -> LoadOutcome {
        let outcome = self.coordinator.complete_load(done.ticket, done.result);
        debug!(
            generation = done.ticket.generation(),
            ?outcome,
            state = ?self.coordinator.state(),
            "Load finished"
        );
        outcome
    }

    /// Parse and apply one line of input.
    ///
    /// # Returns
    ///
    /// What the loop should do next; parse errors come back as [`Flow::Say`].
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => Flow::Say(format!("{e}\n")),
        }
    }

    /// Apply one command to the session state.
    ///
    /// `Refresh` only starts a fetch; its result arrives later on the
    /// session's channel.
    pub fn handle_command(&mut self, command: Command) -> Flow {
        debug!(?command, "Handling command");
        match command {
            Command::Refresh => {
                let ticket = self.coordinator.begin_load();
                self.spawn_fetch(ticket);
                Flow::Render
            }
            Command::Like(id) => match self.coordinator.like_story(id) {
                Some(_) => Flow::Render,
                None => Flow::Say(format!("story {id} is not on the page\n")),
            },
            Command::Accept => {
                self.consent.accept();
                Flow::Render
            }
            Command::ToggleTheme => {
                self.theme = self.theme.toggle();
                info!(theme = %self.theme, "Theme toggled");
                Flow::Render
            }
            Command::Print => Flow::Render,
            Command::Help => Flow::Say(HELP.to_string()),
            Command::Quit => Flow::Quit,
        }
    }

    fn spawn_fetch(&self, ticket: LoadTicket) {
        let source = self.source.clone();
        let limit = self.limit;
        let tx = self.done_tx.clone();
        debug!(generation = ticket.generation(), "Spawning story fetch");
        tokio::spawn(async move {
            let result = fetch_top_stories(&source, limit).await;
            if tx.send(LoadDone { ticket, result }).is_err() {
                debug!(generation = ticket.generation(), "Session ended before fetch finished");
            }
        });
    }

    async fn emit(&self) -> Result<(), Box<dyn Error>> {
        let rendered = self.render()?;
        self.say(&rendered).await
    }

    async fn say(&self, message: &str) -> Result<(), Box<dyn Error>> {
        let mut stdout = tokio::io::stdout();
        if let Err(e) = stdout.write_all(message.as_bytes()).await {
            warn!(error = %e, "Failed writing to stdout");
            return Err(e.into());
        }
        stdout.flush().await?;
        Ok(())
    }
}
