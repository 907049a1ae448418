//! One-time cookie consent banner state.

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    /// Not decided yet; the banner is shown.
    #[default]
    Pending,
    /// Accepted for the rest of the session; the banner is hidden.
    Accepted,
}

/// Session-scoped consent flag.
///
/// Moves from [`ConsentState::Pending`] to [`ConsentState::Accepted`] once.
/// There is no way back and no rejection path.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConsentGate {
    state: ConsentState,
}

impl ConsentGate {
    /// A gate in [`ConsentState::Pending`], banner shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the banner should be drawn.
    pub fn is_visible(&self) -> bool {
        self.state == ConsentState::Pending
    }

    /// Accept and hide the banner. Accepting again is a no-op.
    pub fn accept(&mut self) {
        if self.state == ConsentState::Pending {
            self.state = ConsentState::Accepted;
            info!("Cookie consent accepted");
        }
    }
}
