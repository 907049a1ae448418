//! JSON rendering of the page view.

use crate::view::PageView;
use tracing::{debug, instrument};

/// Serialize `page` as pretty-printed JSON.
#[instrument(level = "debug", skip_all, fields(cards = page.feed.cards.len()))]
pub fn render_page(page: &PageView) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(page)?;
    debug!(bytes = json.len(), "Rendered page as JSON");
    Ok(json)
}
