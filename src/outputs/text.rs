//! Terminal rendering of the page view.
//!
//! Layout, top to bottom: header with tagline, status line, one block per
//! card, and the consent banner while it is still pending.

use crate::theme::Palette;
use crate::utils::ellipsize;
use crate::view::{PageView, StoryCard};
use std::fmt::{self, Write};

pub const SITE_NAME: &str = "SheldonNews";
pub const TAGLINE: &str =
    "Discover the future of technology today and be part of the conversation that shapes our tomorrow.";
pub const CONSENT_NOTICE: &str =
    "We use cookies to ensure you get the best experience on our website. Type `accept` to continue.";

const MAX_TITLE_CHARS: usize = 96;

/// Render `page` with the given palette.
///
/// # Arguments
///
/// * `page` - Snapshot to draw
/// * `palette` - Colours of the active theme, or [`Palette::PLAIN`]
///
/// # Errors
///
/// Propagates the `fmt::Error` of a failed write into the buffer.
pub fn render_page(page: &PageView, palette: Palette) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let p = palette;

    writeln!(out, "{}  {}  {}", p.header, SITE_NAME, p.reset)?;
    writeln!(out, "{}{}{}", p.muted, TAGLINE, p.reset)?;
    writeln!(out)?;

    if page.feed.loading {
        writeln!(out, "{}Loading stories…{}", p.muted, p.reset)?;
    }
    if let Some(error) = &page.feed.error {
        writeln!(out, "{}Could not load stories: {}{}", p.accent, error, p.reset)?;
    }
    if page.feed.cards.is_empty() && !page.feed.loading {
        writeln!(out, "{}No stories to show.{}", p.muted, p.reset)?;
    }

    for (rank, card) in page.feed.cards.iter().enumerate() {
        render_card(&mut out, rank + 1, card, p)?;
    }

    if page.consent.visible {
        writeln!(out)?;
        writeln!(out, "{} {} {}", p.banner, CONSENT_NOTICE, p.reset)?;
    }
    Ok(out)
}

fn render_card(out: &mut String, rank: usize, card: &StoryCard, p: Palette) -> fmt::Result {
    let title = if card.title.is_empty() {
        "(untitled)".to_string()
    } else {
        ellipsize(&card.title, MAX_TITLE_CHARS)
    };
    writeln!(out, "{:>2}. {}{}{}", rank, p.title, title, p.reset)?;
    writeln!(
        out,
        "    {}{}{}  {}♥ {}{}  {}[id {}]{}",
        p.muted, card.formatted_date, p.reset, p.accent, card.like_count, p.reset, p.muted, card.id, p.reset
    )
}
