//! Renderers for a [`PageView`](crate::view::PageView).
//!
//! - [`text`]: the terminal card feed, coloured by the active theme
//! - [`json`]: the same view as JSON, for scripting

pub mod json;
pub mod text;
