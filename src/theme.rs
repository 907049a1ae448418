//! Light/dark colour mode.
//!
//! The theme is an explicit value owned by `main` and handed to the
//! renderer; nothing reads it from global state.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// ANSI colours used by the text renderer.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                header: "\x1b[1;30;47m",
                title: "\x1b[1;30m",
                muted: "\x1b[90m",
                accent: "\x1b[31m",
                banner: "\x1b[97;44m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Palette {
                header: "\x1b[1;97;40m",
                title: "\x1b[1;97m",
                muted: "\x1b[37m",
                accent: "\x1b[91m",
                banner: "\x1b[97;44m",
                reset: "\x1b[0m",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Escape sequences for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub header: &'static str,
    pub title: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
    pub banner: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// Palette that emits nothing, for output that is not a terminal.
    pub const PLAIN: Palette = Palette {
        header: "",
        title: "",
        muted: "",
        accent: "",
        banner: "",
        reset: "",
    };
}
