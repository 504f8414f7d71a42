//! Per-user presentation preference.
//!
//! The theme is an explicit value owned by each user's settings record and
//! handed to whoever renders; nothing here is process-global.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Used when neither a saved preference nor a client hint is available.
    pub const FALLBACK: Theme = Theme::Dark;

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(DomainError::field("theme", format!("unknown theme '{other}'"))),
        }
    }
}

/// A user's theme preference as stored.
///
/// `saved` is `None` until the user picks a theme explicitly; until then the
/// client's system preference wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub saved: Option<Theme>,
}

impl ThemePreference {
    pub fn explicit(theme: Theme) -> Self {
        Self { saved: Some(theme) }
    }

    /// Effective theme given the client's system preference, if it sent one.
    pub fn resolve(&self, system: Option<Theme>) -> Theme {
        self.saved.or(system).unwrap_or(Theme::FALLBACK)
    }

    /// Flip the effective theme and pin the result as an explicit choice.
    pub fn toggle(&self, system: Option<Theme>) -> Self {
        Self::explicit(self.resolve(system).toggled())
    }
}
