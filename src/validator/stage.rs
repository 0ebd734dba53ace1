//! # Lifecycle stages.
//!
//! A [`Stage`] tells when a validator is meant to run. The enumeration is
//! closed: unknown tags are rejected by [`FromStr`].

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// When a validator applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Before an addon version is released.
    PreRelease,
    /// After an addon version has been released.
    PostRelease,
}

impl Stage {
    /// Every stage, in lifecycle order.
    pub const ALL: [Stage; 2] = [Stage::PreRelease, Stage::PostRelease];

    /// Canonical tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PreRelease => "pre-release",
            Stage::PostRelease => "post-release",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseError::Stage {
                input: s.to_string(),
            })
    }
}
