//! Anonymization rule and hierarchy level enums.

use serde::{Deserialize, Serialize};

/// Day count applied when an entity becomes RESTRICTED without any day input.
pub const DEFAULT_RESTRICTION_DAYS: u32 = 30;

/// Whether a document field may be anonymized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    Allowed,
    Restricted,
    NotAllowed,
}

impl Rule {
    /// All rules in display order.
    pub const ALL: [Rule; 3] = [Rule::Allowed, Rule::Restricted, Rule::NotAllowed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Allowed => "ALLOWED",
            Rule::Restricted => "RESTRICTED",
            Rule::NotAllowed => "NOT_ALLOWED",
        }
    }

    /// Human-readable name used in chart slices and notices.
    pub fn display_name(&self) -> &'static str {
        match self {
            Rule::Allowed => "Allowed",
            Rule::Restricted => "Restricted",
            Rule::NotAllowed => "Blocked",
        }
    }
}

/// Tree level of an entity. Doubles as the update endpoint path segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Class,
    Type,
    Label,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Class => "class",
            Level::Type => "type",
            Level::Label => "label",
        }
    }

    /// Inverse of [`Level::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Level::Class),
            "type" => Some(Level::Type),
            "label" => Some(Level::Label),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw day-count input. Only strictly positive integers are accepted.
pub fn parse_days(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|days| *days > 0)
}
