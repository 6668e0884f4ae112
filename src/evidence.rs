//! Evidence primitives.
//!
//! Every personalized claim carries an [`Evidence`] naming the concrete
//! field or document it came from. "No evidence" is its own variant, so an
//! ungrounded fact cannot masquerade as a sourced one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label written for ungrounded facts when rendered as plain text.
pub const UNGROUNDED_LABEL: &str = "unknown - hypothesis only";

/// Words that mark a source string as a placeholder rather than a source.
const GENERIC_MARKERS: [&str; 8] = [
    "hypothesis",
    "assumption",
    "assumed",
    "generic",
    "guess",
    "unknown",
    "n/a",
    "tbd",
];

/// Where a fact came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Evidence {
    /// Backed by a named source, e.g. `from CRM field: title`.
    Grounded { source: String },
    /// No source; a hypothesis only.
    Ungrounded,
}

impl Evidence {
    /// Evidence from any named source.
    pub fn grounded(source: impl Into<String>) -> Self {
        Evidence::Grounded {
            source: source.into(),
        }
    }

    /// `from CRM field: <field>`
    pub fn crm_field(field: &str) -> Self {
        Self::grounded(format!("from CRM field: {}", field))
    }

    /// `from person research: <field>`
    pub fn person_research(field: &str) -> Self {
        Self::grounded(format!("from person research: {}", field))
    }

    /// `from company research: <field>`
    pub fn company_research(field: &str) -> Self {
        Self::grounded(format!("from company research: {}", field))
    }

    /// The source string, when grounded.
    pub fn source(&self) -> Option<&str> {
        match self {
            Evidence::Grounded { source } => Some(source.as_str()),
            Evidence::Ungrounded => None,
        }
    }

    /// Grounded with a non-blank source that is not the ungrounded label.
    pub fn is_grounded(&self) -> bool {
        match self {
            Evidence::Grounded { source } => {
                let trimmed = source.trim();
                !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(UNGROUNDED_LABEL)
            }
            Evidence::Ungrounded => false,
        }
    }

    /// Grounded in something specific enough to back a high-confidence claim.
    pub fn is_substantive(&self) -> bool {
        let Some(source) = self.source().filter(|_| self.is_grounded()) else {
            return false;
        };
        let lower = source.trim().to_lowercase();
        if lower.len() < 8 || lower.ends_with(':') {
            return false;
        }
        !GENERIC_MARKERS.iter().any(|marker| lower.contains(marker))
    }

    /// The source, or the ungrounded label.
    pub fn label(&self) -> &str {
        self.source()
            .filter(|_| self.is_grounded())
            .unwrap_or(UNGROUNDED_LABEL)
    }

    /// Whether the source mentions `needle` (case-insensitive).
    pub fn mentions(&self, needle: &str) -> bool {
        self.source()
            .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value paired with its evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidenced<T> {
    /// The value.
    pub value: T,
    /// Where it came from.
    pub evidence: Evidence,
}

impl<T> Evidenced<T> {
    /// Pair a value with evidence.
    pub fn new(value: T, evidence: Evidence) -> Self {
        Self { value, evidence }
    }
}
