//! Re-shaping a rendered touch for a specific delivery surface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cta::signoff;
use super::{char_count, truncate_to_limit, word_count, MessageVariant};
use crate::config::ProductConfig;

/// LinkedIn caps connection-request notes at 300 characters.
pub const CONNECTION_NOTE_LIMIT: usize = 300;

/// Where a message will actually be pasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFormat {
    /// Connection request note.
    LinkedinConnection,
    /// Message to a first-degree connection.
    LinkedinMessage,
    /// InMail to someone outside the network.
    LinkedinInmail,
    /// Email.
    Email,
}

impl ChannelFormat {
    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelFormat::LinkedinConnection => "linkedin_connection",
            ChannelFormat::LinkedinMessage => "linkedin_message",
            ChannelFormat::LinkedinInmail => "linkedin_inmail",
            ChannelFormat::Email => "email",
        }
    }

    /// Character ceiling for this surface.
    pub fn char_limit(&self, catalog: &ProductConfig) -> usize {
        match self {
            ChannelFormat::LinkedinConnection => CONNECTION_NOTE_LIMIT,
            ChannelFormat::LinkedinMessage | ChannelFormat::LinkedinInmail => {
                catalog.max_chars.linkedin
            }
            ChannelFormat::Email => catalog.max_chars.email,
        }
    }

    fn has_subjects(&self) -> bool {
        matches!(self, ChannelFormat::LinkedinInmail | ChannelFormat::Email)
    }
}

impl fmt::Display for ChannelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChannelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "linkedin_connection" | "connection" => Ok(ChannelFormat::LinkedinConnection),
            "linkedin_message" | "message" => Ok(ChannelFormat::LinkedinMessage),
            "linkedin_inmail" | "inmail" => Ok(ChannelFormat::LinkedinInmail),
            "email" => Ok(ChannelFormat::Email),
            _ => Err(format!("Unknown channel format: {}", s)),
        }
    }
}

/// A touch ready to paste into one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRendering {
    /// Surface the body was adapted for.
    pub format: ChannelFormat,
    /// Adapted body.
    pub body: String,
    /// Subject candidates, empty where the surface has none.
    pub subject_lines: Vec<String>,
    /// Character ceiling for the surface.
    pub char_limit: usize,
    /// Characters in the body.
    pub char_count: usize,
    /// Words in the body.
    pub word_count: usize,
}

/// Adapt a rendered touch to `format`.
///
/// Connection notes drop the greeting, signoff and P.S. LinkedIn messages
/// and InMails drop the P.S. Email passes through unchanged.
pub fn render_for_channel(
    variant: &MessageVariant,
    format: ChannelFormat,
    catalog: &ProductConfig,
) -> ChannelRendering {
    let sign = signoff(variant.tone, &catalog.sender);
    let paragraphs: Vec<&str> = variant.body.split("\n\n").collect();

    let body = match format {
        ChannelFormat::Email => variant.body.clone(),
        ChannelFormat::LinkedinInmail => without_ps(&paragraphs).join("\n\n"),
        ChannelFormat::LinkedinMessage => {
            let mut kept = without_ps(&paragraphs);
            if let Some(first) = kept.first_mut() {
                if let Some(rest) = first.strip_prefix("Hi ") {
                    *first = format!("Hey {}", rest);
                }
            }
            kept.join("\n\n")
        }
        ChannelFormat::LinkedinConnection => without_ps(&paragraphs)
            .into_iter()
            .filter(|p| !is_greeting(p) && *p != sign)
            .collect::<Vec<_>>()
            .join(" "),
    };

    let char_limit = format.char_limit(catalog);
    let body = truncate_to_limit(&body, char_limit);
    ChannelRendering {
        format,
        subject_lines: if format.has_subjects() {
            variant.subject_lines.clone()
        } else {
            Vec::new()
        },
        char_limit,
        char_count: char_count(&body),
        word_count: word_count(&body),
        body,
    }
}

fn without_ps(paragraphs: &[&str]) -> Vec<String> {
    paragraphs
        .iter()
        .filter(|p| !p.starts_with("P.S."))
        .map(|p| p.to_string())
        .collect()
}

fn is_greeting(paragraph: &str) -> bool {
    (paragraph.starts_with("Hi ") || paragraph.starts_with("Hey ")) && paragraph.ends_with(',')
}
