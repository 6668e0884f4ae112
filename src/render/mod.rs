//! Tone-aware message rendering.
//!
//! Everything here is a pure function of the artifact, the scoring tier and
//! the catalog. Evidence labels never reach the body; hooks and pains are
//! rewritten into prose first.

mod channel;
mod compose;
mod cta;
mod tone;
mod truncate;
mod variants;

pub use channel::{render_for_channel, ChannelFormat, ChannelRendering};
pub use compose::Composer;
pub use cta::{connected_cta, ps_line, signoff, soft_ask};
pub use tone::{
    function_label, pick_opener_hook, pick_value_prop, render_opener, render_pain_sentence,
    short_pain_label,
};
pub use truncate::truncate_to_limit;
pub use variants::{generate_message_variants, VariantMetadata, VariantSet};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::evidence::Evidence;

// ============================================================================
// Tone and channel
// ============================================================================

/// Voice of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Warm, peer to peer.
    #[default]
    Friendly,
    /// Leads with the point.
    Direct,
    /// Question led.
    Curious,
}

impl Tone {
    /// All tones in variant order.
    pub const ALL: [Tone; 3] = [Tone::Friendly, Tone::Direct, Tone::Curious];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Direct => "direct",
            Tone::Curious => "curious",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Ok(Tone::Friendly),
            "direct" => Ok(Tone::Direct),
            "curious" => Ok(Tone::Curious),
            _ => Err(format!("Unknown tone: {}", s)),
        }
    }
}

/// Delivery channel of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// LinkedIn InMail or message.
    #[default]
    Linkedin,
    /// Call cheat sheet.
    Phone,
    /// Email.
    Email,
}

impl Channel {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Linkedin => "linkedin",
            Channel::Phone => "phone",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Channel::Linkedin),
            "phone" | "call" => Ok(Channel::Phone),
            "email" => Ok(Channel::Email),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

// ============================================================================
// Rendered message
// ============================================================================

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageVariant {
    /// Voice of the message.
    pub tone: Tone,
    /// Delivery channel.
    pub channel: Channel,
    /// Position in the sequence.
    pub touch_number: u8,
    /// Empty for call snippets.
    pub subject_lines: Vec<String>,
    /// Message body.
    pub body: String,
    /// Opener clause, empty for touches without one.
    pub opener: String,
    /// Evidence behind the opener's hook.
    pub opener_evidence: Evidence,
    /// Empty only for the break-up touch.
    pub proof_point_key: String,
    /// Short form of the proof point, for draft rows.
    pub proof_point: String,
    /// Pain the message led with; empty when no proof point is cited.
    pub pain_hook: String,
    /// Call to action.
    pub cta: String,
    /// Characters in the body.
    pub char_count: usize,
    /// Whitespace-separated words in the body.
    pub word_count: usize,
}

/// Whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Characters, not bytes.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
