//! Outcome feedback: conversion stats, reply sentiment and research
//! corrections.
//!
//! Everything here reads history snapshots handed in by the caller. The
//! store is never queried from inside the tracker, and research artifacts
//! are never modified; corrections go to an append-only log.

mod ab;
mod corrections;
mod sentiment;
mod stats;

pub use ab::{
    assign_ab_groups, group_descriptions, AbAssignment, AbCandidate, AbGroup, AB_VARIABLES,
};
pub use corrections::{
    assess_correction_impact, detect_contradictions, Contradiction, CorrectionEvent,
    CorrectionImpact, CorrectionLog, DEFAULT_CORRECTION_THRESHOLD,
};
pub use sentiment::{score_reply_sentiment, ReplyAction, SentimentResult, SENTIMENT_CATEGORIES};
pub use stats::{
    generate_feedback_report, get_conversion_stats, get_winning_patterns, proof_point_preference,
    Breakdown, ConversionStats, PatternConfidence, Recommendation, Totals, WinningPatterns,
    UNKNOWN_BUCKET,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sent touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchRecord {
    /// Unique touch id; recording the same id twice is a no-op.
    pub id: String,
    /// Contact the touch went to.
    pub contact_id: String,
    /// `linkedin`, `email` or `phone`.
    #[serde(default)]
    pub channel: Option<String>,
    /// Position in the sequence.
    #[serde(default)]
    pub touch_number: Option<u8>,
    /// Proof-point key cited.
    #[serde(default)]
    pub proof_point_used: Option<String>,
    /// Pain the touch led with.
    #[serde(default)]
    pub pain_hook: Option<String>,
    /// Where the opener's hook came from.
    #[serde(default)]
    pub opener_style: Option<String>,
    /// A/B arm, when the contact is in an experiment.
    #[serde(default)]
    pub ab_group: Option<String>,
    /// When the touch went out.
    pub sent_at: DateTime<Utc>,
}

/// A prospect reply, optionally attributed to the touch it answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyRecord {
    /// Touch the reply answers, when known.
    #[serde(default)]
    pub touchpoint_id: Option<String>,
    /// Contact who replied.
    pub contact_id: String,
    /// `positive`, `negative`, `neutral`, `referral` or `out_of_office`.
    pub intent: String,
    /// Reply text.
    #[serde(default)]
    pub text: String,
    /// When the reply arrived.
    pub replied_at: DateTime<Utc>,
}

impl ReplyRecord {
    /// Positive and referral replies both count as wins.
    pub fn is_positive(&self) -> bool {
        matches!(self.intent.as_str(), "positive" | "referral")
    }
}

/// A booked meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// Contact the meeting is with.
    pub contact_id: String,
    /// When the meeting was booked.
    pub created_at: DateTime<Utc>,
}

/// Everything the tracker aggregates over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackHistory {
    /// Sent touches.
    pub touches: Vec<TouchRecord>,
    /// Replies received.
    pub replies: Vec<ReplyRecord>,
    /// Meetings booked.
    pub meetings: Vec<MeetingRecord>,
}
