//! Reply sentiment on a continuous -1 to +1 scale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::research::inference::{has_keyword, normalize};

/// Keyword category: `(name, score, keywords)`, in match priority order.
pub type SentimentCategory = (&'static str, f64, &'static [&'static str]);

/// Strong signals are checked before mild ones.
pub const SENTIMENT_CATEGORIES: [SentimentCategory; 7] = [
    (
        "strong_negative",
        -0.9,
        &[
            "not interested",
            "stop",
            "unsubscribe",
            "remove me",
            "do not contact",
            "don't contact",
            "no thanks",
            "please stop",
            "wrong person",
        ],
    ),
    (
        "strong_positive",
        0.9,
        &[
            "yes",
            "let's schedule",
            "let's chat",
            "let's connect",
            "interested",
            "love to",
            "sounds great",
            "book a time",
            "available",
            "set up a call",
            "looking forward",
        ],
    ),
    (
        "out_of_office",
        0.0,
        &[
            "out of office",
            "ooo",
            "on vacation",
            "on leave",
            "will be back",
            "return on",
            "away from",
        ],
    ),
    (
        "referral",
        0.3,
        &[
            "talk to",
            "reach out to",
            "contact my colleague",
            "try reaching",
            "better person",
            "connect you with",
        ],
    ),
    (
        "mild_negative",
        -0.5,
        &[
            "not right now",
            "not the right time",
            "maybe later",
            "busy right now",
            "check back",
            "not a priority",
            "already have",
            "we use",
            "happy with",
        ],
    ),
    (
        "mild_positive",
        0.5,
        &[
            "maybe",
            "could be",
            "tell me more",
            "send me more",
            "share more",
            "good timing",
            "open to",
            "curious",
            "worth exploring",
            "interesting",
        ],
    ),
    (
        "neutral",
        0.0,
        &[
            "thanks for reaching out",
            "noted",
            "received",
            "will review",
            "let me think",
            "not sure",
        ],
    ),
];

/// Replies shorter than this are harder to read.
const SHORT_REPLY_CHARS: usize = 10;

/// What to do next with the prospect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAction {
    /// Positive reply ready for a meeting.
    ScheduleMeeting,
    /// Interested but wants material first.
    SendMoreInfo,
    /// Neutral or timing pushback.
    FollowUpLater,
    /// Negative, stop the sequence for now.
    PauseSequence,
    /// Opted out, do not contact.
    MarkDnc,
    /// Too short or ambiguous to act on.
    ReviewManually,
}

impl ReplyAction {
    /// From a matched sentiment score.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            ReplyAction::ScheduleMeeting
        } else if score >= 0.3 {
            ReplyAction::SendMoreInfo
        } else if score >= -0.3 {
            ReplyAction::FollowUpLater
        } else if score >= -0.7 {
            ReplyAction::PauseSequence
        } else {
            ReplyAction::MarkDnc
        }
    }

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyAction::ScheduleMeeting => "schedule_meeting",
            ReplyAction::SendMoreInfo => "send_more_info",
            ReplyAction::FollowUpLater => "follow_up_later",
            ReplyAction::PauseSequence => "pause_sequence",
            ReplyAction::MarkDnc => "mark_dnc",
            ReplyAction::ReviewManually => "review_manually",
        }
    }
}

impl fmt::Display for ReplyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scored reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Score in -1.0 to 1.0.
    pub sentiment_score: f64,
    /// Label band for the score.
    pub sentiment_label: String,
    /// Winning category, `"none"` for empty text, `"inferred_from_intent"`
    /// when no keyword matched.
    pub matched_category: String,
    /// Confidence in 0.0 to 1.0.
    pub confidence: f64,
    /// Reply intent the score implies.
    pub suggested_intent: String,
    /// Next step for the prospect.
    pub action: ReplyAction,
}

fn sentiment_label(score: f64) -> &'static str {
    if score >= 0.7 {
        "very_positive"
    } else if score >= 0.3 {
        "positive"
    } else if score >= -0.3 {
        "neutral"
    } else if score >= -0.7 {
        "negative"
    } else {
        "very_negative"
    }
}

fn intent_score(intent: &str) -> f64 {
    match intent {
        "positive" => 0.5,
        "negative" => -0.5,
        "referral" => 0.3,
        _ => 0.0,
    }
}

fn or_neutral(intent: &str) -> String {
    if intent.trim().is_empty() {
        "neutral".to_string()
    } else {
        intent.to_string()
    }
}

/// Score a reply.
///
/// Categories are scanned in priority order and each contributes at most
/// one match, longest keyword first. The category with the largest absolute
/// score wins; earlier categories win ties.
pub fn score_reply_sentiment(reply_text: &str, existing_intent: &str) -> SentimentResult {
    let trimmed = reply_text.trim();
    if trimmed.is_empty() {
        return SentimentResult {
            sentiment_score: 0.0,
            sentiment_label: "unknown".to_string(),
            matched_category: "none".to_string(),
            confidence: 0.0,
            suggested_intent: or_neutral(existing_intent),
            action: ReplyAction::ReviewManually,
        };
    }

    let text = normalize(trimmed);
    let mut best: Option<(&str, f64)> = None;
    let mut matched = 0usize;
    for (category, score, keywords) in SENTIMENT_CATEGORIES.iter() {
        let mut sorted: Vec<&str> = keywords.to_vec();
        sorted.sort_by_key(|k| std::cmp::Reverse(k.len()));
        if sorted.iter().any(|kw| has_keyword(&text, kw)) {
            matched += 1;
            let replace = match best {
                None => true,
                Some((_, current)) => score.abs() > current.abs(),
            };
            if replace {
                best = Some((category, *score));
            }
        }
    }

    let Some((category, score)) = best else {
        let score = intent_score(existing_intent);
        return SentimentResult {
            sentiment_score: score,
            sentiment_label: sentiment_label(score).to_string(),
            matched_category: "inferred_from_intent".to_string(),
            confidence: 0.3,
            suggested_intent: or_neutral(existing_intent),
            action: ReplyAction::ReviewManually,
        };
    };

    let mut confidence = (0.5 + matched as f64 * 0.15).min(0.95);
    if trimmed.chars().count() < SHORT_REPLY_CHARS {
        confidence = confidence.min(0.6);
    }

    let suggested_intent = if score >= 0.3 {
        "positive"
    } else if score <= -0.3 {
        "negative"
    } else if category == "referral" || category == "out_of_office" {
        category
    } else {
        "neutral"
    };

    SentimentResult {
        sentiment_score: score,
        sentiment_label: sentiment_label(score).to_string(),
        matched_category: category.to_string(),
        confidence: (confidence * 100.0).round() / 100.0,
        suggested_intent: suggested_intent.to_string(),
        action: ReplyAction::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_request_is_very_positive() {
        let r = score_reply_sentiment("Sounds great, let's schedule something next week", "");
        assert_eq!(r.matched_category, "strong_positive");
        assert_eq!(r.sentiment_score, 0.9);
        assert_eq!(r.sentiment_label, "very_positive");
        assert_eq!(r.action, ReplyAction::ScheduleMeeting);
        assert_eq!(r.suggested_intent, "positive");
    }

    #[test]
    fn test_strong_negative_outranks_everything() {
        let r = score_reply_sentiment("Not interested, please remove me from your list", "");
        assert_eq!(r.matched_category, "strong_negative");
        assert_eq!(r.action, ReplyAction::MarkDnc);
        assert_eq!(r.sentiment_label, "very_negative");
    }

    #[test]
    fn test_maybe_later_is_mild_negative_not_positive() {
        let r = score_reply_sentiment("Maybe later in the year, we're slammed", "");
        // mild_negative and mild_positive both match; equal magnitude keeps
        // the higher-priority category.
        assert_eq!(r.matched_category, "mild_negative");
        assert_eq!(r.action, ReplyAction::PauseSequence);
        assert_eq!(r.confidence, 0.8);
    }

    #[test]
    fn test_out_of_office_and_referral() {
        let ooo = score_reply_sentiment("I am out of office until Monday", "");
        assert_eq!(ooo.matched_category, "out_of_office");
        assert_eq!(ooo.suggested_intent, "out_of_office");
        assert_eq!(ooo.action, ReplyAction::FollowUpLater);

        let referral = score_reply_sentiment("You should talk to our QA lead Priya", "");
        assert_eq!(referral.matched_category, "referral");
        assert_eq!(referral.suggested_intent, "positive");
        assert_eq!(referral.action, ReplyAction::SendMoreInfo);
    }

    #[test]
    fn test_whole_word_matching() {
        // "eyes" must not read as "yes", "stopwatch" not as "stop"
        let r = score_reply_sentiment("Our eyes are on the stopwatch metrics", "neutral");
        assert_eq!(r.matched_category, "inferred_from_intent");
        assert_eq!(r.confidence, 0.3);
        assert_eq!(r.action, ReplyAction::ReviewManually);
    }

    #[test]
    fn test_empty_and_short_replies() {
        let empty = score_reply_sentiment("   ", "positive");
        assert_eq!(empty.sentiment_label, "unknown");
        assert_eq!(empty.suggested_intent, "positive");
        assert_eq!(empty.action, ReplyAction::ReviewManually);

        let short = score_reply_sentiment("Yes", "");
        assert_eq!(short.matched_category, "strong_positive");
        assert!(short.confidence <= 0.6);
    }

    #[test]
    fn test_unmatched_falls_back_to_existing_intent() {
        let r = score_reply_sentiment("Forwarded internally.", "negative");
        assert_eq!(r.sentiment_score, -0.5);
        assert_eq!(r.sentiment_label, "negative");
        assert_eq!(r.suggested_intent, "negative");
    }

    #[test]
    fn test_scores_stay_in_range() {
        for (_, score, _) in SENTIMENT_CATEGORIES {
            assert!((-1.0..=1.0).contains(&score));
        }
    }
}
