//! Conversion breakdowns and winning-pattern detection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{FeedbackHistory, ReplyRecord, TouchRecord};

/// Bucket for rows with no value in the dimension.
pub const UNKNOWN_BUCKET: &str = "(unknown)";

/// Totals at or above this sample size carry high confidence.
const HIGH_CONFIDENCE_SAMPLE: usize = 50;
const MEDIUM_CONFIDENCE_SAMPLE: usize = 20;

// ============================================================================
// Breakdowns
// ============================================================================

/// Counts and rates for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Touches sent.
    pub sent: usize,
    /// Touches that drew a reply.
    pub replied: usize,
    /// Replies that were positive or a referral.
    pub positive: usize,
    /// Replied over sent.
    pub reply_rate: f64,
    /// Positive over sent.
    pub positive_rate: f64,
}

impl Breakdown {
    /// Rates derived from the counts.
    pub fn new(sent: usize, replied: usize, positive: usize) -> Self {
        Self {
            sent,
            replied,
            positive,
            reply_rate: safe_rate(replied, sent),
            positive_rate: safe_rate(positive, sent),
        }
    }
}

/// Whole-window totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Touches in the window.
    pub touches_sent: usize,
    /// Replies in the window.
    pub replies_received: usize,
    /// Positive or referral replies.
    pub positive_replies: usize,
    /// Meetings booked in the window.
    pub meetings_booked: usize,
    /// Replies over touches.
    pub reply_rate: f64,
    /// Positive replies over touches.
    pub positive_rate: f64,
    /// Meetings over touches.
    pub meeting_rate: f64,
}

/// Conversion stats over one look-back window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Keyed by proof-point key.
    pub by_proof_point: BTreeMap<String, Breakdown>,
    /// Keyed by channel.
    pub by_channel: BTreeMap<String, Breakdown>,
    /// Keyed by touch number.
    pub by_touch_number: BTreeMap<String, Breakdown>,
    /// Keyed by opener hook source.
    pub by_opener_style: BTreeMap<String, Breakdown>,
    /// Keyed by A/B arm.
    pub by_ab_group: BTreeMap<String, Breakdown>,
    /// Whole-window totals.
    pub totals: Totals,
    /// Look-back window length.
    pub period_days: i64,
}

/// Rate rounded to four decimals; zero when nothing was sent.
fn safe_rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 10_000.0).round() / 10_000.0
}

fn bucket_key(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_BUCKET.to_string())
}

fn breakdown(
    touches: &[&TouchRecord],
    reply_by_touch: &HashMap<&str, &ReplyRecord>,
    field: impl Fn(&TouchRecord) -> Option<String>,
) -> BTreeMap<String, Breakdown> {
    let mut counts: BTreeMap<String, (usize, usize, usize)> = BTreeMap::new();
    for touch in touches {
        let entry = counts.entry(bucket_key(field(touch))).or_default();
        entry.0 += 1;
        if let Some(reply) = reply_by_touch.get(touch.id.as_str()) {
            entry.1 += 1;
            if reply.is_positive() {
                entry.2 += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(key, (sent, replied, positive))| (key, Breakdown::new(sent, replied, positive)))
        .collect()
}

/// Break down the last `days` of history by message attribute.
pub fn get_conversion_stats(
    history: &FeedbackHistory,
    days: i64,
    now: DateTime<Utc>,
) -> ConversionStats {
    let cutoff = now - Duration::days(days);
    let touches: Vec<&TouchRecord> = history
        .touches
        .iter()
        .filter(|t| t.sent_at >= cutoff)
        .collect();
    let replies: Vec<&ReplyRecord> = history
        .replies
        .iter()
        .filter(|r| r.replied_at >= cutoff)
        .collect();
    let meetings = history
        .meetings
        .iter()
        .filter(|m| m.created_at >= cutoff)
        .count();

    // Later replies to the same touch replace earlier ones.
    let mut reply_by_touch: HashMap<&str, &ReplyRecord> = HashMap::new();
    for reply in &replies {
        if let Some(id) = reply.touchpoint_id.as_deref() {
            reply_by_touch.insert(id, reply);
        }
    }
    let positive_replies = replies.iter().filter(|r| r.is_positive()).count();

    ConversionStats {
        by_proof_point: breakdown(&touches, &reply_by_touch, |t| t.proof_point_used.clone()),
        by_channel: breakdown(&touches, &reply_by_touch, |t| t.channel.clone()),
        by_touch_number: breakdown(&touches, &reply_by_touch, |t| {
            t.touch_number.map(|n| n.to_string())
        }),
        by_opener_style: breakdown(&touches, &reply_by_touch, |t| t.opener_style.clone()),
        by_ab_group: breakdown(&touches, &reply_by_touch, |t| t.ab_group.clone()),
        totals: Totals {
            touches_sent: touches.len(),
            replies_received: replies.len(),
            positive_replies,
            meetings_booked: meetings,
            reply_rate: safe_rate(replies.len(), touches.len()),
            positive_rate: safe_rate(positive_replies, touches.len()),
            meeting_rate: safe_rate(meetings, touches.len()),
        },
        period_days: days,
    }
}

// ============================================================================
// Winning patterns
// ============================================================================

/// How much to trust the recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternConfidence {
    /// Enough sends to act on.
    High,
    /// Directional only.
    Medium,
    /// Too few sends to trust.
    Low,
}

impl PatternConfidence {
    /// From the total number of touches sent.
    pub fn from_sample(total_sent: usize) -> Self {
        if total_sent >= HIGH_CONFIDENCE_SAMPLE {
            PatternConfidence::High
        } else if total_sent >= MEDIUM_CONFIDENCE_SAMPLE {
            PatternConfidence::Medium
        } else {
            PatternConfidence::Low
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternConfidence::High => "high",
            PatternConfidence::Medium => "medium",
            PatternConfidence::Low => "low",
        }
    }
}

impl fmt::Display for PatternConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Winner for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Attribute the winner was picked from.
    pub dimension: String,
    /// Winning bucket key.
    pub winner: String,
    /// Winner's positive rate.
    pub positive_rate: f64,
    /// Winner's sends.
    pub sample_size: usize,
    /// Suggested action.
    pub recommendation: String,
}

/// Per-dimension winners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningPatterns {
    /// One per dimension with a winner.
    pub recommendations: Vec<Recommendation>,
    /// Winning proof point.
    pub top_proof_point: Option<String>,
    /// Winning channel.
    pub top_channel: Option<String>,
    /// Winning touch number.
    pub top_touch_number: Option<String>,
    /// Winning opener style.
    pub top_opener_style: Option<String>,
    /// Winning A/B arm.
    pub top_ab_group: Option<String>,
    /// Touches the patterns were drawn from.
    pub sample_size: usize,
    /// How far to trust the patterns.
    pub confidence: PatternConfidence,
}

/// Best bucket by positive rate, then reply rate, among buckets with at
/// least `min_sample` sends. The unknown bucket never wins; on a full tie
/// the first key in order is kept.
fn find_winner(
    breakdown: &BTreeMap<String, Breakdown>,
    min_sample: usize,
) -> Option<(&String, &Breakdown)> {
    breakdown
        .iter()
        .filter(|(key, b)| key.as_str() != UNKNOWN_BUCKET && b.sent >= min_sample)
        .fold(None, |best: Option<(&String, &Breakdown)>, (key, b)| match best {
            Some((_, current))
                if (b.positive_rate, b.reply_rate) <= (current.positive_rate, current.reply_rate) =>
            {
                best
            }
            _ => Some((key, b)),
        })
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

fn describe(dimension: &str, key: &str, b: &Breakdown) -> String {
    let rate = percent(b.positive_rate);
    match dimension {
        "proof_point" => format!(
            "Prefer '{}' proof point ({} positive rate, n={})",
            key, rate, b.sent
        ),
        "channel" => format!(
            "'{}' channel performs best ({} positive rate, n={})",
            key, rate, b.sent
        ),
        "touch_number" => format!(
            "Touch {} has highest conversion ({} positive rate, n={})",
            key, rate, b.sent
        ),
        "opener_style" => format!(
            "'{}' opener style wins ({} positive rate, n={})",
            key, rate, b.sent
        ),
        _ => format!(
            "A/B group '{}' leads ({} positive rate, n={})",
            key, rate, b.sent
        ),
    }
}

/// Find the winning bucket in each dimension.
pub fn get_winning_patterns(stats: &ConversionStats, min_sample: usize) -> WinningPatterns {
    let dimensions: [(&str, &BTreeMap<String, Breakdown>); 5] = [
        ("proof_point", &stats.by_proof_point),
        ("channel", &stats.by_channel),
        ("touch_number", &stats.by_touch_number),
        ("opener_style", &stats.by_opener_style),
        ("ab_group", &stats.by_ab_group),
    ];

    let mut recommendations = Vec::new();
    let mut tops: [Option<String>; 5] = Default::default();
    for (slot, (dimension, breakdown)) in dimensions.iter().enumerate() {
        if let Some((key, b)) = find_winner(breakdown, min_sample) {
            tops[slot] = Some(key.clone());
            recommendations.push(Recommendation {
                dimension: dimension.to_string(),
                winner: key.clone(),
                positive_rate: b.positive_rate,
                sample_size: b.sent,
                recommendation: describe(dimension, key, b),
            });
        }
    }
    let [top_proof_point, top_channel, top_touch_number, top_opener_style, top_ab_group] = tops;

    WinningPatterns {
        recommendations,
        top_proof_point,
        top_channel,
        top_touch_number,
        top_opener_style,
        top_ab_group,
        sample_size: stats.totals.touches_sent,
        confidence: PatternConfidence::from_sample(stats.totals.touches_sent),
    }
}

/// Proof point with the best observed positive rate, if the data is strong
/// enough to trust and the rate is above zero.
pub fn proof_point_preference(stats: &ConversionStats, min_sample: usize) -> Option<String> {
    find_winner(&stats.by_proof_point, min_sample)
        .filter(|(_, b)| b.positive_rate > 0.0)
        .map(|(key, _)| key.clone())
}

// ============================================================================
// Report
// ============================================================================

/// Plain-text performance summary.
pub fn generate_feedback_report(stats: &ConversionStats, patterns: &WinningPatterns) -> String {
    let totals = &stats.totals;
    let mut lines = vec![
        format!(
            "=== OUTREACH PERFORMANCE REPORT ({}-day window) ===",
            stats.period_days
        ),
        String::new(),
        format!("Total touches: {}", totals.touches_sent),
        format!(
            "Replies: {} ({:.1}% rate)",
            totals.replies_received,
            totals.reply_rate * 100.0
        ),
        format!(
            "Positive replies: {} ({:.1}% rate)",
            totals.positive_replies,
            totals.positive_rate * 100.0
        ),
        format!(
            "Meetings booked: {} ({:.1}% rate)",
            totals.meetings_booked,
            totals.meeting_rate * 100.0
        ),
        format!("Confidence: {}", patterns.confidence),
        String::new(),
    ];

    if !patterns.recommendations.is_empty() {
        lines.push("--- WINNING PATTERNS ---".to_string());
        for rec in &patterns.recommendations {
            lines.push(format!("  {}", rec.recommendation));
        }
        lines.push(String::new());
    }

    if !stats.by_proof_point.is_empty() {
        lines.push("--- PROOF POINT PERFORMANCE ---".to_string());
        for (key, b) in stats.by_proof_point.iter().filter(|(_, b)| b.sent > 0) {
            lines.push(format!(
                "  {:<30}  sent={:>3}  replied={:>3}  positive={:>3}  rate={}",
                key,
                b.sent,
                b.replied,
                b.positive,
                percent(b.positive_rate)
            ));
        }
        lines.push(String::new());
    }

    if !stats.by_channel.is_empty() {
        lines.push("--- CHANNEL PERFORMANCE ---".to_string());
        for (key, b) in stats.by_channel.iter().filter(|(_, b)| b.sent > 0) {
            lines.push(format!(
                "  {:<15}  sent={:>3}  replied={:>3}  rate={}",
                key,
                b.sent,
                b.replied,
                percent(b.reply_rate)
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::MeetingRecord;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn touch(id: &str, pp: Option<&str>, channel: &str, days_ago: i64) -> TouchRecord {
        TouchRecord {
            id: id.to_string(),
            contact_id: format!("contact-{}", id),
            channel: Some(channel.to_string()),
            touch_number: Some(1),
            proof_point_used: pp.map(str::to_string),
            pain_hook: None,
            opener_style: None,
            ab_group: None,
            sent_at: now() - Duration::days(days_ago),
        }
    }

    fn reply(touch_id: &str, intent: &str) -> ReplyRecord {
        ReplyRecord {
            touchpoint_id: Some(touch_id.to_string()),
            contact_id: format!("contact-{}", touch_id),
            intent: intent.to_string(),
            text: String::new(),
            replied_at: now() - Duration::days(1),
        }
    }

    fn history() -> FeedbackHistory {
        FeedbackHistory {
            touches: vec![
                touch("t1", Some("cred_coverage"), "linkedin", 5),
                touch("t2", Some("cred_coverage"), "linkedin", 5),
                touch("t3", Some("nagra_api"), "email", 5),
                touch("t4", None, "email", 5),
                touch("old", Some("nagra_api"), "email", 200),
            ],
            replies: vec![reply("t1", "positive"), reply("t2", "negative"), reply("t3", "referral")],
            meetings: vec![MeetingRecord {
                contact_id: "contact-t1".to_string(),
                created_at: now() - Duration::days(1),
            }],
        }
    }

    #[test]
    fn test_breakdowns_and_window() {
        let stats = get_conversion_stats(&history(), 90, now());
        assert_eq!(stats.totals.touches_sent, 4);
        assert_eq!(stats.totals.replies_received, 3);
        assert_eq!(stats.totals.positive_replies, 2);
        assert_eq!(stats.totals.meetings_booked, 1);
        assert_eq!(stats.totals.reply_rate, 0.75);

        let cred = stats.by_proof_point["cred_coverage"];
        assert_eq!((cred.sent, cred.replied, cred.positive), (2, 2, 1));
        assert_eq!(cred.positive_rate, 0.5);
        assert_eq!(stats.by_proof_point["nagra_api"].positive_rate, 1.0);
        assert_eq!(stats.by_proof_point[UNKNOWN_BUCKET].sent, 1);
        assert_eq!(stats.by_touch_number["1"].sent, 4);
        assert_eq!(stats.period_days, 90);
    }

    #[test]
    fn test_rates_round_to_four_places() {
        let b = Breakdown::new(3, 1, 1);
        assert_eq!(b.reply_rate, 0.3333);
        assert_eq!(Breakdown::new(0, 0, 0).positive_rate, 0.0);
    }

    #[test]
    fn test_winner_respects_sample_floor() {
        let stats = get_conversion_stats(&history(), 90, now());
        let patterns = get_winning_patterns(&stats, 2);
        // nagra_api has the better rate but only one send
        assert_eq!(patterns.top_proof_point.as_deref(), Some("cred_coverage"));
        assert_eq!(patterns.confidence, PatternConfidence::Low);

        let patterns = get_winning_patterns(&stats, 1);
        assert_eq!(patterns.top_proof_point.as_deref(), Some("nagra_api"));
        assert!(patterns.recommendations[0]
            .recommendation
            .contains("100% positive rate, n=1"));
    }

    #[test]
    fn test_unknown_bucket_never_wins() {
        let mut stats = ConversionStats::default();
        stats
            .by_proof_point
            .insert(UNKNOWN_BUCKET.to_string(), Breakdown::new(10, 10, 10));
        stats
            .by_proof_point
            .insert("cred_coverage".to_string(), Breakdown::new(10, 2, 1));
        assert_eq!(proof_point_preference(&stats, 5).as_deref(), Some("cred_coverage"));
    }

    #[test]
    fn test_reply_rate_breaks_ties() {
        let mut stats = ConversionStats::default();
        stats
            .by_channel
            .insert("email".to_string(), Breakdown::new(10, 2, 1));
        stats
            .by_channel
            .insert("linkedin".to_string(), Breakdown::new(10, 5, 1));
        let patterns = get_winning_patterns(&stats, 5);
        assert_eq!(patterns.top_channel.as_deref(), Some("linkedin"));
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(PatternConfidence::from_sample(50), PatternConfidence::High);
        assert_eq!(PatternConfidence::from_sample(20), PatternConfidence::Medium);
        assert_eq!(PatternConfidence::from_sample(19), PatternConfidence::Low);
    }

    #[test]
    fn test_report_mentions_totals_and_winners() {
        let stats = get_conversion_stats(&history(), 90, now());
        let patterns = get_winning_patterns(&stats, 1);
        let report = generate_feedback_report(&stats, &patterns);
        assert!(report.starts_with("=== OUTREACH PERFORMANCE REPORT (90-day window) ==="));
        assert!(report.contains("Total touches: 4"));
        assert!(report.contains("Replies: 3 (75.0% rate)"));
        assert!(report.contains("--- WINNING PATTERNS ---"));
        assert!(report.contains("cred_coverage"));
        assert!(report.contains("--- CHANNEL PERFORMANCE ---"));
    }
}
