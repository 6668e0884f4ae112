//! Multi-touch sequence generation.
//!
//! The sequence is a fixed walk over touch numbers 1 to 6 chosen by tier.
//! Nothing here is interactive: the cadence, the proof-point rotation and
//! every body are computed up front.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::{ProductConfig, ProofPoint};
use crate::error::CatalogResult;
use crate::feedback::ConversionStats;
use crate::qa::{check_message_variant, QaResult};
use crate::render::{Channel, Composer, MessageVariant, Tone};
use crate::research::ResearchArtifact;
use crate::scoring::{ScoringResult, Tier};
use crate::selection::{select_best_proof_point, select_with_feedback, Objection};

// ============================================================================
// Cadence
// ============================================================================

/// Touch numbers and day offsets for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceSpec {
    /// Tier this cadence serves.
    pub tier: Tier,
    /// Human-readable cadence name.
    pub label: &'static str,
    /// Touch numbers in send order.
    pub touches: &'static [u8],
    /// Days after the start date, one per touch.
    pub day_offsets: &'static [i64],
}

/// Cadence per tier, hottest first.
pub const CADENCES: [CadenceSpec; 4] = [
    CadenceSpec {
        tier: Tier::Hot,
        label: "aggressive (10 days)",
        touches: &[1, 2, 3, 4, 5, 6],
        day_offsets: &[0, 2, 3, 5, 7, 10],
    },
    CadenceSpec {
        tier: Tier::Warm,
        label: "standard (14 days)",
        touches: &[1, 2, 3, 4, 5, 6],
        day_offsets: &[0, 3, 5, 8, 11, 14],
    },
    CadenceSpec {
        tier: Tier::Cool,
        label: "gentle (21 days)",
        touches: &[1, 3, 6],
        day_offsets: &[0, 7, 21],
    },
    CadenceSpec {
        tier: Tier::Cold,
        label: "light (14 days)",
        touches: &[1, 6],
        day_offsets: &[0, 14],
    },
];

/// The cadence for a tier.
pub fn cadence_for(tier: Tier) -> &'static CadenceSpec {
    match tier {
        Tier::Hot => &CADENCES[0],
        Tier::Warm => &CADENCES[1],
        Tier::Cool => &CADENCES[2],
        Tier::Cold => &CADENCES[3],
    }
}

/// What kind of touch a step is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchType {
    /// Touch 1 opening InMail.
    Inmail,
    /// Touches 2 and 4 call cheat sheet.
    CallSnippet,
    /// Touch 3 InMail follow-up.
    InmailFollowup,
    /// Touch 5 email.
    Email,
    /// Touch 6 break-up InMail.
    InmailBreakup,
}

impl TouchType {
    /// Fixed mapping from touch number.
    pub fn for_touch(touch_number: u8) -> Option<Self> {
        match touch_number {
            1 => Some(TouchType::Inmail),
            2 | 4 => Some(TouchType::CallSnippet),
            3 => Some(TouchType::InmailFollowup),
            5 => Some(TouchType::Email),
            6 => Some(TouchType::InmailBreakup),
            _ => None,
        }
    }

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchType::Inmail => "inmail",
            TouchType::CallSnippet => "call_snippet",
            TouchType::InmailFollowup => "inmail_followup",
            TouchType::Email => "email",
            TouchType::InmailBreakup => "inmail_breakup",
        }
    }

    /// Delivery channel.
    pub fn channel(&self) -> Channel {
        match self {
            TouchType::CallSnippet => Channel::Phone,
            TouchType::Email => Channel::Email,
            _ => Channel::Linkedin,
        }
    }

    /// Whether QA applies.
    pub fn is_written(&self) -> bool {
        !matches!(self, TouchType::CallSnippet)
    }
}

impl fmt::Display for TouchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TouchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inmail" => Ok(TouchType::Inmail),
            "call_snippet" | "call" => Ok(TouchType::CallSnippet),
            "inmail_followup" | "followup" => Ok(TouchType::InmailFollowup),
            "email" => Ok(TouchType::Email),
            "inmail_breakup" | "breakup" => Ok(TouchType::InmailBreakup),
            _ => Err(format!("Unknown touch type: {}", s)),
        }
    }
}

/// One row of a planning view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Position in the sequence.
    pub touch_number: u8,
    /// Days after the start date.
    pub day_offset: i64,
    /// Calendar send date.
    pub send_date: NaiveDate,
    /// Delivery channel.
    pub channel: Channel,
    /// Touch kind.
    pub touch_type: TouchType,
}

/// Cadence for a tier laid out from `start`.
pub fn get_cadence_schedule(tier: Tier, start: NaiveDate) -> Vec<ScheduleEntry> {
    let cadence = cadence_for(tier);
    cadence
        .touches
        .iter()
        .zip(cadence.day_offsets.iter())
        .filter_map(|(&touch_number, &day_offset)| {
            let touch_type = TouchType::for_touch(touch_number)?;
            Some(ScheduleEntry {
                touch_number,
                day_offset,
                send_date: start + Duration::days(day_offset),
                channel: touch_type.channel(),
                touch_type,
            })
        })
        .collect()
}

// ============================================================================
// Sequence output
// ============================================================================

/// A rendered step with its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTouch {
    /// Rendered message for the touch.
    #[serde(flatten)]
    pub message: MessageVariant,
    /// Touch kind.
    pub touch_type: TouchType,
    /// Calendar send date.
    pub send_date: NaiveDate,
}

/// Cadence actually produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceSummary {
    /// Tier the cadence was chosen for.
    pub tier: Tier,
    /// Cadence name.
    pub label: String,
    /// Touches actually scheduled.
    pub total_touches: usize,
    /// Days from first to last touch.
    pub total_days: i64,
}

/// Sequence-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    /// Prospect's full name.
    pub prospect_name: String,
    /// Prospect's company.
    pub company: String,
    /// Tone every touch was written in.
    pub tone: Tone,
    /// Tier from scoring.
    pub scoring_tier: Tier,
    /// ICP score from scoring.
    pub total_score: i32,
    /// Distinct keys in touch order.
    pub proof_points_used: Vec<String>,
    /// Rotation summary such as `3 unique proof points across 4 touches`.
    pub proof_point_rotation: String,
    /// Whether the email touch was scheduled.
    pub has_email: bool,
    /// When the sequence was rendered.
    pub generated_at: DateTime<Utc>,
    /// Objection the copy gets ahead of.
    pub predicted_objection: Objection,
}

/// A complete outreach sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Scheduled touches in send order.
    pub touches: Vec<SequenceTouch>,
    /// Cadence summary.
    pub cadence: CadenceSummary,
    /// One per written touch, in touch order.
    pub qa_results: Vec<QaResult>,
    /// Sequence-level summary.
    pub metadata: SequenceMetadata,
}

impl Sequence {
    /// Touch numbers in order.
    pub fn touch_numbers(&self) -> Vec<u8> {
        self.touches.iter().map(|t| t.message.touch_number).collect()
    }

    /// The touch with this number, if scheduled.
    pub fn touch(&self, touch_number: u8) -> Option<&SequenceTouch> {
        self.touches
            .iter()
            .find(|t| t.message.touch_number == touch_number)
    }
}

/// Caller choices for one sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceOptions<'a> {
    /// Tone for every touch.
    pub tone: Tone,
    /// Schedule the email touch.
    pub has_email: bool,
    /// Date of touch 1.
    pub start_date: NaiveDate,
    /// Conversion history that may override the touch 1 pick.
    pub feedback: Option<&'a ConversionStats>,
    /// Replies needed before feedback can override the pick.
    pub feedback_min_sample: usize,
}

impl<'a> SequenceOptions<'a> {
    /// No feedback, default min sample.
    pub fn new(tone: Tone, has_email: bool, start_date: NaiveDate) -> Self {
        Self {
            tone,
            has_email,
            start_date,
            feedback: None,
            feedback_min_sample: 5,
        }
    }

    /// Attach a conversion snapshot.
    pub fn with_feedback(mut self, stats: &'a ConversionStats, min_sample: usize) -> Self {
        self.feedback = Some(stats);
        self.feedback_min_sample = min_sample;
        self
    }
}

// ============================================================================
// Proof-point rotation
// ============================================================================

/// Picks for every touch, computed before any rendering.
#[derive(Debug, Clone, Copy)]
struct Rotation<'a> {
    touch1: &'a ProofPoint,
    touch3: &'a ProofPoint,
    touch5: &'a ProofPoint,
    call2: &'a ProofPoint,
    call4: &'a ProofPoint,
}

impl<'a> Rotation<'a> {
    fn select(
        artifact: &ResearchArtifact,
        catalog: &'a ProductConfig,
        options: &SequenceOptions<'_>,
    ) -> CatalogResult<Self> {
        let touch1 = select_with_feedback(
            artifact,
            catalog,
            &[],
            options.feedback,
            options.feedback_min_sample,
        )?;
        let touch3 = select_best_proof_point(artifact, catalog, &[touch1.key.clone()])?;
        let touch5 = select_best_proof_point(
            artifact,
            catalog,
            &[touch1.key.clone(), touch3.key.clone()],
        )?;
        // Calls only avoid the written touch right before them.
        let call2 = select_best_proof_point(artifact, catalog, &[touch1.key.clone()])?;
        let call4 = select_best_proof_point(artifact, catalog, &[touch3.key.clone()])?;
        Ok(Self {
            touch1,
            touch3,
            touch5,
            call2,
            call4,
        })
    }
}

/// Render the full sequence for one prospect.
///
/// Touch 5 is skipped when the prospect has no email. QA covers every
/// written touch; call snippets are never gated.
pub fn generate_sequence(
    artifact: &ResearchArtifact,
    scoring: &ScoringResult,
    catalog: &ProductConfig,
    options: &SequenceOptions<'_>,
) -> CatalogResult<Sequence> {
    let tier = scoring.tier;
    let tone = options.tone;
    let cadence = cadence_for(tier);
    let rotation = Rotation::select(artifact, catalog, options)?;
    let composer = Composer::new(artifact, catalog, tier);

    let mut touches = Vec::with_capacity(cadence.touches.len());
    for (&touch_number, &day_offset) in cadence.touches.iter().zip(cadence.day_offsets.iter()) {
        let Some(touch_type) = TouchType::for_touch(touch_number) else {
            continue;
        };
        let message = match touch_type {
            TouchType::Inmail => {
                composer.first_touch(tone, Channel::Linkedin, rotation.touch1, None)
            }
            TouchType::CallSnippet => {
                let pp = if touch_number == 2 {
                    rotation.call2
                } else {
                    rotation.call4
                };
                composer.call_snippet(tone, pp, touch_number)
            }
            TouchType::InmailFollowup => composer.follow_up(tone, rotation.touch3),
            TouchType::Email => {
                if !options.has_email {
                    debug!("Skipping email touch, no address on file");
                    continue;
                }
                composer.email(tone, rotation.touch5, Some(rotation.touch1))
            }
            TouchType::InmailBreakup => composer.breakup(tone),
        };
        debug!(
            touch = touch_number,
            touch_type = %touch_type,
            proof_point = %message.proof_point_key,
            words = message.word_count,
            "Rendered touch"
        );
        touches.push(SequenceTouch {
            message,
            touch_type,
            send_date: options.start_date + Duration::days(day_offset),
        });
    }

    let qa_results = touches
        .iter()
        .filter(|t| t.touch_type.is_written())
        .map(|t| check_message_variant(&t.message, artifact, catalog))
        .collect();

    let used: Vec<&str> = touches
        .iter()
        .map(|t| t.message.proof_point_key.as_str())
        .filter(|k| !k.is_empty())
        .collect();
    let mut proof_points_used: Vec<String> = Vec::new();
    for key in &used {
        if !proof_points_used.iter().any(|k| k == key) {
            proof_points_used.push(key.to_string());
        }
    }
    let proof_point_rotation = format!(
        "{} unique proof points across {} touches",
        proof_points_used.len(),
        used.len()
    );

    Ok(Sequence {
        cadence: CadenceSummary {
            tier,
            label: cadence.label.to_string(),
            total_touches: touches.len(),
            total_days: cadence.day_offsets.last().copied().unwrap_or(0),
        },
        touches,
        qa_results,
        metadata: SequenceMetadata {
            prospect_name: artifact.prospect.full_name.clone(),
            company: artifact.prospect.company_name.clone(),
            tone,
            scoring_tier: tier,
            total_score: scoring.total_score,
            proof_points_used,
            proof_point_rotation,
            has_email: options.has_email,
            generated_at: Utc::now(),
            predicted_objection: composer.objection().clone(),
        },
    })
}
