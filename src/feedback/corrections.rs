//! Research contradictions found in replies, and the append-only log they
//! are recorded in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::research::inference::{
    display_tool_name, has_keyword, is_competitor_tool, normalize, COMPETITOR_TOOLS,
};
use crate::research::{Account, ResearchArtifact};

/// Contradictions at or above this confidence are recorded automatically.
pub const DEFAULT_CORRECTION_THRESHOLD: f64 = 0.7;

const NEGATION_CONFIDENCE: f64 = 0.8;
const REPLACEMENT_CONFIDENCE: f64 = 0.7;
const ROLE_FIT_CONFIDENCE: f64 = 0.7;

const NEGATION_TEMPLATES: [&str; 8] = [
    "don't use {}",
    "do not use {}",
    "not using {}",
    "stopped using {}",
    "moved away from {}",
    "migrated from {}",
    "no longer use {}",
    "{} anymore",
];

const REPLACEMENT_TEMPLATES: [&str; 4] = ["we use {}", "using {}", "moved to {}", "switched to {}"];

const ROLE_FIT_PHRASES: [&str; 5] = [
    "wrong person",
    "not my area",
    "don't handle",
    "not responsible",
    "try reaching",
];

/// Something in a reply that disagrees with the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    /// `tech_stack` or `role_fit`.
    pub field: String,
    /// What the artifact assumed, for display.
    pub our_assumption: String,
    /// What the reply says instead, for display.
    pub reply_suggests: String,
    /// What the artifact holds.
    pub original_value: String,
    /// What the reply implies instead.
    pub corrected_value: String,
    /// Confidence in 0.0 to 1.0.
    pub confidence: f64,
}

/// Scan a reply for statements that contradict the artifact.
///
/// Read-only: the artifact is never touched.
pub fn detect_contradictions(reply_text: &str, artifact: &ResearchArtifact) -> Vec<Contradiction> {
    let text = normalize(reply_text);
    let stack: Vec<String> = artifact
        .signals
        .tech_stack
        .iter()
        .map(|t| t.value.trim().to_lowercase())
        .collect();
    let mut found = Vec::new();

    for tool in &stack {
        let display = display_tool_name(tool);
        let negated = NEGATION_TEMPLATES
            .iter()
            .any(|t| has_keyword(&text, &t.replace("{}", tool)));
        if negated {
            found.push(Contradiction {
                field: "tech_stack".to_string(),
                our_assumption: format!("Uses {}", display),
                reply_suggests: format!("Does not use {}", display),
                original_value: display.clone(),
                corrected_value: format!("Does not use {}", display),
                confidence: NEGATION_CONFIDENCE,
            });
        }

        if !is_competitor_tool(tool) {
            continue;
        }
        for other in COMPETITOR_TOOLS.iter().filter(|o| **o != tool.as_str()) {
            if stack.iter().any(|s| s == other) {
                continue;
            }
            let replaced = REPLACEMENT_TEMPLATES
                .iter()
                .any(|t| has_keyword(&text, &t.replace("{}", other)));
            if replaced {
                let other_display = display_tool_name(other);
                found.push(Contradiction {
                    field: "tech_stack".to_string(),
                    our_assumption: format!("Uses {}", display),
                    reply_suggests: format!("Actually uses {}", other_display),
                    original_value: display.clone(),
                    corrected_value: other_display,
                    confidence: REPLACEMENT_CONFIDENCE,
                });
            }
        }
    }

    if ROLE_FIT_PHRASES.iter().any(|p| has_keyword(&text, p)) {
        found.push(Contradiction {
            field: "role_fit".to_string(),
            our_assumption: "Responsible for test automation decisions".to_string(),
            reply_suggests: "May not be the right contact".to_string(),
            original_value: artifact.prospect.title.clone(),
            corrected_value: "Not the decision maker".to_string(),
            confidence: ROLE_FIT_CONFIDENCE,
        });
    }

    found
}

// ============================================================================
// Correction log
// ============================================================================

/// One recorded correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEvent {
    /// Unique event id; appending the same id twice is a no-op.
    pub id: String,
    /// Contact the correction concerns.
    pub contact_id: String,
    /// Artifact field corrected.
    pub field: String,
    /// Value before the correction.
    pub original_value: String,
    /// Value after the correction.
    pub corrected_value: String,
    /// `reply`, `call_notes` or `manual`.
    pub source: String,
    /// Confidence in 0.0 to 1.0.
    pub confidence: f64,
    /// When the correction was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl CorrectionEvent {
    /// Fresh event from a detected contradiction.
    pub fn from_contradiction(contact_id: &str, contradiction: &Contradiction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contact_id: contact_id.to_string(),
            field: contradiction.field.clone(),
            original_value: contradiction.original_value.clone(),
            corrected_value: contradiction.corrected_value.clone(),
            source: "reply".to_string(),
            confidence: contradiction.confidence,
            recorded_at: Utc::now(),
        }
    }
}

/// Corrections in arrival order. Events can be appended and read, never
/// edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionLog {
    events: Vec<CorrectionEvent>,
}

impl CorrectionLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn append(&mut self, event: CorrectionEvent) {
        self.events.push(event);
    }

    /// Append an event for each contradiction at or above `threshold` and
    /// return the new events.
    pub fn record_contradictions(
        &mut self,
        contact_id: &str,
        contradictions: &[Contradiction],
        threshold: f64,
    ) -> Vec<CorrectionEvent> {
        let recorded: Vec<CorrectionEvent> = contradictions
            .iter()
            .filter(|c| c.confidence >= threshold)
            .map(|c| CorrectionEvent::from_contradiction(contact_id, c))
            .collect();
        for event in &recorded {
            info!(
                contact_id = %event.contact_id,
                field = %event.field,
                original = %event.original_value,
                "Recorded research correction"
            );
        }
        self.events.extend(recorded.iter().cloned());
        recorded
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[CorrectionEvent] {
        &self.events
    }

    /// Events for one contact, oldest first.
    pub fn for_contact<'a>(&'a self, contact_id: &'a str) -> impl Iterator<Item = &'a CorrectionEvent> {
        self.events.iter().filter(move |e| e.contact_id == contact_id)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// How far a correction reaches beyond the one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionImpact {
    /// Other accounts holding the same original value.
    pub affected_accounts: usize,
    /// Suggested follow-up.
    pub recommendation: String,
}

/// Count other accounts resting on the same assumption.
pub fn assess_correction_impact(
    field: &str,
    original_value: &str,
    accounts: &[Account],
) -> CorrectionImpact {
    let original = original_value.trim();
    let (affected_accounts, recommendation) = match field {
        "tech_stack" => {
            let n = accounts
                .iter()
                .filter(|a| a.known_tools.iter().any(|t| t.trim().eq_ignore_ascii_case(original)))
                .count();
            let rec = if n > 0 {
                format!("Review {} other accounts with '{}' in known_tools", n, original)
            } else {
                String::new()
            };
            (n, rec)
        }
        "industry" => {
            let n = accounts
                .iter()
                .filter(|a| {
                    a.industry
                        .as_deref()
                        .is_some_and(|i| i.trim().eq_ignore_ascii_case(original))
                })
                .count();
            let rec = if n > 0 {
                format!(
                    "Verify industry classification for {} accounts classified as '{}'",
                    n, original
                )
            } else {
                String::new()
            };
            (n, rec)
        }
        "pain" => (
            0,
            "Consider adjusting pain hypothesis confidence for similar prospects".to_string(),
        ),
        "role_fit" => (
            0,
            "Ask for a referral to the owner of test automation".to_string(),
        ),
        _ => (0, String::new()),
    };
    CorrectionImpact {
        affected_accounts,
        recommendation,
    }
}
