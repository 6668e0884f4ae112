//! Research artifact: the evidence-grounded fact sheet for one prospect.
//!
//! Input records ([`Contact`], [`Account`], [`PersonResearch`],
//! [`CompanyResearch`], [`StoredSignal`]) arrive from the store. The builder
//! assembles a [`ResearchArtifact`] from them, and the validator checks it
//! for evidence discipline.

mod builder;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod inference;
mod validator;
pub mod vertical_pains;

pub use builder::{build_research_artifact, detect_signals, DEFAULT_MUST_NOT_CLAIM, FALLBACK_PAIN};
pub use inference::{JobFunction, Seniority};
pub use validator::{
    validate_artifact_json, validate_research_artifact, Severity, ValidationIssue,
    ValidationReport,
};
pub use vertical_pains::VerticalPainLibrary;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::evidence::{Evidence, Evidenced};

// ============================================================================
// Input records
// ============================================================================

/// CRM contact row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

impl Contact {
    /// Whether a non-blank email is on file.
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// CRM account row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub employee_band: Option<String>,
    #[serde(default)]
    pub hq_location: Option<String>,
    /// Stored as `0`/`1` or a boolean.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub buyer_intent: bool,
    /// Stored as a JSON array or as a string holding one.
    #[serde(default, deserialize_with = "deserialize_tool_list")]
    pub known_tools: Vec<String>,
}

/// Cached profile research.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonResearch {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub recently_hired: bool,
    #[serde(default)]
    pub tenure_months: Option<u32>,
}

impl PersonResearch {
    /// Explicit flag, or tenure under six months.
    pub fn is_recently_hired(&self) -> bool {
        self.recently_hired || self.tenure_months.is_some_and(|m| m < 6)
    }
}

/// Cached company research.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyResearch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tool_list")]
    pub known_tools: Vec<String>,
    #[serde(default)]
    pub hiring_signals: Option<String>,
    #[serde(default)]
    pub funding_info: Option<String>,
    #[serde(default)]
    pub recent_news: Option<String>,
}

/// A previously detected buying signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub signal_type: String,
    pub description: String,
    #[serde(default)]
    pub source: String,
}

impl StoredSignal {
    /// Build a signal.
    pub fn new(signal_type: &str, description: impl Into<String>, source: &str) -> Self {
        Self {
            signal_type: signal_type.to_string(),
            description: description.into(),
            source: source.to_string(),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(false),
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        serde_json::Value::String(s) => Ok(matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes"
        )),
        other => Err(de::Error::custom(format!(
            "expected boolean or integer flag, got {}",
            other
        ))),
    }
}

fn deserialize_tool_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let array = match value {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Array(items) => items,
        // Unparseable stored strings are treated as "no tools".
        serde_json::Value::String(s) => match serde_json::from_str(&s) {
            Ok(serde_json::Value::Array(items)) => items,
            _ => return Ok(Vec::new()),
        },
        other => {
            return Err(de::Error::custom(format!(
                "expected tool array, got {}",
                other
            )))
        }
    };
    Ok(array
        .into_iter()
        .filter_map(|item| item.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect())
}

// ============================================================================
// Artifact sections
// ============================================================================

/// Who is being contacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub full_name: String,
    pub first_name: String,
    pub title: String,
    pub seniority: Seniority,
    pub function: JobFunction,
    pub linkedin_url: Option<String>,
    pub company_name: String,
    pub company_domain: Option<String>,
}

/// Where they work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub industry: Option<String>,
    /// Classified vertical, `"Tech"` when nothing matched.
    pub vertical: String,
    pub size_band: Option<String>,
    pub employee_count: Option<u32>,
    pub geo: Option<String>,
    pub product_summary: Option<String>,
}

/// Tech stack, intent signals and triggers, each with evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub tech_stack: Vec<Evidenced<String>>,
    pub intent_signals: Vec<Evidenced<String>>,
    pub triggers: Vec<Evidenced<String>>,
}

impl Signals {
    /// Tech stack values in insertion order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tech_stack.iter().map(|t| t.value.clone()).collect()
    }

    /// Whether the CRM buyer-intent flag contributed an intent signal.
    pub fn has_buyer_intent_flag(&self) -> bool {
        self.intent_signals
            .iter()
            .any(|s| s.evidence.mentions("CRM field: buyer_intent"))
    }
}

/// ICP fit narrative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IcpFit {
    pub fit_summary: String,
    pub fit_reasons: Vec<String>,
    pub disqualifiers: Vec<String>,
}

/// One hypothesized pain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainHypothesis {
    pub pain: String,
    /// In `[0, 1]`, rounded to two decimals.
    pub confidence: f64,
    pub evidence: Evidence,
}

impl PainHypothesis {
    /// Clamps confidence into `[0, 1]`.
    pub fn new(pain: &str, confidence: f64, evidence: Evidence) -> Self {
        Self {
            pain: pain.to_string(),
            confidence: round2(confidence.clamp(0.0, 1.0)),
            evidence,
        }
    }
}

/// Hypothesized pains, never empty once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pains {
    pub hypothesized_pains: Vec<PainHypothesis>,
}

impl Pains {
    /// The highest-confidence pain. First wins on ties.
    pub fn top(&self) -> Option<&PainHypothesis> {
        self.hypothesized_pains.iter().fold(None, |best, p| match best {
            Some(b) if b.confidence >= p.confidence => Some(b),
            _ => Some(p),
        })
    }
}

/// An opener someone could verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationHook {
    pub hook: String,
    pub evidence_field: Evidence,
}

impl PersonalizationHook {
    /// Build a hook.
    pub fn new(hook: impl Into<String>, evidence_field: Evidence) -> Self {
        Self {
            hook: hook.into(),
            evidence_field,
        }
    }
}

/// Hooks in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personalization {
    pub hooks: Vec<PersonalizationHook>,
}

/// Claims generated copy must avoid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub must_not_claim: Vec<String>,
}

/// Provenance and completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub created_at: DateTime<Utc>,
    pub data_sources: Vec<String>,
    pub research_quality_score: f64,
}

impl ArtifactMetadata {
    /// Whether copy may reference news or company details.
    pub fn has_cached_research(&self) -> bool {
        self.data_sources
            .iter()
            .any(|s| s == "cached company research" || s == "signal_enrichment")
    }
}

/// The full fact sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchArtifact {
    pub prospect: Prospect,
    pub company: Company,
    pub signals: Signals,
    pub icp_fit: IcpFit,
    pub pains: Pains,
    pub personalization: Personalization,
    pub constraints: Constraints,
    pub metadata: ArtifactMetadata,
}

/// Builder output. Validation failure is reported here, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub artifact: ResearchArtifact,
    pub validation: ValidationReport,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
