//! Signal enrichment from job postings, funding data and company news.
//!
//! Absent inputs yield an empty [`Enrichment`], never an error. Merging into
//! an artifact only adds facts and is idempotent.

mod analyze;
mod patterns;

pub use analyze::{
    analyze_company_news, analyze_funding, analyze_job_posting, analyze_job_postings_batch,
    FundingAnalysis, NewsAnalysis, PostingAnalysis, PostingBatch,
};
pub use patterns::BudgetSignal;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::evidence::{Evidence, Evidenced};
use crate::research::{PainHypothesis, ResearchArtifact};

/// Summary used when nothing was detected.
pub const NO_SIGNALS_SUMMARY: &str = "No enrichment signals detected";

/// Data source tag appended on merge.
pub const ENRICHMENT_SOURCE: &str = "signal_enrichment";

// ============================================================================
// Types
// ============================================================================

/// An open position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Posting title.
    #[serde(default)]
    pub title: String,
    /// Posting body.
    #[serde(default, alias = "description")]
    pub text: String,
}

/// Everything enrichment may look at. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentInput {
    /// Company the signals belong to.
    #[serde(default)]
    pub company_name: String,
    /// Open positions.
    #[serde(default)]
    pub job_postings: Vec<JobPosting>,
    /// Free-text funding announcement.
    #[serde(default)]
    pub funding_text: Option<String>,
    /// Amount raised, as written.
    #[serde(default)]
    pub funding_amount: Option<String>,
    /// Round name such as `Series B`.
    #[serde(default)]
    pub funding_stage: Option<String>,
    /// Announcement date, as written.
    #[serde(default)]
    pub funding_date: Option<String>,
    /// Free-text company news.
    #[serde(default)]
    pub news_text: Option<String>,
}

/// Signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Weak or indirect.
    Low,
    /// Worth mentioning.
    Medium,
    /// Strong enough to lead with.
    High,
}

/// QA hiring pace derived from open QA roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiringVelocity {
    /// No open QA roles.
    #[default]
    None,
    /// One open QA role.
    Low,
    /// Two to four open QA roles.
    Medium,
    /// Five or more open QA roles.
    High,
}

impl HiringVelocity {
    /// 0 none, 1 low, 2-4 medium, 5+ high.
    pub fn from_count(qa_roles: usize) -> Self {
        match qa_roles {
            0 => HiringVelocity::None,
            1 => HiringVelocity::Low,
            2..=4 => HiringVelocity::Medium,
            _ => HiringVelocity::High,
        }
    }

    fn strength(&self) -> Option<Strength> {
        match self {
            HiringVelocity::None => None,
            HiringVelocity::Low => Some(Strength::Low),
            HiringVelocity::Medium => Some(Strength::Medium),
            HiringVelocity::High => Some(Strength::High),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            HiringVelocity::None => "none",
            HiringVelocity::Low => "low",
            HiringVelocity::Medium => "medium",
            HiringVelocity::High => "high",
        }
    }
}

impl fmt::Display for HiringVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected signal with the text that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSignal {
    /// Category such as `hiring` or `funding`.
    pub signal_type: String,
    /// What was detected.
    pub description: String,
    /// Input the signal came from.
    pub source: String,
    /// Signal strength.
    pub strength: Strength,
    /// Text behind the signal.
    pub evidence: Evidence,
}

impl EnrichmentSignal {
    pub(crate) fn new(
        signal_type: &str,
        description: String,
        source: &str,
        strength: Strength,
        evidence: Evidence,
    ) -> Self {
        Self {
            signal_type: signal_type.to_string(),
            description,
            source: source.to_string(),
            strength,
            evidence,
        }
    }

    fn dedup_key(&self) -> String {
        let head: String = self.description.chars().take(50).collect();
        format!("{}:{}", self.signal_type, head)
    }
}

/// A pain category matched in a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainIndicator {
    /// Pain category.
    pub kind: String,
    /// Keywords that matched.
    pub keywords_matched: Vec<String>,
    /// Posting the match came from.
    pub evidence: String,
}

/// Unified enrichment output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Deduplicated signals.
    pub signals: Vec<EnrichmentSignal>,
    /// Pains implied by the signals.
    pub pain_hypotheses: Vec<PainHypothesis>,
    /// Tools named in postings.
    pub tech_stack_evidence: Vec<Evidenced<String>>,
    /// QA hiring pace.
    pub hiring_velocity: HiringVelocity,
    /// Open QA roles counted.
    pub total_qa_roles: usize,
    /// Transformation themes from news.
    pub transformations: Vec<String>,
    /// One-line summary for logs and reports.
    pub enrichment_summary: String,
}

impl Enrichment {
    /// Whether anything was detected.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
            && self.pain_hypotheses.is_empty()
            && self.tech_stack_evidence.is_empty()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run every analyzer that has input and combine the results.
pub fn enrich_from_signals(input: &EnrichmentInput) -> Enrichment {
    let company = input.company_name.trim();
    let mut signals = Vec::new();
    let mut pain_hypotheses = Vec::new();
    let mut tech_stack_evidence = Vec::new();
    let mut transformations = Vec::new();
    let mut hiring_velocity = HiringVelocity::None;
    let mut total_qa_roles = 0;

    if !input.job_postings.is_empty() {
        let batch = analyze_job_postings_batch(&input.job_postings, company);
        signals.extend(batch.signals);
        pain_hypotheses.extend(batch.pain_hypotheses);
        tech_stack_evidence.extend(batch.tech_stack_evidence);
        hiring_velocity = batch.hiring_velocity;
        total_qa_roles = batch.total_qa_roles;
    }

    let funding_text = input.funding_text.as_deref().unwrap_or("").trim();
    let funding_stage = input
        .funding_stage
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if !funding_text.is_empty() || funding_stage.is_some() {
        let funding = analyze_funding(
            funding_text,
            company,
            input.funding_amount.as_deref(),
            funding_stage,
            input.funding_date.as_deref(),
        );
        signals.extend(funding.signals);
        pain_hypotheses.extend(funding.pain_hypotheses);
    }

    if let Some(news) = input.news_text.as_deref().filter(|n| !n.trim().is_empty()) {
        let news = analyze_company_news(news, company);
        signals.extend(news.signals);
        pain_hypotheses.extend(news.pain_hypotheses);
        transformations = news.transformations;
    }

    let mut seen = std::collections::HashSet::new();
    signals.retain(|s| seen.insert(s.dedup_key()));

    let mut parts = Vec::new();
    if total_qa_roles > 0 {
        parts.push(format!("{} QA roles open", total_qa_roles));
    }
    if !tech_stack_evidence.is_empty() {
        let tools: Vec<&str> = tech_stack_evidence.iter().map(|t| t.value.as_str()).collect();
        parts.push(format!("uses {}", tools.join(", ")));
    }
    if let Some(stage) = funding_stage {
        parts.push(format!("{} funding", stage));
    }
    if !transformations.is_empty() {
        let kinds: Vec<String> = transformations.iter().map(|t| t.replace('_', " ")).collect();
        parts.push(kinds.join(", "));
    }
    let enrichment_summary = if parts.is_empty() {
        NO_SIGNALS_SUMMARY.to_string()
    } else {
        parts.join("; ")
    };

    debug!(
        company = %company,
        signals = signals.len(),
        pains = pain_hypotheses.len(),
        velocity = %hiring_velocity,
        "Enrichment complete"
    );

    Enrichment {
        signals,
        pain_hypotheses,
        tech_stack_evidence,
        hiring_velocity,
        total_qa_roles,
        transformations,
        enrichment_summary,
    }
}

fn pain_key(pain: &str) -> String {
    pain.to_lowercase().chars().take(50).collect()
}

/// Add enrichment facts to an artifact without overwriting anything.
///
/// Applying the same enrichment twice leaves the artifact unchanged the
/// second time.
pub fn merge_enrichment_into_artifact(artifact: &mut ResearchArtifact, enrichment: &Enrichment) {
    let signals = &mut artifact.signals;

    for tech in &enrichment.tech_stack_evidence {
        let known = signals
            .tech_stack
            .iter()
            .any(|t| t.value.eq_ignore_ascii_case(&tech.value));
        if !known {
            signals.tech_stack.push(tech.clone());
        }
    }

    for sig in &enrichment.signals {
        if matches!(
            sig.signal_type.as_str(),
            "funding" | "budget_available" | "digital_transformation" | "hiring_qa" | "hiring_velocity"
        ) {
            push_unique(
                &mut signals.intent_signals,
                Evidenced::new(sig.description.clone(), sig.evidence.clone()),
            );
        }
        if matches!(
            sig.signal_type.as_str(),
            "hiring_qa" | "hiring_velocity" | "funding" | "digital_transformation" | "competitor_tool"
        ) {
            push_unique(
                &mut signals.triggers,
                Evidenced::new(
                    format!("{}: {}", sig.signal_type.replace('_', " "), sig.description),
                    sig.evidence.clone(),
                ),
            );
        }
    }

    let pains = &mut artifact.pains.hypothesized_pains;
    for pain in &enrichment.pain_hypotheses {
        let key = pain_key(&pain.pain);
        if !pains.iter().any(|p| pain_key(&p.pain) == key) {
            pains.push(pain.clone());
        }
    }

    let sources = &mut artifact.metadata.data_sources;
    if !sources.iter().any(|s| s == ENRICHMENT_SOURCE) {
        sources.push(ENRICHMENT_SOURCE.to_string());
    }

    let summary = enrichment.enrichment_summary.trim();
    if !summary.is_empty() && summary != NO_SIGNALS_SUMMARY {
        let reason = format!("Enrichment: {}", summary);
        if !artifact.icp_fit.fit_reasons.contains(&reason) {
            artifact.icp_fit.fit_reasons.push(reason);
        }
    }
}

fn push_unique(items: &mut Vec<Evidenced<String>>, item: Evidenced<String>) {
    if !items.iter().any(|i| i.value == item.value) {
        items.push(item);
    }
}
