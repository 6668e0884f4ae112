//! Optional generative refinement of pains and drafts.
//!
//! Nothing here can fail the caller. Every generative path validates its
//! output against what the artifact or draft already holds and falls back to
//! the deterministic result when validation, the network or parsing fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{contains_dash, ProductConfig};
use crate::error::LangbaseError;
use crate::evidence::Evidence;
use crate::langbase::{LangbaseClient, PainSuggestion, PolishResponse};
use crate::qa::{check_message_variant, metric_tokens};
use crate::render::{char_count, word_count, Channel, MessageVariant};
use crate::research::{PainHypothesis, ResearchArtifact};

/// Ungrounded pains never rank above this after refinement.
pub const UNGROUNDED_CONFIDENCE_CAP: f64 = 0.5;

/// Most pains kept from one refinement.
pub const MAX_REFINED_PAINS: usize = 5;

/// Polished drafts must stay within this band of the original word count.
const POLISH_WORD_RATIO: (f64, f64) = (0.8, 1.2);

/// Why a generative step was discarded.
#[derive(Debug, Error)]
pub enum RefineError {
    /// Langbase call failed.
    #[error(transparent)]
    Langbase(#[from] LangbaseError),

    /// Completion was not the expected JSON.
    #[error("Unparseable completion: {0}")]
    Parse(#[from] serde_json::Error),

    /// Completion had nothing usable.
    #[error("No usable suggestions")]
    Empty,
}

// ============================================================================
// Pain refinement
// ============================================================================

/// Produces the ordered pain list the renderer should use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PainRefiner: Send + Sync {
    /// Never fails; a refiner that cannot improve the list returns it as is.
    async fn refine(&self, artifact: &ResearchArtifact) -> Vec<PainHypothesis>;
}

/// The artifact's own pains, highest confidence first. Stable on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedRefiner;

#[async_trait]
impl PainRefiner for RuleBasedRefiner {
    async fn refine(&self, artifact: &ResearchArtifact) -> Vec<PainHypothesis> {
        let mut pains = artifact.pains.hypothesized_pains.clone();
        pains.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        pains
    }
}

/// Asks a Langbase pipe to re-rank pains, falling back to `fallback`.
pub struct GenerativeRefiner<F: PainRefiner> {
    client: LangbaseClient,
    pipe: String,
    fallback: F,
}

impl<F: PainRefiner> GenerativeRefiner<F> {
    /// Refiner calling `pipe`, falling back to `fallback`.
    pub fn new(client: LangbaseClient, pipe: impl Into<String>, fallback: F) -> Self {
        Self {
            client,
            pipe: pipe.into(),
            fallback,
        }
    }

    async fn try_refine(&self, artifact: &ResearchArtifact) -> Result<Vec<PainHypothesis>, RefineError> {
        let payload = serde_json::to_string(artifact)?;
        let completion = self.client.complete(&self.pipe, payload).await?;
        let suggestions = PainSuggestion::list_from_completion(&completion)?;
        let pains = accept_suggestions(artifact, &suggestions);
        if pains.is_empty() {
            return Err(RefineError::Empty);
        }
        debug!(
            pipe = %self.pipe,
            offered = suggestions.len(),
            kept = pains.len(),
            "Refined pains"
        );
        Ok(pains)
    }
}

#[async_trait]
impl<F: PainRefiner> PainRefiner for GenerativeRefiner<F> {
    async fn refine(&self, artifact: &ResearchArtifact) -> Vec<PainHypothesis> {
        match self.try_refine(artifact).await {
            Ok(pains) => pains,
            Err(e) => {
                warn!(pipe = %self.pipe, error = %e, "Pain refinement fell back to rules");
                self.fallback.refine(artifact).await
            }
        }
    }
}

/// Every evidence source string the artifact already carries.
fn known_sources(artifact: &ResearchArtifact) -> HashSet<String> {
    let signals = &artifact.signals;
    artifact
        .pains
        .hypothesized_pains
        .iter()
        .map(|p| &p.evidence)
        .chain(signals.tech_stack.iter().map(|t| &t.evidence))
        .chain(signals.intent_signals.iter().map(|t| &t.evidence))
        .chain(signals.triggers.iter().map(|t| &t.evidence))
        .chain(artifact.personalization.hooks.iter().map(|h| &h.evidence_field))
        .filter(|e| e.is_grounded())
        .filter_map(|e| e.source())
        .map(|s| s.trim().to_string())
        .collect()
}

/// Keep suggestions whose evidence is already in the artifact.
///
/// A suggestion citing an unknown source is dropped. One citing nothing is
/// kept as ungrounded with its confidence capped. Output is deduped by
/// lowercase text and sorted by confidence.
pub fn accept_suggestions(
    artifact: &ResearchArtifact,
    suggestions: &[PainSuggestion],
) -> Vec<PainHypothesis> {
    let sources = known_sources(artifact);
    let mut seen = HashSet::new();
    let mut pains: Vec<PainHypothesis> = suggestions
        .iter()
        .filter_map(|s| {
            let text = s.pain.trim();
            if text.is_empty() || contains_dash(text) || !s.confidence.is_finite() {
                return None;
            }
            let cited = s.evidence.as_deref().map(str::trim).filter(|e| !e.is_empty());
            match cited {
                Some(source) if sources.contains(source) => {
                    Some(PainHypothesis::new(text, s.confidence, Evidence::grounded(source)))
                }
                Some(_) => None,
                None => Some(PainHypothesis::new(
                    text,
                    s.confidence.min(UNGROUNDED_CONFIDENCE_CAP),
                    Evidence::Ungrounded,
                )),
            }
        })
        .filter(|p| seen.insert(p.pain.to_lowercase()))
        .collect();
    pains.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    pains.truncate(MAX_REFINED_PAINS);
    pains
}

/// Copy of `artifact` carrying `pains`. The input is left untouched.
pub fn with_pains(artifact: &ResearchArtifact, pains: Vec<PainHypothesis>) -> ResearchArtifact {
    let mut refined = artifact.clone();
    refined.pains.hypothesized_pains = pains;
    refined
}

// ============================================================================
// Message polish
// ============================================================================

/// Result of a polish attempt. `body` is always sendable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolishOutcome {
    /// Body to send.
    pub body: String,
    /// Whether the generative polish was kept.
    pub polished: bool,
    /// Why the draft was kept instead.
    pub fallback_reason: Option<String>,
}

impl PolishOutcome {
    fn original(body: &str, reason: String) -> Self {
        Self {
            body: body.to_string(),
            polished: false,
            fallback_reason: Some(reason),
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

/// Check a polished candidate against the draft it replaces.
pub fn validate_polish(original: &str, candidate: &str) -> Result<(), String> {
    if candidate.trim().is_empty() {
        return Err("empty body".to_string());
    }
    if contains_dash(candidate) {
        return Err("contains a dash".to_string());
    }

    let before = word_count(original) as f64;
    let after = word_count(candidate) as f64;
    let (low, high) = POLISH_WORD_RATIO;
    if after < before * low || after > before * high {
        return Err(format!("word count {} outside {:.0}-{:.0}", after, before * low, before * high));
    }

    let kept = metric_tokens(candidate);
    if let Some(missing) = metric_tokens(original).into_iter().find(|m| !kept.contains(m)) {
        return Err(format!("dropped metric {}", missing));
    }

    if last_line(original) != last_line(candidate) {
        return Err("signoff changed".to_string());
    }
    Ok(())
}

/// Run the polish pipe over `body`, keeping the original on any failure.
pub async fn polish_message(client: &LangbaseClient, pipe: &str, body: &str) -> PolishOutcome {
    let completion = match client.complete(pipe, body.to_string()).await {
        Ok(c) => c,
        Err(e) => {
            warn!(pipe = %pipe, error = %e, "Polish fell back to original");
            return PolishOutcome::original(body, e.to_string());
        }
    };

    let candidate = PolishResponse::from_completion(&completion).body;
    match validate_polish(body, &candidate) {
        Ok(()) => PolishOutcome {
            body: candidate,
            polished: true,
            fallback_reason: None,
        },
        Err(reason) => {
            warn!(pipe = %pipe, reason = %reason, "Polished draft rejected");
            PolishOutcome::original(body, reason)
        }
    }
}

/// Polish a rendered touch, keeping the original unless the polished copy
/// also passes the QA gate. Call snippets are returned unchanged.
pub async fn polish_variant(
    client: &LangbaseClient,
    pipe: &str,
    variant: &MessageVariant,
    artifact: &ResearchArtifact,
    catalog: &ProductConfig,
) -> MessageVariant {
    if variant.channel == Channel::Phone {
        return variant.clone();
    }
    let outcome = polish_message(client, pipe, &variant.body).await;
    if !outcome.polished {
        return variant.clone();
    }

    let mut polished = variant.clone();
    polished.char_count = char_count(&outcome.body);
    polished.word_count = word_count(&outcome.body);
    polished.body = outcome.body;

    let qa = check_message_variant(&polished, artifact, catalog);
    if qa.passed {
        polished
    } else {
        warn!(
            touch = variant.touch_number,
            failed = ?qa.failures(),
            "Polished touch failed QA"
        );
        variant.clone()
    }
}
