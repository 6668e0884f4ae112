//! Proof-point selection with rotation and optional feedback bias.

use tracing::debug;

use crate::config::{ProductConfig, ProofPoint};
use crate::error::{CatalogError, CatalogResult};
use crate::feedback::{proof_point_preference, ConversionStats};
use crate::research::inference::{display_tool_name, has_keyword, normalize, HEADLINE_COMPETITORS};
use crate::research::ResearchArtifact;

const VERTICAL_MATCH: i32 = 3;
const TOOL_MATCH: i32 = 2;
const PAIN_MATCH: i32 = 1;

/// How well a proof point fits the artifact.
///
/// Verticals match whole tags only, so "tech" never matches "fintech".
/// Tools and pains match whole words inside a tag.
pub fn proof_point_score(pp: &ProofPoint, artifact: &ResearchArtifact) -> i32 {
    let tags: Vec<String> = pp.best_for.iter().map(|t| t.trim().to_lowercase()).collect();
    let normalized_tags: Vec<String> = tags.iter().map(|t| normalize(t)).collect();
    let mut score = 0;

    let vertical = artifact.company.vertical.trim().to_lowercase();
    let industry = artifact
        .company
        .industry
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let is_vertical = |t: &String| {
        (!vertical.is_empty() && *t == vertical) || (!industry.is_empty() && *t == industry)
    };
    if tags.iter().any(is_vertical) {
        score += VERTICAL_MATCH;
    }

    for tool in &artifact.signals.tech_stack {
        let tool = tool.value.trim();
        if normalized_tags.iter().any(|t| has_keyword(t, tool)) {
            score += TOOL_MATCH;
        }
    }

    for pain in &artifact.pains.hypothesized_pains {
        let text = normalize(&pain.pain);
        if tags.iter().any(|tag| has_keyword(&text, tag)) {
            score += PAIN_MATCH;
        }
    }

    score
}

/// Best-scoring proof point not in `exclude_keys`.
///
/// Ties go to catalog order. When every key is excluded the rotation is
/// exhausted and the first catalog entry is reused.
pub fn select_best_proof_point<'a>(
    artifact: &ResearchArtifact,
    catalog: &'a ProductConfig,
    exclude_keys: &[String],
) -> CatalogResult<&'a ProofPoint> {
    let mut best: Option<(&ProofPoint, i32)> = None;
    for pp in catalog
        .proof_points
        .iter()
        .filter(|pp| !exclude_keys.contains(&pp.key))
    {
        let score = proof_point_score(pp, artifact);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((pp, score));
        }
    }

    match best {
        Some((pp, score)) => {
            debug!(key = %pp.key, score, "Selected proof point");
            Ok(pp)
        }
        None => catalog.proof_points.first().ok_or(CatalogError::Empty),
    }
}

/// Prefer the feedback winner when it clears the sample gate and is not
/// excluded; otherwise fall back to [`select_best_proof_point`].
pub fn select_with_feedback<'a>(
    artifact: &ResearchArtifact,
    catalog: &'a ProductConfig,
    exclude_keys: &[String],
    stats: Option<&ConversionStats>,
    min_sample: usize,
) -> CatalogResult<&'a ProofPoint> {
    if let Some(preferred) = stats.and_then(|s| proof_point_preference(s, min_sample)) {
        if !exclude_keys.contains(&preferred) {
            if let Some(pp) = catalog.proof_point(&preferred) {
                debug!(key = %pp.key, "Selected proof point from feedback");
                return Ok(pp);
            }
        }
    }
    select_best_proof_point(artifact, catalog, exclude_keys)
}

/// Clause tying a proof point to the prospect's situation.
///
/// A detected competitor the proof point does not already name gives
/// `" after a similar switch from {Tool}"`; with no competitor the industry
/// gives `" in a similar {industry} environment"`.
pub fn bridge_phrase(pp: &ProofPoint, artifact: &ResearchArtifact) -> String {
    let competitor = artifact
        .signals
        .tech_stack
        .iter()
        .map(|t| t.value.trim().to_lowercase())
        .find(|t| HEADLINE_COMPETITORS.contains(&t.as_str()));

    match competitor {
        Some(tool) if !pp.text.to_lowercase().contains(&tool) => {
            format!(" after a similar switch from {}", display_tool_name(&tool))
        }
        Some(_) => String::new(),
        None => artifact
            .company
            .industry
            .as_deref()
            .and_then(|i| i.split(['/', ',']).next())
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .map(|i| format!(" in a similar {} environment", i))
            .unwrap_or_default(),
    }
}
