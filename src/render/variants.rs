//! Three-tone first-touch variants.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Channel, Composer, MessageVariant, Tone};
use crate::config::ProductConfig;
use crate::error::CatalogResult;
use crate::qa::{check_message_variant, QaResult};
use crate::research::ResearchArtifact;
use crate::scoring::{ScoringResult, Tier};
use crate::selection::select_best_proof_point;

/// Summary of one variant run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetadata {
    /// Prospect's full name.
    pub prospect_name: String,
    /// Company name.
    pub company: String,
    /// ICP tier.
    pub scoring_tier: Tier,
    /// ICP total score.
    pub total_score: i32,
    /// Primary pick, used by the friendly and direct variants.
    pub proof_point_used: String,
    /// Distinct keys in variant order.
    pub proof_points_used: Vec<String>,
    /// Channel the variants target.
    pub channel: Channel,
}

/// Friendly, direct and curious first touches with their QA results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    /// Friendly, direct and curious, in that order.
    pub variants: Vec<MessageVariant>,
    /// QA result per variant, same order.
    pub qa_results: Vec<QaResult>,
    /// Run summary.
    pub metadata: VariantMetadata,
}

/// Render one first touch per tone.
///
/// Friendly and direct cite the best proof point; curious cites the next
/// best so the set never repeats one story three times.
pub fn generate_message_variants(
    artifact: &ResearchArtifact,
    scoring: &ScoringResult,
    catalog: &ProductConfig,
    channel: Channel,
) -> CatalogResult<VariantSet> {
    let primary = select_best_proof_point(artifact, catalog, &[])?;
    let secondary = select_best_proof_point(artifact, catalog, &[primary.key.clone()])?;
    debug!(
        primary = %primary.key,
        secondary = %secondary.key,
        tier = %scoring.tier,
        "Selected proof points for variants"
    );

    let composer = Composer::new(artifact, catalog, scoring.tier);
    let mut variants = Vec::with_capacity(Tone::ALL.len());
    for tone in Tone::ALL {
        let (pp, other) = match tone {
            Tone::Curious => (secondary, primary),
            _ => (primary, secondary),
        };
        variants.push(composer.first_touch(tone, channel, pp, Some(other)));
    }

    let qa_results = variants
        .iter()
        .map(|v| check_message_variant(v, artifact, catalog))
        .collect();

    let mut proof_points_used: Vec<String> = Vec::new();
    for v in &variants {
        if !proof_points_used.contains(&v.proof_point_key) {
            proof_points_used.push(v.proof_point_key.clone());
        }
    }

    Ok(VariantSet {
        variants,
        qa_results,
        metadata: VariantMetadata {
            prospect_name: artifact.prospect.full_name.clone(),
            company: artifact.prospect.company_name.clone(),
            scoring_tier: scoring.tier,
            total_score: scoring.total_score,
            proof_point_used: primary.key.clone(),
            proof_points_used,
            channel,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::fixtures::sarah_artifact;
    use crate::scoring::{score_from_artifact, ScoringPolicy};

    #[test]
    fn test_three_tones_with_rotated_proof_points() {
        let catalog = ProductConfig::builtin();
        let artifact = sarah_artifact();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        let set = generate_message_variants(&artifact, &scoring, &catalog, Channel::Linkedin).unwrap();

        let tones: Vec<Tone> = set.variants.iter().map(|v| v.tone).collect();
        assert_eq!(tones, Tone::ALL.to_vec());
        assert_eq!(set.variants[0].proof_point_key, "cred_coverage");
        assert_eq!(set.variants[1].proof_point_key, "cred_coverage");
        assert_eq!(set.variants[2].proof_point_key, "selenium_maintenance");
        assert_eq!(set.metadata.proof_point_used, "cred_coverage");
        assert_eq!(
            set.metadata.proof_points_used,
            vec!["cred_coverage".to_string(), "selenium_maintenance".to_string()]
        );
        assert_eq!(set.qa_results.len(), 3);
    }

    #[test]
    fn test_variants_pass_the_gate() {
        let catalog = ProductConfig::builtin();
        let artifact = sarah_artifact();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        for channel in [Channel::Linkedin, Channel::Email] {
            let set = generate_message_variants(&artifact, &scoring, &catalog, channel).unwrap();
            for qa in &set.qa_results {
                assert!(qa.passed, "{:?}", qa);
            }
        }
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let mut catalog = ProductConfig::builtin();
        catalog.proof_points.clear();
        let artifact = sarah_artifact();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        assert!(generate_message_variants(&artifact, &scoring, &catalog, Channel::Email).is_err());
    }
}
