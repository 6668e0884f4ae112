//! Deterministic ICP scoring from a research artifact.
//!
//! Every feature is evaluated, missing data scores zero, and the total is
//! clamped to `[0, 100]`.

mod policy;

pub use policy::{FeatureWeights, ScoringPolicy, Tier};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::research::inference::{band_floor, has_keyword, is_competitor_tool, normalize, Seniority};
use crate::research::{JobFunction, ResearchArtifact};

/// Persona title phrases and their tier (3 primary, 2 secondary, 1 influencer).
pub const ICP_TITLE_MAP: [(&str, u8); 26] = [
    ("qa manager", 3),
    ("qa lead", 3),
    ("director of qa", 3),
    ("head of qa", 3),
    ("vp quality", 3),
    ("vp quality engineering", 3),
    ("sr director quality", 3),
    ("director quality engineering", 3),
    ("director of quality engineering", 3),
    ("director of quality", 3),
    ("head of quality", 3),
    ("quality engineering manager", 3),
    ("quality assurance", 3),
    ("software eng manager", 2),
    ("vp engineering", 2),
    ("vp software engineering", 2),
    ("cto", 2),
    ("director of engineering", 2),
    ("director engineering", 2),
    ("senior sdet", 1),
    ("automation lead", 1),
    ("qa architect", 1),
    ("test architect", 1),
    ("sdet lead", 1),
    ("principal sdet", 1),
    ("test lead", 1),
];

/// Industry keywords and their fit tier.
pub const ICP_VERTICALS: [(&str, u8); 11] = [
    ("saas", 2),
    ("fintech", 2),
    ("healthcare", 2),
    ("digital health", 2),
    ("retail", 1),
    ("e-commerce", 1),
    ("telecom", 1),
    ("pharma", 1),
    ("financial services", 2),
    ("banking", 2),
    ("insurance", 1),
];

/// Size bands and their fit tier.
pub const ICP_SIZE_BANDS: [(&str, u8); 6] = [
    ("51-200", 1),
    ("201-500", 2),
    ("501-1000", 2),
    ("1001-5000", 2),
    ("5001-10000", 1),
    ("10001-50000", 1),
];

const LARGE_COMPANY_FLOOR: u32 = 10001;

/// Score, tier and the per-feature breakdown behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Weighted sum of the feature scores.
    pub total_score: i32,
    /// Tier for the total.
    pub tier: Tier,
    /// Score per feature.
    pub feature_scores: BTreeMap<String, i32>,
    /// Weight per feature.
    pub feature_weights: BTreeMap<String, i32>,
    /// Human-readable scoring reasons.
    pub reasons: Vec<String>,
    /// Features scored without data.
    pub missing_data: Vec<String>,
    /// Policy version that produced the score.
    pub policy_version: String,
}

impl ScoringResult {
    /// Points for one feature; zero when absent.
    pub fn feature(&self, name: &str) -> i32 {
        self.feature_scores.get(name).copied().unwrap_or(0)
    }
}

fn strip_of(text: &str) -> String {
    text.replace(" of ", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best persona tier for a title, 0 when nothing matches.
pub fn title_tier(title: &str) -> u8 {
    let normalized = normalize(title);
    let stripped = normalize(&strip_of(&title.to_lowercase()));
    ICP_TITLE_MAP
        .iter()
        .filter(|(key, _)| has_keyword(&normalized, key) || has_keyword(&stripped, &strip_of(key)))
        .map(|(_, tier)| *tier)
        .max()
        .unwrap_or(0)
}

fn vertical_tier(industry: Option<&str>, vertical: &str) -> u8 {
    let text = format!("{} {}", industry.unwrap_or(""), vertical).to_lowercase();
    ICP_VERTICALS
        .iter()
        .filter(|(key, _)| text.contains(key))
        .map(|(_, tier)| *tier)
        .max()
        .unwrap_or(0)
}

fn size_tier(band: Option<&str>, employee_count: Option<u32>) -> u8 {
    let from_band = band.and_then(|b| {
        ICP_SIZE_BANDS
            .iter()
            .find(|(key, _)| *key == b.trim())
            .map(|(_, tier)| *tier)
    });
    match (from_band, employee_count) {
        (Some(tier), _) => tier,
        (None, Some(n)) if (51..=200).contains(&n) => 1,
        (None, Some(n)) if (201..=10000).contains(&n) => 2,
        (None, Some(n)) if (10001..=50000).contains(&n) => 1,
        _ => 0,
    }
}

fn scaled(weight: i32, tier: u8, max_tier: u8) -> i32 {
    weight * i32::from(tier) / i32::from(max_tier)
}

/// Score an artifact under `policy`.
pub fn score_from_artifact(artifact: &ResearchArtifact, policy: &ScoringPolicy) -> ScoringResult {
    let w = policy.weights;
    let prospect = &artifact.prospect;
    let company = &artifact.company;
    let signals = &artifact.signals;

    let mut reasons = Vec::new();
    let mut missing_data = Vec::new();
    let mut scores: BTreeMap<String, i32> = BTreeMap::new();

    // Title / persona
    let title_points = if prospect.title.is_empty() {
        missing_data.push("title".to_string());
        0
    } else {
        match title_tier(&prospect.title) {
            0 if prospect.function == JobFunction::QaTesting => {
                reasons.push(format!("QA title '{}' outside persona map", prospect.title));
                scaled(w.title_persona_match, 1, 3)
            }
            0 => 0,
            tier => {
                let label = match tier {
                    3 => "primary",
                    2 => "secondary",
                    _ => "influencer",
                };
                reasons.push(format!("Title '{}' matches {} persona", prospect.title, label));
                scaled(w.title_persona_match, tier, 3)
            }
        }
    };
    scores.insert("title_persona_match".to_string(), title_points);

    // Vertical
    if company.industry.is_none() {
        missing_data.push("industry".to_string());
    }
    let vertical_points = match vertical_tier(company.industry.as_deref(), &company.vertical) {
        0 => 0,
        tier => {
            reasons.push(format!("Vertical {} is an ICP fit", company.vertical));
            scaled(w.vertical_fit, tier, 2)
        }
    };
    scores.insert("vertical_fit".to_string(), vertical_points);

    // Size
    if company.size_band.is_none() && company.employee_count.is_none() {
        missing_data.push("company_size".to_string());
    }
    let size_points = match size_tier(company.size_band.as_deref(), company.employee_count) {
        0 => 0,
        tier => {
            reasons.push(format!(
                "Company size {} fits",
                company.size_band.as_deref().unwrap_or("(count only)")
            ));
            scaled(w.size_fit, tier, 2)
        }
    };
    scores.insert("size_fit".to_string(), size_points);

    // Seniority
    let seniority_points = if prospect.seniority.is_strategic() {
        reasons.push(format!("Decision-level seniority: {}", prospect.seniority));
        w.seniority_fit
    } else if prospect.seniority.is_mid_level() {
        scaled(w.seniority_fit, 1, 2)
    } else {
        0
    };
    scores.insert("seniority_fit".to_string(), seniority_points);

    // Buyer intent
    let intent_points = if signals.has_buyer_intent_flag() {
        reasons.push("Buyer intent flag set".to_string());
        w.buyer_intent_bonus
    } else {
        let others = signals.intent_signals.len() as i32;
        if others == 0 {
            missing_data.push("buyer_intent".to_string());
        }
        (5 * others).min(10).min(w.buyer_intent_bonus)
    };
    scores.insert("buyer_intent_bonus".to_string(), intent_points);

    // Competitor tool
    if signals.tech_stack.is_empty() {
        missing_data.push("known_tools".to_string());
    }
    let competitor = signals
        .tech_stack
        .iter()
        .find(|t| is_competitor_tool(&t.value) && t.evidence.is_grounded());
    let tool_points = match competitor {
        Some(tool) => {
            reasons.push(format!("Uses competitor tool {}", tool.value));
            w.competitor_tool_bonus
        }
        None => 0,
    };
    scores.insert("competitor_tool_bonus".to_string(), tool_points);

    // Large-company VP penalty
    let large = company
        .employee_count
        .or_else(|| company.size_band.as_deref().and_then(band_floor))
        .is_some_and(|n| n >= LARGE_COMPANY_FLOOR);
    let executive = matches!(prospect.seniority, Seniority::Vp | Seniority::CSuite);
    let penalty = if large && executive {
        reasons.push("Executive at very large company is hard to reach".to_string());
        w.large_company_vp_penalty
    } else {
        0
    };
    scores.insert("large_company_vp_penalty".to_string(), penalty);

    let raw: i32 = scores.values().sum();
    let total_score = raw.clamp(0, 100);
    let tier = policy.tier_for(total_score);

    debug!(
        prospect = %prospect.full_name,
        score = total_score,
        tier = %tier,
        policy = %policy.version,
        "Scored prospect"
    );

    ScoringResult {
        total_score,
        tier,
        feature_scores: scores,
        feature_weights: w
            .entries()
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect(),
        reasons,
        missing_data,
        policy_version: policy.version.clone(),
    }
}
