//! Versioned scoring policy: tier cutoffs, feature weights, feedback gates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Tier
// ============================================================================

/// Lead priority bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Work now: full cadence.
    Hot,
    /// Worth a full sequence.
    Warm,
    /// Light-touch cadence.
    Cool,
    /// Minimal outreach.
    Cold,
}

impl Tier {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "hot",
            Tier::Warm => "warm",
            Tier::Cool => "cool",
            Tier::Cold => "cold",
        }
    }

    /// Tier under the default policy.
    pub fn from_score(score: i32) -> Self {
        ScoringPolicy::default().tier_for(score)
    }

    /// Hot and warm leads.
    pub fn is_engaged(&self) -> bool {
        matches!(self, Tier::Hot | Tier::Warm)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(Tier::Hot),
            "warm" => Ok(Tier::Warm),
            "cool" => Ok(Tier::Cool),
            "cold" => Ok(Tier::Cold),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

// ============================================================================
// Weights
// ============================================================================

/// Maximum points per feature. The penalty is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureWeights {
    /// Title matches a buyer persona.
    pub title_persona_match: i32,
    /// Vertical is a target vertical.
    pub vertical_fit: i32,
    /// Company size is in the sweet spot.
    pub size_fit: i32,
    /// Seniority carries buying power.
    pub seniority_fit: i32,
    /// Account shows buyer intent.
    pub buyer_intent_bonus: i32,
    /// A competitor tool is in the stack.
    pub competitor_tool_bonus: i32,
    /// VP at a very large company, who rarely replies to cold outreach.
    pub large_company_vp_penalty: i32,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            title_persona_match: 25,
            vertical_fit: 15,
            size_fit: 15,
            seniority_fit: 15,
            buyer_intent_bonus: 15,
            competitor_tool_bonus: 15,
            large_company_vp_penalty: -10,
        }
    }
}

impl FeatureWeights {
    /// `(feature, weight)` pairs in evaluation order.
    pub fn entries(&self) -> [(&'static str, i32); 7] {
        [
            ("title_persona_match", self.title_persona_match),
            ("vertical_fit", self.vertical_fit),
            ("size_fit", self.size_fit),
            ("seniority_fit", self.seniority_fit),
            ("buyer_intent_bonus", self.buyer_intent_bonus),
            ("competitor_tool_bonus", self.competitor_tool_bonus),
            ("large_company_vp_penalty", self.large_company_vp_penalty),
        ]
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Declared, versioned scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Policy identifier recorded on every score.
    pub version: String,
    /// Minimum score for Hot.
    pub hot: i32,
    /// Minimum score for Warm.
    pub warm: i32,
    /// Minimum score for Cool.
    pub cool: i32,
    /// Sends a bucket needs before feedback may override static selection.
    pub feedback_min_sample: usize,
    /// Feedback look-back window in days.
    pub feedback_window_days: i64,
    /// Feature weights.
    pub weights: FeatureWeights,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: "icp-v2".to_string(),
            hot: 80,
            warm: 60,
            cool: 40,
            feedback_min_sample: 5,
            feedback_window_days: 90,
            weights: FeatureWeights::default(),
        }
    }
}

impl ScoringPolicy {
    /// Default cutoffs with the feedback gates taken from configuration.
    pub fn with_feedback(min_sample: usize, window_days: i64) -> Self {
        Self {
            feedback_min_sample: min_sample,
            feedback_window_days: window_days,
            ..Self::default()
        }
    }

    /// Each cutoff is inclusive.
    pub fn tier_for(&self, score: i32) -> Tier {
        if score >= self.hot {
            Tier::Hot
        } else if score >= self.warm {
            Tier::Warm
        } else if score >= self.cool {
            Tier::Cool
        } else {
            Tier::Cold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_exact() {
        let cases = [
            (100, Tier::Hot),
            (80, Tier::Hot),
            (79, Tier::Warm),
            (60, Tier::Warm),
            (59, Tier::Cool),
            (40, Tier::Cool),
            (39, Tier::Cold),
            (0, Tier::Cold),
        ];
        for (score, tier) in cases {
            assert_eq!(Tier::from_score(score), tier, "score {}", score);
        }
    }

    #[test]
    fn test_weights_sum_to_100_before_penalty() {
        let sum: i32 = FeatureWeights::default()
            .entries()
            .iter()
            .filter(|(_, w)| *w > 0)
            .map(|(_, w)| w)
            .sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn test_tier_parse_and_display() {
        assert_eq!("HOT".parse::<Tier>(), Ok(Tier::Hot));
        assert!("lukewarm".parse::<Tier>().is_err());
        assert_eq!(Tier::Cool.to_string(), "cool");
        let json = serde_json::to_string(&Tier::Warm).unwrap();
        assert_eq!(json, "\"warm\"");
    }

    #[test]
    fn test_policy_version() {
        assert_eq!(ScoringPolicy::default().version, "icp-v2");
        assert_eq!(ScoringPolicy::with_feedback(10, 30).feedback_min_sample, 10);
    }
}
