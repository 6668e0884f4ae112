//! Product catalog: proof points, value props, forbidden phrases, limits.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{CatalogError, CatalogResult};
use crate::render::Channel;

/// A verified customer outcome that may be cited in outreach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofPoint {
    /// Catalog key. Filled from the map key when loading JSON.
    #[serde(skip)]
    pub key: String,
    /// Full sentence form.
    pub text: String,
    /// Short form used in call snippets.
    pub short: String,
    /// Headline metric, if any.
    #[serde(default)]
    pub metric: String,
    /// Contexts this proof point fits (verticals, tools, situations).
    #[serde(default)]
    pub best_for: Vec<String>,
}

impl ProofPoint {
    fn new(key: &str, text: &str, short: &str, metric: &str, best_for: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            text: text.to_string(),
            short: short.to_string(),
            metric: metric.to_string(),
            best_for: best_for.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-channel character limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxChars {
    /// LinkedIn body limit in characters.
    pub linkedin: usize,
    /// Email body limit in characters.
    pub email: usize,
    /// Subject line limit in characters.
    pub subject_line: usize,
}

impl MaxChars {
    /// Body limit for a channel. Call snippets share the LinkedIn limit.
    pub fn for_channel(&self, channel: Channel) -> usize {
        match channel {
            Channel::Email => self.email,
            Channel::Linkedin | Channel::Phone => self.linkedin,
        }
    }
}

impl Default for MaxChars {
    fn default() -> Self {
        Self {
            linkedin: 1900,
            email: 3000,
            subject_line: 80,
        }
    }
}

/// The single source of truth for all generated language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Our company name.
    pub company: String,
    /// Name the messages are signed with.
    pub sender: String,
    /// Value props, quoted verbatim.
    #[serde(default)]
    pub value_props: Vec<String>,
    #[serde(
        serialize_with = "serialize_proof_points",
        deserialize_with = "deserialize_proof_points"
    )]
    /// Proof points in catalog order.
    pub proof_points: Vec<ProofPoint>,
    /// Call-to-action options.
    #[serde(default)]
    pub cta_options: Vec<String>,
    /// Phrases no message may contain.
    #[serde(default)]
    pub forbidden_phrases: Vec<String>,
    /// Character limits.
    #[serde(default)]
    pub max_chars: MaxChars,
    /// Tone name to description.
    #[serde(default)]
    pub tone_descriptions: BTreeMap<String, String>,
}

impl ProductConfig {
    /// Built-in catalog.
    pub fn builtin() -> Self {
        Self {
            company: "Testsigma".to_string(),
            sender: "Rob Gorham".to_string(),
            value_props: vec![
                "AI self-healing keeps suites stable when the UI changes".to_string(),
                "Plain-English authoring lets manual testers and developers collaborate on automation".to_string(),
                "One cloud platform covers web, mobile and API testing".to_string(),
            ],
            proof_points: vec![
                ProofPoint::new(
                    "hansard_regression",
                    "Hansard cut regression from 8 weeks to 5 weeks with AI auto-heal",
                    "Hansard cut regression from 8 weeks to 5",
                    "8 weeks to 5 weeks",
                    &["insurance", "financial services", "finserv", "long regression cycles"],
                ),
                ProofPoint::new(
                    "medibuddy_scale",
                    "Medibuddy automated 2,500 tests and cut maintenance 50%",
                    "Medibuddy automate 2,500 tests and halve maintenance",
                    "50% less maintenance",
                    &["healthcare", "digital health", "mid-size teams", "scaling"],
                ),
                ProofPoint::new(
                    "cred_coverage",
                    "CRED hit 90% regression automation and 5x faster execution",
                    "CRED reach 90% regression automation",
                    "90% automation, 5x faster",
                    &["fintech", "high-velocity", "fast release cycles"],
                ),
                ProofPoint::new(
                    "sanofi_speed",
                    "Sanofi went from 3-day regression to 80 minutes",
                    "Sanofi take regression from 3 days to 80 minutes",
                    "3 days to 80 minutes",
                    &["pharma", "healthcare", "compliance-heavy", "large regression"],
                ),
                ProofPoint::new(
                    "fortune100_productivity",
                    "A Fortune 100 company saw 3X productivity increase",
                    "a Fortune 100 team triple QA productivity",
                    "3X productivity",
                    &["enterprise", "vp-level", "big tech"],
                ),
                ProofPoint::new(
                    "nagra_api",
                    "Nagra DTV built 2,500 tests in 8 months, 4X faster",
                    "Nagra DTV build 2,500 tests in 8 months",
                    "4X faster",
                    &["media", "streaming", "api testing", "telecom"],
                ),
                ProofPoint::new(
                    "spendflo_roi",
                    "Spendflo cut 50% of manual testing with ROI in first quarter",
                    "Spendflo cut manual testing in half",
                    "50% less manual testing",
                    &["saas", "small teams", "startup", "budget-conscious"],
                ),
                ProofPoint::new(
                    "selenium_maintenance",
                    "Teams moving off Selenium see 70% less maintenance",
                    "teams off Selenium cut maintenance 70%",
                    "70% maintenance reduction",
                    &["selenium users", "cypress users", "playwright users"],
                ),
                ProofPoint::new(
                    "self_healing",
                    "AI self-healing removes up to 90% of test maintenance",
                    "teams remove 90% of maintenance with self-healing",
                    "90% maintenance reduction",
                    &["flaky tests", "brittle tests", "frequent ui changes"],
                ),
            ],
            cta_options: vec![
                "15-minute walkthrough".to_string(),
                "side-by-side comparison".to_string(),
                "short case study".to_string(),
            ],
            forbidden_phrases: vec![
                "I saw your post".to_string(),
                "browsing your profile".to_string(),
                "hope this finds you well".to_string(),
                "just checking in".to_string(),
                "touching base".to_string(),
                "game-changer".to_string(),
                "revolutionary".to_string(),
                "guaranteed".to_string(),
                "synergy".to_string(),
            ],
            max_chars: MaxChars::default(),
            tone_descriptions: BTreeMap::from([
                (
                    "friendly".to_string(),
                    "Warm, conversational, peer to peer".to_string(),
                ),
                (
                    "direct".to_string(),
                    "Short sentences, lead with the point, no softeners".to_string(),
                ),
                (
                    "curious".to_string(),
                    "Question led, invites the prospect to reflect".to_string(),
                ),
            ]),
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str, origin: &str) -> CatalogResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json, &origin)
    }

    /// Reject catalogs that cannot back generation.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.proof_points.is_empty() {
            return Err(CatalogError::Empty);
        }
        for pp in &self.proof_points {
            if pp.text.trim().is_empty() {
                return Err(CatalogError::InvalidEntry {
                    key: pp.key.clone(),
                    message: "text is empty".to_string(),
                });
            }
            if contains_dash(&pp.text) || contains_dash(&pp.short) {
                return Err(CatalogError::InvalidEntry {
                    key: pp.key.clone(),
                    message: "em or en dash in proof point text".to_string(),
                });
            }
        }
        if let Some(vp) = self.value_props.iter().find(|vp| contains_dash(vp)) {
            return Err(CatalogError::InvalidEntry {
                key: "value_props".to_string(),
                message: format!("em or en dash in '{}'", vp),
            });
        }
        Ok(())
    }

    /// Look up a proof point by key.
    pub fn proof_point(&self, key: &str) -> Option<&ProofPoint> {
        self.proof_points.iter().find(|pp| pp.key == key)
    }

    /// Whether `key` names a cataloged proof point.
    pub fn contains_key(&self, key: &str) -> bool {
        self.proof_point(key).is_some()
    }

    /// Fetch a proof point or fail with [`CatalogError::UnknownKey`].
    pub fn require(&self, key: &str) -> CatalogResult<&ProofPoint> {
        self.proof_point(key).ok_or_else(|| CatalogError::UnknownKey {
            key: key.to_string(),
        })
    }
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// True when `text` holds an em or en dash.
pub(crate) fn contains_dash(text: &str) -> bool {
    text.contains('\u{2014}') || text.contains('\u{2013}')
}

fn serialize_proof_points<S>(points: &[ProofPoint], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(points.len()))?;
    for pp in points {
        map.serialize_entry(&pp.key, pp)?;
    }
    map.end()
}

/// Keeps document order so argmax ties resolve the same way every load.
fn deserialize_proof_points<'de, D>(deserializer: D) -> Result<Vec<ProofPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedPoints;

    impl<'de> Visitor<'de> for OrderedPoints {
        type Value = Vec<ProofPoint>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of proof point key to {text, short, metric, best_for}")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut points = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, mut pp)) = access.next_entry::<String, ProofPoint>()? {
                pp.key = key;
                points.push(pp);
            }
            Ok(points)
        }
    }

    deserializer.deserialize_map(OrderedPoints)
}
