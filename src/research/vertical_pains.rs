//! Curated per-vertical pain library.
//!
//! Loaded once (built in or from JSON) and passed by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::PainHypothesis;
use crate::error::{CatalogError, CatalogResult};
use crate::evidence::Evidence;

/// Confidence added when the prospect uses one of the vertical's typical tools.
pub const TOOL_OVERLAP_BOOST: f64 = 0.1;

/// One curated pain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryPain {
    /// Pain statement.
    pub pain: String,
    /// Base confidence in 0.0 to 1.0.
    pub confidence: f64,
    /// Tools or themes the pain relates to.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Pains and typical tools for one vertical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalEntry {
    /// Tools common in the vertical.
    #[serde(default)]
    pub typical_tools: Vec<String>,
    /// Curated pains.
    #[serde(default)]
    pub pains: Vec<LibraryPain>,
}

/// `{ "verticals": { "FinTech": { ... } } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalPainLibrary {
    /// Entry per vertical name.
    #[serde(default)]
    pub verticals: BTreeMap<String, VerticalEntry>,
}

impl VerticalPainLibrary {
    /// Load a library file.
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&json).map_err(|e| CatalogError::Parse {
            path: origin,
            message: e.to_string(),
        })
    }

    /// Exact match first, then case-insensitive.
    pub fn entry(&self, vertical: &str) -> Option<&VerticalEntry> {
        self.verticals.get(vertical).or_else(|| {
            self.verticals
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(vertical))
                .map(|(_, entry)| entry)
        })
    }

    /// Pain hypotheses for a vertical, boosted on typical-tool overlap.
    pub fn pains_for(&self, vertical: &str, known_tools: &[String]) -> Vec<PainHypothesis> {
        let Some(entry) = self.entry(vertical) else {
            return Vec::new();
        };

        let overlap = known_tools.iter().any(|tool| {
            entry
                .typical_tools
                .iter()
                .any(|typical| typical.eq_ignore_ascii_case(tool.trim()))
        });

        entry
            .pains
            .iter()
            .map(|p| {
                let boosted = if overlap {
                    p.confidence + TOOL_OVERLAP_BOOST
                } else {
                    p.confidence
                };
                PainHypothesis::new(
                    &p.pain,
                    boosted,
                    Evidence::grounded(format!("from vertical pain library: {}", vertical)),
                )
            })
            .collect()
    }

    /// Built-in library keyed by the classifier's vertical names.
    pub fn builtin() -> Self {
        fn pain(text: &str, confidence: f64, tags: &[&str]) -> LibraryPain {
            LibraryPain {
                pain: text.to_string(),
                confidence,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            }
        }
        fn entry(tools: &[&str], pains: Vec<LibraryPain>) -> VerticalEntry {
            VerticalEntry {
                typical_tools: tools.iter().map(|t| t.to_string()).collect(),
                pains,
            }
        }

        let verticals = BTreeMap::from([
            (
                "FinTech".to_string(),
                entry(
                    &["Selenium", "Appium", "Cypress"],
                    vec![
                        pain(
                            "Release velocity pressure on payment flows that cannot break",
                            0.55,
                            &["velocity", "payments"],
                        ),
                        pain(
                            "Audit-ready test evidence for every release",
                            0.45,
                            &["compliance"],
                        ),
                    ],
                ),
            ),
            (
                "FinServ".to_string(),
                entry(
                    &["Tosca", "UFT", "Selenium"],
                    vec![
                        pain(
                            "Long regression cycles across legacy core banking systems",
                            0.55,
                            &["regression", "legacy"],
                        ),
                        pain(
                            "Manual testing backlog ahead of quarterly releases",
                            0.45,
                            &["manual"],
                        ),
                    ],
                ),
            ),
            (
                "Healthcare".to_string(),
                entry(
                    &["Selenium", "Appium"],
                    vec![
                        pain(
                            "Validating patient-facing workflows across web and mobile",
                            0.5,
                            &["cross-platform"],
                        ),
                        pain(
                            "Documentation overhead from regulated release processes",
                            0.45,
                            &["compliance"],
                        ),
                    ],
                ),
            ),
            (
                "SaaS".to_string(),
                entry(
                    &["Cypress", "Playwright", "Selenium"],
                    vec![
                        pain(
                            "Flaky end-to-end tests blocking continuous deployment",
                            0.55,
                            &["flaky", "ci"],
                        ),
                        pain(
                            "Test coverage lagging behind weekly feature releases",
                            0.5,
                            &["coverage"],
                        ),
                    ],
                ),
            ),
            (
                "E-Commerce".to_string(),
                entry(
                    &["Selenium", "BrowserStack"],
                    vec![pain(
                        "Checkout regressions slipping through during peak season",
                        0.5,
                        &["regression", "seasonal"],
                    )],
                ),
            ),
            (
                "Insurance".to_string(),
                entry(
                    &["Tosca", "UFT"],
                    vec![pain(
                        "Policy and claims workflows too complex to regress manually",
                        0.5,
                        &["regression"],
                    )],
                ),
            ),
            (
                "Pharma".to_string(),
                entry(
                    &["Tosca", "Selenium"],
                    vec![pain(
                        "Validated system releases tied up in lengthy regression",
                        0.5,
                        &["compliance", "regression"],
                    )],
                ),
            ),
            (
                "Telecom".to_string(),
                entry(
                    &["Appium", "Selenium"],
                    vec![pain(
                        "Device fragmentation multiplying mobile test effort",
                        0.5,
                        &["mobile"],
                    )],
                ),
            ),
            (
                "Retail".to_string(),
                entry(
                    &["Selenium"],
                    vec![pain(
                        "Store and online channels drifting out of sync in testing",
                        0.4,
                        &["omnichannel"],
                    )],
                ),
            ),
        ]);

        Self { verticals }
    }
}
