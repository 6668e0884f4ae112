//! Stratified A/B split for one-variable experiments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::research::ResearchArtifact;

/// Variables with stock group descriptions: `(variable, group A, group B)`.
pub const AB_VARIABLES: [(&str, &str, &str); 5] = [
    (
        "pain_hook",
        "Flaky or brittle tests (maintenance angle)",
        "Release velocity (speed angle)",
    ),
    (
        "proof_point_style",
        "Named customer (Sanofi, CRED, Hansard)",
        "Anonymous customer (a Fortune 100 company)",
    ),
    (
        "opener_style",
        "Career-reference openers",
        "Company-metric openers",
    ),
    (
        "ask_intensity",
        "Direct ask for 15 minutes",
        "Soft offer to share more",
    ),
    (
        "message_length",
        "Tight (70 to 80 words)",
        "Fuller (100 to 120 words)",
    ),
];

const CONTROL: &str = "Control";
const VARIANT: &str = "Variant";

/// Experiment arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbGroup {
    /// Control arm.
    A,
    /// Variant arm.
    B,
}

impl AbGroup {
    /// `"A"` or `"B"`, as stored on touch records.
    pub fn as_str(&self) -> &'static str {
        match self {
            AbGroup::A => "A",
            AbGroup::B => "B",
        }
    }

    fn other(self) -> Self {
        match self {
            AbGroup::A => AbGroup::B,
            AbGroup::B => AbGroup::A,
        }
    }
}

impl fmt::Display for AbGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(AbGroup::A),
            "B" | "b" => Ok(AbGroup::B),
            other => Err(format!("Unknown A/B group '{}' (expected A or B)", other)),
        }
    }
}

/// One contact to split, with the strata it is balanced on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbCandidate {
    /// Contact being split.
    pub contact_id: String,
    /// Function and seniority, e.g. `"QA/Testing director"`.
    pub persona: String,
    /// Company vertical.
    pub vertical: String,
}

impl AbCandidate {
    /// Candidate from raw strata values.
    pub fn new(
        contact_id: impl Into<String>,
        persona: impl Into<String>,
        vertical: impl Into<String>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            persona: persona.into(),
            vertical: vertical.into(),
        }
    }

    /// Persona and vertical as the research artifact inferred them.
    pub fn from_artifact(contact_id: impl Into<String>, artifact: &ResearchArtifact) -> Self {
        Self::new(
            contact_id,
            format!(
                "{} {}",
                artifact.prospect.function, artifact.prospect.seniority
            ),
            artifact.company.vertical.clone(),
        )
    }
}

/// Result of one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbAssignment {
    /// Variable under test.
    pub variable: String,
    /// Description of arm A.
    pub group_a: String,
    /// Description of arm B.
    pub group_b: String,
    /// Arm per contact id.
    pub assignments: BTreeMap<String, AbGroup>,
    /// Contacts in arm A.
    pub group_a_count: usize,
    /// Contacts in arm B.
    pub group_b_count: usize,
}

impl AbAssignment {
    /// Arm for a contact, if it was part of the split.
    pub fn group_for(&self, contact_id: &str) -> Option<AbGroup> {
        self.assignments.get(contact_id).copied()
    }
}

/// Stock descriptions for `variable`, or control/variant for anything else.
pub fn group_descriptions(variable: &str) -> (&'static str, &'static str) {
    AB_VARIABLES
        .iter()
        .find(|(name, _, _)| *name == variable)
        .map(|(_, a, b)| (*a, *b))
        .unwrap_or((CONTROL, VARIANT))
}

/// Split contacts into A and B, balanced on persona and vertical.
///
/// Contacts are ordered by persona, vertical and id, and the arms alternate
/// down that order. Each stratum therefore differs by at most one between
/// arms, and the same contacts always get the same split regardless of input
/// order. A repeated contact id keeps its first arm.
pub fn assign_ab_groups(contacts: &[AbCandidate], variable: &str) -> AbAssignment {
    let (group_a, group_b) = group_descriptions(variable);

    let mut ordered: Vec<&AbCandidate> = contacts.iter().collect();
    ordered.sort_by(|x, y| {
        (&x.persona, &x.vertical, &x.contact_id).cmp(&(&y.persona, &y.vertical, &y.contact_id))
    });

    let mut assignments = BTreeMap::new();
    let mut next = AbGroup::A;
    for candidate in ordered {
        if assignments.contains_key(&candidate.contact_id) {
            continue;
        }
        assignments.insert(candidate.contact_id.clone(), next);
        next = next.other();
    }

    let group_a_count = assignments.values().filter(|g| **g == AbGroup::A).count();
    let group_b_count = assignments.len() - group_a_count;
    debug!(
        variable,
        group_a = group_a_count,
        group_b = group_b_count,
        "Assigned A/B groups"
    );

    AbAssignment {
        variable: variable.to_string(),
        group_a: group_a.to_string(),
        group_b: group_b.to_string(),
        assignments,
        group_a_count,
        group_b_count,
    }
}
