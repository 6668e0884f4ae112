//! Evidence-discipline checks for research artifacts.
//!
//! Failing validation is a normal outcome reported in a [`ValidationReport`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ResearchArtifact;

/// Confidence above which a pain must cite substantive evidence.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Confidence above which an ungrounded pain draws a warning.
pub const WARN_CONFIDENCE: f64 = 0.5;

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Makes the artifact invalid.
    Error,
    /// Reported but does not block.
    Warning,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Artifact field the rule looked at.
    pub field: String,
    /// What went wrong.
    pub message: String,
    /// Whether it blocks.
    pub severity: Severity,
}

/// Result of validating an artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when there are no errors.
    pub valid: bool,
    /// Blocking issues.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking issues.
    pub warnings: Vec<ValidationIssue>,
    /// Length of `errors`.
    pub error_count: usize,
    /// Length of `warnings`.
    pub warning_count: usize,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Error);
        Self {
            valid: errors.is_empty(),
            error_count: errors.len(),
            warning_count: warnings.len(),
            errors,
            warnings,
        }
    }

    /// Whether any error was reported for `field` or one of its children.
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field.starts_with(field))
    }
}

fn error(field: impl Into<String>, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field: field.into(),
        message: message.into(),
        severity: Severity::Error,
    }
}

fn warning(field: impl Into<String>, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field: field.into(),
        message: message.into(),
        severity: Severity::Warning,
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

/// Check a typed artifact.
pub fn validate_research_artifact(artifact: &ResearchArtifact) -> ValidationReport {
    ValidationReport::from_issues(typed_issues(artifact))
}

fn typed_issues(artifact: &ResearchArtifact) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if artifact.constraints.must_not_claim.is_empty() {
        issues.push(error(
            "constraints.must_not_claim",
            "must_not_claim is empty. Must include default guardrails.",
        ));
    }

    for (i, hook) in artifact.personalization.hooks.iter().enumerate() {
        if !hook.evidence_field.is_grounded() {
            issues.push(error(
                format!("personalization.hooks[{}]", i),
                format!("Hook '{}' has no evidence field.", preview(&hook.hook)),
            ));
        }
    }

    for (i, pain) in artifact.pains.hypothesized_pains.iter().enumerate() {
        let field = format!("pains.hypothesized_pains[{}]", i);
        if pain.confidence > HIGH_CONFIDENCE && !pain.evidence.is_substantive() {
            issues.push(error(
                field.clone(),
                format!(
                    "Pain '{}' has confidence {} but no substantive evidence.",
                    preview(&pain.pain),
                    pain.confidence
                ),
            ));
        }
        if pain.confidence > WARN_CONFIDENCE && !pain.evidence.is_grounded() {
            issues.push(warning(
                field,
                format!(
                    "Pain '{}' has confidence {} without evidence (consider lowering).",
                    preview(&pain.pain),
                    pain.confidence
                ),
            ));
        }
    }

    for (i, item) in artifact.signals.tech_stack.iter().enumerate() {
        if !item.evidence.is_grounded() {
            issues.push(error(
                format!("signals.tech_stack[{}]", i),
                format!("Tech stack item '{}' has no evidence.", preview(&item.value)),
            ));
        }
    }

    if artifact.prospect.full_name.trim().is_empty() {
        issues.push(error("prospect.full_name", "Missing prospect name."));
    }
    if artifact.prospect.company_name.trim().is_empty() {
        issues.push(warning("prospect.company_name", "Missing company name."));
    }

    issues
}

/// Check an artifact that arrived as raw JSON.
///
/// Structural problems (bare-string tech stack entries, entries without
/// evidence) are reported first; a structurally sound document is then
/// decoded and checked with the typed rules.
pub fn validate_artifact_json(value: &Value) -> ValidationReport {
    let mut issues = Vec::new();

    let tech_stack = value
        .pointer("/signals/tech_stack")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for (i, item) in tech_stack.iter().enumerate() {
        let field = format!("signals.tech_stack[{}]", i);
        match item {
            Value::String(s) => issues.push(error(
                field,
                format!(
                    "Tech stack item '{}' is a plain string; must be {{value, evidence}}.",
                    preview(s)
                ),
            )),
            Value::Object(map) if !map.contains_key("evidence") => {
                let name = map.get("value").and_then(Value::as_str).unwrap_or("");
                issues.push(error(
                    field,
                    format!("Tech stack item '{}' has no evidence.", preview(name)),
                ));
            }
            _ => {}
        }
    }

    if issues.is_empty() {
        match serde_json::from_value::<ResearchArtifact>(value.clone()) {
            Ok(artifact) => issues.extend(typed_issues(&artifact)),
            Err(e) => issues.push(error(
                "artifact",
                format!("Artifact does not match the expected shape: {}", e),
            )),
        }
    }

    ValidationReport::from_issues(issues)
}
