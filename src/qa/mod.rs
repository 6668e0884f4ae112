//! QA gate for rendered touches.
//!
//! Every gating check runs independently and `passed` is their conjunction.
//! The gate only reports; regenerating, editing or shipping with a flag is
//! left to the caller. Advisories are recorded alongside but never gate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{contains_dash, ProductConfig};
use crate::render::MessageVariant;
use crate::research::ResearchArtifact;

/// Break-up touch number; the only touch allowed to cite no proof point.
pub const BREAKUP_TOUCH: u8 = 6;

// ============================================================================
// Results
// ============================================================================

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaCheck {
    /// Check name.
    pub check: String,
    /// Whether it passed.
    pub passed: bool,
    /// Empty when the check passed.
    pub detail: String,
}

impl QaCheck {
    fn new(check: &str, failures: Vec<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: failures.is_empty(),
            detail: failures.join("; "),
        }
    }
}

/// Gate result for one touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    /// `"{tone}/touch {n}"`.
    pub subject: String,
    /// True when every gating check passed.
    pub passed: bool,
    /// Gating checks that passed.
    pub passed_count: usize,
    /// Gating checks run.
    pub total_checks: usize,
    /// Gating checks.
    pub checks: Vec<QaCheck>,
    /// Non-gating checks, reported only.
    pub advisories: Vec<QaCheck>,
}

impl QaResult {
    /// Look up a gating check or advisory by name.
    pub fn check(&self, name: &str) -> Option<&QaCheck> {
        self.checks
            .iter()
            .chain(self.advisories.iter())
            .find(|c| c.check == name)
    }

    /// Detail strings of every failed gating check.
    pub fn failures(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| format!("{}: {}", c.check, c.detail))
            .collect()
    }
}

// ============================================================================
// Patterns
// ============================================================================

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

static PLACEHOLDER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\{[^}]*\}",
        r"\[(?:NAME|name|COMPANY|company|TITLE|title|INSERT|Insert|Your|your|PROSPECT)[^\]]*\]",
        r"<(?:company|name|title)>",
        r"\bTODO\b",
        r"\bFIXME\b",
        r"\bXXX\b",
    ])
});

/// Percentages and multipliers such as `90%` or `5x`.
static METRIC_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+(?:[.,]\d+)?(?:%|x\b)").ok());

static OVERUSED_OPENERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)^I noticed\b",
        r"(?i)^I saw\b",
        r"(?i)^I see\b",
        r"(?i)^I came across\b",
        r"(?i)^I found\b",
        r"(?i)^I hope\b",
    ])
});

const PRIVATE_DOC_PHRASES: [&str; 4] = [
    "your internal docs",
    "your internal documentation",
    "your roadmap",
    "your private",
];

const NEWS_PHRASES: [&str; 6] = [
    "saw the news",
    "read about your",
    "recently announced",
    "recent announcement",
    "congrats on the funding",
    "just raised",
];

const ACTIVITY_PHRASES: [&str; 5] = [
    "your post",
    "your article",
    "you posted",
    "you shared",
    "your comment",
];

const COMPANY_DETAIL_PHRASES: [&str; 4] = [
    "your product",
    "your platform",
    "your customers",
    "your users",
];

// ============================================================================
// Gate
// ============================================================================

/// Run every check on one written touch.
pub fn check_message_variant(
    variant: &MessageVariant,
    artifact: &ResearchArtifact,
    catalog: &ProductConfig,
) -> QaResult {
    let checks = vec![
        check_opener_evidence(variant),
        check_char_limit(variant, catalog),
        check_forbidden_phrases(variant, catalog),
        check_dashes(variant),
        check_proof_point(variant, catalog),
        check_must_not_claim(variant, artifact, catalog),
        check_placeholders(variant),
    ];
    let advisories = vec![
        check_word_count(variant),
        check_question_count(variant),
        check_opener_variety(variant),
    ];

    let passed_count = checks.iter().filter(|c| c.passed).count();
    QaResult {
        subject: format!("{}/touch {}", variant.tone, variant.touch_number),
        passed: passed_count == checks.len(),
        passed_count,
        total_checks: checks.len(),
        checks,
        advisories,
    }
}

/// Body plus subject lines, for checks that cover everything a prospect sees.
fn visible_text(variant: &MessageVariant) -> String {
    let mut text = variant.subject_lines.join("\n");
    text.push('\n');
    text.push_str(&variant.body);
    text
}

fn check_opener_evidence(variant: &MessageVariant) -> QaCheck {
    let mut failures = Vec::new();
    if !variant.opener_evidence.is_grounded() {
        failures.push("opener is not backed by a grounded hook".to_string());
    }
    QaCheck::new("opener_has_evidence", failures)
}

fn check_char_limit(variant: &MessageVariant, catalog: &ProductConfig) -> QaCheck {
    let mut failures = Vec::new();
    let limit = catalog.max_chars.for_channel(variant.channel);
    let count = variant.body.chars().count();
    if count > limit {
        failures.push(format!("body is {} chars (limit {})", count, limit));
    }
    let subject_limit = catalog.max_chars.subject_line;
    for subject in &variant.subject_lines {
        let count = subject.chars().count();
        if count > subject_limit {
            failures.push(format!(
                "subject '{}' is {} chars (limit {})",
                subject, count, subject_limit
            ));
        }
    }
    QaCheck::new("within_char_limit", failures)
}

fn check_forbidden_phrases(variant: &MessageVariant, catalog: &ProductConfig) -> QaCheck {
    let text = visible_text(variant).to_lowercase();
    let failures = catalog
        .forbidden_phrases
        .iter()
        .filter(|p| !p.trim().is_empty() && text.contains(&p.to_lowercase()))
        .map(|p| format!("forbidden phrase '{}'", p))
        .collect();
    QaCheck::new("no_forbidden_phrases", failures)
}

fn check_dashes(variant: &MessageVariant) -> QaCheck {
    let mut failures = Vec::new();
    if contains_dash(&visible_text(variant)) {
        failures.push("contains an em or en dash".to_string());
    }
    QaCheck::new("no_em_dashes", failures)
}

fn check_proof_point(variant: &MessageVariant, catalog: &ProductConfig) -> QaCheck {
    let key = variant.proof_point_key.trim();
    let mut failures = Vec::new();
    if key.is_empty() {
        if variant.touch_number != BREAKUP_TOUCH {
            failures.push(format!(
                "touch {} cites no proof point",
                variant.touch_number
            ));
        }
    } else if !catalog.contains_key(key) {
        failures.push(format!("unknown proof point '{}'", key));
    }
    QaCheck::new("proof_point_valid", failures)
}

fn check_must_not_claim(
    variant: &MessageVariant,
    artifact: &ResearchArtifact,
    catalog: &ProductConfig,
) -> QaCheck {
    let text = visible_text(variant);
    let lower = text.to_lowercase();
    let mut failures = Vec::new();
    let mut flag_phrases = |phrases: &[&str], rule: &str| {
        for phrase in phrases {
            if lower.contains(phrase) {
                failures.push(format!("'{}' breaks rule: {}", phrase, rule));
            }
        }
    };

    for rule in &artifact.constraints.must_not_claim {
        let rule_lower = rule.to_lowercase();
        if rule_lower.contains("private docs") {
            flag_phrases(&PRIVATE_DOC_PHRASES, rule);
        } else if rule_lower.contains("recent news") {
            if !artifact.metadata.has_cached_research() {
                flag_phrases(&NEWS_PHRASES, rule);
            }
        } else if rule_lower.contains("linkedin activity") {
            flag_phrases(&ACTIVITY_PHRASES, rule);
        } else if rule_lower.contains("company products") {
            flag_phrases(&COMPANY_DETAIL_PHRASES, rule);
        }
    }

    if artifact
        .constraints
        .must_not_claim
        .iter()
        .any(|r| r.to_lowercase().contains("exact metrics"))
    {
        for metric in uncataloged_metrics(&text, catalog) {
            failures.push(format!("metric '{}' is not in the catalog", metric));
        }
    }
    QaCheck::new("respects_must_not_claim", failures)
}

/// Percentage and multiplier tokens in `text`, lowercased, in order.
pub fn metric_tokens(text: &str) -> Vec<String> {
    let Some(pattern) = METRIC_PATTERN.as_ref() else {
        return Vec::new();
    };
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Metric tokens in `text` that no catalog entry states.
fn uncataloged_metrics(text: &str, catalog: &ProductConfig) -> Vec<String> {
    let sources: Vec<String> = catalog
        .proof_points
        .iter()
        .flat_map(|pp| [&pp.text, &pp.short, &pp.metric])
        .chain(catalog.value_props.iter())
        .map(|s| s.to_lowercase())
        .collect();
    metric_tokens(text)
        .into_iter()
        .filter(|metric| !sources.iter().any(|s| s.contains(metric.as_str())))
        .collect()
}

fn check_placeholders(variant: &MessageVariant) -> QaCheck {
    let text = visible_text(variant);
    let failures = PLACEHOLDER_PATTERNS
        .iter()
        .filter_map(|p| p.find(&text))
        .map(|m| format!("placeholder '{}'", m.as_str()))
        .collect();
    QaCheck::new("no_placeholders", failures)
}

// ============================================================================
// Advisories
// ============================================================================

/// Word-count window for a written touch.
pub fn word_range(touch_number: u8) -> (usize, usize) {
    match touch_number {
        1 | 5 => (70, 120),
        3 => (40, 70),
        6 => (30, 50),
        _ => (40, 120),
    }
}

fn check_word_count(variant: &MessageVariant) -> QaCheck {
    let (low, high) = word_range(variant.touch_number);
    let words = variant.word_count;
    let mut failures = Vec::new();
    if words < low {
        failures.push(format!("too short: {} words (min {})", words, low));
    } else if words > high {
        failures.push(format!("too long: {} words (max {})", words, high));
    }
    QaCheck::new("word_count_in_range", failures)
}

fn check_question_count(variant: &MessageVariant) -> QaCheck {
    let questions = variant.body.matches('?').count();
    let mut failures = Vec::new();
    if questions > 1 {
        failures.push(format!("{} questions (max 1)", questions));
    }
    QaCheck::new("one_question_max", failures)
}

fn check_opener_variety(variant: &MessageVariant) -> QaCheck {
    // Skip the greeting line.
    let first_sentence = variant
        .body
        .split("\n\n")
        .find(|p| !(p.starts_with("Hi ") || p.starts_with("Hey ")) || !p.ends_with(','))
        .unwrap_or("")
        .trim();
    let failures = OVERUSED_OPENERS
        .iter()
        .find(|p| p.is_match(first_sentence))
        .map(|p| vec![format!("overused opener ({})", p.as_str())])
        .unwrap_or_default();
    QaCheck::new("opener_variety", failures)
}
