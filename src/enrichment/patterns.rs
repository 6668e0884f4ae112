//! Pattern tables for free-text enrichment, compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Titles (or opening text) that mark a QA role.
pub(crate) static QA_JOB_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"qa\s+(?:engineer|analyst|lead|manager|director|architect)",
        r"sdet",
        r"test\s+(?:engineer|automation|architect|lead|manager)",
        r"quality\s+(?:engineer|assurance|lead|manager|director)",
        r"automation\s+(?:engineer|lead|architect|developer)",
        r"software\s+engineer\s+in\s+test",
    ])
});

/// Titles that signal a senior QA hire.
pub(crate) static SENIOR_QA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:senior|sr\.?|staff|principal|lead)\s+(?:sdet|qa|test|quality|automation)",
        r"(?:sdet|qa|test|quality|automation)\s+(?:lead|manager|director|head|architect)",
        r"(?:director|head|vp|manager)\s+(?:of\s+)?(?:qa|quality|test|automation)",
    ])
});

/// Tool name and the patterns that detect it.
pub(crate) static TOOL_PATTERNS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 26] = [
        ("selenium", &[r"\bselenium\b", r"\bwebdriver\b"]),
        ("cypress", &[r"\bcypress\b", r"\bcypress\.io\b"]),
        ("playwright", &[r"\bplaywright\b"]),
        ("appium", &[r"\bappium\b"]),
        ("testcomplete", &[r"\btestcomplete\b"]),
        ("katalon", &[r"\bkatalon\b"]),
        ("tosca", &[r"\btosca\b", r"\btricentis\b"]),
        ("browserstack", &[r"\bbrowserstack\b"]),
        ("sauce labs", &[r"\bsauce\s*labs?\b"]),
        ("lambdatest", &[r"\blambdatest\b"]),
        ("testim", &[r"\btestim\b"]),
        ("mabl", &[r"\bmabl\b"]),
        ("ranorex", &[r"\branorex\b"]),
        ("smartbear", &[r"\bsmartbear\b"]),
        ("uft", &[r"\buft\b", r"\bunified\s+functional\s+testing\b"]),
        ("jest", &[r"\bjest\b"]),
        ("pytest", &[r"\bpytest\b"]),
        ("junit", &[r"\bjunit\b"]),
        ("testng", &[r"\btestng\b"]),
        ("robot framework", &[r"\brobot\s+framework\b"]),
        ("cucumber", &[r"\bcucumber\b"]),
        ("postman", &[r"\bpostman\b"]),
        ("rest assured", &[r"\brest\s*assured\b"]),
        ("jmeter", &[r"\bjmeter\b"]),
        ("k6", &[r"\bk6\b"]),
        ("locust", &[r"\blocust\b"]),
    ];
    table
        .iter()
        .map(|(tool, patterns)| (*tool, compile(patterns)))
        .collect()
});

/// Pain categories detected by plain keyword containment.
pub(crate) const PAIN_KEYWORDS: [(&str, &[&str]); 6] = [
    (
        "flaky_tests",
        &["flaky", "intermittent", "unstable tests", "test stability", "unreliable tests"],
    ),
    (
        "slow_regression",
        &[
            "regression",
            "slow pipeline",
            "long test cycles",
            "release velocity",
            "deployment frequency",
            "ci/cd bottleneck",
        ],
    ),
    (
        "maintenance_overhead",
        &[
            "test maintenance",
            "brittle tests",
            "framework migration",
            "technical debt",
            "legacy tests",
            "refactor",
        ],
    ),
    (
        "scaling_automation",
        &[
            "scale automation",
            "scaling automation",
            "scaling our automation",
            "increase coverage",
            "expand test",
            "automation strategy",
            "test strategy",
            "automation roadmap",
            "grow the automation",
        ],
    ),
    (
        "cross_platform",
        &[
            "cross-browser",
            "cross-platform",
            "mobile testing",
            "responsive testing",
            "multi-device",
            "ios and android",
        ],
    ),
    (
        "shift_left",
        &[
            "shift left",
            "shift-left",
            "developer testing",
            "dev-led testing",
            "test early",
            "quality ownership",
        ],
    ),
];

/// Hypothesis text for each pain category.
pub(crate) fn pain_label(kind: &str) -> &'static str {
    match kind {
        "flaky_tests" => "Flaky or unstable test suites causing pipeline failures",
        "slow_regression" => "Slow regression cycles bottlenecking release velocity",
        "maintenance_overhead" => "High test maintenance overhead and technical debt",
        "scaling_automation" => "Need to scale test automation coverage",
        "cross_platform" => "Cross-platform and cross-browser testing complexity",
        "shift_left" => "Shifting testing left to developer-led quality ownership",
        _ => "Testing friction mentioned in job requirements",
    }
}

/// Transformation kind, display label and detection patterns.
pub(crate) static TRANSFORMATION_PATTERNS: Lazy<Vec<(&'static str, &'static str, Vec<Regex>)>> =
    Lazy::new(|| {
        vec![
            (
                "cloud_migration",
                "Cloud migration",
                compile(&[
                    r"cloud\s+migration",
                    r"migrate\s+to\s+(?:aws|azure|gcp|cloud)",
                    r"moving\s+to\s+(?:the\s+)?cloud",
                    r"cloud\s+(?:first|native|adoption)",
                ]),
            ),
            (
                "platform_rewrite",
                "Platform modernization",
                compile(&[
                    r"replatform",
                    r"platform\s+(?:rewrite|migration|modernization)",
                    r"monolith\s+to\s+microservices",
                    r"legacy\s+(?:migration|modernization)",
                ]),
            ),
            (
                "devops_transformation",
                "DevOps transformation",
                compile(&[
                    r"devops\s+transformation",
                    r"ci/cd\s+(?:pipeline|adoption|implementation)",
                    r"continuous\s+(?:delivery|deployment|integration)",
                    r"infrastructure\s+as\s+code",
                ]),
            ),
            (
                "digital_transformation",
                "Digital transformation",
                compile(&[
                    r"digital\s+transformation",
                    r"digitization",
                    r"digital\s+(?:first|strategy)",
                ]),
            ),
            (
                "agile_transformation",
                "Agile transformation",
                compile(&[
                    r"agile\s+transformation",
                    r"adopting\s+agile",
                    r"scrum\s+(?:adoption|implementation)",
                    r"move\s+to\s+agile",
                ]),
            ),
        ]
    });

/// Budget posture implied by a funding stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSignal {
    /// Seed and pre-seed.
    EarlyStage,
    /// Series A and B.
    GrowthMode,
    /// Series C, D and growth equity.
    Scaling,
    /// Series E and private equity.
    Mature,
    /// Publicly traded.
    Public,
    /// No funding signal.
    Unknown,
}

impl BudgetSignal {
    /// Stages that fund new tooling.
    pub fn is_growth(&self) -> bool {
        matches!(self, BudgetSignal::GrowthMode | BudgetSignal::Scaling)
    }
}

/// Funding stage key, signal strength and budget posture. Order matters for detection.
pub(crate) const FUNDING_STAGES: [(&str, super::Strength, BudgetSignal); 10] = [
    ("seed", super::Strength::Low, BudgetSignal::EarlyStage),
    ("pre-seed", super::Strength::Low, BudgetSignal::EarlyStage),
    ("series a", super::Strength::Medium, BudgetSignal::GrowthMode),
    ("series b", super::Strength::High, BudgetSignal::GrowthMode),
    ("series c", super::Strength::High, BudgetSignal::Scaling),
    ("series d", super::Strength::High, BudgetSignal::Scaling),
    ("series e", super::Strength::Medium, BudgetSignal::Mature),
    ("ipo", super::Strength::Medium, BudgetSignal::Public),
    ("growth equity", super::Strength::High, BudgetSignal::Scaling),
    ("pe", super::Strength::Medium, BudgetSignal::Mature),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(QA_JOB_PATTERNS.len(), 6);
        assert_eq!(SENIOR_QA_PATTERNS.len(), 3);
        assert_eq!(TOOL_PATTERNS.len(), 26);
        assert!(TOOL_PATTERNS.iter().all(|(_, p)| !p.is_empty()));
        assert!(TRANSFORMATION_PATTERNS.iter().all(|(_, _, p)| !p.is_empty()));
    }

    #[test]
    fn test_labels_are_dash_free() {
        for (kind, _) in PAIN_KEYWORDS.iter() {
            let label = pain_label(kind);
            assert!(!label.contains('\u{2014}') && !label.contains('\u{2013}'));
        }
    }
}
