//! Keyword tables that derive facts from titles, industries and free text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Seniority
// ============================================================================

/// Decision level inferred from a title or CRM field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seniority {
    /// Chief officers and founders.
    CSuite,
    /// Vice presidents.
    Vp,
    /// Directors and heads of.
    Director,
    /// Managers and leads.
    Manager,
    /// Senior, staff and principal ICs.
    Senior,
    /// Everyone else.
    Individual,
}

impl Seniority {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::CSuite => "c-suite",
            Seniority::Vp => "vp",
            Seniority::Director => "director",
            Seniority::Manager => "manager",
            Seniority::Senior => "senior",
            Seniority::Individual => "individual",
        }
    }

    /// VP, director and c-suite get strategic framing.
    pub fn is_strategic(&self) -> bool {
        matches!(self, Seniority::CSuite | Seniority::Vp | Seniority::Director)
    }

    /// Managers and senior ICs.
    pub fn is_mid_level(&self) -> bool {
        matches!(self, Seniority::Manager | Seniority::Senior)
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Seniority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "c-suite" | "csuite" | "c-level" | "executive" => Ok(Seniority::CSuite),
            "vp" | "vice-president" | "svp" | "evp" => Ok(Seniority::Vp),
            "director" | "head" => Ok(Seniority::Director),
            "manager" | "lead" => Ok(Seniority::Manager),
            "senior" | "sr" | "principal" | "staff" => Ok(Seniority::Senior),
            "individual" | "ic" | "entry" | "mid" => Ok(Seniority::Individual),
            _ => Err(format!("Unknown seniority: {}", s)),
        }
    }
}

// ============================================================================
// Function
// ============================================================================

/// Job function inferred from a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobFunction {
    /// Quality and test roles.
    #[serde(rename = "QA/Testing")]
    QaTesting,
    /// Software engineering roles.
    #[serde(rename = "Engineering")]
    Engineering,
    /// DevOps, SRE and platform roles.
    #[serde(rename = "DevOps/Platform")]
    DevopsPlatform,
    /// Product managers and owners.
    #[serde(rename = "Product")]
    Product,
    /// Anything unmatched.
    #[serde(rename = "Other")]
    Other,
}

impl JobFunction {
    /// Display name used in fit summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFunction::QaTesting => "QA/Testing",
            JobFunction::Engineering => "Engineering",
            JobFunction::DevopsPlatform => "DevOps/Platform",
            JobFunction::Product => "Product",
            JobFunction::Other => "Other",
        }
    }
}

impl fmt::Display for JobFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const QA_KEYWORDS: [&str; 8] = [
    "qa", "quality", "test", "testing", "tester", "sdet", "automation", "qe",
];
const ENGINEERING_KEYWORDS: [&str; 7] = [
    "engineering", "engineer", "software", "developer", "cto", "architect", "development",
];
const DEVOPS_KEYWORDS: [&str; 6] = ["devops", "platform", "infrastructure", "sre", "release", "reliability"];
const PRODUCT_KEYWORDS: [&str; 2] = ["product", "program"];

/// Lowercase, punctuation-free text padded with spaces for whole-word lookups.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}

/// Whole-word (or whole-phrase) match against text produced by [`normalize`].
pub fn has_keyword(normalized: &str, keyword: &str) -> bool {
    let needle = normalize(keyword);
    !needle.trim().is_empty() && normalized.contains(&needle)
}

fn has_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| has_keyword(normalized, kw))
}

/// Infer the job function from a title.
pub fn infer_function(title: &str) -> JobFunction {
    let t = normalize(title);
    if has_any(&t, &QA_KEYWORDS) {
        JobFunction::QaTesting
    } else if has_any(&t, &ENGINEERING_KEYWORDS) {
        JobFunction::Engineering
    } else if has_any(&t, &DEVOPS_KEYWORDS) {
        JobFunction::DevopsPlatform
    } else if has_any(&t, &PRODUCT_KEYWORDS) {
        JobFunction::Product
    } else {
        JobFunction::Other
    }
}

/// Infer seniority. A recognised explicit CRM value wins over the title.
pub fn infer_seniority(title: &str, explicit: Option<&str>) -> Seniority {
    if let Some(parsed) = explicit
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| s.parse::<Seniority>().ok())
    {
        return parsed;
    }

    let t = normalize(title);
    if has_any(&t, &["chief", "cto", "ceo", "coo", "cio", "cpo"]) {
        Seniority::CSuite
    } else if has_any(&t, &["vp", "svp", "evp", "vice president"]) {
        Seniority::Vp
    } else if has_any(&t, &["director", "head of", "head"]) {
        Seniority::Director
    } else if has_any(&t, &["manager", "lead"]) {
        Seniority::Manager
    } else if has_any(&t, &["senior", "sr", "principal", "staff"]) {
        Seniority::Senior
    } else {
        Seniority::Individual
    }
}

// ============================================================================
// Vertical
// ============================================================================

/// Vertical keyword table. Order breaks ties.
pub const VERTICAL_KEYWORDS: [(&str, &[&str]); 11] = [
    (
        "FinTech",
        &[
            "fintech", "payments", "crypto", "blockchain", "lending", "neobank",
            "buy now pay later", "bnpl", "digital wallet", "remittance",
        ],
    ),
    (
        "FinServ",
        &[
            "bank", "banking", "credit union", "mortgage", "wealth management",
            "asset management", "brokerage", "financial services", "capital markets",
            "investment", "insurance carrier",
        ],
    ),
    (
        "Healthcare",
        &[
            "health", "medical", "clinical", "patient", "telehealth", "healthtech",
            "digital health", "ehr", "emr", "health insurance",
        ],
    ),
    (
        "SaaS",
        &[
            "saas", "software as a service", "cloud platform", "b2b software",
            "enterprise software", "developer tools",
        ],
    ),
    (
        "E-Commerce",
        &[
            "e-commerce", "ecommerce", "online retail", "marketplace", "shopping",
            "catalog", "direct to consumer", "d2c",
        ],
    ),
    ("InsurTech", &["insurtech", "insurance technology", "digital insurance"]),
    ("Insurance", &["insurance", "reinsurance", "underwriting", "claims"]),
    ("Tech", &["technology", "software", "internet", "platform", "infrastructure"]),
    ("Telecom", &["telecom", "telecommunications", "wireless", "mobile network"]),
    ("Pharma", &["pharmaceutical", "pharma", "drug", "biotech", "life sciences"]),
    ("Retail", &["retail", "store", "consumer goods", "cpg"]),
];

/// Vertical used when nothing matches.
pub const DEFAULT_VERTICAL: &str = "Tech";

/// Argmax of keyword hits over industry plus description; first entry wins ties.
pub fn classify_vertical(description: &str, industry: &str) -> &'static str {
    let text = format!("{} {}", description, industry).to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;
    for (vertical, keywords) in VERTICAL_KEYWORDS.iter() {
        let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((vertical, hits));
        }
    }
    best.map(|(v, _)| v).unwrap_or(DEFAULT_VERTICAL)
}

// ============================================================================
// Company size
// ============================================================================

/// Bucket an employee count into the CRM band vocabulary.
pub fn size_band_for(employee_count: u32) -> &'static str {
    match employee_count {
        0..=50 => "1-50",
        51..=200 => "51-200",
        201..=500 => "201-500",
        501..=1000 => "501-1000",
        1001..=5000 => "1001-5000",
        5001..=10000 => "5001-10000",
        10001..=50000 => "10001-50000",
        _ => "50000+",
    }
}

/// Lower bound of a band string such as `"1001-5000"` or `"50000+"`.
pub fn band_floor(band: &str) -> Option<u32> {
    band.trim()
        .split(|c| c == '-' || c == '+')
        .next()
        .and_then(|s| s.trim().replace(',', "").parse().ok())
}

// ============================================================================
// Competitor tools
// ============================================================================

/// Test tooling vocabulary treated as competitive displacement.
pub const COMPETITOR_TOOLS: [&str; 20] = [
    "selenium", "cypress", "playwright", "tosca", "katalon", "testim", "mabl",
    "sauce labs", "browserstack", "lambdatest", "appium", "ranorex", "telerik",
    "smartbear", "tricentis", "qmetry", "testcomplete", "uft", "eggplant", "perfecto",
];

/// Tools whose maintenance burden drives the strongest pain.
pub const HIGH_MAINTENANCE_TOOLS: [&str; 3] = ["selenium", "cypress", "playwright"];

/// Tools named in CTAs and bridges.
pub const HEADLINE_COMPETITORS: [&str; 5] =
    ["selenium", "cypress", "playwright", "katalon", "testcomplete"];

/// Whether a tool name is in the competitor vocabulary.
pub fn is_competitor_tool(tool: &str) -> bool {
    let lower = tool.trim().to_lowercase();
    COMPETITOR_TOOLS.contains(&lower.as_str())
}

/// Competitor tools mentioned in free text, in vocabulary order.
pub fn detect_competitor_tools(text: &str) -> Vec<&'static str> {
    let normalized = normalize(text);
    COMPETITOR_TOOLS
        .iter()
        .copied()
        .filter(|tool| has_keyword(&normalized, tool))
        .collect()
}

/// `"sauce labs"` becomes `"Sauce Labs"`.
pub fn display_tool_name(tool: &str) -> String {
    tool.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
