//! Per-source analyzers: job postings, funding and news.

use std::collections::BTreeSet;

use super::patterns::{
    pain_label, BudgetSignal, FUNDING_STAGES, PAIN_KEYWORDS, QA_JOB_PATTERNS,
    SENIOR_QA_PATTERNS, TOOL_PATTERNS, TRANSFORMATION_PATTERNS,
};
use super::{EnrichmentSignal, HiringVelocity, JobPosting, PainIndicator, Strength};
use crate::evidence::{Evidence, Evidenced};
use crate::research::inference::{display_tool_name, has_keyword, is_competitor_tool, normalize};
use crate::research::PainHypothesis;

/// Signals found in one job posting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingAnalysis {
    /// Signals from this posting.
    pub signals: Vec<EnrichmentSignal>,
    /// Testing tools named, display-cased.
    pub tools_detected: Vec<String>,
    /// Pain categories matched.
    pub pains_detected: Vec<PainIndicator>,
    /// Whether the role is a QA role.
    pub is_qa_role: bool,
    /// Whether the role is senior or leadership.
    pub is_senior: bool,
    /// Evidence label naming the posting.
    pub evidence_source: String,
}

/// Aggregate over a company's postings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingBatch {
    /// QA roles among the postings.
    pub total_qa_roles: usize,
    /// Senior QA roles among them.
    pub senior_qa_roles: usize,
    /// Hiring pace from the QA role count.
    pub hiring_velocity: HiringVelocity,
    /// Every tool named, deduplicated.
    pub all_tools: Vec<String>,
    /// Signals across postings.
    pub signals: Vec<EnrichmentSignal>,
    /// Pains implied by the postings.
    pub pain_hypotheses: Vec<PainHypothesis>,
    /// Tools with the posting that named them.
    pub tech_stack_evidence: Vec<Evidenced<String>>,
}

/// Signals from a funding event.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingAnalysis {
    /// Funding signals.
    pub signals: Vec<EnrichmentSignal>,
    /// Pains a raise tends to bring.
    pub pain_hypotheses: Vec<PainHypothesis>,
    /// Round detected in the text.
    pub detected_stage: Option<String>,
    /// Budget implied by the round.
    pub budget_signal: BudgetSignal,
}

/// Signals from company news.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsAnalysis {
    /// News signals.
    pub signals: Vec<EnrichmentSignal>,
    /// Pains implied by the news.
    pub pain_hypotheses: Vec<PainHypothesis>,
    /// Transformation themes detected.
    pub transformations: Vec<String>,
}

fn title_case(text: &str) -> String {
    display_tool_name(text)
}

/// Analyze a single posting.
pub fn analyze_job_posting(posting: &JobPosting, company_name: &str) -> PostingAnalysis {
    let text = posting.text.to_lowercase();
    let title = posting.title.to_lowercase();
    let opening: String = text.chars().take(500).collect();
    let evidence_source = if company_name.is_empty() {
        format!("from job posting: {}", posting.title)
    } else {
        format!("from job posting: {} at {}", posting.title, company_name)
    };

    let is_qa_role = QA_JOB_PATTERNS
        .iter()
        .any(|re| re.is_match(&title) || re.is_match(&opening));
    let is_senior = SENIOR_QA_PATTERNS.iter().any(|re| re.is_match(&title));

    let tools_detected: Vec<String> = TOOL_PATTERNS
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(&text)))
        .map(|(tool, _)| tool.to_string())
        .collect();

    let pains_detected: Vec<PainIndicator> = PAIN_KEYWORDS
        .iter()
        .filter_map(|(kind, keywords)| {
            let matched: Vec<String> = keywords
                .iter()
                .filter(|kw| text.contains(*kw))
                .map(|kw| kw.to_string())
                .collect();
            if matched.is_empty() {
                return None;
            }
            let preview: Vec<&str> = matched.iter().take(3).map(String::as_str).collect();
            Some(PainIndicator {
                kind: kind.to_string(),
                evidence: format!("{} mentions: {}", evidence_source, preview.join(", ")),
                keywords_matched: matched,
            })
        })
        .collect();

    let mut signals = Vec::new();
    let evidence = Evidence::grounded(evidence_source.clone());
    if is_qa_role {
        signals.push(EnrichmentSignal::new(
            "hiring_qa",
            format!("Hiring for QA: {}", posting.title),
            "job_posting",
            if is_senior {
                Strength::High
            } else {
                Strength::Medium
            },
            evidence.clone(),
        ));
    }

    let competitors: Vec<&str> = tools_detected
        .iter()
        .map(String::as_str)
        .filter(|t| is_competitor_tool(t))
        .collect();
    if !competitors.is_empty() {
        signals.push(EnrichmentSignal::new(
            "competitor_tool",
            format!("Job posting requires: {}", competitors.join(", ")),
            "job_posting",
            Strength::High,
            evidence,
        ));
    }

    for pain in &pains_detected {
        let preview: Vec<&str> = pain
            .keywords_matched
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        signals.push(EnrichmentSignal::new(
            &format!("pain_indicator_{}", pain.kind),
            format!("Pain signal ({}): {}", pain.kind, preview.join(", ")),
            "job_posting",
            Strength::Medium,
            Evidence::grounded(pain.evidence.clone()),
        ));
    }

    PostingAnalysis {
        signals,
        tools_detected,
        pains_detected,
        is_qa_role,
        is_senior,
        evidence_source,
    }
}

/// Analyze every posting for a company and derive hiring velocity.
pub fn analyze_job_postings_batch(postings: &[JobPosting], company_name: &str) -> PostingBatch {
    let mut all_tools = BTreeSet::new();
    let mut pains: Vec<PainIndicator> = Vec::new();
    let mut signals = Vec::new();
    let mut qa_count = 0;
    let mut senior_count = 0;

    for posting in postings {
        let result = analyze_job_posting(posting, company_name);
        if result.is_qa_role {
            qa_count += 1;
        }
        if result.is_senior {
            senior_count += 1;
        }
        all_tools.extend(result.tools_detected);
        signals.extend(result.signals);

        for pain in result.pains_detected {
            match pains.iter_mut().find(|p| p.kind == pain.kind) {
                Some(existing) => {
                    for kw in pain.keywords_matched {
                        if !existing.keywords_matched.contains(&kw) {
                            existing.keywords_matched.push(kw);
                        }
                    }
                }
                None => pains.push(pain),
            }
        }
    }

    let velocity = HiringVelocity::from_count(qa_count);
    let evidence_base = if company_name.is_empty() {
        "from job postings".to_string()
    } else {
        format!("from job postings at {}", company_name)
    };

    let mut pain_hypotheses = Vec::new();
    if qa_count >= 3 {
        pain_hypotheses.push(PainHypothesis::new(
            &format!("Rapidly scaling QA team ({} open QA roles)", qa_count),
            (0.6 + qa_count as f64 * 0.05).min(0.9),
            Evidence::grounded(format!(
                "{}: {} QA-related job postings",
                evidence_base, qa_count
            )),
        ));
    }
    for pain in &pains {
        pain_hypotheses.push(PainHypothesis::new(
            pain_label(&pain.kind),
            (0.5 + pain.keywords_matched.len() as f64 * 0.1).min(0.85),
            Evidence::grounded(pain.evidence.clone()),
        ));
    }

    let tech_stack_evidence = all_tools
        .iter()
        .filter(|t| is_competitor_tool(t))
        .map(|t| {
            Evidenced::new(
                display_tool_name(t),
                Evidence::grounded(format!("{}: mentioned in job requirements", evidence_base)),
            )
        })
        .collect();

    if let Some(strength) = velocity.strength() {
        signals.push(EnrichmentSignal::new(
            "hiring_velocity",
            format!(
                "QA hiring velocity: {} ({} open roles)",
                velocity, qa_count
            ),
            "job_postings",
            strength,
            Evidence::grounded(format!(
                "{}: {} QA-related postings found",
                evidence_base, qa_count
            )),
        ));
    }

    PostingBatch {
        total_qa_roles: qa_count,
        senior_qa_roles: senior_count,
        hiring_velocity: velocity,
        all_tools: all_tools.into_iter().collect(),
        signals,
        pain_hypotheses,
        tech_stack_evidence,
    }
}

/// Analyze a funding event. The stage is taken from `stage` or detected in the text.
pub fn analyze_funding(
    funding_text: &str,
    company_name: &str,
    amount: Option<&str>,
    stage: Option<&str>,
    date: Option<&str>,
) -> FundingAnalysis {
    let evidence_base = if company_name.is_empty() {
        "from funding data".to_string()
    } else {
        format!("from funding data: {}", company_name)
    };

    let stage_key = stage
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            let normalized = normalize(funding_text);
            FUNDING_STAGES
                .iter()
                .find(|(key, _, _)| has_keyword(&normalized, key))
                .map(|(key, _, _)| key.to_string())
        });

    let (strength, budget_signal) = stage_key
        .as_deref()
        .and_then(|key| FUNDING_STAGES.iter().find(|(k, _, _)| *k == key))
        .map(|(_, strength, budget)| (*strength, *budget))
        .unwrap_or((Strength::Medium, BudgetSignal::Unknown));

    let mut parts = Vec::new();
    if let Some(key) = &stage_key {
        parts.push(title_case(key));
    }
    if let Some(amount) = amount.filter(|a| !a.trim().is_empty()) {
        parts.push(amount.trim().to_string());
    }
    if let Some(date) = date.filter(|d| !d.trim().is_empty()) {
        parts.push(format!("on {}", date.trim()));
    }

    let description = if parts.is_empty() {
        let preview: String = funding_text.chars().take(100).collect();
        format!("Funding activity: {}", preview)
    } else {
        format!("Funding: {}", parts.join(", "))
    };

    let mut signals = vec![EnrichmentSignal::new(
        "funding",
        description.clone(),
        "funding_data",
        strength,
        Evidence::grounded(format!("{}: {}", evidence_base, description)),
    )];
    let mut pain_hypotheses = Vec::new();

    if budget_signal.is_growth() {
        let stage_label = stage_key
            .as_deref()
            .map(title_case)
            .unwrap_or_else(|| "growth".to_string());
        pain_hypotheses.push(PainHypothesis::new(
            "Scaling engineering and QA to match growth-stage velocity",
            0.65,
            Evidence::grounded(format!(
                "{}: {} funding indicates rapid scaling",
                evidence_base, stage_label
            )),
        ));
        signals.push(EnrichmentSignal::new(
            "budget_available",
            format!(
                "Post-funding budget likely available for tooling ({})",
                stage_label
            ),
            "funding_data",
            strength,
            Evidence::grounded(format!(
                "{}: recent funding suggests tooling budget",
                evidence_base
            )),
        ));
    }

    FundingAnalysis {
        signals,
        pain_hypotheses,
        detected_stage: stage_key,
        budget_signal,
    }
}

/// Analyze news text for transformation initiatives. One signal per kind.
pub fn analyze_company_news(news_text: &str, company_name: &str) -> NewsAnalysis {
    let text = news_text.to_lowercase();
    let evidence_base = if company_name.is_empty() {
        "from company news".to_string()
    } else {
        format!("from company news: {}", company_name)
    };

    let mut analysis = NewsAnalysis::default();
    for (kind, label, patterns) in TRANSFORMATION_PATTERNS.iter() {
        if !patterns.iter().any(|re| re.is_match(&text)) {
            continue;
        }
        let lower_label = label.to_lowercase();
        analysis.transformations.push(kind.to_string());
        analysis.signals.push(EnrichmentSignal::new(
            "digital_transformation",
            format!("{} underway", label),
            "company_news",
            Strength::High,
            Evidence::grounded(format!("{}: mentions {}", evidence_base, lower_label)),
        ));
        analysis.pain_hypotheses.push(PainHypothesis::new(
            &format!(
                "Test automation complexity increasing due to {}",
                lower_label
            ),
            0.7,
            Evidence::grounded(format!(
                "{}: {} creates new testing surfaces",
                evidence_base, lower_label
            )),
        ));
    }
    analysis
}
