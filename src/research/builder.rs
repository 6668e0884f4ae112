//! Assembles a [`ResearchArtifact`] from stored records.
//!
//! Only CRM rows, cached research and stored signals are read. Every fact
//! that lands in the artifact names the field it came from.

use chrono::Utc;
use tracing::debug;

use super::inference::{
    classify_vertical, detect_competitor_tools, display_tool_name, infer_function,
    infer_seniority, size_band_for, JobFunction, Seniority, HIGH_MAINTENANCE_TOOLS,
};
use super::validator::validate_research_artifact;
use super::vertical_pains::VerticalPainLibrary;
use super::{
    round2, Account, ArtifactMetadata, BuildOutcome, Company, CompanyResearch, Constraints,
    Contact, IcpFit, PainHypothesis, Pains, PersonResearch, Personalization, PersonalizationHook,
    Prospect, ResearchArtifact, Signals, StoredSignal,
};
use crate::error::MissingInputError;
use crate::evidence::{Evidence, Evidenced};

/// Guardrails every artifact starts with.
pub const DEFAULT_MUST_NOT_CLAIM: [&str; 3] = [
    "No claims of having read private docs",
    "No claims of seeing recent news unless from cached research",
    "No claims of exact metrics unless provided in CRM data",
];

/// Pain used when no rule fires.
pub const FALLBACK_PAIN: &str = "Test maintenance and flaky tests slowing release velocity";

const NO_PERSON_RESEARCH_CLAIM: &str =
    "No claims about prospect's LinkedIn activity (no person research available)";
const NO_COMPANY_RESEARCH_CLAIM: &str =
    "No claims about company products/metrics (no company research available)";

const ABOUT_SNIPPET_CHARS: usize = 100;

// ============================================================================
// Pain rules
// ============================================================================

/// Facts the pain rules look at.
#[derive(Debug)]
pub(crate) struct PainContext<'a> {
    pub tools: &'a [Evidenced<String>],
    pub function: JobFunction,
    pub seniority: Seniority,
    pub industry: Option<(&'a str, Evidence)>,
}

type PainRule = fn(&PainContext<'_>) -> Option<PainHypothesis>;

/// Applied in order; each rule contributes at most one pain.
pub(crate) const PAIN_RULES: [(&str, PainRule); 4] = [
    ("tool_maintenance", tool_maintenance_pain),
    ("qa_leader_scaling", qa_leader_pain),
    ("financial_compliance", financial_compliance_pain),
    ("healthcare_compliance", healthcare_compliance_pain),
];

fn tool_maintenance_pain(ctx: &PainContext<'_>) -> Option<PainHypothesis> {
    if ctx.tools.is_empty() {
        return None;
    }
    let names: Vec<&str> = ctx.tools.iter().map(|t| t.value.as_str()).collect();
    let high_maintenance = names
        .iter()
        .any(|t| HIGH_MAINTENANCE_TOOLS.contains(&t.to_lowercase().as_str()));
    // CRM evidence wins when any tool came from the account row
    let evidence = ctx
        .tools
        .iter()
        .find(|t| t.evidence.mentions("CRM field"))
        .unwrap_or(&ctx.tools[0])
        .evidence
        .clone();
    Some(PainHypothesis::new(
        &format!("Test maintenance overhead with {}", names.join(", ")),
        if high_maintenance { 0.8 } else { 0.5 },
        evidence,
    ))
}

fn qa_leader_pain(ctx: &PainContext<'_>) -> Option<PainHypothesis> {
    let leads = matches!(
        ctx.seniority,
        Seniority::Director | Seniority::Vp | Seniority::Manager
    );
    (ctx.function == JobFunction::QaTesting && leads).then(|| {
        PainHypothesis::new(
            "Scaling test automation while managing team bandwidth",
            0.6,
            Evidence::crm_field("title"),
        )
    })
}

fn financial_compliance_pain(ctx: &PainContext<'_>) -> Option<PainHypothesis> {
    let (industry, evidence) = ctx.industry.as_ref()?;
    let lower = industry.to_lowercase();
    ["fintech", "finserv", "banking", "insurance"]
        .iter()
        .any(|v| lower.contains(v))
        .then(|| {
            PainHypothesis::new(
                "Regression testing across compliance-sensitive financial workflows",
                0.5,
                evidence.clone(),
            )
        })
}

fn healthcare_compliance_pain(ctx: &PainContext<'_>) -> Option<PainHypothesis> {
    let (industry, evidence) = ctx.industry.as_ref()?;
    let lower = industry.to_lowercase();
    let financial = ["fintech", "finserv", "banking", "insurance"]
        .iter()
        .any(|v| lower.contains(v));
    let health = ["healthcare", "pharma", "health"]
        .iter()
        .any(|v| lower.contains(v));
    (health && !financial).then(|| {
        PainHypothesis::new(
            "Compliance-heavy regression cycles in regulated environment",
            0.5,
            evidence.clone(),
        )
    })
}

// ============================================================================
// Builder
// ============================================================================

/// Build and validate an artifact.
///
/// Fails only when the contact has neither a first nor a last name.
pub fn build_research_artifact(
    contact: &Contact,
    account: Option<&Account>,
    person: Option<&PersonResearch>,
    company_research: Option<&CompanyResearch>,
    signals: &[StoredSignal],
    library: &VerticalPainLibrary,
) -> Result<BuildOutcome, MissingInputError> {
    let first = contact.first_name.trim();
    let last = contact.last_name.trim();
    if first.is_empty() && last.is_empty() {
        return Err(MissingInputError::field("contact", "first_name"));
    }

    let mut data_sources = vec!["CRM contact record".to_string()];
    if account.is_some() {
        data_sources.push("CRM account record".to_string());
    }
    if company_research.is_some() {
        data_sources.push("cached company research".to_string());
    }
    if person.is_some() {
        data_sources.push("cached person research".to_string());
    }
    if !signals.is_empty() {
        data_sources.push("stored signals".to_string());
    }

    let prospect = build_prospect(contact, account);
    let company = build_company(account, company_research);
    let signal_section = build_signals(account, company_research, signals);
    let icp_fit = build_icp_fit(&prospect, &company);
    let industry_evidence = if non_blank(account.and_then(|a| a.industry.as_deref())).is_some() {
        Evidence::crm_field("industry")
    } else {
        Evidence::company_research("industry")
    };
    let pains = build_pains(
        &prospect,
        &company,
        &signal_section,
        industry_evidence,
        library,
    );
    let personalization = build_hooks(&prospect, person);

    let mut must_not_claim: Vec<String> =
        DEFAULT_MUST_NOT_CLAIM.iter().map(|s| s.to_string()).collect();
    if person.is_none() {
        must_not_claim.push(NO_PERSON_RESEARCH_CLAIM.to_string());
    }
    if company_research.is_none() {
        must_not_claim.push(NO_COMPANY_RESEARCH_CLAIM.to_string());
    }

    let research_quality_score = quality_score(&prospect, &company);

    let artifact = ResearchArtifact {
        prospect,
        company,
        signals: signal_section,
        icp_fit,
        pains,
        personalization,
        constraints: Constraints { must_not_claim },
        metadata: ArtifactMetadata {
            created_at: Utc::now(),
            data_sources,
            research_quality_score,
        },
    };

    let validation = validate_research_artifact(&artifact);
    debug!(
        prospect = %artifact.prospect.full_name,
        valid = validation.valid,
        errors = validation.error_count,
        pains = artifact.pains.hypothesized_pains.len(),
        "Built research artifact"
    );

    Ok(BuildOutcome {
        artifact,
        validation,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn build_prospect(contact: &Contact, account: Option<&Account>) -> Prospect {
    let first = contact.first_name.trim();
    let full_name = format!("{} {}", first, contact.last_name.trim())
        .trim()
        .to_string();
    let title = contact.title.trim().to_string();
    let company_name = non_blank(Some(&contact.company_name))
        .or_else(|| non_blank(account.map(|a| a.name.as_str())))
        .unwrap_or_default();

    Prospect {
        first_name: if first.is_empty() {
            full_name.clone()
        } else {
            first.to_string()
        },
        full_name,
        seniority: infer_seniority(&title, contact.seniority_level.as_deref()),
        function: infer_function(&title),
        title,
        linkedin_url: non_blank(contact.linkedin_url.as_deref()),
        company_name,
        company_domain: non_blank(account.and_then(|a| a.domain.as_deref())),
    }
}

fn build_company(account: Option<&Account>, research: Option<&CompanyResearch>) -> Company {
    let industry = non_blank(account.and_then(|a| a.industry.as_deref()))
        .or_else(|| non_blank(research.and_then(|r| r.industry.as_deref())));
    let product_summary = non_blank(research.and_then(|r| r.description.as_deref()));
    let employee_count = account.and_then(|a| a.employee_count);
    let size_band = non_blank(account.and_then(|a| a.employee_band.as_deref()))
        .or_else(|| employee_count.map(|n| size_band_for(n).to_string()));

    let vertical = classify_vertical(
        product_summary.as_deref().unwrap_or(""),
        industry.as_deref().unwrap_or(""),
    )
    .to_string();

    Company {
        industry,
        vertical,
        size_band,
        employee_count,
        geo: non_blank(account.and_then(|a| a.hq_location.as_deref())),
        product_summary,
    }
}

fn trigger_label(signal_type: &str) -> Option<&'static str> {
    match signal_type {
        "recently_hired" => Some("job change"),
        "funding" => Some("funding event"),
        "digital_transformation" => Some("digital transformation"),
        "hiring_qa" => Some("QA hiring"),
        "competitor_tool" => Some("competitor tool usage"),
        _ => None,
    }
}

fn build_signals(
    account: Option<&Account>,
    research: Option<&CompanyResearch>,
    stored: &[StoredSignal],
) -> Signals {
    let mut signals = Signals::default();

    let mut push_tool = |tool: &str, evidence: Evidence| {
        let tool = tool.trim();
        if tool.is_empty() {
            return;
        }
        let seen = signals
            .tech_stack
            .iter()
            .any(|t| t.value.eq_ignore_ascii_case(tool));
        if !seen {
            signals
                .tech_stack
                .push(Evidenced::new(tool.to_string(), evidence));
        }
    };

    if let Some(account) = account {
        for tool in &account.known_tools {
            push_tool(tool, Evidence::crm_field("known_tools"));
        }
    }
    if let Some(research) = research {
        for tool in &research.known_tools {
            push_tool(tool, Evidence::company_research("known_tools"));
        }
        for (field, text) in [
            ("description", research.description.as_deref()),
            ("recent_news", research.recent_news.as_deref()),
        ] {
            for tool in detect_competitor_tools(text.unwrap_or("")) {
                push_tool(&display_tool_name(tool), Evidence::company_research(field));
            }
        }
    }

    for signal in stored {
        let evidence = Evidence::grounded(format!("from signal: {}", signal.signal_type));
        if matches!(
            signal.signal_type.as_str(),
            "buyer_intent" | "funding" | "digital_transformation" | "hiring_qa"
        ) {
            signals
                .intent_signals
                .push(Evidenced::new(signal.description.clone(), evidence.clone()));
        }
        if let Some(label) = trigger_label(&signal.signal_type) {
            signals.triggers.push(Evidenced::new(
                format!("{}: {}", label, signal.description),
                evidence,
            ));
        }
    }

    if account.is_some_and(|a| a.buyer_intent) {
        signals.intent_signals.push(Evidenced::new(
            "Buyer intent flag set".to_string(),
            Evidence::crm_field("buyer_intent"),
        ));
    }

    signals
}

fn build_icp_fit(prospect: &Prospect, company: &Company) -> IcpFit {
    let mut fit_reasons = Vec::new();
    let mut disqualifiers = Vec::new();

    match prospect.function {
        JobFunction::QaTesting => fit_reasons.push("Prospect is in QA/Testing function".to_string()),
        JobFunction::Engineering => {
            fit_reasons.push("Prospect is in Engineering (secondary ICP)".to_string())
        }
        other => disqualifiers.push(format!("Function '{}' is not primary ICP", other)),
    }

    let seniority = prospect.seniority;
    if seniority.is_strategic() {
        fit_reasons.push(format!("Senior role: {}", seniority));
    } else if seniority.is_mid_level() {
        fit_reasons.push(format!("Mid-level: {}", seniority));
    } else {
        disqualifiers.push(format!(
            "Seniority '{}' may lack decision-making authority",
            seniority
        ));
    }

    match company.size_band.as_deref() {
        Some(band @ ("201-500" | "501-1000" | "1001-5000")) => {
            fit_reasons.push(format!("Company size {} is sweet spot", band))
        }
        Some(band @ ("50000+" | "1-50")) => {
            disqualifiers.push(format!("Company size {} is outside sweet spot", band))
        }
        _ => {}
    }

    let strength = match fit_reasons.len() {
        n if n >= 3 => "Strong",
        2 => "Moderate",
        _ => "Weak",
    };

    IcpFit {
        fit_summary: format!(
            "{} ICP fit: {} {} at {} company",
            strength, prospect.function, seniority, company.vertical
        ),
        fit_reasons,
        disqualifiers,
    }
}

fn build_pains(
    prospect: &Prospect,
    company: &Company,
    signals: &Signals,
    industry_evidence: Evidence,
    library: &VerticalPainLibrary,
) -> Pains {
    let ctx = PainContext {
        tools: &signals.tech_stack,
        function: prospect.function,
        seniority: prospect.seniority,
        industry: company
            .industry
            .as_deref()
            .map(|i| (i, industry_evidence)),
    };

    let mut pains: Vec<PainHypothesis> =
        PAIN_RULES.iter().filter_map(|(_, rule)| rule(&ctx)).collect();

    for pain in library.pains_for(&company.vertical, &signals.tool_names()) {
        let duplicate = pains
            .iter()
            .any(|p| p.pain.to_lowercase() == pain.pain.to_lowercase());
        if !duplicate {
            pains.push(pain);
        }
    }

    if pains.is_empty() {
        pains.push(PainHypothesis::new(FALLBACK_PAIN, 0.3, Evidence::Ungrounded));
    }

    Pains {
        hypothesized_pains: pains,
    }
}

fn build_hooks(prospect: &Prospect, person: Option<&PersonResearch>) -> Personalization {
    let mut hooks = Vec::new();

    if !prospect.title.is_empty() {
        hooks.push(PersonalizationHook::new(
            format!("Role as {}", prospect.title),
            Evidence::crm_field("title"),
        ));
    }
    if !prospect.company_name.is_empty() {
        hooks.push(PersonalizationHook::new(
            format!("Work at {}", prospect.company_name),
            Evidence::crm_field("company_name"),
        ));
    }

    if let Some(person) = person {
        if let Some(headline) = non_blank(person.headline.as_deref()) {
            hooks.push(PersonalizationHook::new(
                format!("LinkedIn headline: {}", headline),
                Evidence::person_research("headline"),
            ));
        }
        if person.is_recently_hired() {
            hooks.push(PersonalizationHook::new(
                "Recently started in role (< 6 months)",
                Evidence::person_research("recently_hired"),
            ));
        }
        if let Some(about) = non_blank(person.about.as_deref()) {
            let snippet: String = about.chars().take(ABOUT_SNIPPET_CHARS).collect();
            hooks.push(PersonalizationHook::new(
                format!("About: {}", snippet),
                Evidence::person_research("about"),
            ));
        }
    }

    Personalization { hooks }
}

fn quality_score(prospect: &Prospect, company: &Company) -> f64 {
    let filled = [
        !prospect.full_name.is_empty(),
        !prospect.title.is_empty(),
        true, // seniority always inferred
        true, // function always inferred
        prospect.linkedin_url.is_some(),
        !prospect.company_name.is_empty(),
        prospect.company_domain.is_some(),
        company.industry.is_some(),
        company.size_band.is_some(),
        company.geo.is_some(),
        company.product_summary.is_some(),
    ];
    let count = filled.iter().filter(|f| **f).count();
    round2(count as f64 / filled.len() as f64)
}

// ============================================================================
// Signal detection
// ============================================================================

/// Derive signals from cached research, ready to be stored.
pub fn detect_signals(
    company: Option<&CompanyResearch>,
    person: Option<&PersonResearch>,
) -> Vec<StoredSignal> {
    let mut signals = Vec::new();

    if let Some(company) = company {
        if let Some(hiring) = non_blank(company.hiring_signals.as_deref()) {
            let lower = hiring.to_lowercase();
            if ["qa", "quality", "test", "sdet", "automation"]
                .iter()
                .any(|t| lower.contains(t))
            {
                signals.push(StoredSignal::new(
                    "hiring_qa",
                    format!("QA-related hiring: {}", hiring),
                    "job_postings",
                ));
            }
        }

        if let Some(funding) = non_blank(company.funding_info.as_deref()) {
            signals.push(StoredSignal::new(
                "funding",
                format!("Recent funding: {}", funding),
                "news",
            ));
        }

        if let Some(news) = non_blank(company.recent_news.as_deref()) {
            let lower = news.to_lowercase();
            if [
                "digital transformation",
                "migration",
                "modernization",
                "cloud",
                "platform",
                "replatform",
            ]
            .iter()
            .any(|t| lower.contains(t))
            {
                signals.push(StoredSignal::new(
                    "digital_transformation",
                    format!("Transformation signal: {}", news),
                    "news",
                ));
            }
        }

        if !company.known_tools.is_empty() {
            signals.push(StoredSignal::new(
                "competitor_tool",
                format!("Uses: {}", company.known_tools.join(", ")),
                "job_postings",
            ));
        }
    }

    if person.is_some_and(|p| p.is_recently_hired()) {
        signals.push(StoredSignal::new(
            "recently_hired",
            "New to role (< 6 months)",
            "linkedin",
        ));
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(title: &str) -> Contact {
        Contact {
            first_name: "Sarah".to_string(),
            last_name: "Chen".to_string(),
            title: title.to_string(),
            company_name: "PayFlow".to_string(),
            ..Default::default()
        }
    }

    fn tools(names: &[&str]) -> Vec<Evidenced<String>> {
        names
            .iter()
            .map(|n| Evidenced::new(n.to_string(), Evidence::crm_field("known_tools")))
            .collect()
    }

    fn ctx<'a>(tools: &'a [Evidenced<String>], industry: Option<&'a str>) -> PainContext<'a> {
        PainContext {
            tools,
            function: JobFunction::QaTesting,
            seniority: Seniority::Director,
            industry: industry.map(|i| (i, Evidence::crm_field("industry"))),
        }
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let mut c = contact("QA Lead");
        c.first_name.clear();
        c.last_name = "  ".to_string();
        let err = build_research_artifact(&c, None, None, None, &[], &VerticalPainLibrary::default())
            .unwrap_err();
        assert!(err.to_string().contains("first_name"));
    }

    #[test]
    fn test_tool_rule_confidence_by_tool() {
        let high = tools(&["Selenium"]);
        let pain = tool_maintenance_pain(&ctx(&high, None)).unwrap();
        assert_eq!(pain.confidence, 0.8);
        assert_eq!(pain.evidence.source(), Some("from CRM field: known_tools"));

        let low = tools(&["Tosca"]);
        assert_eq!(tool_maintenance_pain(&ctx(&low, None)).unwrap().confidence, 0.5);
        assert!(tool_maintenance_pain(&ctx(&[], None)).is_none());
    }

    #[test]
    fn test_qa_leader_rule_requires_leader_seniority() {
        let mut c = ctx(&[], None);
        assert!(qa_leader_pain(&c).is_some());
        c.seniority = Seniority::Individual;
        assert!(qa_leader_pain(&c).is_none());
        c.seniority = Seniority::CSuite;
        assert!(qa_leader_pain(&c).is_none());
    }

    #[test]
    fn test_compliance_rules_are_exclusive() {
        let c = ctx(&[], Some("Health Insurance"));
        assert!(financial_compliance_pain(&c).is_some());
        assert!(healthcare_compliance_pain(&c).is_none());

        let c = ctx(&[], Some("Healthcare"));
        assert!(financial_compliance_pain(&c).is_none());
        assert!(healthcare_compliance_pain(&c).is_some());
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = PAIN_RULES.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "tool_maintenance",
                "qa_leader_scaling",
                "financial_compliance",
                "healthcare_compliance"
            ]
        );
    }

    #[test]
    fn test_fallback_pain_when_nothing_matches() {
        let c = Contact {
            first_name: "Pat".to_string(),
            title: "Coordinator".to_string(),
            ..Default::default()
        };
        let outcome =
            build_research_artifact(&c, None, None, None, &[], &VerticalPainLibrary::default())
                .unwrap();
        let pains = &outcome.artifact.pains.hypothesized_pains;
        assert_eq!(pains.len(), 1);
        assert_eq!(pains[0].pain, FALLBACK_PAIN);
        assert_eq!(pains[0].evidence, Evidence::Ungrounded);
        assert!(outcome.validation.valid);
    }

    #[test]
    fn test_tech_stack_dedup_and_detection() {
        let account = Account {
            name: "PayFlow".to_string(),
            known_tools: vec!["Selenium".to_string()],
            ..Default::default()
        };
        let research = CompanyResearch {
            known_tools: vec!["selenium".to_string(), "Jenkins".to_string()],
            description: Some("Payments platform tested with Cypress".to_string()),
            ..Default::default()
        };
        let outcome = build_research_artifact(
            &contact("Director of QA"),
            Some(&account),
            None,
            Some(&research),
            &[],
            &VerticalPainLibrary::default(),
        )
        .unwrap();
        let stack = &outcome.artifact.signals.tech_stack;
        let names: Vec<&str> = stack.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(names, vec!["Selenium", "Jenkins", "Cypress"]);
        assert_eq!(stack[0].evidence, Evidence::crm_field("known_tools"));
        assert_eq!(stack[2].evidence, Evidence::company_research("description"));
    }

    #[test]
    fn test_must_not_claim_grows_without_research() {
        let outcome = build_research_artifact(
            &contact("QA Manager"),
            None,
            None,
            None,
            &[],
            &VerticalPainLibrary::default(),
        )
        .unwrap();
        let claims = &outcome.artifact.constraints.must_not_claim;
        assert_eq!(claims.len(), 5);
        assert!(claims.contains(&NO_PERSON_RESEARCH_CLAIM.to_string()));
        assert!(claims.contains(&NO_COMPANY_RESEARCH_CLAIM.to_string()));
    }

    #[test]
    fn test_person_hooks_and_about_snippet() {
        let person = PersonResearch {
            headline: Some("Quality leader".to_string()),
            about: Some("x".repeat(150)),
            tenure_months: Some(2),
            ..Default::default()
        };
        let outcome = build_research_artifact(
            &contact("QA Manager"),
            None,
            Some(&person),
            None,
            &[],
            &VerticalPainLibrary::default(),
        )
        .unwrap();
        let hooks = &outcome.artifact.personalization.hooks;
        assert_eq!(hooks.len(), 5);
        assert_eq!(hooks[2].evidence_field, Evidence::person_research("headline"));
        assert_eq!(hooks[4].hook.len(), "About: ".len() + 100);
    }

    #[test]
    fn test_signals_become_intent_and_triggers() {
        let signals = vec![
            StoredSignal::new("funding", "Series B", "news"),
            StoredSignal::new("recently_hired", "New to role", "linkedin"),
        ];
        let account = Account {
            buyer_intent: true,
            ..Default::default()
        };
        let outcome = build_research_artifact(
            &contact("QA Manager"),
            Some(&account),
            None,
            None,
            &signals,
            &VerticalPainLibrary::default(),
        )
        .unwrap();
        let s = &outcome.artifact.signals;
        assert_eq!(s.intent_signals.len(), 2);
        assert!(s.has_buyer_intent_flag());
        assert_eq!(s.triggers[0].value, "funding event: Series B");
        assert_eq!(s.triggers[1].value, "job change: New to role");
        assert_eq!(s.triggers[0].evidence.source(), Some("from signal: funding"));
    }

    #[test]
    fn test_fit_summary_and_size_band_inference() {
        let account = Account {
            name: "PayFlow".to_string(),
            industry: Some("FinTech".to_string()),
            employee_count: Some(350),
            ..Default::default()
        };
        let outcome = build_research_artifact(
            &contact("Director of QA"),
            Some(&account),
            None,
            None,
            &[],
            &VerticalPainLibrary::default(),
        )
        .unwrap();
        let a = &outcome.artifact;
        assert_eq!(a.company.size_band.as_deref(), Some("201-500"));
        assert_eq!(
            a.icp_fit.fit_summary,
            "Strong ICP fit: QA/Testing director at FinTech company"
        );
    }

    #[test]
    fn test_detect_signals() {
        let company = CompanyResearch {
            hiring_signals: Some("Hiring 3 SDETs".to_string()),
            funding_info: Some("Series C".to_string()),
            recent_news: Some("Cloud migration underway".to_string()),
            known_tools: vec!["Selenium".to_string()],
            ..Default::default()
        };
        let person = PersonResearch {
            recently_hired: true,
            ..Default::default()
        };
        let types: Vec<String> = detect_signals(Some(&company), Some(&person))
            .into_iter()
            .map(|s| s.signal_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "hiring_qa",
                "funding",
                "digital_transformation",
                "competitor_tool",
                "recently_hired"
            ]
        );
        assert!(detect_signals(None, None).is_empty());
    }
}
