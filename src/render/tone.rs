//! Turns hooks and pains into tone-specific sentences.

use super::Tone;
use crate::config::ProductConfig;
use crate::research::inference::{
    has_keyword, is_competitor_tool, normalize, HIGH_MAINTENANCE_TOOLS,
};
use crate::research::{JobFunction, PersonalizationHook, ResearchArtifact, Seniority};

const ABOUT_SNIPPET_CHARS: usize = 60;

/// Short function label for prose: "QA", "engineering", ...
pub fn function_label(title: &str) -> String {
    let normalized = normalize(title);
    if ["qa", "quality", "test", "testing", "sdet"]
        .iter()
        .any(|k| has_keyword(&normalized, k))
    {
        return "QA".to_string();
    }
    if has_keyword(&normalized, "engineering") || has_keyword(&normalized, "software") {
        return "engineering".to_string();
    }
    if has_keyword(&normalized, "devops") || has_keyword(&normalized, "platform") {
        return "platform engineering".to_string();
    }
    match title.split_once(" of ") {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => title.trim().to_string(),
    }
}

fn hook_rank(hook: &PersonalizationHook) -> u8 {
    if hook.evidence_field.mentions("person research") {
        0
    } else if hook.evidence_field.mentions("company research") {
        1
    } else {
        2
    }
}

/// Best grounded hook: person research, then company, then CRM.
pub fn pick_opener_hook(artifact: &ResearchArtifact) -> Option<&PersonalizationHook> {
    artifact
        .personalization
        .hooks
        .iter()
        .filter(|h| h.evidence_field.is_grounded())
        .min_by_key(|h| hook_rank(h))
}

/// Rewrite a hook into an opener clause (no trailing period).
pub fn render_opener(
    hook: Option<&PersonalizationHook>,
    artifact: &ResearchArtifact,
    tone: Tone,
) -> String {
    let company = company_name(artifact);
    let title = artifact.prospect.title.trim();
    let func = function_label(title);
    let func_lower = if func == "QA" { func.clone() } else { func.to_lowercase() };
    let raw = hook.map(|h| h.hook.as_str()).unwrap_or("");
    let lower = raw.to_lowercase();

    if lower.starts_with("linkedin headline") {
        return match tone {
            Tone::Friendly => format!("Your work leading {} at {} stood out", func, company),
            Tone::Direct => format!("Given your background in {} at {}", func_lower, company),
            Tone::Curious => format!(
                "Your experience leading {} at {} got me thinking",
                func_lower, company
            ),
        };
    }

    if lower.starts_with("recently started") {
        return match tone {
            Tone::Friendly => format!("Congrats on the new role at {}", company),
            Tone::Direct => format!(
                "Starting a new {} role is a natural time to look at tooling",
                if title.is_empty() { "leadership" } else { title }
            ),
            Tone::Curious => format!(
                "Curious what's top of mind as you settle into the new role at {}",
                company
            ),
        };
    }

    if let Some(about) = raw.strip_prefix("About:") {
        let snippet: String = about.trim().chars().take(ABOUT_SNIPPET_CHARS).collect();
        let snippet = snippet.trim_end_matches(['.', ',', ' ']).to_lowercase();
        return match tone {
            Tone::Friendly => format!("Your focus on {} resonated", snippet),
            Tone::Direct => format!("Based on your background in {}", snippet),
            Tone::Curious => format!("Your experience with {} got me thinking", snippet),
        };
    }

    if lower.starts_with("work at") {
        return match tone {
            Tone::Friendly => format!("What {} is building caught my attention", company),
            Tone::Direct => format!("Reaching out because of {}'s engineering team", company),
            Tone::Curious => format!(
                "Curious about how {} handles test automation at scale",
                company
            ),
        };
    }

    // "Role as ..." and the ungrounded fallback share phrasing.
    match tone {
        Tone::Friendly => format!("Your work leading {} at {} stood out", func, company),
        Tone::Direct if !title.is_empty() => {
            format!("Given your role as {} at {}", title, company)
        }
        Tone::Direct => format!("Reaching out because of {}'s engineering team", company),
        Tone::Curious => format!(
            "Running {} at a company like {} is no small feat",
            func_lower, company
        ),
    }
}

fn company_name(artifact: &ResearchArtifact) -> String {
    let name = artifact.prospect.company_name.trim();
    if name.is_empty() {
        "your company".to_string()
    } else {
        name.to_string()
    }
}

fn industry_phrase(artifact: &ResearchArtifact) -> String {
    artifact
        .company
        .industry
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(&artifact.company.vertical)
        .to_string()
}

/// Up to two tool names for prose, competitor tools first.
pub(crate) fn prose_tools(artifact: &ResearchArtifact) -> Vec<String> {
    let stack = &artifact.signals.tech_stack;
    let competitors: Vec<String> = stack
        .iter()
        .filter(|t| is_competitor_tool(&t.value))
        .map(|t| t.value.clone())
        .collect();
    let pool = if competitors.is_empty() {
        stack.iter().map(|t| t.value.clone()).collect()
    } else {
        competitors
    };
    pool.into_iter().take(2).collect()
}

/// Rewrite a pain hypothesis into a sentence fragment.
///
/// Curious renderings are phrased as questions and carry no punctuation;
/// the caller adds the question mark.
pub fn render_pain_sentence(pain: &str, artifact: &ResearchArtifact, tone: Tone) -> String {
    let company = company_name(artifact);
    let industry = industry_phrase(artifact);
    let strategic = artifact.prospect.seniority.is_strategic();
    let tools = prose_tools(artifact);
    let lower = pain.to_lowercase();

    if lower.contains("maintenance") && !tools.is_empty() {
        let tool_list = tools.join(" and ");
        return match (strategic, tone) {
            (true, Tone::Friendly) => format!(
                "Keeping {} suites stable while shipping fast is a grind most {} teams know well",
                tool_list, industry
            ),
            (true, Tone::Direct) => format!(
                "At {}'s scale, {} maintenance is probably eating into your team's velocity",
                company, tool_list
            ),
            (true, Tone::Curious) => format!(
                "How much engineering time goes into keeping {} tests from breaking",
                tool_list
            ),
            (false, Tone::Friendly) => format!(
                "Wrangling {} test maintenance while keeping release cycles tight is a constant balancing act",
                tool_list
            ),
            (false, Tone::Direct) => format!(
                "{} maintenance overhead tends to grow faster than teams can keep up with",
                tool_list
            ),
            (false, Tone::Curious) => format!(
                "Are flaky {} tests still the biggest time sink for your team",
                tool_list
            ),
        };
    }

    if lower.contains("compliance") || lower.contains("regulated") {
        return match (strategic, tone) {
            (true, Tone::Curious) => "How do you keep regression cycles short when compliance requires full coverage before every release".to_string(),
            (true, _) => format!(
                "Regression cycles in a regulated {} environment can be a real bottleneck for release velocity",
                industry
            ),
            (false, Tone::Curious) => {
                "How much of your sprint gets eaten by compliance-driven regression".to_string()
            }
            (false, _) => "Running full regression before every release in a compliance-heavy environment takes serious bandwidth".to_string(),
        };
    }

    if lower.contains("scaling") {
        return match (strategic, tone) {
            (true, Tone::Curious) => format!(
                "How are you scaling test coverage at {} without scaling headcount",
                company
            ),
            (true, _) => format!(
                "Scaling test coverage without scaling headcount is one of the harder problems in {} engineering",
                industry
            ),
            (false, Tone::Curious) => {
                "How do you grow automation coverage while the team is already stretched".to_string()
            }
            (false, _) => "Growing automation coverage while your team's already stretched thin is a tough balance".to_string(),
        };
    }

    match (strategic, tone) {
        (_, Tone::Curious) => format!(
            "How much of the release cycle at {} goes into keeping tests green",
            company
        ),
        (true, _) if lower.contains("maintenance") => format!(
            "At {}'s scale, test maintenance tends to become a real drag on release velocity",
            company
        ),
        (true, _) => format!(
            "Test automation at {}'s scale tends to become a strategic bottleneck",
            company
        ),
        (false, _) => format!(
            "Keeping test suites reliable as {} ships faster is a constant challenge",
            company
        ),
    }
}

/// Short label for subject lines.
pub fn short_pain_label(pain: &str) -> String {
    let lower = pain.to_lowercase();
    if lower.contains("maintenance") {
        return "test maintenance".to_string();
    }
    if lower.contains("compliance") || lower.contains("regulated") {
        return "regression cycles".to_string();
    }
    if lower.contains("scaling") {
        return "scaling automation".to_string();
    }
    if lower.contains("flaky") {
        return "flaky tests".to_string();
    }
    pain.split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(',')
        .to_lowercase()
}

/// Value prop that fits the prospect, taken verbatim from the catalog.
pub fn pick_value_prop<'a>(
    catalog: &'a ProductConfig,
    artifact: &ResearchArtifact,
    tone: Tone,
) -> Option<&'a str> {
    let vps = &catalog.value_props;
    let first = vps.first()?;
    let find = |words: &[&str]| {
        vps.iter()
            .find(|vp| {
                let lower = vp.to_lowercase();
                words.iter().any(|w| lower.contains(w))
            })
            .map(String::as_str)
    };

    let executive = matches!(
        artifact.prospect.seniority,
        Seniority::Vp | Seniority::CSuite
    );
    if executive {
        return Some(find(&["maintenance", "reduction"]).unwrap_or(first));
    }
    let headline_tool = artifact.signals.tech_stack.iter().any(|t| {
        HIGH_MAINTENANCE_TOOLS.contains(&t.value.trim().to_lowercase().as_str())
    });
    if headline_tool {
        if let Some(vp) = find(&["self-healing", "maintenance", "ui changes"]) {
            return Some(vp);
        }
    }
    if artifact.prospect.function == JobFunction::QaTesting {
        if let Some(vp) = find(&["collaborate", "plain-english", "no-code"]) {
            return Some(vp);
        }
    }
    let index = match tone {
        Tone::Friendly => 0,
        Tone::Direct => 1,
        Tone::Curious => 2,
    };
    Some(vps.get(index).unwrap_or(first).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::fixtures::{bare_artifact, sarah_artifact, sarah_with_person};

    #[test]
    fn test_function_label() {
        assert_eq!(function_label("Director of QA"), "QA");
        assert_eq!(function_label("VP Software Engineering"), "engineering");
        assert_eq!(function_label("Head of Platform"), "platform engineering");
        assert_eq!(function_label("Director of Sales"), "Sales");
        assert_eq!(function_label("Coordinator"), "Coordinator");
    }

    #[test]
    fn test_person_research_hook_ranks_first() {
        let artifact = sarah_with_person();
        let hook = pick_opener_hook(&artifact).unwrap();
        assert!(hook.evidence_field.mentions("person research"));

        let artifact = sarah_artifact();
        let hook = pick_opener_hook(&artifact).unwrap();
        assert_eq!(hook.hook, "Role as Director of QA");
    }

    #[test]
    fn test_crm_company_field_is_not_company_research() {
        let artifact = bare_artifact();
        let company_hook = artifact
            .personalization
            .hooks
            .iter()
            .find(|h| h.hook.starts_with("Work at"))
            .unwrap();
        assert_eq!(hook_rank(company_hook), 2);
        let hook = pick_opener_hook(&artifact).unwrap();
        assert_eq!(hook.hook, "Role as Coordinator");
    }

    #[test]
    fn test_opener_never_leaks_evidence_labels() {
        for artifact in [sarah_artifact(), sarah_with_person(), bare_artifact()] {
            let hook = pick_opener_hook(&artifact);
            for tone in Tone::ALL {
                let opener = render_opener(hook, &artifact, tone);
                assert!(!opener.contains("from CRM"), "{}", opener);
                assert!(!opener.contains("Role as"), "{}", opener);
                assert!(!opener.to_lowercase().contains("hypothesis"), "{}", opener);
            }
        }
    }

    #[test]
    fn test_pain_sentence_uses_tool_and_seniority() {
        let artifact = sarah_artifact();
        let pain = "Test maintenance overhead with Selenium, Jira";
        let friendly = render_pain_sentence(pain, &artifact, Tone::Friendly);
        assert!(friendly.contains("Selenium"));
        assert!(!friendly.contains("Jira"));
        assert!(friendly.contains("FinTech teams"));

        let mut junior = artifact.clone();
        junior.prospect.seniority = Seniority::Individual;
        let direct = render_pain_sentence(pain, &junior, Tone::Direct);
        assert!(direct.starts_with("Selenium maintenance overhead"));
    }

    #[test]
    fn test_curious_pains_are_questions() {
        let artifact = sarah_artifact();
        for pain in [
            "Test maintenance overhead with Selenium",
            "Regression testing across compliance-sensitive financial workflows",
            "Scaling test automation while managing team bandwidth",
            "Something else entirely",
        ] {
            let sentence = render_pain_sentence(pain, &artifact, Tone::Curious);
            let first = sentence.split_whitespace().next().unwrap_or("");
            assert!(
                ["How", "Are"].contains(&first),
                "not a question: {}",
                sentence
            );
        }
    }

    #[test]
    fn test_short_pain_label() {
        assert_eq!(short_pain_label("Test maintenance overhead with Selenium"), "test maintenance");
        assert_eq!(short_pain_label("Release velocity pressure on payments"), "release velocity pressure");
    }

    #[test]
    fn test_value_prop_comes_from_catalog() {
        let catalog = ProductConfig::builtin();
        let artifact = sarah_artifact();
        for tone in Tone::ALL {
            let vp = pick_value_prop(&catalog, &artifact, tone).unwrap();
            assert!(catalog.value_props.iter().any(|v| v == vp));
        }
        let mut empty = catalog.clone();
        empty.value_props.clear();
        assert!(pick_value_prop(&empty, &artifact, Tone::Friendly).is_none());
    }
}
