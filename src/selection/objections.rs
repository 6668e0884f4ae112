//! Objection prediction as an ordered rule cascade. First match wins.

use serde::{Deserialize, Serialize};

use crate::evidence::Evidence;
use crate::render::Tone;
use crate::research::inference::{display_tool_name, is_competitor_tool};
use crate::research::ResearchArtifact;

const LARGE_ENTERPRISE_FLOOR: u32 = 50000;
const SMALL_COMPANY_CEILING: u32 = 200;
const REGULATED_KEYWORDS: [&str; 5] = ["pharma", "healthcare", "finance", "banking", "insurance"];

/// The facts the cascade looks at, pulled from an artifact once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectionContext {
    /// Started the role recently.
    pub recently_hired: bool,
    /// Competitor tools in the tech stack, lowercase, in stack order.
    pub competitor_tools: Vec<String>,
    /// Headcount, when known.
    pub employee_count: Option<u32>,
    /// Size band, when known.
    pub size_band: Option<String>,
    /// Industry and vertical, lowercased and joined.
    pub industry_text: String,
}

impl ObjectionContext {
    /// Gather the cascade inputs from an artifact.
    pub fn from_artifact(artifact: &ResearchArtifact) -> Self {
        let recently_hired = artifact
            .personalization
            .hooks
            .iter()
            .any(|h| h.evidence_field == Evidence::person_research("recently_hired"))
            || artifact
                .signals
                .triggers
                .iter()
                .any(|t| t.value.to_lowercase().starts_with("job change"));

        let competitor_tools = artifact
            .signals
            .tech_stack
            .iter()
            .map(|t| t.value.trim().to_lowercase())
            .filter(|t| is_competitor_tool(t))
            .collect();

        let industry_text = format!(
            "{} {}",
            artifact.company.industry.as_deref().unwrap_or(""),
            artifact.company.vertical
        )
        .to_lowercase();

        Self {
            recently_hired,
            competitor_tools,
            employee_count: artifact.company.employee_count,
            size_band: artifact.company.size_band.clone(),
            industry_text,
        }
    }

    fn primary_tool(&self) -> Option<&str> {
        self.competitor_tools.first().map(String::as_str)
    }
}

/// One entry of the cascade.
#[derive(Debug, Clone, Copy)]
pub struct ObjectionRule {
    /// Stable key.
    pub key: &'static str,
    /// What the prospect is likely to say.
    pub objection: &'static str,
    /// `{tool}` is replaced with the detected tool name.
    pub rebuttal: &'static str,
    /// Whether the rule fires.
    pub applies: fn(&ObjectionContext) -> bool,
}

fn recently_hired(ctx: &ObjectionContext) -> bool {
    ctx.recently_hired
}

fn has_competitor_tool(ctx: &ObjectionContext) -> bool {
    !ctx.competitor_tools.is_empty()
}

fn large_enterprise(ctx: &ObjectionContext) -> bool {
    ctx.employee_count.is_some_and(|n| n >= LARGE_ENTERPRISE_FLOOR)
        || ctx.size_band.as_deref().is_some_and(|b| b.trim() == "50000+")
}

fn regulated_industry(ctx: &ObjectionContext) -> bool {
    REGULATED_KEYWORDS
        .iter()
        .any(|k| ctx.industry_text.contains(k))
}

fn budget_constrained(ctx: &ObjectionContext) -> bool {
    ctx.employee_count.is_some_and(|n| n < SMALL_COMPANY_CEILING)
}

fn always(_: &ObjectionContext) -> bool {
    true
}

/// Cascade in priority order. The last rule always matches.
pub const OBJECTION_RULES: [ObjectionRule; 6] = [
    ObjectionRule {
        key: "timing",
        objection: "Too early, still assessing",
        rebuttal: "Makes sense. Most leaders use the first 90 days to audit what's working. \
                   Happy to share what we see across similar teams so you have a benchmark, \
                   and there's a free trial whenever you want a hands-on look.",
        applies: recently_hired,
    },
    ObjectionRule {
        key: "existing_tool",
        objection: "We already use {tool}",
        rebuttal: "Totally fair. A lot of teams we work with had {tool} too. The gap they kept \
                   hitting was maintenance overhead when the UI changes often. Worth comparing \
                   side by side?",
        applies: has_competitor_tool,
    },
    ObjectionRule {
        key: "security_procurement",
        objection: "Security and procurement review is complex",
        rebuttal: "Understood. We go through enterprise security reviews regularly and can \
                   start with a scoped pilot so procurement only reviews what you actually use.",
        applies: large_enterprise,
    },
    ObjectionRule {
        key: "compliance",
        objection: "Compliance requirements",
        rebuttal: "Makes sense in a regulated space. Teams like yours use us with full audit \
                   trails and on-prem data options, and we can walk your compliance group \
                   through the controls.",
        applies: regulated_industry,
    },
    ObjectionRule {
        key: "budget",
        objection: "Budget is tight",
        rebuttal: "Totally get it. One team your size cut manual testing in half and saw ROI in \
                   the first quarter. Happy to show the math for your setup.",
        applies: budget_constrained,
    },
    ObjectionRule {
        key: "existing_tool",
        objection: "We already have existing tools",
        rebuttal: "Totally fair. Most teams we talk to have something in place. The question is \
                   usually how much time goes into keeping it running.",
        applies: always,
    },
];

/// A predicted objection with its rebuttal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objection {
    /// Key of the rule that fired.
    pub key: String,
    /// What the prospect is likely to say.
    pub objection: String,
    /// Suggested reply.
    pub rebuttal: String,
    /// Display name of the tool substituted into the texts, if any.
    #[serde(default)]
    pub tool: Option<String>,
}

/// First matching rule for the context.
pub fn predict_objection(ctx: &ObjectionContext) -> Objection {
    // The final rule is unconditional, so the fallback is never taken.
    let rule = OBJECTION_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .unwrap_or(&OBJECTION_RULES[OBJECTION_RULES.len() - 1]);

    let tool = ctx.primary_tool().map(display_tool_name);
    let fill = |text: &str| match &tool {
        Some(name) => text.replace("{tool}", name),
        None => text.replace("{tool}", "your current tool"),
    };

    Objection {
        key: rule.key.to_string(),
        objection: fill(rule.objection),
        rebuttal: fill(rule.rebuttal),
        tool: tool.filter(|_| rule.objection.contains("{tool}") || rule.rebuttal.contains("{tool}")),
    }
}

/// Predict straight from an artifact.
pub fn predict_objection_for(artifact: &ResearchArtifact) -> Objection {
    predict_objection(&ObjectionContext::from_artifact(artifact))
}

/// One sentence that gets ahead of the objection, when the tone allows it.
pub fn preemptive_line(objection: &Objection, tone: Tone) -> Option<String> {
    let line = match (objection.key.as_str(), tone) {
        ("timing", Tone::Friendly) => {
            "Totally understand if you're still getting your bearings in the new role."
        }
        ("timing", Tone::Direct) => "Worth a look while you're setting priorities.",
        ("timing", Tone::Curious) => "Curious what's on your first 90-day list.",
        ("existing_tool", Tone::Friendly) => {
            return objection
                .tool
                .as_ref()
                .map(|tool| format!("Not asking you to rip out {}, just compare notes.", tool));
        }
        ("existing_tool", Tone::Curious) => {
            "Curious how much of the week goes into keeping current tests green."
        }
        ("budget", Tone::Friendly) => "No big rollout needed to see if it fits.",
        ("budget", Tone::Curious) => "Curious whether test upkeep shows up in your budget talks.",
        ("compliance", Tone::Friendly) | ("compliance", Tone::Curious) => {
            "Audit trails come built in."
        }
        ("security_procurement", Tone::Friendly) => "A scoped pilot keeps the review small.",
        _ => return None,
    };
    Some(line.to_string())
}
