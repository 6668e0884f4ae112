//! Shared records for unit tests across the crate.

use super::{build_research_artifact, Account, Contact, PersonResearch, ResearchArtifact, VerticalPainLibrary};

pub(crate) fn sarah_contact() -> Contact {
    Contact {
        id: Some("c-1".to_string()),
        first_name: "Sarah".to_string(),
        last_name: "Chen".to_string(),
        title: "Director of QA".to_string(),
        company_name: "PayFlow".to_string(),
        email: Some("sarah@payflow.io".to_string()),
        ..Default::default()
    }
}

pub(crate) fn payflow_account() -> Account {
    Account {
        id: Some("a-1".to_string()),
        name: "PayFlow".to_string(),
        domain: Some("payflow.io".to_string()),
        industry: Some("FinTech".to_string()),
        employee_count: Some(350),
        buyer_intent: true,
        known_tools: vec!["Selenium".to_string(), "Jira".to_string()],
        ..Default::default()
    }
}

/// Director of QA at a 350-person FinTech with Selenium and buyer intent.
pub(crate) fn sarah_artifact() -> ResearchArtifact {
    build_research_artifact(
        &sarah_contact(),
        Some(&payflow_account()),
        None,
        None,
        &[],
        &VerticalPainLibrary::builtin(),
    )
    .unwrap()
    .artifact
}

/// Same prospect, freshly hired, with a profile headline.
pub(crate) fn sarah_with_person() -> ResearchArtifact {
    let person = PersonResearch {
        headline: Some("Building quality at PayFlow".to_string()),
        recently_hired: true,
        ..Default::default()
    };
    build_research_artifact(
        &sarah_contact(),
        Some(&payflow_account()),
        Some(&person),
        None,
        &[],
        &VerticalPainLibrary::builtin(),
    )
    .unwrap()
    .artifact
}

/// No account, no title keywords, no tools.
pub(crate) fn bare_artifact() -> ResearchArtifact {
    let contact = Contact {
        first_name: "Alex".to_string(),
        last_name: "Doe".to_string(),
        title: "Coordinator".to_string(),
        company_name: "Unknown Co".to_string(),
        ..Default::default()
    };
    build_research_artifact(&contact, None, None, None, &[], &VerticalPainLibrary::builtin())
        .unwrap()
        .artifact
}
