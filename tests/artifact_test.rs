//! Research artifact integration tests
//!
//! Builds artifacts from CRM-shaped records and checks evidence discipline
//! through the public API.

use serde_json::json;

use bdr_outreach::evidence::Evidence;
use bdr_outreach::research::{
    build_research_artifact, validate_artifact_json, validate_research_artifact, Account,
    CompanyResearch, Contact, PersonResearch, ResearchArtifact, StoredSignal, VerticalPainLibrary,
    FALLBACK_PAIN,
};

fn sarah() -> Contact {
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

fn payflow() -> Account {
    Account {
        id: Some("a-1".to_string()),
        name: "PayFlow".to_string(),
        domain: Some("payflow.io".to_string()),
        industry: Some("FinTech".to_string()),
        employee_count: Some(350),
        buyer_intent: true,
        known_tools: vec!["Selenium".to_string()],
        ..Default::default()
    }
}

fn sarah_artifact() -> ResearchArtifact {
    build_research_artifact(
        &sarah(),
        Some(&payflow()),
        None,
        None,
        &[],
        &VerticalPainLibrary::builtin(),
    )
    .expect("artifact should build")
    .artifact
}

fn bare_contact() -> Contact {
    Contact {
        first_name: "Alex".to_string(),
        last_name: "Doe".to_string(),
        title: "Coordinator".to_string(),
        company_name: "Unknown Co".to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn test_qa_director_artifact_is_valid() {
        let outcome = build_research_artifact(
            &sarah(),
            Some(&payflow()),
            None,
            None,
            &[],
            &VerticalPainLibrary::builtin(),
        )
        .unwrap();

        assert!(outcome.validation.valid, "{:?}", outcome.validation.errors);
        assert_eq!(outcome.artifact.prospect.full_name, "Sarah Chen");
        assert_eq!(outcome.artifact.prospect.company_domain.as_deref(), Some("payflow.io"));
    }

    #[test]
    fn test_selenium_maintenance_pain_has_crm_evidence() {
        let artifact = sarah_artifact();
        let pain = artifact
            .pains
            .hypothesized_pains
            .iter()
            .find(|p| p.pain.contains("Selenium"))
            .expect("Selenium pain should be present");

        assert!(pain.confidence >= 0.7);
        assert!(pain.evidence.mentions("CRM field"));
        assert!(pain.evidence.is_substantive());
    }

    #[test]
    fn test_tech_stack_entries_carry_evidence() {
        let artifact = sarah_artifact();
        assert!(!artifact.signals.tech_stack.is_empty());
        for item in &artifact.signals.tech_stack {
            assert!(item.evidence.is_grounded(), "{} has no evidence", item.value);
        }
    }

    #[test]
    fn test_bare_contact_falls_back() {
        let outcome = build_research_artifact(
            &bare_contact(),
            None,
            None,
            None,
            &[],
            &VerticalPainLibrary::builtin(),
        )
        .unwrap();
        let artifact = &outcome.artifact;

        assert!(outcome.validation.valid, "{:?}", outcome.validation.errors);
        assert_eq!(artifact.pains.hypothesized_pains.len(), 1);
        assert_eq!(artifact.pains.hypothesized_pains[0].pain, FALLBACK_PAIN);
        assert_eq!(artifact.pains.hypothesized_pains[0].evidence, Evidence::Ungrounded);

        let hooks: Vec<&str> = artifact
            .personalization
            .hooks
            .iter()
            .map(|h| h.hook.as_str())
            .collect();
        assert_eq!(hooks, vec!["Role as Coordinator", "Work at Unknown Co"]);
    }

    #[test]
    fn test_missing_research_adds_guardrails() {
        let artifact = sarah_artifact();
        let claims = &artifact.constraints.must_not_claim;
        assert!(claims.iter().any(|c| c.contains("LinkedIn activity")));
        assert!(claims.iter().any(|c| c.contains("company products")));

        let with_research = build_research_artifact(
            &sarah(),
            Some(&payflow()),
            Some(&PersonResearch {
                headline: Some("Quality at PayFlow".to_string()),
                ..Default::default()
            }),
            Some(&CompanyResearch {
                description: Some("Payments platform for SMBs".to_string()),
                ..Default::default()
            }),
            &[],
            &VerticalPainLibrary::builtin(),
        )
        .unwrap()
        .artifact;
        assert_eq!(with_research.constraints.must_not_claim.len(), 3);
    }

    #[test]
    fn test_stored_signals_become_evidence() {
        let signals = vec![StoredSignal::new("hiring_qa", "Posted two SDET roles", "job_board")];
        let artifact = build_research_artifact(
            &sarah(),
            Some(&payflow()),
            None,
            None,
            &signals,
            &VerticalPainLibrary::builtin(),
        )
        .unwrap()
        .artifact;

        let all: Vec<&Evidence> = artifact
            .signals
            .intent_signals
            .iter()
            .chain(artifact.signals.triggers.iter())
            .map(|s| &s.evidence)
            .collect();
        assert!(all.iter().any(|e| e.mentions("from signal: hiring_qa")));
    }

    #[test]
    fn test_nameless_contact_is_rejected() {
        let contact = Contact {
            title: "Director of QA".to_string(),
            ..Default::default()
        };
        let result = build_research_artifact(
            &contact,
            None,
            None,
            None,
            &[],
            &VerticalPainLibrary::builtin(),
        );
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod validator_tests {
    use super::*;

    #[test]
    fn test_json_round_trip_is_valid() {
        let value = serde_json::to_value(sarah_artifact()).unwrap();
        let report = validate_artifact_json(&value);
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_bare_string_tech_stack_fails() {
        let mut value = serde_json::to_value(sarah_artifact()).unwrap();
        value["signals"]["tech_stack"] = json!(["Selenium"]);

        let report = validate_artifact_json(&value);
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.field == "signals.tech_stack[0]"));
    }

    #[test]
    fn test_tech_stack_object_without_evidence_fails() {
        let mut value = serde_json::to_value(sarah_artifact()).unwrap();
        value["signals"]["tech_stack"] = json!([{ "value": "Selenium" }]);

        let report = validate_artifact_json(&value);
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "signals.tech_stack[0]");
    }

    #[test]
    fn test_ungrounded_hook_fails() {
        let mut artifact = sarah_artifact();
        artifact.personalization.hooks[0].evidence_field = Evidence::Ungrounded;

        let report = validate_research_artifact(&artifact);
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.field == "personalization.hooks[0]"));
    }

    #[test]
    fn test_generic_evidence_cannot_back_high_confidence() {
        let mut artifact = sarah_artifact();
        artifact.pains.hypothesized_pains[0].confidence = 0.9;
        artifact.pains.hypothesized_pains[0].evidence = Evidence::grounded("generic assumption");

        let report = validate_research_artifact(&artifact);
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.field == "pains.hypothesized_pains[0]"));
    }

    #[test]
    fn test_empty_guardrails_fail() {
        let mut artifact = sarah_artifact();
        artifact.constraints.must_not_claim.clear();

        let report = validate_research_artifact(&artifact);
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "constraints.must_not_claim");
    }
}
