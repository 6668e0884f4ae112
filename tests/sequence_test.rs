//! Rendering and sequence integration tests
//!
//! Covers the six-touch state machine, proof-point rotation across tone
//! variants, channel truncation and the dash ban.

use chrono::NaiveDate;

use bdr_outreach::config::ProductConfig;
use bdr_outreach::qa::check_message_variant;
use bdr_outreach::render::{
    generate_message_variants, render_for_channel, truncate_to_limit, Channel, ChannelFormat, Tone,
};
use bdr_outreach::research::{
    build_research_artifact, Account, Contact, ResearchArtifact, VerticalPainLibrary,
};
use bdr_outreach::scoring::{score_from_artifact, ScoringPolicy, ScoringResult, Tier};
use bdr_outreach::sequence::{generate_sequence, get_cadence_schedule, SequenceOptions};

const DASHES: [char; 2] = ['\u{2014}', '\u{2013}'];

fn sarah_artifact() -> ResearchArtifact {
    let contact = Contact {
        first_name: "Sarah".to_string(),
        last_name: "Chen".to_string(),
        title: "Director of QA".to_string(),
        company_name: "PayFlow".to_string(),
        email: Some("sarah@payflow.io".to_string()),
        ..Default::default()
    };
    let account = Account {
        name: "PayFlow".to_string(),
        industry: Some("FinTech".to_string()),
        employee_count: Some(350),
        buyer_intent: true,
        known_tools: vec!["Selenium".to_string()],
        ..Default::default()
    };
    build_research_artifact(
        &contact,
        Some(&account),
        None,
        None,
        &[],
        &VerticalPainLibrary::builtin(),
    )
    .expect("artifact should build")
    .artifact
}

fn scoring_with_tier(artifact: &ResearchArtifact, tier: Tier) -> ScoringResult {
    let mut scoring = score_from_artifact(artifact, &ScoringPolicy::default());
    scoring.tier = tier;
    scoring
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

#[cfg(test)]
mod cadence_tests {
    use super::*;

    #[test]
    fn test_hot_with_email_has_all_six_touches() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = scoring_with_tier(&artifact, Tier::Hot);
        let sequence = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Friendly, true, start()),
        )
        .unwrap();

        assert_eq!(sequence.touch_numbers(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(sequence.cadence.total_touches, 6);
        assert_eq!(sequence.cadence.total_days, 10);
    }

    #[test]
    fn test_cold_has_first_touch_and_breakup() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = scoring_with_tier(&artifact, Tier::Cold);
        let sequence = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Direct, true, start()),
        )
        .unwrap();

        assert_eq!(sequence.touch_numbers(), vec![1, 6]);
        let breakup = sequence.touch(6).unwrap();
        assert_eq!(breakup.send_date, NaiveDate::from_ymd_opt(2026, 1, 19).unwrap());
    }

    #[test]
    fn test_no_email_skips_email_touch() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = scoring_with_tier(&artifact, Tier::Hot);
        let sequence = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Curious, false, start()),
        )
        .unwrap();

        assert_eq!(sequence.touch_numbers(), vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_cool_schedule() {
        let schedule = get_cadence_schedule(Tier::Cool, start());
        let touches: Vec<u8> = schedule.iter().map(|e| e.touch_number).collect();
        assert_eq!(touches, vec![1, 3, 6]);
        assert_eq!(schedule[2].day_offset, 21);
        assert_eq!(schedule[2].send_date, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
    }
}

#[cfg(test)]
mod breakup_tests {
    use super::*;

    #[test]
    fn test_breakup_never_pitches() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();

        for tone in Tone::ALL {
            let scoring = scoring_with_tier(&artifact, Tier::Hot);
            let sequence = generate_sequence(
                &artifact,
                &scoring,
                &catalog,
                &SequenceOptions::new(tone, true, start()),
            )
            .unwrap();
            let breakup = &sequence.touch(6).unwrap().message;

            assert!(breakup.proof_point_key.is_empty());
            assert!(!breakup.body.contains(&catalog.company));
            for pp in &catalog.proof_points {
                assert!(!breakup.body.contains(&pp.text), "{} leaked into breakup", pp.key);
                assert!(!breakup.body.contains(&pp.short), "{} leaked into breakup", pp.key);
            }
        }
    }
}

#[cfg(test)]
mod content_tests {
    use super::*;

    #[test]
    fn test_variants_rotate_proof_points() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        let set = generate_message_variants(&artifact, &scoring, &catalog, Channel::Linkedin).unwrap();

        assert_eq!(set.variants.len(), 3);
        let mut keys: Vec<&str> = set
            .variants
            .iter()
            .map(|v| v.proof_point_key.as_str())
            .collect();
        keys.sort();
        keys.dedup();
        assert!(keys.len() >= 2, "keys: {:?}", keys);
    }

    #[test]
    fn test_first_touch_passes_the_gate() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        let sequence = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Friendly, true, start()),
        )
        .unwrap();
        let first = &sequence.touch(1).unwrap().message;

        assert!(catalog.contains_key(&first.proof_point_key));
        let qa = check_message_variant(first, &artifact, &catalog);
        assert!(qa.passed, "{:?}", qa.failures());
        assert!(qa.check("no_forbidden_phrases").unwrap().passed);
    }

    #[test]
    fn test_no_dashes_before_or_after_truncation() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = scoring_with_tier(&artifact, Tier::Hot);

        for tone in Tone::ALL {
            let sequence = generate_sequence(
                &artifact,
                &scoring,
                &catalog,
                &SequenceOptions::new(tone, true, start()),
            )
            .unwrap();
            for touch in &sequence.touches {
                let body = &touch.message.body;
                assert!(!body.contains(DASHES), "dash in touch {}", touch.message.touch_number);
                let note =
                    render_for_channel(&touch.message, ChannelFormat::LinkedinConnection, &catalog);
                assert!(!note.body.contains(DASHES));
                assert!(note.char_count <= 300);
            }
        }
    }
}

#[cfg(test)]
mod truncation_tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        let text = "Short and sweet";
        assert_eq!(truncate_to_limit(text, 100), text);
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let text = "word ".repeat(80);
        let once = truncate_to_limit(&text, 120);
        let twice = truncate_to_limit(&once, 120);
        assert_eq!(once, twice);
        assert!(once.chars().count() <= 120);
    }

    #[test]
    fn test_cuts_on_word_boundary() {
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima";
        let cut = truncate_to_limit(text, 40);

        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= 40);
        let head = cut.trim_end_matches("...");
        assert!(text.starts_with(head));
        assert_eq!(text.as_bytes()[head.len()], b' ');
    }

    #[test]
    fn test_hard_cut_without_boundary() {
        let text = "x".repeat(200);
        let cut = truncate_to_limit(&text, 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_dashes_become_hyphens() {
        assert_eq!(truncate_to_limit("fast \u{2014} stable", 100), "fast - stable");
        assert!(!truncate_to_limit(&"a\u{2013}b ".repeat(40), 60).contains(DASHES));
    }
}
