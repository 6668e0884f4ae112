//! Feedback tracker integration tests
//!
//! Conversion stats, winning patterns, reply sentiment and contradiction
//! detection over caller-supplied history.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use bdr_outreach::config::ProductConfig;
use bdr_outreach::feedback::{
    detect_contradictions, generate_feedback_report, get_conversion_stats, get_winning_patterns,
    score_reply_sentiment, CorrectionLog, FeedbackHistory, MeetingRecord, PatternConfidence,
    ReplyAction, ReplyRecord, TouchRecord, DEFAULT_CORRECTION_THRESHOLD, UNKNOWN_BUCKET,
};
use bdr_outreach::render::Tone;
use bdr_outreach::research::{
    build_research_artifact, Account, Contact, ResearchArtifact, VerticalPainLibrary,
};
use bdr_outreach::scoring::{score_from_artifact, ScoringPolicy};
use bdr_outreach::sequence::{generate_sequence, SequenceOptions};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn touch(id: &str, proof_point: Option<&str>, channel: &str, days_ago: i64) -> TouchRecord {
    TouchRecord {
        id: id.to_string(),
        contact_id: format!("contact-{}", id),
        channel: Some(channel.to_string()),
        touch_number: Some(1),
        proof_point_used: proof_point.map(str::to_string),
        pain_hook: None,
        opener_style: None,
        ab_group: None,
        sent_at: now() - Duration::days(days_ago),
    }
}

fn reply(touch_id: &str, intent: &str, days_ago: i64) -> ReplyRecord {
    ReplyRecord {
        touchpoint_id: Some(touch_id.to_string()),
        contact_id: format!("contact-{}", touch_id),
        intent: intent.to_string(),
        text: String::new(),
        replied_at: now() - Duration::days(days_ago),
    }
}

/// Six sends of `nagra_api` with three positive replies, six of
/// `cred_coverage` with one.
fn history() -> FeedbackHistory {
    let mut touches = Vec::new();
    let mut replies = Vec::new();
    for i in 0..6 {
        let id = format!("n{}", i);
        touches.push(touch(&id, Some("nagra_api"), "linkedin", 10));
        if i < 3 {
            replies.push(reply(&id, "positive", 9));
        }
    }
    for i in 0..6 {
        let id = format!("c{}", i);
        touches.push(touch(&id, Some("cred_coverage"), "email", 10));
        if i == 0 {
            replies.push(reply(&id, "negative", 9));
        }
        if i == 1 {
            replies.push(reply(&id, "referral", 9));
        }
    }
    FeedbackHistory {
        touches,
        replies,
        meetings: vec![MeetingRecord {
            contact_id: "contact-n0".to_string(),
            created_at: now() - Duration::days(8),
        }],
    }
}

fn sarah_artifact() -> ResearchArtifact {
    let contact = Contact {
        first_name: "Sarah".to_string(),
        last_name: "Chen".to_string(),
        title: "Director of QA".to_string(),
        company_name: "PayFlow".to_string(),
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
    .unwrap()
    .artifact
}

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[test]
    fn test_breakdown_by_proof_point() {
        let stats = get_conversion_stats(&history(), 30, now());

        let nagra = stats.by_proof_point["nagra_api"];
        assert_eq!(nagra.sent, 6);
        assert_eq!(nagra.replied, 3);
        assert_eq!(nagra.positive, 3);
        assert_eq!(nagra.positive_rate, 0.5);

        let cred = stats.by_proof_point["cred_coverage"];
        assert_eq!(cred.replied, 2);
        assert_eq!(cred.positive, 1);
        assert_eq!(cred.positive_rate, 0.1667);
    }

    #[test]
    fn test_totals_and_rates() {
        let stats = get_conversion_stats(&history(), 30, now());
        let totals = stats.totals;

        assert_eq!(totals.touches_sent, 12);
        assert_eq!(totals.replies_received, 5);
        assert_eq!(totals.positive_replies, 4);
        assert_eq!(totals.meetings_booked, 1);
        assert_eq!(totals.meeting_rate, 0.0833);
        assert_eq!(stats.period_days, 30);
    }

    #[test]
    fn test_window_excludes_old_history() {
        let stats = get_conversion_stats(&history(), 5, now());
        assert_eq!(stats.totals.touches_sent, 0);
        assert_eq!(stats.totals.reply_rate, 0.0);
        assert!(stats.by_proof_point.is_empty());
    }

    #[test]
    fn test_missing_attribute_goes_to_unknown_bucket() {
        let history = FeedbackHistory {
            touches: vec![touch("x", None, "linkedin", 1)],
            ..Default::default()
        };
        let stats = get_conversion_stats(&history, 30, now());
        assert_eq!(stats.by_proof_point[UNKNOWN_BUCKET].sent, 1);
    }
}

#[cfg(test)]
mod pattern_tests {
    use super::*;

    #[test]
    fn test_winner_needs_minimum_sample() {
        let stats = get_conversion_stats(&history(), 30, now());

        let patterns = get_winning_patterns(&stats, 5);
        assert_eq!(patterns.top_proof_point.as_deref(), Some("nagra_api"));
        assert_eq!(patterns.top_channel.as_deref(), Some("linkedin"));
        assert_eq!(patterns.confidence, PatternConfidence::Low);

        let strict = get_winning_patterns(&stats, 7);
        assert!(strict.top_proof_point.is_none());
        assert!(strict.top_channel.is_none());
        // all twelve sends were touch 1
        assert_eq!(strict.top_touch_number.as_deref(), Some("1"));
    }

    #[test]
    fn test_report_lists_winners() {
        let stats = get_conversion_stats(&history(), 30, now());
        let patterns = get_winning_patterns(&stats, 5);
        let report = generate_feedback_report(&stats, &patterns);

        assert!(report.starts_with("=== OUTREACH PERFORMANCE REPORT (30-day window) ==="));
        assert!(report.contains("Total touches: 12"));
        assert!(report.contains("--- WINNING PATTERNS ---"));
        assert!(report.contains("Prefer 'nagra_api' proof point"));
    }

    #[test]
    fn test_feedback_overrides_first_touch_pick() {
        let artifact = sarah_artifact();
        let catalog = ProductConfig::builtin();
        let scoring = score_from_artifact(&artifact, &ScoringPolicy::default());
        let stats = get_conversion_stats(&history(), 30, now());
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        let static_pick = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Friendly, true, start),
        )
        .unwrap();
        assert_ne!(static_pick.touch(1).unwrap().message.proof_point_key, "nagra_api");

        let informed = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Friendly, true, start).with_feedback(&stats, 5),
        )
        .unwrap();
        assert_eq!(informed.touch(1).unwrap().message.proof_point_key, "nagra_api");

        let gated = generate_sequence(
            &artifact,
            &scoring,
            &catalog,
            &SequenceOptions::new(Tone::Friendly, true, start).with_feedback(&stats, 10),
        )
        .unwrap();
        assert_eq!(
            gated.touch(1).unwrap().message.proof_point_key,
            static_pick.touch(1).unwrap().message.proof_point_key
        );
    }
}

#[cfg(test)]
mod sentiment_tests {
    use super::*;

    #[test]
    fn test_hard_no_marks_do_not_contact() {
        let r = score_reply_sentiment("Not interested. Please stop emailing me.", "");
        assert_eq!(r.matched_category, "strong_negative");
        assert_eq!(r.action, ReplyAction::MarkDnc);
        assert_eq!(r.suggested_intent, "negative");
    }

    #[test]
    fn test_meeting_request_schedules() {
        let r = score_reply_sentiment("Yes, let's schedule a call next Tuesday", "");
        assert_eq!(r.action, ReplyAction::ScheduleMeeting);
        assert!(r.sentiment_score >= 0.7);
    }

    #[test]
    fn test_soft_interest_sends_more_info() {
        let r = score_reply_sentiment("Could be relevant, tell me more about pricing", "");
        assert_eq!(r.matched_category, "mild_positive");
        assert_eq!(r.action, ReplyAction::SendMoreInfo);
    }

    #[test]
    fn test_out_of_office_is_neutral() {
        let r = score_reply_sentiment("I am out of office until Monday and will be back then", "");
        assert_eq!(r.matched_category, "out_of_office");
        assert_eq!(r.suggested_intent, "out_of_office");
        assert_eq!(r.action, ReplyAction::FollowUpLater);
    }

    #[test]
    fn test_unmatched_reply_uses_existing_intent() {
        let r = score_reply_sentiment("Please send the deck to procurement", "positive");
        assert_eq!(r.matched_category, "inferred_from_intent");
        assert_eq!(r.sentiment_score, 0.5);
        assert_eq!(r.action, ReplyAction::ReviewManually);
    }

    #[test]
    fn test_empty_reply_needs_review() {
        let r = score_reply_sentiment("   ", "");
        assert_eq!(r.matched_category, "none");
        assert_eq!(r.suggested_intent, "neutral");
        assert_eq!(r.action, ReplyAction::ReviewManually);
    }
}

#[cfg(test)]
mod contradiction_tests {
    use super::*;

    #[test]
    fn test_moved_off_selenium_is_a_tech_stack_contradiction() {
        let artifact = sarah_artifact();
        let found = detect_contradictions(
            "We don't use Selenium anymore, moved to Playwright",
            &artifact,
        );

        assert!(!found.is_empty());
        assert!(found
            .iter()
            .any(|c| c.field == "tech_stack" && c.confidence >= 0.7));
        assert!(found.iter().any(|c| c.corrected_value == "Playwright"));
    }

    #[test]
    fn test_detection_leaves_artifact_untouched() {
        let artifact = sarah_artifact();
        let before = artifact.clone();
        let _ = detect_contradictions("Wrong person, try reaching our QA lead", &artifact);
        assert_eq!(artifact, before);
    }

    #[test]
    fn test_wrong_person_is_a_role_fit_contradiction() {
        let artifact = sarah_artifact();
        let found = detect_contradictions("I'm the wrong person for this", &artifact);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "role_fit");
        assert_eq!(found[0].original_value, "Director of QA");
    }

    #[test]
    fn test_log_records_only_confident_contradictions() {
        let artifact = sarah_artifact();
        let found = detect_contradictions(
            "We don't use Selenium anymore, moved to Playwright",
            &artifact,
        );

        let mut log = CorrectionLog::new();
        let recorded = log.record_contradictions("c-1", &found, DEFAULT_CORRECTION_THRESHOLD);
        assert_eq!(recorded.len(), found.len());
        assert_eq!(log.for_contact("c-1").count(), found.len());
        assert_eq!(log.for_contact("c-2").count(), 0);

        let none = log.record_contradictions("c-2", &found, 0.95);
        assert!(none.is_empty());
        assert_eq!(log.len(), found.len());
    }
}
