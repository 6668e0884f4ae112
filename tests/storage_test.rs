//! Integration tests for SQLite storage layer
//!
//! Tests database operations using an in-memory SQLite database.

use chrono::{DateTime, Duration, TimeZone, Utc};

use bdr_outreach::feedback::{
    get_conversion_stats, CorrectionEvent, MeetingRecord, ReplyRecord, TouchRecord,
};
use bdr_outreach::storage::{ApprovalStatus, MessageDraft, OutreachStore, SqliteStorage};

/// Create an in-memory storage instance for testing
async fn create_test_storage() -> SqliteStorage {
    SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create in-memory storage")
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, 9, 30, 0).unwrap()
}

fn touch(id: &str, contact_id: &str, day: u32) -> TouchRecord {
    TouchRecord {
        id: id.to_string(),
        contact_id: contact_id.to_string(),
        channel: Some("linkedin".to_string()),
        touch_number: Some(1),
        proof_point_used: Some("cred_coverage".to_string()),
        pain_hook: Some("Test maintenance overhead with Selenium".to_string()),
        opener_style: Some("role".to_string()),
        ab_group: None,
        sent_at: at(day),
    }
}

fn correction(id: &str, contact_id: &str, day: u32) -> CorrectionEvent {
    CorrectionEvent {
        id: id.to_string(),
        contact_id: contact_id.to_string(),
        field: "tech_stack".to_string(),
        original_value: "Selenium".to_string(),
        corrected_value: "Playwright".to_string(),
        source: "reply".to_string(),
        confidence: 0.7,
        recorded_at: at(day),
    }
}

#[cfg(test)]
mod draft_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(contact_id: &str, touch_number: u8) -> MessageDraft {
        let mut draft = MessageDraft::new(
            contact_id,
            "linkedin",
            touch_number,
            "linkedin_connect",
            "Hi Sarah,\n\nQuick note on Selenium upkeep.\n\nCheers,\nRob",
        )
        .with_subject("Selenium upkeep at PayFlow")
        .with_personalization_score(85)
        .with_proof_point("selenium_maintenance")
        .with_pain_hook("Test maintenance overhead with Selenium");
        draft.created_at = at(1);
        draft
    }

    #[tokio::test]
    async fn test_save_and_list_drafts() {
        let storage = create_test_storage().await;
        let drafts = vec![draft("c-1", 3), draft("c-1", 1), draft("c-2", 1)];

        let saved = storage.save_drafts(&drafts).await.unwrap();
        assert_eq!(saved, 3);

        let listed = storage.list_drafts("c-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].touch_number, 1);
        assert_eq!(listed[1].touch_number, 3);
        assert_eq!(listed[0], drafts[1]);
    }

    #[tokio::test]
    async fn test_saving_twice_is_duplicate_safe() {
        let storage = create_test_storage().await;
        let drafts = vec![draft("c-1", 1), draft("c-1", 3)];

        assert_eq!(storage.save_drafts(&drafts).await.unwrap(), 2);
        assert_eq!(storage.save_drafts(&drafts).await.unwrap(), 0);
        assert_eq!(storage.list_drafts("c-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_draft_defaults_survive_round_trip() {
        let storage = create_test_storage().await;
        let mut bare = MessageDraft::new("c-9", "phone", 2, "call", "Opener line");
        bare.created_at = at(2);
        storage.save_drafts(std::slice::from_ref(&bare)).await.unwrap();

        let listed = storage.list_drafts("c-9").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].approval_status, ApprovalStatus::Pending);
        assert!(listed[0].subject_line.is_none());
        assert!(listed[0].proof_point_used.is_none());
        assert_eq!(listed[0].word_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_contact_has_no_drafts() {
        let storage = create_test_storage().await;
        assert!(storage.list_drafts("nobody").await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod history_tests {
    use super::*;

    #[tokio::test]
    async fn test_touchpoints_are_duplicate_safe() {
        let storage = create_test_storage().await;
        let t = touch("t-1", "c-1", 3);

        assert!(storage.record_touchpoint(&t).await.unwrap());
        assert!(!storage.record_touchpoint(&t).await.unwrap());
    }

    #[tokio::test]
    async fn test_replies_and_meetings_are_duplicate_safe() {
        let storage = create_test_storage().await;
        let reply = ReplyRecord {
            touchpoint_id: Some("t-1".to_string()),
            contact_id: "c-1".to_string(),
            intent: "positive".to_string(),
            text: "Sounds great, let's chat".to_string(),
            replied_at: at(4),
        };
        let meeting = MeetingRecord {
            contact_id: "c-1".to_string(),
            created_at: at(5),
        };

        assert!(storage.record_reply(&reply).await.unwrap());
        assert!(!storage.record_reply(&reply).await.unwrap());
        assert!(storage.record_meeting(&meeting).await.unwrap());
        assert!(!storage.record_meeting(&meeting).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_history_since() {
        let storage = create_test_storage().await;
        storage.record_touchpoint(&touch("old", "c-1", 1)).await.unwrap();
        storage.record_touchpoint(&touch("t-2", "c-2", 10)).await.unwrap();
        storage.record_touchpoint(&touch("t-3", "c-3", 12)).await.unwrap();
        storage
            .record_reply(&ReplyRecord {
                touchpoint_id: Some("t-2".to_string()),
                contact_id: "c-2".to_string(),
                intent: "referral".to_string(),
                text: "Talk to our QA lead".to_string(),
                replied_at: at(11),
            })
            .await
            .unwrap();

        let history = storage.load_history(at(10)).await.unwrap();
        let ids: Vec<&str> = history.touches.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t-2", "t-3"]);
        assert_eq!(history.touches[0], touch("t-2", "c-2", 10));
        assert_eq!(history.replies.len(), 1);
        assert_eq!(history.replies[0].touchpoint_id.as_deref(), Some("t-2"));
        assert_eq!(history.replies[0].replied_at, at(11));
        assert!(history.meetings.is_empty());
    }

    #[tokio::test]
    async fn test_loaded_history_feeds_stats() {
        let storage = create_test_storage().await;
        for (i, day) in [8u32, 9, 10].iter().enumerate() {
            storage
                .record_touchpoint(&touch(&format!("t-{}", i), &format!("c-{}", i), *day))
                .await
                .unwrap();
        }
        storage
            .record_reply(&ReplyRecord {
                touchpoint_id: Some("t-0".to_string()),
                contact_id: "c-0".to_string(),
                intent: "positive".to_string(),
                text: "Yes".to_string(),
                replied_at: at(9),
            })
            .await
            .unwrap();

        let now = at(20);
        let history = storage.load_history(now - Duration::days(90)).await.unwrap();
        let stats = get_conversion_stats(&history, 90, now);

        assert_eq!(stats.totals.touches_sent, 3);
        assert_eq!(stats.by_proof_point["cred_coverage"].positive, 1);
        assert_eq!(stats.totals.reply_rate, 0.3333);
    }
}

#[cfg(test)]
mod correction_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_corrections_are_append_only_and_ordered() {
        let storage = create_test_storage().await;
        let first = correction("r-1", "c-1", 2);
        let second = correction("r-2", "c-2", 3);
        let third = correction("r-3", "c-1", 4);

        for event in [&first, &second, &third] {
            assert!(storage.append_correction(event).await.unwrap());
        }
        assert!(!storage.append_correction(&first).await.unwrap());

        let all = storage.list_corrections(None).await.unwrap();
        assert_eq!(all, vec![first.clone(), second.clone(), third.clone()]);

        let mine = storage.list_corrections(Some("c-1")).await.unwrap();
        assert_eq!(mine, vec![first, third]);
    }

    #[tokio::test]
    async fn test_no_corrections_for_unknown_contact() {
        let storage = create_test_storage().await;
        storage.append_correction(&correction("r-1", "c-1", 2)).await.unwrap();
        assert!(storage.list_corrections(Some("c-404")).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod file_storage_tests {
    use super::*;
    use bdr_outreach::config::DatabaseConfig;

    #[tokio::test]
    async fn test_file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("outreach.db"),
            max_connections: 2,
        };

        {
            let storage = SqliteStorage::new(&config).await.unwrap();
            storage.record_touchpoint(&touch("t-1", "c-1", 3)).await.unwrap();
            storage.pool().close().await;
        }

        let reopened = SqliteStorage::new(&config).await.unwrap();
        let history = reopened.load_history(at(1)).await.unwrap();
        assert_eq!(history.touches.len(), 1);
    }
}
