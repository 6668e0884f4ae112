//! Persistence boundary for drafts, touch history, outcomes and corrections.
//!
//! The outreach core never queries the store on its own. Callers load a
//! history snapshot, hand it to the feedback tracker, and save what the
//! engine produced.

mod sqlite;


pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageResult;
use crate::feedback::{CorrectionEvent, FeedbackHistory, MeetingRecord, ReplyRecord, TouchRecord};

/// Review state of a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Cleared to send.
    Approved,
    /// Sent back for rework.
    Rejected,
    /// Delivered.
    Sent,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
            ApprovalStatus::Sent => write!(f, "sent"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            "sent" => Ok(ApprovalStatus::Sent),
            _ => Err(format!("Unknown approval status: {}", s)),
        }
    }
}

/// One draft row awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Unique draft id.
    pub id: String,
    /// Contact the draft is for.
    pub contact_id: String,
    /// Delivery channel.
    pub channel: String,
    /// Position in the sequence.
    pub touch_number: u8,
    /// Touch kind, e.g. `inmail` or `call_snippet`.
    pub touch_type: String,
    /// First subject line, when the touch has any.
    pub subject_line: Option<String>,
    /// Message body.
    pub body: String,
    /// 0-100; the research quality of the artifact behind the draft.
    pub personalization_score: u8,
    /// Proof-point key cited.
    pub proof_point_used: Option<String>,
    /// Pain the touch led with.
    pub pain_hook: Option<String>,
    /// Whitespace-separated words in the body.
    pub word_count: usize,
    /// Review state.
    pub approval_status: ApprovalStatus,
    /// When the draft was rendered.
    pub created_at: DateTime<Utc>,
}

impl MessageDraft {
    /// Fresh pending draft with a new id.
    pub fn new(
        contact_id: impl Into<String>,
        channel: impl Into<String>,
        touch_number: u8,
        touch_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            id: Uuid::new_v4().to_string(),
            contact_id: contact_id.into(),
            channel: channel.into(),
            touch_number,
            touch_type: touch_type.into(),
            subject_line: None,
            word_count: body.split_whitespace().count(),
            body,
            personalization_score: 0,
            proof_point_used: None,
            pain_hook: None,
            approval_status: ApprovalStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Set the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject_line = Some(subject.into());
        self
    }

    /// Clamped to 100.
    pub fn with_personalization_score(mut self, score: u8) -> Self {
        self.personalization_score = score.min(100);
        self
    }

    /// Record the cited proof point.
    pub fn with_proof_point(mut self, key: impl Into<String>) -> Self {
        self.proof_point_used = Some(key.into());
        self
    }

    /// Record the pain hook.
    pub fn with_pain_hook(mut self, hook: impl Into<String>) -> Self {
        self.pain_hook = Some(hook.into());
        self
    }
}

/// Store used by the CLI and by callers embedding the engine.
///
/// Every insert is duplicate-safe: writing the same record twice stores it
/// once and reports `false` (or a smaller count) the second time.
#[async_trait]
pub trait OutreachStore: Send + Sync {
    // Drafts

    /// Insert drafts; returns how many were new.
    async fn save_drafts(&self, drafts: &[MessageDraft]) -> StorageResult<usize>;
    /// Drafts for a contact ordered by touch number.
    async fn list_drafts(&self, contact_id: &str) -> StorageResult<Vec<MessageDraft>>;

    // History

    async fn record_touchpoint(&self, touch: &TouchRecord) -> StorageResult<bool>;
    async fn record_reply(&self, reply: &ReplyRecord) -> StorageResult<bool>;
    async fn record_meeting(&self, meeting: &MeetingRecord) -> StorageResult<bool>;
    /// Touches, replies and meetings at or after `since`, oldest first.
    async fn load_history(&self, since: DateTime<Utc>) -> StorageResult<FeedbackHistory>;

    // Corrections (append-only)

    async fn append_correction(&self, event: &CorrectionEvent) -> StorageResult<bool>;
    /// Corrections in arrival order, optionally for one contact.
    async fn list_corrections(&self, contact_id: Option<&str>) -> StorageResult<Vec<CorrectionEvent>>;
}
