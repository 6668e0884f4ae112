//! Orchestration around an injected, immutable catalog.
//!
//! [`OutreachEngine`] owns nothing mutable. The same engine can serve many
//! prospects concurrently; each call builds its own artifact and output.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{Config, ProductConfig};
use crate::enrichment::{enrich_from_signals, merge_enrichment_into_artifact, EnrichmentInput};
use crate::error::AppResult;
use crate::feedback::{
    assign_ab_groups, get_conversion_stats, AbAssignment, AbCandidate, AbGroup, ConversionStats,
    FeedbackHistory, TouchRecord,
};
use crate::refine::{with_pains, PainRefiner};
use crate::render::{generate_message_variants, Channel, MessageVariant, VariantSet};
use crate::research::{
    build_research_artifact, validate_research_artifact, Account, BuildOutcome, CompanyResearch,
    Contact, PersonResearch, ResearchArtifact, StoredSignal, VerticalPainLibrary,
};
use crate::scoring::{score_from_artifact, ScoringPolicy, ScoringResult};
use crate::sequence::{generate_sequence, Sequence, SequenceOptions};
use crate::storage::{MessageDraft, OutreachStore};

/// Hour of day (UTC) stamped on touch records built from send dates.
const SEND_HOUR: u32 = 9;

/// Everything known about one prospect, as read from the store or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProspectInput {
    /// CRM contact.
    pub contact: Contact,
    /// CRM account, when known.
    #[serde(default)]
    pub account: Option<Account>,
    /// Person-level research.
    #[serde(default)]
    pub person: Option<PersonResearch>,
    /// Company-level research.
    #[serde(default)]
    pub company_research: Option<CompanyResearch>,
    /// Stored buying signals.
    #[serde(default)]
    pub signals: Vec<StoredSignal>,
    /// Enrichment sources to analyze.
    #[serde(default)]
    pub enrichment: Option<EnrichmentInput>,
}

impl ProspectInput {
    /// Input with only the CRM contact.
    pub fn new(contact: Contact) -> Self {
        Self {
            contact,
            ..Self::default()
        }
    }

    /// Attach the contact's account.
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    /// Attach person research.
    pub fn with_person(mut self, person: PersonResearch) -> Self {
        self.person = Some(person);
        self
    }
}

/// Research, scoring, sequencing and persistence over one catalog.
pub struct OutreachEngine {
    catalog: Arc<ProductConfig>,
    policy: ScoringPolicy,
    vertical_pains: VerticalPainLibrary,
}

impl OutreachEngine {
    /// Default policy and the built-in vertical pain library.
    pub fn new(catalog: Arc<ProductConfig>) -> Self {
        Self {
            catalog,
            policy: ScoringPolicy::default(),
            vertical_pains: VerticalPainLibrary::builtin(),
        }
    }

    /// Catalog, library and feedback gates as configured.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog = Arc::new(config.load_product_config()?);
        Ok(Self {
            catalog,
            policy: ScoringPolicy::with_feedback(
                config.feedback.min_sample,
                config.feedback.window_days,
            ),
            vertical_pains: config.load_vertical_pains()?,
        })
    }

    /// Replace the scoring policy.
    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the vertical pain library.
    pub fn with_vertical_pains(mut self, library: VerticalPainLibrary) -> Self {
        self.vertical_pains = library;
        self
    }

    /// The injected product catalog.
    pub fn catalog(&self) -> &ProductConfig {
        &self.catalog
    }

    /// Active scoring policy.
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Build the artifact, merging enrichment when the input carries any.
    ///
    /// Validation runs again after the merge so the report describes the
    /// artifact actually returned.
    pub fn research(&self, input: &ProspectInput) -> AppResult<BuildOutcome> {
        let mut outcome = build_research_artifact(
            &input.contact,
            input.account.as_ref(),
            input.person.as_ref(),
            input.company_research.as_ref(),
            &input.signals,
            &self.vertical_pains,
        )?;

        if let Some(enrichment_input) = &input.enrichment {
            let enrichment = enrich_from_signals(enrichment_input);
            if !enrichment.is_empty() {
                merge_enrichment_into_artifact(&mut outcome.artifact, &enrichment);
                outcome.validation = validate_research_artifact(&outcome.artifact);
            }
        }

        debug!(
            prospect = %outcome.artifact.prospect.full_name,
            valid = outcome.validation.valid,
            quality = outcome.artifact.metadata.research_quality_score,
            "Built research artifact"
        );
        Ok(outcome)
    }

    /// ICP score and tier under the active policy.
    pub fn score(&self, artifact: &ResearchArtifact) -> ScoringResult {
        let scoring = score_from_artifact(artifact, &self.policy);
        info!(
            prospect = %artifact.prospect.full_name,
            tier = %scoring.tier,
            score = scoring.total_score,
            policy = %scoring.policy_version,
            "Scored prospect"
        );
        scoring
    }

    /// Conversion stats over the policy's feedback window ending at `now`.
    pub fn conversion_stats(&self, history: &FeedbackHistory, now: DateTime<Utc>) -> ConversionStats {
        get_conversion_stats(history, self.policy.feedback_window_days, now)
    }

    /// Start of the feedback window ending at `now`, for loading history.
    pub fn feedback_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.policy.feedback_window_days)
    }

    /// Tier-driven sequence, QA-gated touch by touch.
    pub fn sequence(
        &self,
        artifact: &ResearchArtifact,
        scoring: &ScoringResult,
        options: &SequenceOptions<'_>,
    ) -> AppResult<Sequence> {
        let sequence = generate_sequence(artifact, scoring, &self.catalog, options)?;
        let failed = sequence.qa_results.iter().filter(|r| !r.passed).count();
        info!(
            prospect = %artifact.prospect.full_name,
            touches = sequence.touches.len(),
            qa_failed = failed,
            "Generated sequence"
        );
        Ok(sequence)
    }

    /// All three tone variants of the first touch.
    pub fn variants(
        &self,
        artifact: &ResearchArtifact,
        scoring: &ScoringResult,
        channel: Channel,
    ) -> AppResult<VariantSet> {
        Ok(generate_message_variants(artifact, scoring, &self.catalog, channel)?)
    }

    /// Copy of the artifact with its pains re-ranked by `refiner`.
    pub async fn refine(&self, refiner: &dyn PainRefiner, artifact: &ResearchArtifact) -> ResearchArtifact {
        let pains = refiner.refine(artifact).await;
        with_pains(artifact, pains)
    }

    /// One pending draft row per touch.
    pub fn draft_rows(
        &self,
        contact_id: &str,
        artifact: &ResearchArtifact,
        sequence: &Sequence,
    ) -> Vec<MessageDraft> {
        let personalization = (artifact.metadata.research_quality_score * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8;

        sequence
            .touches
            .iter()
            .map(|touch| {
                let message = &touch.message;
                let mut draft = MessageDraft::new(
                    contact_id,
                    message.channel.as_str(),
                    message.touch_number,
                    touch.touch_type.as_str(),
                    message.body.clone(),
                )
                .with_personalization_score(personalization);
                if let Some(subject) = message.subject_lines.first() {
                    draft = draft.with_subject(subject.clone());
                }
                if !message.proof_point_key.is_empty() {
                    draft = draft.with_proof_point(message.proof_point_key.clone());
                }
                if !message.pain_hook.is_empty() {
                    draft = draft.with_pain_hook(message.pain_hook.clone());
                }
                draft
            })
            .collect()
    }

    /// Stratified A/B split of researched prospects on one test variable.
    pub fn assign_ab_groups(
        &self,
        prospects: &[(String, ResearchArtifact)],
        variable: &str,
    ) -> AbAssignment {
        let candidates: Vec<AbCandidate> = prospects
            .iter()
            .map(|(contact_id, artifact)| AbCandidate::from_artifact(contact_id.clone(), artifact))
            .collect();
        assign_ab_groups(&candidates, variable)
    }

    /// One touch record per scheduled touch, stamped with its send date and
    /// tagged with the contact's A/B arm.
    pub fn touch_records(
        &self,
        contact_id: &str,
        sequence: &Sequence,
        ab_group: Option<AbGroup>,
    ) -> Vec<TouchRecord> {
        sequence
            .touches
            .iter()
            .map(|touch| {
                let message = &touch.message;
                TouchRecord {
                    id: format!("{}-t{}-{}", contact_id, message.touch_number, touch.send_date),
                    contact_id: contact_id.to_string(),
                    channel: Some(message.channel.as_str().to_string()),
                    touch_number: Some(message.touch_number),
                    proof_point_used: non_empty(&message.proof_point_key),
                    pain_hook: non_empty(&message.pain_hook),
                    opener_style: opener_style(message),
                    ab_group: ab_group.map(|g| g.to_string()),
                    sent_at: send_time(touch.send_date),
                }
            })
            .collect()
    }

    /// Record the sequence's touches as sent; returns how many were new.
    pub async fn record_sequence(
        &self,
        store: &dyn OutreachStore,
        contact_id: &str,
        sequence: &Sequence,
        ab_group: Option<AbGroup>,
    ) -> AppResult<usize> {
        let mut recorded = 0;
        for touch in self.touch_records(contact_id, sequence, ab_group) {
            if store.record_touchpoint(&touch).await? {
                recorded += 1;
            }
        }
        debug!(contact_id, recorded, ab_group = ?ab_group, "Recorded touches");
        Ok(recorded)
    }

    /// Save the sequence's draft rows; returns how many were new.
    pub async fn save_sequence(
        &self,
        store: &dyn OutreachStore,
        contact_id: &str,
        artifact: &ResearchArtifact,
        sequence: &Sequence,
    ) -> AppResult<usize> {
        let drafts = self.draft_rows(contact_id, artifact, sequence);
        Ok(store.save_drafts(&drafts).await?)
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Where the opener's hook came from: person, company or CRM.
fn opener_style(message: &MessageVariant) -> Option<String> {
    let evidence = &message.opener_evidence;
    if message.opener.trim().is_empty() || !evidence.is_grounded() {
        return None;
    }
    let style = if evidence.mentions("person research") {
        "person"
    } else if evidence.mentions("company research") {
        "company"
    } else {
        "crm"
    };
    Some(style.to_string())
}

fn send_time(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(SEND_HOUR, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&naive)
}
