//! Per-touch message composition.

use super::cta::{connected_cta, cta_line, ps_line, signoff, soft_ask};
use super::tone::{
    function_label, pick_opener_hook, pick_value_prop, render_opener, render_pain_sentence,
    short_pain_label,
};
use super::{capitalize_first, char_count, truncate_to_limit, word_count, Channel, MessageVariant, Tone};
use crate::config::{ProductConfig, ProofPoint};
use crate::evidence::Evidence;
use crate::qa::{word_range, BREAKUP_TOUCH};
use crate::research::inference::{display_tool_name, HEADLINE_COMPETITORS};
use crate::research::{PersonalizationHook, ResearchArtifact, FALLBACK_PAIN};
use crate::scoring::Tier;
use crate::selection::{bridge_phrase, predict_objection_for, preemptive_line, Objection};

/// Renders every touch type for one prospect.
///
/// Holds the per-prospect picks (opener hook, top pain, competitor) so each
/// touch phrases the same facts consistently.
#[derive(Debug, Clone)]
pub struct Composer<'a> {
    artifact: &'a ResearchArtifact,
    catalog: &'a ProductConfig,
    tier: Tier,
    hook: Option<&'a PersonalizationHook>,
    pain: String,
    competitor: Option<String>,
    objection: Objection,
    first_name: String,
    company: String,
    func: String,
}

impl<'a> Composer<'a> {
    /// Gather the per-prospect picks.
    pub fn new(artifact: &'a ResearchArtifact, catalog: &'a ProductConfig, tier: Tier) -> Self {
        let prospect = &artifact.prospect;
        let first_name = Some(prospect.first_name.trim())
            .filter(|n| !n.is_empty())
            .or_else(|| prospect.full_name.split_whitespace().next())
            .unwrap_or("there")
            .to_string();
        let company = Some(prospect.company_name.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or("your company")
            .to_string();
        let pain = artifact
            .pains
            .top()
            .map(|p| p.pain.clone())
            .unwrap_or_else(|| FALLBACK_PAIN.to_string());
        let competitor = artifact
            .signals
            .tech_stack
            .iter()
            .map(|t| t.value.trim().to_lowercase())
            .find(|t| HEADLINE_COMPETITORS.contains(&t.as_str()))
            .map(|t| display_tool_name(&t));

        Self {
            artifact,
            catalog,
            tier,
            hook: pick_opener_hook(artifact),
            pain,
            competitor,
            objection: predict_objection_for(artifact),
            first_name,
            company,
            func: function_label(&prospect.title),
        }
    }

    /// Evidence behind the opener; ungrounded when no hook qualifies.
    pub fn opener_evidence(&self) -> Evidence {
        self.hook
            .map(|h| h.evidence_field.clone())
            .unwrap_or(Evidence::Ungrounded)
    }

    /// Raw top pain hypothesis.
    pub fn pain_hook(&self) -> &str {
        &self.pain
    }

    /// Objection predicted for this prospect.
    pub fn objection(&self) -> &Objection {
        &self.objection
    }

    /// Opener clause for a tone.
    pub fn opener(&self, tone: Tone) -> String {
        render_opener(self.hook, self.artifact, tone)
    }

    /// CTA for a tone under this tier.
    pub fn cta(&self, tone: Tone) -> String {
        connected_cta(
            self.tier,
            tone,
            self.artifact.prospect.seniority.is_strategic(),
            &self.company,
            self.competitor.as_deref(),
        )
    }

    fn pain_clause(&self, tone: Tone) -> String {
        capitalize_first(&render_pain_sentence(&self.pain, self.artifact, tone))
    }

    fn proof_clause(&self, pp: &ProofPoint) -> String {
        format!(
            "{}{}",
            pp.text.trim().trim_end_matches('.'),
            bridge_phrase(pp, self.artifact)
        )
    }

    fn value_prop_sentence(&self, tone: Tone) -> String {
        pick_value_prop(self.catalog, self.artifact, tone)
            .map(|vp| format!(" {}.", vp.trim().trim_end_matches('.')))
            .unwrap_or_default()
    }

    fn peer_line(&self, tone: Tone) -> String {
        match tone {
            Tone::Friendly => "Most teams I talk to are balancing the same tradeoff between test coverage and release speed.",
            Tone::Direct => "Most teams we work with hit that wall once the regression suite starts to sprawl.",
            Tone::Curious => "I've heard a version of this from several teams growing their automation lately.",
        }
        .to_string()
    }

    fn company_line(&self) -> String {
        format!("That's the gap {} was built to close.", self.catalog.company)
    }

    fn pain_reminder(&self) -> String {
        format!(
            "Figured it was worth one more note on {}.",
            short_pain_label(&self.pain)
        )
    }

    /// Catalog value props other than the one `tone` already leads with.
    fn other_value_props(&self, tone: Tone) -> Vec<String> {
        let picked = pick_value_prop(self.catalog, self.artifact, tone);
        self.catalog
            .value_props
            .iter()
            .filter(|vp| Some(vp.as_str()) != picked)
            .map(|vp| format!("{}.", vp.trim().trim_end_matches('.')))
            .collect()
    }

    /// Padding for the long touches, most specific first.
    fn long_touch_extras(&self, tone: Tone) -> Vec<String> {
        let mut extras: Vec<String> = preemptive_line(&self.objection, tone).into_iter().collect();
        extras.push(self.peer_line(tone));
        extras.extend(self.other_value_props(tone));
        extras.push(self.company_line());
        extras
    }

    /// Grow a body with `extras`, in order, until it reaches the touch's
    /// word floor. An extra that would push past the ceiling is skipped.
    fn fit_words(
        &self,
        touch_number: u8,
        extras: &[String],
        build: impl Fn(&str) -> String,
    ) -> String {
        let (low, high) = word_range(touch_number);
        let mut extra = String::new();
        let mut body = build(&extra);
        for sentence in extras {
            if word_count(&body) >= low {
                break;
            }
            let grown = format!("{} {}", extra, sentence);
            let candidate = build(&grown);
            if word_count(&candidate) > high {
                continue;
            }
            extra = grown;
            body = candidate;
        }
        body
    }

    fn closing(&self, tone: Tone) -> String {
        cta_line(&self.cta(tone), soft_ask(self.tier, tone))
    }

    fn signoff(&self, tone: Tone) -> String {
        signoff(tone, &self.catalog.sender)
    }

    /// Subject lines for a written touch, each within the subject limit.
    pub fn subject_lines(&self, touch_number: u8) -> Vec<String> {
        let first = &self.first_name;
        let company = &self.company;
        let func = &self.func;
        let label = short_pain_label(&self.pain);
        let lines = match touch_number {
            1 => vec![
                format!("{} at {}", func, company),
                format!("Thought for {} re: {}", first, label),
                format!("{}'s {} team", company, func),
            ],
            3 => vec![
                format!("Re: {} at {}", func, company),
                format!("Quick follow-up, {}", first),
                format!("One more thought for {}", company),
            ],
            5 => vec![
                format!("{} at {}", capitalize_first(&label), company),
                format!("{}, a different angle", first),
                format!("{} + {}", self.catalog.company, company),
            ],
            6 => vec!["Closing the loop".to_string(), format!("Last note, {}", first)],
            _ => Vec::new(),
        };
        let limit = self.catalog.max_chars.subject_line;
        lines
            .into_iter()
            .map(|line| truncate_to_limit(&line, limit))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        tone: Tone,
        channel: Channel,
        touch_number: u8,
        body: String,
        opener: String,
        pp: Option<&ProofPoint>,
        cta: String,
    ) -> MessageVariant {
        let limit = self.catalog.max_chars.for_channel(channel);
        let body = truncate_to_limit(&body, limit);
        let subject_lines = if channel == Channel::Phone {
            Vec::new()
        } else {
            self.subject_lines(touch_number)
        };
        MessageVariant {
            tone,
            channel,
            touch_number,
            subject_lines,
            char_count: char_count(&body),
            word_count: word_count(&body),
            body,
            opener,
            opener_evidence: self.opener_evidence(),
            proof_point_key: pp.map(|p| p.key.clone()).unwrap_or_default(),
            proof_point: pp.map(|p| p.short.clone()).unwrap_or_default(),
            pain_hook: if pp.is_some() {
                self.pain.clone()
            } else {
                String::new()
            },
            cta,
        }
    }

    /// Touch 1: the full opening message.
    ///
    /// `ps_other` feeds the email-only P.S.
    pub fn first_touch(
        &self,
        tone: Tone,
        channel: Channel,
        pp: &ProofPoint,
        ps_other: Option<&ProofPoint>,
    ) -> MessageVariant {
        let opener = self.opener(tone);
        let pain = self.pain_clause(tone);
        let proof = self.proof_clause(pp);
        let vp = self.value_prop_sentence(tone);
        let closing = self.closing(tone);
        let sign = self.signoff(tone);

        let ps = ps_line(self.tier, channel, pp, ps_other);
        let build = |extra: &str| {
            let mut body = match tone {
                Tone::Curious => format!(
                    "Hi {},\n\n{}. {}?\n\n{}.{}{} {}\n\n{}",
                    self.first_name, opener, pain, proof, vp, extra, closing, sign
                ),
                _ => format!(
                    "Hi {},\n\n{}. {} - {}.{}{}\n\n{}\n\n{}",
                    self.first_name, opener, pain, proof, vp, extra, closing, sign
                ),
            };
            if let Some(ps) = &ps {
                body.push_str("\n\n");
                body.push_str(ps);
            }
            body
        };
        let body = self.fit_words(1, &self.long_touch_extras(tone), build);
        self.finish(tone, channel, 1, body, opener, Some(pp), self.cta(tone))
    }

    /// Touch 3: short follow-up that points back at the first message.
    pub fn follow_up(&self, tone: Tone, pp: &ProofPoint) -> MessageVariant {
        let proof = self.proof_clause(pp);
        let preempt = preemptive_line(&self.objection, tone)
            .map(|line| format!(" {}", line))
            .unwrap_or_default();
        let closing = self.closing(tone);
        let sign = self.signoff(tone);
        let cta = self.cta(tone);
        let build = |extra: &str| match tone {
            Tone::Friendly => format!(
                "Hi {},\n\nCircling back quick. Thought this might be relevant for {}. {}.{}{}\n\n{}\n\n{}",
                self.first_name, self.company, proof, preempt, extra, closing, sign
            ),
            Tone::Direct => format!(
                "Hi {},\n\nCircling back on my last note. {}.{} {}\n\n{}",
                self.first_name, proof, extra, cta, sign
            ),
            Tone::Curious => format!(
                "Hi {},\n\nCircling back on my earlier note. {}.{}{} {}\n\n{}",
                self.first_name, proof, preempt, extra, closing, sign
            ),
        };

        let mut extras = Vec::new();
        if tone == Tone::Direct {
            extras.extend(preemptive_line(&self.objection, tone));
        }
        extras.push(self.pain_reminder());
        extras.extend(pick_value_prop(self.catalog, self.artifact, tone).map(|vp| {
            format!("{}.", vp.trim().trim_end_matches('.'))
        }));
        extras.push(self.peer_line(tone));
        extras.push(self.company_line());
        let body = self.fit_words(3, &extras, build);
        self.finish(
            tone,
            Channel::Linkedin,
            3,
            body,
            String::new(),
            Some(pp),
            self.cta(tone),
        )
    }

    /// Touch 5: email that acknowledges the channel switch.
    pub fn email(&self, tone: Tone, pp: &ProofPoint, ps_other: Option<&ProofPoint>) -> MessageVariant {
        let opener = self.opener(tone);
        let pain = self.pain_clause(tone);
        let proof = self.proof_clause(pp);
        let vp = self.value_prop_sentence(tone);
        let closing = self.closing(tone);
        let sign = self.signoff(tone);

        let cta = self.cta(tone);
        let ps = ps_line(self.tier, Channel::Email, pp, ps_other);
        let build = |extra: &str| {
            let mut body = match tone {
                Tone::Friendly => format!(
                    "Hi {},\n\nReaching out by email since LinkedIn can get noisy. {}.\n\n{} - {}.{}{}\n\n{}\n\n{}",
                    self.first_name, opener, pain, proof, vp, extra, closing, sign
                ),
                Tone::Direct => format!(
                    "Hi {},\n\nSwitching to email. {}. {}.\n\n{}.{}{} {}\n\n{}",
                    self.first_name, opener, pain, proof, vp, extra, cta, sign
                ),
                Tone::Curious => format!(
                    "Hi {},\n\nTrying email since LinkedIn can be easy to miss. {}. {}?\n\n{}.{}{} {}\n\n{}",
                    self.first_name, opener, pain, proof, vp, extra, closing, sign
                ),
            };
            if let Some(ps) = &ps {
                body.push_str("\n\n");
                body.push_str(ps);
            }
            body
        };
        let body = self.fit_words(5, &self.long_touch_extras(tone), build);
        self.finish(tone, Channel::Email, 5, body, opener, Some(pp), self.cta(tone))
    }

    /// Touch 6: respectful close-out with no pitch at all.
    pub fn breakup(&self, tone: Tone) -> MessageVariant {
        let sign = self.signoff(tone);
        let build = |extra: &str| match tone {
            Tone::Friendly => format!(
                "Hi {},\n\nI've reached out a couple of times and haven't heard back, which is totally fine. \
                 Just wanted to close the loop so I'm not clogging your inbox.\n\n\
                 If the timing's ever right, my door's open.{}\n\n{}",
                self.first_name, extra, sign
            ),
            Tone::Direct => format!(
                "Hi {},\n\nClosing the loop here since I haven't heard back. No reply needed if the timing \
                 isn't right. If testing tooling comes back on the radar later on, happy to pick it up then.{}\n\n{}",
                self.first_name, extra, sign
            ),
            Tone::Curious => format!(
                "Hi {},\n\nFigured I'd close the loop rather than keep pinging you. If priorities shift \
                 down the road and test automation moves up the list, feel free to reach out anytime.{}\n\n{}",
                self.first_name, extra, sign
            ),
        };
        let extras = [
            "Thanks for reading either way.".to_string(),
            "Wishing you a smooth rest of the quarter.".to_string(),
        ];
        let body = self.fit_words(BREAKUP_TOUCH, &extras, build);
        self.finish(tone, Channel::Linkedin, 6, body, String::new(), None, String::new())
    }

    /// Touches 2 and 4: three-line call cheat sheet.
    pub fn call_snippet(&self, tone: Tone, pp: &ProofPoint, touch_number: u8) -> MessageVariant {
        let sender_first = self
            .catalog
            .sender
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();
        let ours = &self.catalog.company;
        let first = &self.first_name;
        let company = &self.company;

        let opener_line = match tone {
            Tone::Friendly => format!(
                "Hey {}, this is {} from {}, calling about your {} work at {}.",
                first, sender_first, ours, self.func, company
            ),
            Tone::Direct => format!(
                "Hi {}, {} from {}. Quick call about {}.",
                first, sender_first, ours, company
            ),
            Tone::Curious => format!(
                "Hey {}, {} from {}, had a question about how {} handles test automation.",
                first, sender_first, ours, company
            ),
        };
        let mark = if tone == Tone::Curious { '?' } else { '.' };
        let pain_line = format!("{}{}", self.pain_clause(tone), mark);
        let bridge_line = format!(
            "We helped {}. Worth 60 seconds to see if it's relevant?",
            pp.short.trim().trim_end_matches('.')
        );
        let body = format!(
            "OPENER: {}\nPAIN: {}\nBRIDGE: {}",
            opener_line, pain_line, bridge_line
        );
        self.finish(
            tone,
            Channel::Phone,
            touch_number,
            body,
            opener_line,
            Some(pp),
            String::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::contains_dash;
    use crate::research::fixtures::{bare_artifact, sarah_artifact, sarah_with_person};

    fn catalog() -> ProductConfig {
        ProductConfig::builtin()
    }

    #[test]
    fn test_first_touch_structure() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Hot);
        let pp = catalog.proof_point("cred_coverage").unwrap();
        let v = composer.first_touch(Tone::Friendly, Channel::Linkedin, pp, None);

        assert!(v.body.starts_with("Hi Sarah,\n\n"));
        assert!(v.body.contains("CRED hit 90% regression automation"));
        assert!(v.body.contains("after a similar switch from Selenium"));
        assert!(v.body.ends_with("Cheers,\nRob Gorham"));
        assert!(!v.body.contains("from CRM field"));
        assert_eq!(v.proof_point_key, "cred_coverage");
        assert_eq!(v.subject_lines.len(), 3);
        assert_eq!(v.char_count, v.body.chars().count());
        assert!(v.opener_evidence.is_grounded());
    }

    #[test]
    fn test_email_first_touch_gets_ps_when_hot() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Hot);
        let pp = catalog.proof_point("cred_coverage").unwrap();
        let other = catalog.proof_point("selenium_maintenance");
        let email = composer.first_touch(Tone::Direct, Channel::Email, pp, other);
        assert!(email.body.contains("\n\nP.S. Teams moving off Selenium"));
        let inmail = composer.first_touch(Tone::Direct, Channel::Linkedin, pp, other);
        assert!(!inmail.body.contains("P.S."));
    }

    #[test]
    fn test_follow_up_references_earlier_touch() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Warm);
        let pp = catalog.proof_point("selenium_maintenance").unwrap();
        for tone in Tone::ALL {
            let v = composer.follow_up(tone, pp);
            assert!(v.body.contains("Circling back"), "{}", v.body);
            assert_eq!(v.touch_number, 3);
        }
    }

    #[test]
    fn test_breakup_never_pitches() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Hot);
        for tone in Tone::ALL {
            let v = composer.breakup(tone);
            assert!(v.proof_point_key.is_empty());
            assert!(!v.body.contains("PayFlow"));
            assert!(!v.body.contains(&catalog.company));
            for pp in &catalog.proof_points {
                assert!(!v.body.contains(&pp.text));
                assert!(!v.body.contains(&pp.short));
            }
            for subject in &v.subject_lines {
                assert!(!subject.contains("PayFlow"));
            }
            assert!((30..=50).contains(&v.word_count), "{} words", v.word_count);
        }
    }

    #[test]
    fn test_call_snippet_has_three_lines() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Hot);
        let pp = catalog.proof_point("medibuddy_scale").unwrap();
        let v = composer.call_snippet(Tone::Friendly, pp, 2);
        let lines: Vec<&str> = v.body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("OPENER: Hey Sarah, this is Rob from Testsigma"));
        assert!(lines[1].starts_with("PAIN: "));
        assert_eq!(
            lines[2],
            "BRIDGE: We helped Medibuddy automate 2,500 tests and halve maintenance. Worth 60 seconds to see if it's relevant?"
        );
        assert!(v.subject_lines.is_empty());
        assert_eq!(v.channel, Channel::Phone);
    }

    #[test]
    fn test_bodies_are_dash_free_for_every_tone() {
        let catalog = catalog();
        for artifact in [sarah_artifact(), bare_artifact()] {
            for tier in [Tier::Hot, Tier::Warm, Tier::Cool, Tier::Cold] {
                let composer = Composer::new(&artifact, &catalog, tier);
                for tone in Tone::ALL {
                    for pp in &catalog.proof_points {
                        let bodies = [
                            composer.first_touch(tone, Channel::Email, pp, None).body,
                            composer.follow_up(tone, pp).body,
                            composer.email(tone, pp, None).body,
                            composer.call_snippet(tone, pp, 4).body,
                        ];
                        for body in bodies {
                            assert!(!contains_dash(&body), "{}", body);
                        }
                    }
                    assert!(!contains_dash(&composer.breakup(tone).body));
                }
            }
        }
    }

    fn assert_in_window(v: &MessageVariant) {
        let (low, high) = word_range(v.touch_number);
        assert!(
            (low..=high).contains(&v.word_count),
            "touch {} {} has {} words (want {}..={}):\n{}",
            v.touch_number,
            v.tone,
            v.word_count,
            low,
            high,
            v.body
        );
        assert!(v.body.matches('?').count() <= 1, "{}", v.body);
    }

    #[test]
    fn test_written_touches_land_in_word_window() {
        let catalog = catalog();
        for artifact in [sarah_artifact(), sarah_with_person(), bare_artifact()] {
            for tier in [Tier::Hot, Tier::Warm, Tier::Cool, Tier::Cold] {
                let composer = Composer::new(&artifact, &catalog, tier);
                for tone in Tone::ALL {
                    for (i, pp) in catalog.proof_points.iter().enumerate() {
                        let other = catalog.proof_points.get((i + 1) % catalog.proof_points.len());
                        assert_in_window(&composer.first_touch(tone, Channel::Linkedin, pp, None));
                        assert_in_window(&composer.first_touch(tone, Channel::Email, pp, other));
                        assert_in_window(&composer.follow_up(tone, pp));
                        assert_in_window(&composer.email(tone, pp, other));
                    }
                    assert_in_window(&composer.breakup(tone));
                }
            }
        }
    }

    #[test]
    fn test_short_direct_follow_up_is_padded_from_catalog() {
        let catalog = catalog();
        let artifact = sarah_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Warm);
        let pp = catalog.proof_point("selenium_maintenance").unwrap();
        let v = composer.follow_up(Tone::Direct, pp);
        assert!(v.body.contains("Figured it was worth one more note on "));
        assert!(v.body.ends_with("how that'd apply to PayFlow?\n\nRob Gorham"), "{}", v.body);
        assert!(v.word_count >= 40);
    }

    #[test]
    fn test_bare_artifact_still_has_grounded_opener() {
        let catalog = catalog();
        let artifact = bare_artifact();
        let composer = Composer::new(&artifact, &catalog, Tier::Cold);
        assert_eq!(composer.opener_evidence(), Evidence::crm_field("title"));
        assert_eq!(composer.pain_hook(), FALLBACK_PAIN);
    }
}
