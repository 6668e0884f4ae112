//! Closing elements: CTA, softener, signoff and P.S.

use super::{Channel, Tone};
use crate::config::ProofPoint;
use crate::scoring::Tier;

/// A CTA that flows from the proof point just cited.
///
/// Hot leads get a concrete time-boxed ask; cold leads a passive mention.
pub fn connected_cta(
    tier: Tier,
    tone: Tone,
    strategic: bool,
    company: &str,
    competitor: Option<&str>,
) -> String {
    match (tier, tone) {
        (Tier::Hot, Tone::Friendly) => match competitor {
            Some(tool) => format!(
                "Happy to show you what that'd look like against your {} setup, 15 minutes tops.",
                tool
            ),
            None => format!(
                "Happy to show you what that'd look like for {}, 15 minutes tops.",
                company
            ),
        },
        (Tier::Hot, Tone::Direct) if strategic => {
            format!("Open to 15 minutes this week on how that maps to {}?", company)
        }
        (Tier::Hot, Tone::Direct) => match competitor {
            Some(tool) => format!("Open to 15 minutes comparing that to your {} setup?", tool),
            None => format!("Open to 15 minutes on how that'd work for {}?", company),
        },
        (Tier::Hot, Tone::Curious) => format!(
            "Curious if you'd see similar results at {}, happy to walk through it in 15 minutes.",
            company
        ),

        (Tier::Warm, Tone::Friendly) => match competitor {
            Some(tool) => format!(
                "If that resonates, happy to walk through how it'd compare to your {} setup.",
                tool
            ),
            None => format!(
                "If that resonates, happy to walk through how it'd map to {}.",
                company
            ),
        },
        (Tier::Warm, Tone::Direct) if strategic => {
            format!("Worth a conversation about how that'd apply to {}?", company)
        }
        (Tier::Warm, Tone::Direct) => match competitor {
            Some(tool) => format!("Worth a side-by-side comparison against {}?", tool),
            None => format!("Worth exploring if that fits {}?", company),
        },
        (Tier::Warm, Tone::Curious) => format!(
            "Curious if you're running into something similar at {}.",
            company
        ),

        (Tier::Cool, Tone::Friendly) => format!(
            "If any of that's relevant to {}, happy to share more.",
            company
        ),
        (Tier::Cool, Tone::Direct) => "Happy to share more if useful.".to_string(),
        (Tier::Cool, Tone::Curious) => "Curious if this is even on your radar.".to_string(),

        (Tier::Cold, _) => "Figured I'd flag it in case it's helpful down the road.".to_string(),
    }
}

/// Easy-out after the CTA. Direct tone never softens.
pub fn soft_ask(tier: Tier, tone: Tone) -> Option<&'static str> {
    match (tier, tone) {
        (_, Tone::Direct) => None,
        (Tier::Hot, Tone::Friendly) => None,
        (Tier::Hot, _) => Some("Either way, appreciate the read."),
        (Tier::Warm, Tone::Friendly) => Some("No worries if the timing's off."),
        (Tier::Warm, _) => Some("No pressure either way."),
        (_, Tone::Friendly) => Some("Either way, no worries at all."),
        _ => Some("No pressure at all."),
    }
}

/// Tone-specific signoff.
pub fn signoff(tone: Tone, sender: &str) -> String {
    match tone {
        Tone::Friendly => format!("Cheers,\n{}", sender),
        Tone::Direct => sender.to_string(),
        Tone::Curious => format!("Best,\n{}", sender),
    }
}

/// Email-only P.S. for hot and warm leads citing a second, unused proof point.
pub fn ps_line(
    tier: Tier,
    channel: Channel,
    used: &ProofPoint,
    other: Option<&ProofPoint>,
) -> Option<String> {
    if channel != Channel::Email || !tier.is_engaged() {
        return None;
    }
    let other = other.filter(|o| o.key != used.key)?;
    Some(match tier {
        Tier::Hot => format!("P.S. {}.", other.text.trim_end_matches('.')),
        _ => format!(
            "P.S. {}, happy to share the full story if relevant.",
            other.text.trim_end_matches('.')
        ),
    })
}

pub(crate) fn cta_line(cta: &str, soft: Option<&str>) -> String {
    match soft {
        Some(soft) => format!("{} {}", cta, soft),
        None => cta.to_string(),
    }
}
