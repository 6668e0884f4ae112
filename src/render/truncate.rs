//! Channel-limit truncation.

const ELLIPSIS: &str = "...";
/// A word boundary is used only if it keeps at least this share of the limit.
const MIN_BOUNDARY_RATIO: f64 = 0.6;

fn strip_dashes(text: &str) -> String {
    text.replace(['\u{2014}', '\u{2013}'], "-")
}

/// Fit `text` within `limit` characters.
///
/// Short text comes back unchanged. Longer text is cut at the last space
/// when that space sits at or past 60% of the limit, otherwise at the
/// limit itself; trailing punctuation is dropped and `...` appended.
pub fn truncate_to_limit(text: &str, limit: usize) -> String {
    let text = strip_dashes(text);
    if text.chars().count() <= limit {
        return text;
    }
    if limit <= ELLIPSIS.len() {
        return text.chars().take(limit).collect();
    }

    let budget = limit - ELLIPSIS.len();
    let prefix: String = text.chars().take(budget).collect();
    let min_boundary = (limit as f64 * MIN_BOUNDARY_RATIO).ceil() as usize;

    let cut = prefix
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(byte, _)| byte)
        .last()
        .filter(|byte| prefix[..*byte].chars().count() >= min_boundary);

    let head = match cut {
        Some(byte) => &prefix[..byte],
        None => prefix.as_str(),
    };
    let head = head.trim_end_matches(|c: char| c.is_whitespace() || ",;:.-!?".contains(c));
    format!("{}{}", head, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(truncate_to_limit("Short.", 100), "Short.");
        let exact = "a".repeat(20);
        assert_eq!(truncate_to_limit(&exact, 20), exact);
    }

    #[test]
    fn test_cuts_at_word_boundary() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let out = truncate_to_limit(text, 30);
        assert!(out.chars().count() <= 30);
        assert!(out.ends_with("..."));
        let head = out.trim_end_matches("...");
        assert!(text.starts_with(head));
        // The cut lands on a word end.
        assert_eq!(text.as_bytes()[head.len()], b' ');
    }

    #[test]
    fn test_falls_back_to_hard_cut_without_late_space() {
        let text = format!("ab {}", "x".repeat(40));
        let out = truncate_to_limit(&text, 20);
        assert_eq!(out.chars().count(), 20);
        assert!(out.starts_with("ab xxxx"));
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        let text = "First sentence here, second clause goes on and on for a while";
        let out = truncate_to_limit(text, 24);
        assert_eq!(out, "First sentence here...");
    }

    #[test]
    fn test_idempotent() {
        let text = "Keeping Selenium suites stable while shipping fast is a grind most teams know";
        let once = truncate_to_limit(text, 40);
        assert_eq!(truncate_to_limit(&once, 40), once);
    }

    #[test]
    fn test_dashes_never_survive() {
        let text = "Fast \u{2014} reliable \u{2013} cheap and a lot more words after that";
        for limit in [10, 25, 200] {
            let out = truncate_to_limit(text, limit);
            assert!(!out.contains('\u{2014}') && !out.contains('\u{2013}'));
            assert!(out.chars().count() <= limit);
        }
    }

    #[test]
    fn test_tiny_limit() {
        assert_eq!(truncate_to_limit("abcdef", 2), "ab");
    }
}
