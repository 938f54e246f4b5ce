//! Sentiment label normalization
//!
//! Pure mapping of free-text sentiment labels to a fixed vocabulary. No I/O,
//! no failure mode.

/// Canonical label for positive sentiment
pub const POSITIVE: &str = "Positive";
/// Canonical label for negative sentiment
pub const NEGATIVE: &str = "Negative";
/// Canonical label for neutral sentiment
pub const NEUTRAL: &str = "Neutral";

/// Normalize a sentiment label.
///
/// Absent or blank input stays absent. A case-insensitive `pos`/`neg`/`neu`
/// prefix maps to the canonical vocabulary; anything else is kept, trimmed
/// and title-cased, so unrecognized labels survive with consistent casing.
pub fn normalize_sentiment(label: Option<&str>) -> Option<String> {
    let trimmed = label?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("pos") {
        return Some(POSITIVE.to_string());
    }
    if lowered.starts_with("neg") {
        return Some(NEGATIVE.to_string());
    }
    if lowered.starts_with("neu") {
        return Some(NEUTRAL.to_string());
    }

    Some(title_case(trimmed))
}

/// Title-case every alphabetic run: uppercase initial, lowercased remainder.
/// Non-alphabetic characters pass through and start a new run.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_run_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_run_start {
                out.extend(ch.to_uppercase());
                at_run_start = false;
            } else {
                out.extend(ch.to_lowercase());
            }
        } else {
            out.push(ch);
            at_run_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_prefixes() {
        assert_eq!(normalize_sentiment(Some("POSITIVE")).as_deref(), Some("Positive"));
        assert_eq!(normalize_sentiment(Some("negative ")).as_deref(), Some("Negative"));
        assert_eq!(normalize_sentiment(Some("Neu")).as_deref(), Some("Neutral"));
        assert_eq!(normalize_sentiment(Some("pos")).as_deref(), Some("Positive"));
        assert_eq!(normalize_sentiment(Some("  neg")).as_deref(), Some("Negative"));
    }

    #[test]
    fn test_absent_and_blank_stay_absent() {
        assert_eq!(normalize_sentiment(None), None);
        assert_eq!(normalize_sentiment(Some("")), None);
        assert_eq!(normalize_sentiment(Some("   ")), None);
    }

    #[test]
    fn test_unrecognized_labels_are_title_cased() {
        assert_eq!(normalize_sentiment(Some("Mixed")).as_deref(), Some("Mixed"));
        assert_eq!(
            normalize_sentiment(Some(" mixed result ")).as_deref(),
            Some("Mixed Result")
        );
        assert_eq!(normalize_sentiment(Some("ANGRY")).as_deref(), Some("Angry"));
        assert_eq!(
            normalize_sentiment(Some("very-happy")).as_deref(),
            Some("Very-Happy")
        );
    }

    #[test]
    fn test_prefix_match_beats_title_case_fallback() {
        // "neutral-ish" starts with "neu", so it collapses to the vocabulary
        assert_eq!(
            normalize_sentiment(Some("neutral-ish")).as_deref(),
            Some("Neutral")
        );
    }
}
