//! Fitting text to the posting service's length limit.

/// Truncate `text` to at most `limit` characters.
///
/// Preference order: cut at the last sentence boundary if it falls within
/// 70% of the limit; else at the last word boundary within 80% (with an
/// ellipsis); else hard-truncate with an ellipsis. Short text passes through
/// trimmed and untouched.
pub fn fit_to_limit(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= limit {
        return trimmed.to_string();
    }

    let window = &chars[..limit];

    let sentence_floor = (limit * 7) / 10;
    if let Some(pos) = window.iter().rposition(|c| matches!(c, '.' | '!' | '?'))
        && pos + 1 >= sentence_floor
    {
        let cut: String = window[..=pos].iter().collect();
        return cut.trim_end().to_string();
    }

    // Reserve one character for the ellipsis from here on
    let head = &chars[..limit - 1];

    let word_floor = (limit * 8) / 10;
    if let Some(pos) = head.iter().rposition(|c| c.is_whitespace())
        && pos >= word_floor
    {
        let mut cut: String = head[..pos].iter().collect();
        cut.push('…');
        return cut;
    }

    let mut cut: String = head.iter().collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(fit_to_limit("  a small thought  ", 280), "a small thought");
    }

    #[test]
    fn cuts_at_sentence_boundary_in_upper_window() {
        // The '.' lands at 70%+ of the limit, so the cut ends the sentence
        let text = "The tide keeps its own ledger of the shore. And nobody audits it, ever, at all.";
        let out = fit_to_limit(text, 60);
        assert_eq!(out, "The tide keeps its own ledger of the shore.");
    }

    #[test]
    fn cuts_at_word_boundary_when_no_late_sentence_end() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let out = fit_to_limit(text, 40);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() <= 40);
        // Never cuts a word in half
        let body = out.trim_end_matches('…');
        assert!(text.contains(body));
        assert!(body.ends_with("seven"));
    }

    #[test]
    fn hard_truncates_unbroken_text() {
        let text = "x".repeat(100);
        let out = fit_to_limit(&text, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn early_sentence_end_does_not_win() {
        // '.' at ~20% of the limit is ignored in favor of a word cut
        let text = "Ha. and then a long unbroken stream of words continues well past the limit here";
        let out = fit_to_limit(text, 60);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() > 20);
    }

    #[test]
    fn result_never_exceeds_limit() {
        for limit in [10, 40, 120, 280] {
            let text = "word ".repeat(200);
            assert!(fit_to_limit(&text, limit).chars().count() <= limit);
        }
    }
}
