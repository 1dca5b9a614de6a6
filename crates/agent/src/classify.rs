//! Thought classification — a pure keyword-priority scan.
//!
//! Categories are checked in a fixed priority order (reflection > decision >
//! curiosity > achievement) and the first category with a hit wins.
//! Anything that matches nothing stays a plain thought.

use driftmind_core::RecordKind;

const REFLECTION_KEYWORDS: [&str; 5] = [
    "i realize",
    "looking back",
    "in retrospect",
    "i've learned",
    "i keep coming back",
];

const DECISION_KEYWORDS: [&str; 5] = [
    "i will",
    "i've decided",
    "i choose",
    "my plan",
    "i'm going to",
];

const CURIOSITY_KEYWORDS: [&str; 5] = [
    "i wonder",
    "curious",
    "what if",
    "intrigued",
    "i'd love to know",
];

const ACHIEVEMENT_KEYWORDS: [&str; 5] = [
    "i completed",
    "i finished",
    "i made",
    "accomplished",
    "it works",
];

/// Classify a thought by its text alone.
pub fn classify_thought(text: &str) -> RecordKind {
    let lower = text.to_lowercase();
    let hits = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if hits(&REFLECTION_KEYWORDS) {
        RecordKind::Reflection
    } else if hits(&DECISION_KEYWORDS) {
        RecordKind::Decision
    } else if hits(&CURIOSITY_KEYWORDS) {
        RecordKind::Curiosity
    } else if hits(&ACHIEVEMENT_KEYWORDS) {
        RecordKind::Achievement
    } else {
        RecordKind::Thought
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wondering_is_curiosity() {
        assert_eq!(classify_thought("I wonder what's next"), RecordKind::Curiosity);
    }

    #[test]
    fn completion_is_achievement() {
        assert_eq!(classify_thought("I completed the task"), RecordKind::Achievement);
    }

    #[test]
    fn plain_text_stays_a_thought() {
        assert_eq!(
            classify_thought("the rain kept a steady rhythm on the window"),
            RecordKind::Thought
        );
    }

    #[test]
    fn reflection_outranks_the_other_categories() {
        // Carries both reflection and achievement markers; reflection wins
        assert_eq!(
            classify_thought("Looking back, I finished more than I expected"),
            RecordKind::Reflection
        );
    }

    #[test]
    fn decision_outranks_curiosity() {
        assert_eq!(
            classify_thought("I've decided to explore the archive, though I'm curious where it leads"),
            RecordKind::Decision
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_thought("I WONDER ABOUT CLOUDS"), RecordKind::Curiosity);
    }
}
