/// Base points per character of a completed sentence.
pub const SCORE_PER_CORRECT_CHAR: u32 = 10;
/// Flat bonus added when the last sentence of a lesson is completed.
pub const LEVEL_COMPLETION_BONUS: u32 = 100;
/// Per-lesson score bonus scale: lesson N contributes (N+1) * this.
pub const LEVEL_NUMBER_MULTIPLIER: u32 = 50;
/// Speed bonus cap in points.
pub const SPEED_BONUS_CAP: f64 = 50.0;
/// Wall-clock limit per sentence before the run fails.
pub const TIME_LIMIT_PER_SENTENCE: u64 = 30;
/// Display threshold only; errors beyond it are shown as a warning.
pub const MAX_ERRORS_PER_LEVEL: usize = 5;
/// Accuracy shown in green at or above this value.
pub const MIN_ACCURACY_FOR_PASS: u32 = 80;

/// Points awarded for one accepted sentence:
/// floor(base + accuracy bonus + speed bonus + lesson bonus), scaled by the
/// max-combo multiplier and truncated.
pub fn sentence_score(
    sentence_len: usize,
    accuracy: u32,
    speed: u32,
    lesson_index: usize,
    max_combo: u32,
) -> u32 {
    let base = sentence_len as f64 * f64::from(SCORE_PER_CORRECT_CHAR);
    let accuracy_bonus = base * f64::from(accuracy) / 100.0;
    let speed_bonus = (f64::from(speed) / 10.0).min(SPEED_BONUS_CAP);
    let level_bonus = f64::from((lesson_index as u32 + 1) * LEVEL_NUMBER_MULTIPLIER);
    let multiplier = 1.0 + f64::from(max_combo.min(20)) * 0.05;
    ((base + accuracy_bonus + speed_bonus + level_bonus).floor() * multiplier) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_short_sentence_scores_both_bonuses() {
        // "Yes, it is." = 11 chars, 100% accuracy, 120 cpm, first lesson, no combo.
        // base 110 + accuracy 110 + speed 12 + level 50 = 282.
        assert_eq!(sentence_score(11, 100, 120, 0, 0), 282);
    }

    #[test]
    fn speed_bonus_is_capped() {
        let slow = sentence_score(10, 100, 500, 0, 0);
        let fast = sentence_score(10, 100, 5000, 0, 0);
        assert_eq!(slow, fast);
    }

    #[test]
    fn max_combo_doubles_at_20() {
        let flat = sentence_score(10, 100, 0, 0, 0);
        let combo = sentence_score(10, 100, 0, 0, 20);
        assert_eq!(combo, flat * 2);
        // Cap: more combo adds nothing further.
        assert_eq!(sentence_score(10, 100, 0, 0, 50), combo);
    }

    #[test]
    fn later_lessons_are_worth_more() {
        assert!(sentence_score(10, 100, 0, 4, 0) > sentence_score(10, 100, 0, 0, 0));
        assert_eq!(
            sentence_score(10, 100, 0, 1, 0) - sentence_score(10, 100, 0, 0, 0),
            LEVEL_NUMBER_MULTIPLIER
        );
    }

    #[test]
    fn zero_accuracy_still_scores_base() {
        // A sentence can only be submitted when it finally matches, so the
        // base and level bonuses apply even after many corrected mistakes.
        assert_eq!(sentence_score(10, 0, 0, 0, 0), 150);
    }
}
