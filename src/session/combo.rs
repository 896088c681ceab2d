/// Streak of consecutive correct keystrokes. Any mistake, including a
/// rejected submission, drops the live streak to zero; the session high-water
/// mark is kept for the end-of-sentence multiplier.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComboTracker {
    pub combo: u32,
    pub max_combo: u32,
}

impl ComboTracker {
    pub fn record_hit(&mut self) -> u32 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.combo
    }

    pub fn record_miss(&mut self) {
        self.combo = 0;
    }

    /// Immediate score bonus for a correct character, capped at 20.
    pub fn char_bonus(&self) -> u32 {
        self.combo.min(20)
    }

    /// Sentence-completion multiplier, driven by the high-water mark rather
    /// than the live streak.
    pub fn multiplier(&self) -> f64 {
        1.0 + f64::from(self.max_combo.min(20)) * 0.05
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
