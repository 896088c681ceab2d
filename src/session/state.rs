use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharOutcome {
    Hit,
    Miss,
}

/// Per-keystroke matcher state for one level attempt.
///
/// Counters accumulate across the sentences of a level and reset when the
/// level restarts; `input` holds only the current sentence attempt. Every
/// append adds one to `total_chars`, every backspace removes one (floor
/// zero).
pub struct SessionState {
    pub lesson_index: usize,
    pub sentence_index: usize,
    target: Vec<char>,
    input: Vec<char>,
    started_at: Instant,
    pub correct_chars: usize,
    pub total_chars: usize,
    pub errors: usize,
    pub score: u32,
}

impl SessionState {
    pub fn new(lesson_index: usize, target: &str, carried_score: u32) -> Self {
        Self {
            lesson_index,
            sentence_index: 0,
            target: target.chars().collect(),
            input: Vec::new(),
            started_at: Instant::now(),
            correct_chars: 0,
            total_chars: 0,
            errors: 0,
            score: carried_score,
        }
    }

    /// Load the next target sentence and restart the per-sentence clock.
    /// Level-scoped counters (correct/total/errors/score) carry over.
    pub fn begin_sentence(&mut self, sentence_index: usize, target: &str) {
        self.sentence_index = sentence_index;
        self.target = target.chars().collect();
        self.input.clear();
        self.started_at = Instant::now();
    }

    pub fn type_char(&mut self, ch: char) -> CharOutcome {
        self.input.push(ch);
        self.total_chars += 1;
        let idx = self.input.len() - 1;
        // Past the end of the target counts as a mismatch.
        if self.target.get(idx) == Some(&ch) {
            self.correct_chars += 1;
            CharOutcome::Hit
        } else {
            self.errors += 1;
            CharOutcome::Miss
        }
    }

    pub fn backspace(&mut self) {
        let Some(removed) = self.input.pop() else {
            return;
        };
        self.total_chars = self.total_chars.saturating_sub(1);
        let idx = self.input.len();
        if self.target.get(idx) != Some(&removed) {
            self.errors = self.errors.saturating_sub(1);
        }
        self.correct_chars = self.correct_chars.min(self.input.len());
    }

    /// Exact-equality check for Enter. A rejected submission counts one error;
    /// the caller resets the combo and leaves the input in place.
    pub fn submit(&mut self) -> bool {
        if self.input == self.target {
            true
        } else {
            self.errors += 1;
            false
        }
    }

    /// Percentage of typed characters that matched, truncated. 100 when
    /// nothing has been typed yet.
    pub fn accuracy(&self) -> u32 {
        if self.total_chars == 0 {
            return 100;
        }
        (self.correct_chars * 100 / self.total_chars) as u32
    }

    /// Characters per minute over the current sentence, truncated. 0 while no
    /// time has elapsed.
    pub fn speed(&self) -> u32 {
        let elapsed = self.elapsed_secs();
        if elapsed <= 0.0 {
            return 0;
        }
        (self.input.len() as f64 / elapsed * 60.0) as u32
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn input_str(&self) -> String {
        self.input.iter().collect()
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    /// Pretend the sentence started `secs` earlier, for deadline tests.
    #[cfg(test)]
    pub fn age_clock(&mut self, secs: u64) {
        self.started_at -= std::time::Duration::from_secs(secs);
    }
}
