use chrono::NaiveDate;
use log::warn;

use crate::store::json_store::JsonStore;
use crate::store::schema::ProgressData;

pub struct LevelRank {
    pub level: u32,
    pub name: &'static str,
    pub exp_required: u32,
}

pub const RANKS: [LevelRank; 10] = [
    LevelRank { level: 1, name: "Beginner", exp_required: 0 },
    LevelRank { level: 2, name: "Learner", exp_required: 100 },
    LevelRank { level: 3, name: "Student", exp_required: 300 },
    LevelRank { level: 4, name: "Scholar", exp_required: 600 },
    LevelRank { level: 5, name: "Expert", exp_required: 1000 },
    LevelRank { level: 6, name: "Master", exp_required: 1500 },
    LevelRank { level: 7, name: "Champion", exp_required: 2100 },
    LevelRank { level: 8, name: "Legend", exp_required: 2800 },
    LevelRank { level: 9, name: "Mythic", exp_required: 3600 },
    LevelRank { level: 10, name: "Transcendent", exp_required: 4500 },
];

const MAX_LEVEL: u32 = 10;

/// Experience accumulator with a fixed ascending threshold table. The stored
/// level only ever moves up: recomputing a lower level from exp (stale file,
/// edited thresholds) never demotes the player.
pub struct LevelSystem {
    data: ProgressData,
    store: JsonStore,
}

impl LevelSystem {
    pub fn load(store: JsonStore) -> Self {
        let mut data = store.load_progress();
        // A hand-edited file can carry a level outside the table.
        data.level = data.level.clamp(1, MAX_LEVEL);
        Self { data, store }
    }

    /// Add experience and return `Some(new_level)` on a level-up. Persists on
    /// level-up; plain exp gains ride along with the next save.
    pub fn add_exp(&mut self, amount: u32) -> Option<u32> {
        self.data.exp += amount;
        let earned = RANKS
            .iter()
            .rev()
            .find(|rank| self.data.exp >= rank.exp_required)
            .map_or(1, |rank| rank.level);
        if earned > self.data.level {
            self.data.level = earned;
            self.save();
            Some(earned)
        } else {
            None
        }
    }

    /// One exp per correctly typed character.
    pub fn add_exp_for_char(&mut self) -> Option<u32> {
        self.add_exp(1)
    }

    /// A completed sentence: 15 exp when typed perfectly, 10 otherwise.
    pub fn add_exp_for_sentence(&mut self, perfect: bool, words: u32) -> Option<u32> {
        self.data.total_sentences += 1;
        self.data.total_words += words;
        let result = self.add_exp(if perfect { 15 } else { 10 });
        self.save();
        result
    }

    pub fn add_exp_for_level(&mut self) -> Option<u32> {
        self.data.total_levels += 1;
        let result = self.add_exp(50);
        self.save();
        result
    }

    pub fn add_exp_for_combo(&mut self, combo: u32) -> Option<u32> {
        self.add_exp(combo / 2)
    }

    /// Advance the practice-day streak: unchanged for a repeat day, +1 when
    /// the previous practice day was yesterday, otherwise back to 1. Returns
    /// the current streak length.
    pub fn record_practice_day(&mut self, today: NaiveDate) -> u32 {
        match self.data.last_practice_date {
            Some(last) if last == today => return self.data.streak_days,
            Some(last) if today.signed_duration_since(last).num_days() == 1 => {
                self.data.streak_days += 1;
            }
            _ => self.data.streak_days = 1,
        }
        self.data.best_streak = self.data.best_streak.max(self.data.streak_days);
        self.data.last_practice_date = Some(today);
        self.save();
        self.data.streak_days
    }

    pub fn level(&self) -> u32 {
        self.data.level
    }

    pub fn exp(&self) -> u32 {
        self.data.exp
    }

    pub fn streak_days(&self) -> u32 {
        self.data.streak_days
    }

    pub fn rank_name(&self) -> &'static str {
        RANKS
            .iter()
            .find(|rank| rank.level == self.data.level)
            .map_or(RANKS[0].name, |rank| rank.name)
    }

    pub fn totals(&self) -> (u32, u32, u32) {
        (
            self.data.total_words,
            self.data.total_sentences,
            self.data.total_levels,
        )
    }

    /// Percentage progress into the current level, clamped to 100. Always 100
    /// at the level cap.
    pub fn progress_to_next(&self) -> f64 {
        if self.data.level >= MAX_LEVEL {
            return 100.0;
        }
        let current_req = RANKS[(self.data.level - 1) as usize].exp_required;
        let next_req = RANKS[self.data.level as usize].exp_required;
        let gained = f64::from(self.data.exp.saturating_sub(current_req));
        let needed = f64::from(next_req - current_req);
        (gained / needed * 100.0).min(100.0)
    }

    pub fn exp_to_next(&self) -> u32 {
        if self.data.level >= MAX_LEVEL {
            return 0;
        }
        let next_req = RANKS[self.data.level as usize].exp_required;
        next_req.saturating_sub(self.data.exp)
    }

    fn save(&self) {
        if let Err(e) = self.store.save_progress(&self.data) {
            warn!("failed to save progress: {e}");
        }
    }
}
