use chrono::{DateTime, Datelike, Local, NaiveDate};
use log::warn;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::store::json_store::JsonStore;
use crate::store::schema::{ChallengeProgress, DailyData, TodayChallenge};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Chars,
    Words,
    Sentences,
    Combo,
    Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reward {
    pub tier: Tier,
    pub exp: u32,
    pub score_multiplier: f64,
}

impl Reward {
    fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Bronze => Reward { tier, exp: 50, score_multiplier: 1.2 },
            Tier::Silver => Reward { tier, exp: 75, score_multiplier: 1.35 },
            Tier::Gold => Reward { tier, exp: 100, score_multiplier: 1.5 },
        }
    }
}

pub struct ChallengeDef {
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub time_limit: u64,
    pub goal_type: GoalType,
    /// Bronze, silver, gold thresholds in ascending order.
    pub goals: [u32; 3],
}

pub const CHALLENGES: [ChallengeDef; 5] = [
    ChallengeDef {
        kind: "speed",
        name: "Speed Challenge",
        description: "Type as many characters as possible in 30 seconds",
        icon: "⚡",
        time_limit: 30,
        goal_type: GoalType::Chars,
        goals: [50, 80, 120],
    },
    ChallengeDef {
        kind: "accuracy",
        name: "Accuracy Challenge",
        description: "Complete 5 sentences with 100% accuracy",
        icon: "🎯",
        time_limit: 180,
        goal_type: GoalType::Sentences,
        goals: [3, 4, 5],
    },
    ChallengeDef {
        kind: "combo",
        name: "Combo Challenge",
        description: "Reach a 30x combo streak",
        icon: "🔥",
        time_limit: 120,
        goal_type: GoalType::Combo,
        goals: [15, 25, 30],
    },
    ChallengeDef {
        kind: "marathon",
        name: "Word Marathon",
        description: "Type 100 words correctly",
        icon: "🏃",
        time_limit: 300,
        goal_type: GoalType::Words,
        goals: [50, 75, 100],
    },
    ChallengeDef {
        kind: "endurance",
        name: "Endurance Test",
        description: "Type continuously for 5 minutes",
        icon: "💪",
        time_limit: 300,
        goal_type: GoalType::Time,
        goals: [180, 240, 300],
    },
];

fn find_def(kind: &str) -> Option<&'static ChallengeDef> {
    CHALLENGES.iter().find(|def| def.kind == kind)
}

/// Pick the challenge for a calendar date. The draw runs on its own RNG
/// seeded from the date ordinal, so it is stable per day and never perturbs
/// randomness anywhere else in the program.
fn challenge_for_date(date: NaiveDate) -> &'static ChallengeDef {
    let seed = date.num_days_from_ce().max(0) as u64;
    let mut rng = SmallRng::seed_from_u64(seed);
    &CHALLENGES[rng.gen_range(0..CHALLENGES.len())]
}

/// Daily challenge state machine: idle until started, accumulating while
/// active, terminal once completed. The whole record resets the first time it
/// is touched on a new calendar day.
pub struct DailyChallengeEngine {
    data: DailyData,
    store: JsonStore,
}

impl DailyChallengeEngine {
    pub fn load(store: JsonStore) -> Self {
        let mut engine = Self {
            data: store.load_daily(),
            store,
        };
        engine.ensure_today(Local::now().date_naive());
        engine
    }

    fn ensure_today(&mut self, today: NaiveDate) {
        let stale = match &self.data.today_challenge {
            Some(tc) => tc.date != today || find_def(&tc.kind).is_none(),
            None => true,
        };
        if stale {
            let def = challenge_for_date(today);
            self.data = DailyData {
                today_challenge: Some(TodayChallenge {
                    date: today,
                    kind: def.kind.to_string(),
                }),
                challenge_progress: ChallengeProgress::default(),
                completed_today: false,
                reward_tier: None,
            };
            self.save();
        }
    }

    pub fn challenge(&mut self) -> &'static ChallengeDef {
        self.ensure_today(Local::now().date_naive());
        self.current_def()
    }

    /// Read-only view of the current challenge; may be a day stale until the
    /// next `refresh` or mutating call.
    pub fn peek_challenge(&self) -> &'static ChallengeDef {
        self.current_def()
    }

    /// Roll the record over if the calendar date has changed.
    pub fn refresh(&mut self) {
        self.ensure_today(Local::now().date_naive());
    }

    fn current_def(&self) -> &'static ChallengeDef {
        self.data
            .today_challenge
            .as_ref()
            .and_then(|tc| find_def(&tc.kind))
            .unwrap_or(&CHALLENGES[0])
    }

    /// Begin accumulating progress. Starting twice keeps the original start
    /// timestamp.
    pub fn start_challenge(&mut self) {
        self.start_challenge_at(Local::now());
    }

    fn start_challenge_at(&mut self, now: DateTime<Local>) {
        self.ensure_today(now.date_naive());
        if self.data.challenge_progress.started {
            return;
        }
        self.data.challenge_progress.started = true;
        self.data.challenge_progress.start_time = Some(now);
        self.save();
    }

    /// Fold a batch of session deltas into today's progress and evaluate
    /// completion. Ignored entirely before `start_challenge` and after the
    /// day's outcome is decided.
    pub fn update_progress(
        &mut self,
        chars: u32,
        words: u32,
        sentences: u32,
        combo: u32,
        errors: u32,
    ) -> Option<Reward> {
        self.update_progress_at(Local::now(), chars, words, sentences, combo, errors)
    }

    fn update_progress_at(
        &mut self,
        now: DateTime<Local>,
        chars: u32,
        words: u32,
        sentences: u32,
        combo: u32,
        errors: u32,
    ) -> Option<Reward> {
        self.ensure_today(now.date_naive());
        if !self.data.challenge_progress.started || self.data.completed_today {
            return None;
        }

        let progress = &mut self.data.challenge_progress;
        progress.chars += chars;
        progress.words += words;
        progress.sentences += sentences;
        progress.errors += errors;
        progress.max_combo = progress.max_combo.max(combo);
        if let Some(start) = progress.start_time {
            progress.time = now.signed_duration_since(start).as_seconds_f64();
        }

        let result = self.check_completion();
        self.save();
        result
    }

    fn check_completion(&mut self) -> Option<Reward> {
        let def = self.current_def();
        let progress = &self.data.challenge_progress;
        let elapsed = progress.time;

        if elapsed > def.time_limit as f64 {
            // Time is up: settle the day at the highest tier reached, or none.
            let metric = self.metric_value(def);
            let tier = if metric >= f64::from(def.goals[2]) {
                Some(Tier::Gold)
            } else if metric >= f64::from(def.goals[1]) {
                Some(Tier::Silver)
            } else if metric >= f64::from(def.goals[0]) {
                Some(Tier::Bronze)
            } else {
                None
            };
            self.data.completed_today = true;
            self.data.reward_tier = tier;
            return tier.map(Reward::for_tier);
        }

        // Within the limit only a gold finish ends the challenge early.
        let metric = self.metric_value(def);
        if metric >= f64::from(def.goals[2]) {
            self.data.completed_today = true;
            self.data.reward_tier = Some(Tier::Gold);
            return Some(Reward::for_tier(Tier::Gold));
        }
        None
    }

    /// Current value of the goal metric. Accuracy challenges only count
    /// sentences while the error tally is still zero.
    fn metric_value(&self, def: &ChallengeDef) -> f64 {
        let progress = &self.data.challenge_progress;
        match def.goal_type {
            GoalType::Chars => f64::from(progress.chars),
            GoalType::Words => f64::from(progress.words),
            GoalType::Sentences => {
                if progress.errors > 0 {
                    0.0
                } else {
                    f64::from(progress.sentences)
                }
            }
            GoalType::Combo => f64::from(progress.max_combo),
            GoalType::Time => progress.time,
        }
    }

    pub fn progress(&self) -> &ChallengeProgress {
        &self.data.challenge_progress
    }

    pub fn completed_today(&self) -> bool {
        self.data.completed_today
    }

    pub fn reward_tier(&self) -> Option<Tier> {
        self.data.reward_tier
    }

    pub fn is_active(&self) -> bool {
        self.data.challenge_progress.started
            && !self.data.completed_today
            && self.data.challenge_progress.time < self.current_def().time_limit as f64
    }

    /// Progress toward gold and seconds remaining, for the status line.
    pub fn status(&self) -> (f64, f64) {
        let def = self.current_def();
        let toward_gold =
            (self.metric_value(def) / f64::from(def.goals[2]) * 100.0).min(100.0);
        let remaining = (def.time_limit as f64 - self.data.challenge_progress.time).max(0.0);
        (toward_gold, remaining)
    }

    fn save(&self) {
        if let Err(e) = self.store.save_daily(&self.data) {
            warn!("failed to save daily challenge: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use tempfile::TempDir;

    fn make_engine() -> (TempDir, DailyChallengeEngine) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, DailyChallengeEngine::load(store))
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(date: NaiveDate, secs: u32) -> DateTime<Local> {
        let naive = date.and_hms_opt(9, 0, 0).unwrap() + chrono::Duration::seconds(secs.into());
        Local.from_local_datetime(&naive).unwrap()
    }

    /// Force a specific challenge kind by walking dates until the draw lands
    /// on it. The catalog has 5 entries, so a handful of days always hits.
    fn date_with_kind(kind: &str) -> NaiveDate {
        let mut date = day("2026-08-01");
        for _ in 0..60 {
            if challenge_for_date(date).kind == kind {
                return date;
            }
            date += chrono::Duration::days(1);
        }
        panic!("no date draws challenge kind {kind}");
    }

    fn engine_on(date: NaiveDate) -> (TempDir, DailyChallengeEngine) {
        let (dir, mut engine) = make_engine();
        engine.ensure_today(date);
        (dir, engine)
    }

    #[test]
    fn selection_is_deterministic_per_date() {
        let date = day("2026-08-07");
        let first = challenge_for_date(date).kind;
        for _ in 0..10 {
            assert_eq!(challenge_for_date(date).kind, first);
        }
        // Two independently constructed engines agree.
        let (_d1, mut e1) = engine_on(date);
        let (_d2, mut e2) = engine_on(date);
        assert_eq!(e1.challenge().kind, e2.challenge().kind);
    }

    #[test]
    fn progress_is_ignored_before_start() {
        let (_dir, mut engine) = make_engine();
        assert!(engine.update_progress(10, 2, 1, 5, 0).is_none());
        assert_eq!(engine.progress().chars, 0);
    }

    #[test]
    fn starting_twice_keeps_the_first_timestamp() {
        let date = day("2026-08-01");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));
        let first = engine.progress().start_time;
        engine.start_challenge_at(at(date, 30));
        assert_eq!(engine.progress().start_time, first);
    }

    #[test]
    fn combo_challenge_completes_gold_early() {
        let date = date_with_kind("combo");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));

        // Raising max combo to 30 inside the 120s window is an instant gold.
        assert!(engine.update_progress_at(at(date, 10), 0, 0, 0, 25, 0).is_none());
        let reward = engine.update_progress_at(at(date, 20), 0, 0, 0, 30, 0).unwrap();
        assert_eq!(reward.tier, Tier::Gold);
        assert_eq!(reward.exp, 100);
        assert!((reward.score_multiplier - 1.5).abs() < 1e-9);
        assert!(engine.completed_today());

        // The day is settled; further progress is ignored.
        assert!(engine.update_progress_at(at(date, 30), 0, 0, 0, 99, 0).is_none());
    }

    #[test]
    fn partial_goal_settles_at_lower_tier_after_timeout() {
        let date = date_with_kind("combo");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));

        engine.update_progress_at(at(date, 10), 0, 0, 0, 26, 0);
        // Silver reached (26 >= 25) but not gold; nothing settles until the
        // 120s limit passes.
        assert!(!engine.completed_today());

        let reward = engine.update_progress_at(at(date, 121), 0, 0, 0, 0, 0).unwrap();
        assert_eq!(reward.tier, Tier::Silver);
        assert!(engine.completed_today());
        assert_eq!(engine.reward_tier(), Some(Tier::Silver));
    }

    #[test]
    fn missing_every_goal_settles_with_no_reward() {
        let date = date_with_kind("combo");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));

        engine.update_progress_at(at(date, 5), 0, 0, 0, 3, 0);
        assert!(engine.update_progress_at(at(date, 130), 0, 0, 0, 0, 0).is_none());
        assert!(engine.completed_today());
        assert_eq!(engine.reward_tier(), None);
    }

    #[test]
    fn accuracy_challenge_requires_zero_errors() {
        let date = date_with_kind("accuracy");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));

        engine.update_progress_at(at(date, 10), 0, 0, 3, 0, 1);
        // 5 clean sentences would be gold, but the error disqualifies them.
        assert!(engine.update_progress_at(at(date, 20), 0, 0, 2, 0, 0).is_none());
        assert!(!engine.completed_today());
    }

    #[test]
    fn accuracy_challenge_gold_with_clean_run() {
        let date = date_with_kind("accuracy");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));

        for i in 0..4 {
            assert!(engine.update_progress_at(at(date, 10 + i), 0, 0, 1, 0, 0).is_none());
        }
        let reward = engine.update_progress_at(at(date, 20), 0, 0, 1, 0, 0).unwrap();
        assert_eq!(reward.tier, Tier::Gold);
    }

    #[test]
    fn new_day_resets_everything() {
        let date = date_with_kind("combo");
        let (_dir, mut engine) = engine_on(date);
        engine.start_challenge_at(at(date, 0));
        engine.update_progress_at(at(date, 10), 0, 0, 0, 30, 0);
        assert!(engine.completed_today());

        let tomorrow = date + chrono::Duration::days(1);
        engine.ensure_today(tomorrow);
        assert!(!engine.completed_today());
        assert!(!engine.progress().started);
        assert_eq!(engine.progress().max_combo, 0);
        assert_eq!(engine.reward_tier(), None);
    }

    #[test]
    fn state_survives_reload_within_the_day() {
        // Uses the real clock: reloading on the same day must keep progress.
        // The deltas stay below every gold threshold so no kind completes.
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        {
            let mut engine = DailyChallengeEngine::load(store.clone());
            engine.start_challenge();
            engine.update_progress(40, 8, 2, 12, 1);
        }
        let engine = DailyChallengeEngine::load(store);
        assert!(engine.progress().started);
        assert_eq!(engine.progress().chars, 40);
        assert_eq!(engine.progress().max_combo, 12);
    }
}
