use std::time::{Duration, Instant};

use chrono::{Local, Timelike};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::engine::achievements::{AchievementDef, AchievementEngine};
use crate::engine::daily::{DailyChallengeEngine, Reward};
use crate::engine::leaderboard::{Leaderboard, Ranks, View};
use crate::engine::level::LevelSystem;
use crate::feedback::EventSink;
use crate::session::scoring;
use crate::session::{CharOutcome, ComboTracker, SessionState};
use crate::store::json_store::JsonStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    CourseSelect,
    Playing,
    LevelComplete,
    GameOver,
    Leaderboard,
    Achievements,
}

/// How long an achievement toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Session controller: owns the screen state machine and wires every
/// keystroke through the matcher, combo tracker, scorer and the persisted
/// engines. All mutation happens on the caller's thread; the only thing that
/// leaves it is fire-and-forget sink notifications.
pub struct App {
    pub screen: Screen,
    pub config: Config,
    pub corpus: Corpus,
    pub session: Option<SessionState>,
    pub combo: ComboTracker,
    pub level_scores: Vec<u32>,
    pub achievements: AchievementEngine,
    pub levels: LevelSystem,
    pub leaderboard: Leaderboard,
    pub daily: DailyChallengeEngine,
    pub selected_lesson: usize,
    pub leaderboard_view: View,
    pub last_ranks: Option<Ranks>,
    pub last_reward: Option<Reward>,
    pub last_level_up: Option<u32>,
    pub toast: Option<(&'static AchievementDef, Instant)>,
    pub should_quit: bool,
    sink: Box<dyn EventSink>,
    /// Score multiplier from a daily-challenge reward, 1.0 until earned.
    score_multiplier: f64,
}

impl App {
    pub fn new(config: Config, store: JsonStore, corpus: Corpus, sink: Box<dyn EventSink>) -> Self {
        let achievements = AchievementEngine::load(store.clone());
        let levels = LevelSystem::load(store.clone());
        let leaderboard = Leaderboard::load(store.clone());
        let daily = DailyChallengeEngine::load(store);
        let level_scores = vec![0; corpus.len()];

        Self {
            screen: Screen::Menu,
            config,
            corpus,
            session: None,
            combo: ComboTracker::default(),
            level_scores,
            achievements,
            levels,
            leaderboard,
            daily,
            selected_lesson: 0,
            leaderboard_view: View::Daily,
            last_ranks: None,
            last_reward: None,
            last_level_up: None,
            toast: None,
            should_quit: false,
            sink,
            score_multiplier: 1.0,
        }
    }

    pub fn start_level(&mut self, lesson_index: usize) {
        let Some(lesson) = self.corpus.get(lesson_index) else {
            return;
        };
        let Some(first) = lesson.sentence(0) else {
            return;
        };
        let carried = self.level_scores.get(lesson_index).copied().unwrap_or(0);
        let first = first.to_string();
        self.combo.reset();
        self.last_ranks = None;
        self.last_level_up = None;
        self.session = Some(SessionState::new(lesson_index, &first, carried));
        self.sink.on_sentence_started(&first);
        self.screen = Screen::Playing;
    }

    pub fn type_char(&mut self, ch: char) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.type_char(ch) {
            CharOutcome::Hit => {
                let streak = self.combo.record_hit();
                session.score += self.combo.char_bonus();
                self.achievements.check_combo(streak);
                if let Some(level) = self.levels.add_exp_for_char() {
                    self.last_level_up = Some(level);
                }
                if let Some(reward) = self.daily.update_progress(1, 0, 0, streak, 0) {
                    self.apply_reward(reward);
                }
                self.sink.on_correct_char();
            }
            CharOutcome::Miss => {
                self.combo.record_miss();
                if let Some(reward) = self.daily.update_progress(0, 0, 0, 0, 1) {
                    self.apply_reward(reward);
                }
                self.sink.on_incorrect_char();
            }
        }
        self.drain_notifications();
    }

    pub fn backspace(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.backspace();
        }
    }

    /// Enter: accept or reject the current sentence.
    pub fn submit(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if !session.submit() {
            self.combo.record_miss();
            if let Some(reward) = self.daily.update_progress(0, 0, 0, 0, 1) {
                self.apply_reward(reward);
            }
            self.sink.on_submit_rejected();
            self.drain_notifications();
            return;
        }

        let accuracy = session.accuracy();
        let speed = session.speed();
        let sentence: String = session.target().iter().collect();
        let words = sentence.split_whitespace().count() as u32;

        let points = scoring::sentence_score(
            session.target_len(),
            accuracy,
            speed,
            session.lesson_index,
            self.combo.max_combo,
        );
        session.score += (f64::from(points) * self.score_multiplier) as u32;
        let lesson_index = session.lesson_index;
        let next_index = session.sentence_index + 1;

        self.achievements.check_speed(speed);
        self.achievements.check_accuracy(accuracy);
        if let Some(level) = self.levels.add_exp_for_sentence(accuracy >= 100, words) {
            self.last_level_up = Some(level);
        }
        if let Some(reward) = self.daily.update_progress(0, words, 1, self.combo.max_combo, 0) {
            self.apply_reward(reward);
        }
        self.sink.on_sentence_complete();

        let next_sentence = self
            .corpus
            .get(lesson_index)
            .and_then(|l| l.sentence(next_index))
            .map(str::to_string);

        match next_sentence {
            Some(next) => {
                if let Some(session) = self.session.as_mut() {
                    session.begin_sentence(next_index, &next);
                }
                self.sink.on_sentence_started(&next);
            }
            None => self.complete_level(accuracy, speed),
        }
        self.drain_notifications();
    }

    fn complete_level(&mut self, accuracy: u32, speed: u32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.score += scoring::LEVEL_COMPLETION_BONUS;

        let lesson_index = session.lesson_index;
        let score = session.score;
        let errors = session.errors;
        if let Some(slot) = self.level_scores.get_mut(lesson_index) {
            *slot = score;
        }

        let now = Local::now();
        self.achievements
            .check_level_complete(lesson_index, errors, self.corpus.len());
        self.achievements.check_time_of_day(now.hour());
        if let Some(level) = self.levels.add_exp_for_level() {
            self.last_level_up = Some(level);
        }
        if let Some(level) = self.levels.add_exp_for_combo(self.combo.max_combo) {
            self.last_level_up = Some(level);
        }
        let streak = self.levels.record_practice_day(now.date_naive());
        self.achievements.check_streak(streak);

        self.last_ranks = Some(self.leaderboard.add_score(
            &self.config.player_name,
            score,
            accuracy,
            speed,
            self.combo.max_combo,
            self.levels.level(),
        ));

        self.sink.on_level_complete();
        self.screen = Screen::LevelComplete;
    }

    fn apply_reward(&mut self, reward: Reward) {
        if let Some(level) = self.levels.add_exp(reward.exp) {
            self.last_level_up = Some(level);
        }
        self.score_multiplier = reward.score_multiplier;
        self.last_reward = Some(reward);
    }

    /// Promote the oldest pending achievement into the on-screen toast.
    fn drain_notifications(&mut self) {
        if self.toast.is_none() {
            if let Some(def) = self.achievements.pop_notification() {
                self.sink.on_achievement_unlocked(def.name);
                self.toast = Some((def, Instant::now()));
            }
        }
    }

    /// Control-loop tick: enforce the per-sentence deadline and rotate the
    /// achievement toast. Runs independently of keystrokes.
    pub fn tick(&mut self) {
        self.daily.refresh();
        if self.screen == Screen::Playing {
            let timed_out = self
                .session
                .as_ref()
                .is_some_and(|s| s.elapsed_secs() > self.config.time_limit_secs as f64);
            if timed_out {
                self.screen = Screen::GameOver;
            }
        }

        if let Some((_, shown_at)) = self.toast {
            if shown_at.elapsed() > TOAST_DURATION {
                self.toast = None;
            }
        }
        self.drain_notifications();
    }

    pub fn time_remaining(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| (self.config.time_limit_secs as f64 - s.elapsed_secs()).max(0.0))
            .unwrap_or(0.0)
    }

    pub fn retry_level(&mut self) {
        if let Some(index) = self.session.as_ref().map(|s| s.lesson_index) {
            self.start_level(index);
        }
    }

    pub fn next_level(&mut self) {
        let Some(index) = self.session.as_ref().map(|s| s.lesson_index) else {
            return;
        };
        if index + 1 < self.corpus.len() {
            self.start_level(index + 1);
        } else {
            self.go_to_menu();
        }
    }

    pub fn go_to_menu(&mut self) {
        self.session = None;
        self.combo.reset();
        self.screen = Screen::Menu;
    }

    pub fn go_to_course_select(&mut self) {
        self.selected_lesson = self.selected_lesson.min(self.corpus.len().saturating_sub(1));
        self.screen = Screen::CourseSelect;
    }

    pub fn go_to_leaderboard(&mut self) {
        self.leaderboard_view = View::Daily;
        self.screen = Screen::Leaderboard;
    }

    pub fn go_to_achievements(&mut self) {
        self.screen = Screen::Achievements;
    }

    /// Opt into today's challenge and head to lesson select; progress then
    /// accumulates during normal play.
    pub fn start_daily_challenge(&mut self) {
        self.daily.start_challenge();
        self.go_to_course_select();
    }

    pub fn select_prev_lesson(&mut self) {
        self.selected_lesson = self.selected_lesson.saturating_sub(1);
    }

    pub fn select_next_lesson(&mut self) {
        if self.selected_lesson + 1 < self.corpus.len() {
            self.selected_lesson += 1;
        }
    }

    pub fn cycle_leaderboard_view(&mut self) {
        self.leaderboard_view = match self.leaderboard_view {
            View::Daily => View::Weekly,
            View::Weekly => View::AllTime,
            View::AllTime => View::Daily,
        };
    }
}
