use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::engine::daily::Tier;

/// Player progression record, one instance per installation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    pub exp: u32,
    pub level: u32,
    pub total_words: u32,
    pub total_sentences: u32,
    pub total_levels: u32,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_practice_date: Option<NaiveDate>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            exp: 0,
            level: 1,
            total_words: 0,
            total_sentences: 0,
            total_levels: 0,
            streak_days: 0,
            best_streak: 0,
            last_practice_date: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub accuracy: u32,
    pub speed: u32,
    pub combo: u32,
    pub level: u32,
    /// Calendar date of the run, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time of the run, `HH:MM:SS`.
    pub time: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LeaderboardData {
    pub daily: Vec<LeaderboardEntry>,
    pub weekly: Vec<LeaderboardEntry>,
    pub all_time: Vec<LeaderboardEntry>,
}

/// The persisted challenge records only the date and catalog key; goals and
/// time limits are looked up from the static catalog on load, so a stale file
/// cannot carry altered thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodayChallenge {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub chars: u32,
    pub words: u32,
    pub sentences: u32,
    pub max_combo: u32,
    pub time: f64,
    pub errors: u32,
    pub started: bool,
    pub start_time: Option<DateTime<Local>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DailyData {
    pub today_challenge: Option<TodayChallenge>,
    pub challenge_progress: ChallengeProgress,
    pub completed_today: bool,
    pub reward_tier: Option<Tier>,
}
