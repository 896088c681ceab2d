use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{DailyData, LeaderboardData, ProgressData};

/// One JSON file per persisted concern, all under a single base directory.
/// Loads are tolerant: a missing or unparsable file yields the default value
/// (with a logged diagnostic) so a corrupt save never takes the game down.
#[derive(Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentora");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    warn!("discarding unreadable {name}: {e}");
                    T::default()
                }
            },
            Err(e) => {
                warn!("failed to read {name}: {e}");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Unlocked achievement ids, persisted as a flat JSON array.
    pub fn load_achievements(&self) -> BTreeSet<String> {
        let ids: Vec<String> = self.load("achievements.json");
        ids.into_iter().collect()
    }

    pub fn save_achievements(&self, unlocked: &BTreeSet<String>) -> Result<()> {
        self.save("achievements.json", unlocked)
    }

    pub fn load_progress(&self) -> ProgressData {
        self.load("progress.json")
    }

    pub fn save_progress(&self, data: &ProgressData) -> Result<()> {
        self.save("progress.json", data)
    }

    pub fn load_leaderboard(&self) -> LeaderboardData {
        self.load("leaderboard.json")
    }

    pub fn save_leaderboard(&self, data: &LeaderboardData) -> Result<()> {
        self.save("leaderboard.json", data)
    }

    pub fn load_daily(&self) -> DailyData {
        self.load("daily_challenge.json")
    }

    pub fn save_daily(&self, data: &DailyData) -> Result<()> {
        self.save("daily_challenge.json", data)
    }
}
