use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::scoring;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_player_name")]
    pub player_name: String,
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
    #[serde(default = "default_narration_enabled")]
    pub narration_enabled: bool,
    /// Extra lesson files are read from here in addition to the bundled set.
    #[serde(default)]
    pub lessons_dir: Option<String>,
}

fn default_player_name() -> String {
    "Player".to_string()
}
fn default_time_limit_secs() -> u64 {
    scoring::TIME_LIMIT_PER_SENTENCE
}
fn default_narration_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            time_limit_secs: default_time_limit_secs(),
            narration_enabled: default_narration_enabled(),
            lessons_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentora")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file could push out of range.
    pub fn normalize(&mut self) {
        if self.player_name.trim().is_empty() {
            self.player_name = default_player_name();
        }
        self.time_limit_secs = self.time_limit_secs.clamp(5, 600);
    }
}
