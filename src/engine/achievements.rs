use std::collections::{BTreeSet, VecDeque};

use log::warn;

use crate::store::json_store::JsonStore;

#[derive(Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: "first_level",
        name: "First Steps",
        description: "Complete your first level",
        icon: "🎯",
    },
    AchievementDef {
        id: "perfect_sentence",
        name: "Perfect!",
        description: "100% accuracy on a sentence",
        icon: "⭐",
    },
    AchievementDef {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Type faster than 60 chars/min",
        icon: "⚡",
    },
    AchievementDef {
        id: "combo_5",
        name: "On a Roll",
        description: "Reach a 5x combo",
        icon: "🔥",
    },
    AchievementDef {
        id: "combo_10",
        name: "Unstoppable",
        description: "Reach a 10x combo",
        icon: "💫",
    },
    AchievementDef {
        id: "combo_20",
        name: "Legendary",
        description: "Reach a 20x combo",
        icon: "👑",
    },
    AchievementDef {
        id: "all_levels",
        name: "Champion",
        description: "Complete all levels",
        icon: "🏆",
    },
    AchievementDef {
        id: "no_errors",
        name: "Flawless",
        description: "Complete a level with no errors",
        icon: "💎",
    },
    AchievementDef {
        id: "early_bird",
        name: "Early Bird",
        description: "Practice before 7am",
        icon: "🌅",
    },
    AchievementDef {
        id: "night_owl",
        name: "Night Owl",
        description: "Practice after 10pm",
        icon: "🦉",
    },
    AchievementDef {
        id: "daily_streak_7",
        name: "Weekly Dedication",
        description: "Practice 7 days in a row",
        icon: "📅",
    },
    AchievementDef {
        id: "daily_streak_30",
        name: "Monthly Master",
        description: "Practice 30 days in a row",
        icon: "🗓️",
    },
    AchievementDef {
        id: "speed_demon_pro",
        name: "Speed Demon Pro",
        description: "Type faster than 100 chars/min",
        icon: "⚡⚡",
    },
];

fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Monotonic set of unlocked achievement ids plus a transient FIFO of
/// notifications not yet shown. Unlocks persist immediately; a failed save is
/// logged and the unlock stands in memory.
pub struct AchievementEngine {
    unlocked: BTreeSet<String>,
    pending: VecDeque<&'static AchievementDef>,
    store: JsonStore,
}

impl AchievementEngine {
    pub fn load(store: JsonStore) -> Self {
        let unlocked = store.load_achievements();
        Self {
            unlocked,
            pending: VecDeque::new(),
            store,
        }
    }

    /// Returns true only for a first-time unlock of a known id.
    pub fn unlock(&mut self, id: &str) -> bool {
        let Some(def) = find(id) else {
            return false;
        };
        if !self.unlocked.insert(def.id.to_string()) {
            return false;
        }
        self.pending.push_back(def);
        if let Err(e) = self.store.save_achievements(&self.unlocked) {
            warn!("failed to save achievements: {e}");
        }
        true
    }

    /// Evaluated on every correct keystroke, not just when a streak ends.
    pub fn check_combo(&mut self, combo: u32) {
        if combo >= 5 {
            self.unlock("combo_5");
        }
        if combo >= 10 {
            self.unlock("combo_10");
        }
        if combo >= 20 {
            self.unlock("combo_20");
        }
    }

    /// Evaluated once per accepted sentence submission.
    pub fn check_speed(&mut self, speed: u32) {
        if speed >= 60 {
            self.unlock("speed_demon");
        }
        if speed >= 100 {
            self.unlock("speed_demon_pro");
        }
    }

    /// Evaluated once per accepted sentence submission.
    pub fn check_accuracy(&mut self, accuracy: u32) {
        if accuracy >= 100 {
            self.unlock("perfect_sentence");
        }
    }

    /// Evaluated once per completed level.
    pub fn check_level_complete(&mut self, lesson_index: usize, errors: usize, total_lessons: usize) {
        if lesson_index == 0 {
            self.unlock("first_level");
        }
        if errors == 0 {
            self.unlock("no_errors");
        }
        if total_lessons > 0 && lesson_index >= total_lessons - 1 {
            self.unlock("all_levels");
        }
    }

    pub fn check_time_of_day(&mut self, hour: u32) {
        if hour < 7 {
            self.unlock("early_bird");
        } else if hour >= 22 {
            self.unlock("night_owl");
        }
    }

    pub fn check_streak(&mut self, days: u32) {
        if days >= 7 {
            self.unlock("daily_streak_7");
        }
        if days >= 30 {
            self.unlock("daily_streak_30");
        }
    }

    /// Oldest queued notification, if any. The queue is not persisted;
    /// notifications still pending at shutdown are dropped.
    pub fn pop_notification(&mut self) -> Option<&'static AchievementDef> {
        self.pending.pop_front()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    pub fn total_count() -> usize {
        CATALOG.len()
    }

    pub fn all_with_status(&self) -> Vec<(&'static AchievementDef, bool)> {
        CATALOG
            .iter()
            .map(|def| (def, self.unlocked.contains(def.id)))
            .collect()
    }
}
