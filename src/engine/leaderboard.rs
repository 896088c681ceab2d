use chrono::{DateTime, Local, NaiveDate};
use log::warn;

use crate::store::json_store::JsonStore;
use crate::store::schema::{LeaderboardData, LeaderboardEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Daily,
    Weekly,
    AllTime,
}

impl View {
    pub const ALL: [View; 3] = [View::Daily, View::Weekly, View::AllTime];

    pub fn label(self) -> &'static str {
        match self {
            View::Daily => "Today",
            View::Weekly => "This Week",
            View::AllTime => "All Time",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ranks {
    pub daily: Option<usize>,
    pub weekly: Option<usize>,
    pub all_time: Option<usize>,
}

/// Append-only score store with three overlapping retention windows. Every
/// insert re-filters, re-sorts and re-truncates each view from scratch, then
/// persists the whole structure.
pub struct Leaderboard {
    data: LeaderboardData,
    store: JsonStore,
}

const MAX_ENTRIES: usize = 100;

impl Leaderboard {
    pub fn load(store: JsonStore) -> Self {
        let mut board = Self {
            data: store.load_leaderboard(),
            store,
        };
        board.cleanup_and_sort(Local::now().date_naive());
        board
    }

    /// Record a finished run in all three views and return its 1-based rank
    /// in each (None when it fell off the top 100).
    pub fn add_score(
        &mut self,
        name: &str,
        score: u32,
        accuracy: u32,
        speed: u32,
        combo: u32,
        level: u32,
    ) -> Ranks {
        self.add_score_at(Local::now(), name, score, accuracy, speed, combo, level)
    }

    fn add_score_at(
        &mut self,
        now: DateTime<Local>,
        name: &str,
        score: u32,
        accuracy: u32,
        speed: u32,
        combo: u32,
        level: u32,
    ) -> Ranks {
        let entry = LeaderboardEntry {
            name: name.to_string(),
            score,
            accuracy,
            speed,
            combo,
            level,
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
        };

        self.data.daily.push(entry.clone());
        self.data.weekly.push(entry.clone());
        self.data.all_time.push(entry);

        self.cleanup_and_sort(now.date_naive());
        if let Err(e) = self.store.save_leaderboard(&self.data) {
            warn!("failed to save leaderboard: {e}");
        }

        Ranks {
            daily: self.rank_of(View::Daily, name, score),
            weekly: self.rank_of(View::Weekly, name, score),
            all_time: self.rank_of(View::AllTime, name, score),
        }
    }

    fn cleanup_and_sort(&mut self, today: NaiveDate) {
        let week_ago = today - chrono::Duration::days(7);
        self.data
            .daily
            .retain(|e| entry_date(e) == Some(today));
        self.data
            .weekly
            .retain(|e| entry_date(e).is_some_and(|d| d >= week_ago));

        for entries in [
            &mut self.data.daily,
            &mut self.data.weekly,
            &mut self.data.all_time,
        ] {
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(MAX_ENTRIES);
        }
    }

    fn entries(&self, view: View) -> &[LeaderboardEntry] {
        match view {
            View::Daily => &self.data.daily,
            View::Weekly => &self.data.weekly,
            View::AllTime => &self.data.all_time,
        }
    }

    fn rank_of(&self, view: View, name: &str, score: u32) -> Option<usize> {
        self.entries(view)
            .iter()
            .position(|e| e.name == name && e.score == score)
            .map(|i| i + 1)
    }

    pub fn top(&self, view: View, limit: usize) -> &[LeaderboardEntry] {
        let entries = self.entries(view);
        &entries[..entries.len().min(limit)]
    }

    pub fn player_best(&self, name: &str, view: View) -> Option<&LeaderboardEntry> {
        self.entries(view).iter().find(|e| e.name == name)
    }

    pub fn player_rank(&self, name: &str, view: View) -> Option<usize> {
        self.entries(view)
            .iter()
            .position(|e| e.name == name)
            .map(|i| i + 1)
    }
}

fn entry_date(entry: &LeaderboardEntry) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use tempfile::TempDir;

    fn make_board() -> (TempDir, Leaderboard) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, Leaderboard::load(store))
    }

    fn at(date: &str) -> DateTime<Local> {
        let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        Local.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn first_entry_ranks_first_everywhere() {
        let (_dir, mut board) = make_board();
        let ranks = board.add_score("Ada", 500, 98, 120, 15, 3);
        assert_eq!(ranks.daily, Some(1));
        assert_eq!(ranks.weekly, Some(1));
        assert_eq!(ranks.all_time, Some(1));
    }

    #[test]
    fn entries_sort_by_score_descending() {
        let (_dir, mut board) = make_board();
        board.add_score("Ada", 300, 90, 100, 5, 1);
        board.add_score("Bo", 700, 95, 110, 10, 2);
        let ranks = board.add_score("Cy", 500, 92, 105, 8, 1);

        assert_eq!(ranks.all_time, Some(2));
        let top: Vec<u32> = board.top(View::AllTime, 10).iter().map(|e| e.score).collect();
        assert_eq!(top, vec![700, 500, 300]);
    }

    #[test]
    fn views_are_truncated_to_top_100() {
        let (_dir, mut board) = make_board();
        for i in 0..110 {
            board.add_score("Ada", 1000 + i, 90, 100, 5, 1);
        }
        assert_eq!(board.top(View::AllTime, 200).len(), 100);
        // A score below the cutoff reports no rank.
        let ranks = board.add_score("Zed", 1, 50, 40, 0, 1);
        assert_eq!(ranks.all_time, None);
    }

    #[test]
    fn daily_view_drops_other_days() {
        let (_dir, mut board) = make_board();
        board.add_score_at(at("2026-08-01"), "Ada", 400, 90, 100, 5, 1);
        let ranks = board.add_score_at(at("2026-08-02"), "Bo", 300, 90, 100, 5, 1);

        // Yesterday's entry left the daily view, so Bo ranks first there.
        assert_eq!(ranks.daily, Some(1));
        assert_eq!(board.top(View::Daily, 10).len(), 1);
        assert_eq!(board.top(View::Weekly, 10).len(), 2);
        assert_eq!(board.top(View::AllTime, 10).len(), 2);
    }

    #[test]
    fn weekly_view_keeps_a_rolling_seven_days() {
        let (_dir, mut board) = make_board();
        board.add_score_at(at("2026-08-01"), "Ada", 400, 90, 100, 5, 1);
        board.add_score_at(at("2026-08-09"), "Bo", 300, 90, 100, 5, 1);

        let weekly = board.top(View::Weekly, 10);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].name, "Bo");
        assert_eq!(board.top(View::AllTime, 10).len(), 2);
    }

    #[test]
    fn rank_finds_first_name_and_score_match() {
        let (_dir, mut board) = make_board();
        board.add_score("Ada", 500, 90, 100, 5, 1);
        let ranks = board.add_score("Ada", 500, 91, 101, 6, 1);
        // Duplicate name+score: rank points at the first match.
        assert_eq!(ranks.all_time, Some(1));
    }

    #[test]
    fn player_best_and_rank() {
        let (_dir, mut board) = make_board();
        board.add_score("Ada", 300, 90, 100, 5, 1);
        board.add_score("Bo", 700, 95, 110, 10, 2);
        board.add_score("Ada", 600, 93, 105, 9, 2);

        let best = board.player_best("Ada", View::AllTime).unwrap();
        assert_eq!(best.score, 600);
        assert_eq!(board.player_rank("Ada", View::AllTime), Some(2));
        assert_eq!(board.player_rank("Nobody", View::AllTime), None);
    }

    #[test]
    fn board_survives_reload() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        {
            let mut board = Leaderboard::load(store.clone());
            board.add_score("Ada", 500, 98, 120, 15, 3);
        }
        let board = Leaderboard::load(store);
        assert_eq!(board.top(View::AllTime, 10).len(), 1);
        assert_eq!(board.top(View::AllTime, 10)[0].name, "Ada");
    }
}
