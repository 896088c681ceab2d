pub mod achievements;
pub mod daily;
pub mod leaderboard;
pub mod level;
