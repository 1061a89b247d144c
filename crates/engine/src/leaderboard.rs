//! End-of-session ranking.

use std::fmt::Write;

use crate::entity::Player;

/// Rows printed. The board has always shown one more than a top ten.
pub const LEADERBOARD_ROWS: usize = 11;

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: u32,
    pub name: String,
    pub points: i32,
}

/// Players sorted by descending points. Ties keep pool order.
pub fn rank(players: &[Player]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|p| LeaderboardEntry {
            id: p.id,
            name: p.name.clone(),
            points: p.points,
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

/// Render the top [`LEADERBOARD_ROWS`] as `name - points` lines, the name
/// left-aligned in 20 columns and the points right-aligned in 8.
pub fn render(players: &[Player]) -> String {
    let mut out = String::new();
    for entry in rank(players).iter().take(LEADERBOARD_ROWS) {
        let _ = writeln!(out, "{:<20} - {:>8}", entry.name, entry.points);
    }
    out
}
