//! API Response Models

use crate::casino::LeaderboardEntry;
use crate::ledger::RankField;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /api/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    /// Human form, e.g. `1d 2h 3m`
    pub uptime: String,
    pub uptime_seconds: u64,
    pub registered_accounts: usize,
    pub active_blackjack_sessions: usize,
    pub version: String,
}

/// GET /api/leaderboard/:category
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub category: RankField,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Largest `limit` a leaderboard request may ask for
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// `Xd Yh Zm` past a day, `Yh Zm Ss` past an hour, else `Zm Ss`
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}
