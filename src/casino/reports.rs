use crate::cooldowns::CooldownStatus;
use crate::games::{Card, CoinFlip, GameOutcome, Resolution, SlotSpin};
use crate::ledger::{Account, RankField};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CoinFlipReport {
    pub flip: CoinFlip,
    pub outcome: GameOutcome,
    pub cash: i64,
    pub leveled_up: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotsReport {
    pub spin: SlotSpin,
    pub outcome: GameOutcome,
    pub cash: i64,
    pub leveled_up: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlackjackReport {
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_total: u32,
    /// Final stake, doubled if the player doubled down
    pub stake: i64,
    pub hard_mode: bool,
    pub resolution: Resolution,
    pub outcome: GameOutcome,
    pub net: i64,
    pub cash: i64,
    pub leveled_up: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarningsReport {
    pub command: String,
    pub earned: i64,
    pub cash: i64,
    pub level: u64,
    pub xp: u64,
    pub leveled_up: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReward {
    pub streak: u64,
    pub level_multiplier: i64,
    pub streak_multiplier: i64,
    /// Next vote lands on a multiple of 21 and pays triple
    pub bonus_vote: bool,
    pub reward: i64,
}

impl VoteReward {
    pub const BASE: i64 = 100_000;
    pub const BONUS_EVERY: u64 = 21;

    pub fn for_account(account: &Account) -> Self {
        let streak = account.vote_streak;
        let level_multiplier = account.level.max(1).min(i64::MAX as u64) as i64;
        let streak_multiplier = (streak / Self::BONUS_EVERY).clamp(1, 4) as i64;
        let bonus_vote = (streak + 1) % Self::BONUS_EVERY == 0;

        let reward = Self::BASE
            .saturating_mul(level_multiplier)
            .saturating_mul(streak_multiplier)
            .saturating_mul(if bonus_vote { 3 } else { 1 });

        Self {
            streak,
            level_multiplier,
            streak_multiplier,
            bonus_vote,
            reward,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: String,
    pub cash: i64,
    pub level: u64,
    pub xp: u64,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    /// Percent of decided games won; `None` before any
    pub win_rate: Option<f64>,
    pub total_cash_won: i64,
    pub total_cash_lost: i64,
    pub profit: i64,
    pub vote_streak: u64,
}

impl Profile {
    pub fn from_account(user_id: &str, account: &Account) -> Self {
        Self {
            user_id: user_id.to_string(),
            cash: account.cash,
            level: account.level,
            xp: account.xp,
            games_played: account.games_played,
            wins: account.wins,
            losses: account.losses,
            win_rate: account.win_rate(),
            total_cash_won: account.total_cash_won,
            total_cash_lost: account.total_cash_lost,
            profit: account.profit(),
            vote_streak: account.vote_streak,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub field: RankField,
    pub value: i64,
    pub level: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CooldownListing {
    pub user_id: String,
    pub cooldowns: Vec<CooldownStatus>,
}
