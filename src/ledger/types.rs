use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// XP needed per level
pub const XP_PER_LEVEL: u64 = 100;

/// Cash granted to a freshly created account
pub const DEFAULT_STARTING_CASH: i64 = 1000;

/// Cash amount that older writers may have stored as a float (`1075.0`).
/// Fractions are truncated; out-of-range values saturate.
fn whole_cash<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Whole(i64),
        Fractional(f64),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Whole(amount) => Ok(amount),
        Amount::Fractional(amount) if amount.is_finite() => Ok(amount.trunc() as i64),
        Amount::Fractional(amount) => Err(de::Error::custom(format!("cash amount {} is not finite", amount))),
    }
}

/// Per-user account record.
///
/// Keys the engine does not interpret (`items`, `boosts`, `last_vote`,
/// `mine`, plus anything unknown) are carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "whole_cash")]
    pub cash: i64,
    #[serde(default)]
    pub level: u64,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub games_played: u64,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub losses: u64,
    #[serde(default, deserialize_with = "whole_cash")]
    pub total_cash_won: i64,
    #[serde(default, deserialize_with = "whole_cash")]
    pub total_cash_lost: i64,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub boosts: Vec<Value>,
    /// Command name -> absolute expiry (seconds since epoch)
    #[serde(default)]
    pub cooldowns: BTreeMap<String, f64>,
    #[serde(default)]
    pub vote_streak: u64,
    #[serde(default)]
    pub last_vote: Value,
    #[serde(default)]
    pub mine: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn new(starting_cash: i64) -> Self {
        Self {
            cash: starting_cash,
            level: 0,
            xp: 0,
            games_played: 0,
            wins: 0,
            losses: 0,
            total_cash_won: 0,
            total_cash_lost: 0,
            items: Vec::new(),
            boosts: Vec::new(),
            cooldowns: BTreeMap::new(),
            vote_streak: 0,
            last_vote: Value::Null,
            mine: Value::Null,
            extra: Map::new(),
        }
    }

    /// Level implied by the current XP
    pub fn level_for(xp: u64) -> u64 {
        xp / XP_PER_LEVEL
    }

    /// Re-derive `level` from `xp`
    pub fn sync_level(&mut self) {
        self.level = Self::level_for(self.xp);
    }

    /// Grant XP; returns the new level when it went up
    pub fn add_xp(&mut self, xp: u64) -> Option<u64> {
        let before = self.level;
        self.xp = self.xp.saturating_add(xp);
        self.sync_level();
        (self.level > before).then_some(self.level)
    }

    /// Book one settled wager. `net` is positive for a win, negative for a
    /// loss and zero for a push.
    pub fn settle_wager(&mut self, net: i64, xp: u64) -> Option<u64> {
        self.games_played += 1;
        if net > 0 {
            self.wins += 1;
            self.total_cash_won = self.total_cash_won.saturating_add(net);
        } else if net < 0 {
            self.losses += 1;
            self.total_cash_lost = self.total_cash_lost.saturating_add(net.saturating_neg());
        }
        self.cash = self.cash.saturating_add(net);
        self.add_xp(xp)
    }

    /// Book earned (non-wager) income
    pub fn credit_earnings(&mut self, amount: i64, xp: u64) -> Option<u64> {
        self.cash = self.cash.saturating_add(amount);
        self.total_cash_won = self.total_cash_won.saturating_add(amount);
        self.add_xp(xp)
    }

    /// Lifetime won minus lifetime lost
    pub fn profit(&self) -> i64 {
        self.total_cash_won.saturating_sub(self.total_cash_lost)
    }

    /// Percentage of decided games won, if any were decided
    pub fn win_rate(&self) -> Option<f64> {
        let decided = self.wins + self.losses;
        (decided > 0).then(|| self.wins as f64 / decided as f64 * 100.0)
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CASH)
    }
}

/// Aggregate counters across every settled wager
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub total_bets: u64,
    #[serde(default, deserialize_with = "whole_cash")]
    pub total_cash_won: i64,
    #[serde(default, deserialize_with = "whole_cash")]
    pub total_cash_lost: i64,
}

impl GlobalStats {
    pub fn record(&mut self, stake: i64, won: bool) {
        self.total_bets += 1;
        if won {
            self.total_cash_won = self.total_cash_won.saturating_add(stake);
        } else {
            self.total_cash_lost = self.total_cash_lost.saturating_add(stake);
        }
    }
}

/// On-disk ledger document: `{"users": {...}, "global_stats": {...}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default)]
    pub users: BTreeMap<String, Account>,
    #[serde(default)]
    pub global_stats: GlobalStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LedgerDocument {
    fn default() -> Self {
        let mut extra = Map::new();
        extra.insert("guilds".to_string(), Value::Object(Map::new()));
        Self {
            users: BTreeMap::new(),
            global_stats: GlobalStats::default(),
            extra,
        }
    }
}

/// Numeric account fields the leaderboard can rank by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankField {
    Cash,
    Level,
    Xp,
    Wins,
    GamesPlayed,
    TotalCashWon,
    Profit,
}

impl RankField {
    /// Sort key; widened so every field compares without overflow
    pub fn key(&self, account: &Account) -> i128 {
        match self {
            RankField::Cash => account.cash as i128,
            RankField::Level => account.level as i128,
            RankField::Xp => account.xp as i128,
            RankField::Wins => account.wins as i128,
            RankField::GamesPlayed => account.games_played as i128,
            RankField::TotalCashWon => account.total_cash_won as i128,
            RankField::Profit => account.total_cash_won as i128 - account.total_cash_lost as i128,
        }
    }
}

impl fmt::Display for RankField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankField::Cash => "cash",
            RankField::Level => "level",
            RankField::Xp => "xp",
            RankField::Wins => "wins",
            RankField::GamesPlayed => "games_played",
            RankField::TotalCashWon => "total_cash_won",
            RankField::Profit => "profit",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RankField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(RankField::Cash),
            "level" => Ok(RankField::Level),
            "xp" => Ok(RankField::Xp),
            "wins" => Ok(RankField::Wins),
            "games_played" => Ok(RankField::GamesPlayed),
            "total_cash_won" => Ok(RankField::TotalCashWon),
            "profit" => Ok(RankField::Profit),
            other => Err(format!("unknown leaderboard field '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_account_defaults() {
        let account = Account::default();
        assert_eq!(account.cash, 1000);
        assert_eq!(account.level, 0);
        assert!(account.cooldowns.is_empty());
        assert_eq!(account.last_vote, Value::Null);
    }

    #[test]
    fn test_level_tracks_xp() {
        let mut account = Account::default();
        assert_eq!(account.add_xp(99), None);
        assert_eq!(account.add_xp(1), Some(1));
        assert_eq!(account.add_xp(250), Some(3));
        assert_eq!(account.level, account.xp / 100);
    }

    #[test]
    fn test_settle_wager_sides() {
        let mut account = Account::default();
        account.settle_wager(-500, 1);
        assert_eq!(account.cash, 500);
        assert_eq!(account.losses, 1);
        assert_eq!(account.total_cash_lost, 500);

        account.settle_wager(0, 5);
        assert_eq!(account.cash, 500);
        assert_eq!((account.wins, account.losses), (0, 1));
        assert_eq!(account.games_played, 2);

        account.settle_wager(150, 5);
        assert_eq!(account.cash, 650);
        assert_eq!(account.total_cash_won, 150);
        assert_eq!(account.profit(), -350);
        assert_eq!(account.win_rate(), Some(50.0));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let raw = json!({
            "users": {
                "42": {
                    "cash": 10, "level": 0, "xp": 5, "games_played": 1, "wins": 0,
                    "losses": 1, "total_cash_won": 0, "total_cash_lost": 3,
                    "items": ["pickaxe"], "boosts": [], "cooldowns": {"work": 1700000000.5},
                    "vote_streak": 2, "last_vote": 1699999999, "mine": {"depth": 3},
                    "nickname": "rocket"
                }
            },
            "global_stats": {"total_bets": 1, "total_cash_won": 0, "total_cash_lost": 3},
            "guilds": {"7": {"prefix": "!"}}
        });

        let doc: LedgerDocument = serde_json::from_value(raw.clone()).unwrap();
        let account = &doc.users["42"];
        assert_eq!(account.extra.get("nickname"), Some(&json!("rocket")));
        assert_eq!(account.mine, json!({"depth": 3}));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_float_cash_is_truncated() {
        let raw = json!({
            "users": {"1": {"cash": 1075.9, "total_cash_won": 75.0, "total_cash_lost": 0}},
            "global_stats": {"total_bets": 3, "total_cash_won": 75.5, "total_cash_lost": 200.0}
        });

        let doc: LedgerDocument = serde_json::from_value(raw).unwrap();
        let account = &doc.users["1"];
        assert_eq!(account.cash, 1075);
        assert_eq!(account.total_cash_won, 75);
        assert_eq!(doc.global_stats.total_cash_won, 75);
        assert_eq!(doc.global_stats.total_cash_lost, 200);

        let negative: Account = serde_json::from_value(json!({"cash": -12.5})).unwrap();
        assert_eq!(negative.cash, -12);
        assert!(serde_json::from_value::<Account>(json!({"cash": "lots"})).is_err());
    }

    #[test]
    fn test_rank_field_parsing() {
        assert_eq!("Cash".parse::<RankField>(), Ok(RankField::Cash));
        assert_eq!("profit".parse::<RankField>(), Ok(RankField::Profit));
        assert!("height".parse::<RankField>().is_err());
        assert_eq!(RankField::GamesPlayed.to_string(), "games_played");
    }
}
