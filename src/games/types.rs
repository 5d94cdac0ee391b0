use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    CoinFlip,
    Slots,
    Blackjack,
}

impl GameType {
    /// Command name, also used as the cooldown key
    pub fn command(&self) -> &'static str {
        match self {
            GameType::CoinFlip => "coinflip",
            GameType::Slots => "slots",
            GameType::Blackjack => "blackjack",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Coin face, used both for the player's call and the landed side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

impl FromStr for CoinSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heads" | "h" => Ok(CoinSide::Heads),
            "tails" | "t" => Ok(CoinSide::Tails),
            other => Err(format!("'{}' is not heads or tails", other)),
        }
    }
}

/// How a settled wager ended for the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Push,
}

impl GameOutcome {
    pub fn from_net(net: i64) -> Self {
        match net {
            n if n > 0 => GameOutcome::Win,
            n if n < 0 => GameOutcome::Loss,
            _ => GameOutcome::Push,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Win => write!(f, "win"),
            GameOutcome::Loss => write!(f, "loss"),
            GameOutcome::Push => write!(f, "push"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_side_parsing() {
        assert_eq!("Heads".parse::<CoinSide>(), Ok(CoinSide::Heads));
        assert_eq!(" t ".parse::<CoinSide>(), Ok(CoinSide::Tails));
        assert!("edge".parse::<CoinSide>().is_err());
    }

    #[test]
    fn test_outcome_from_net() {
        assert_eq!(GameOutcome::from_net(25), GameOutcome::Win);
        assert_eq!(GameOutcome::from_net(-1), GameOutcome::Loss);
        assert_eq!(GameOutcome::from_net(0), GameOutcome::Push);
    }

    #[test]
    fn test_game_type_serialization() {
        assert_eq!(serde_json::to_string(&GameType::CoinFlip).unwrap(), "\"coinflip\"");
        assert_eq!(GameType::Blackjack.to_string(), "blackjack");
    }
}
