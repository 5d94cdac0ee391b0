use crate::games::types::{CoinSide, GameOutcome};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Resolved coin flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinFlip {
    pub call: CoinSide,
    pub landed: CoinSide,
    pub stake: i64,
    /// `+stake` on a correct call, `-stake` otherwise
    pub net: i64,
}

impl CoinFlip {
    pub fn resolve(call: CoinSide, landed: CoinSide, stake: i64) -> Self {
        let net = if call == landed { stake } else { -stake };
        Self { call, landed, stake, net }
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome::from_net(self.net)
    }
}

/// Uniformly pick a side
pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> CoinSide {
    if rng.gen_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    }
}
