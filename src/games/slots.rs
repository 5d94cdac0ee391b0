//! Three-reel weighted slot machine

use crate::games::types::GameOutcome;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const REELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Seven,
    Diamond,
    Bar,
    Bell,
    Shoe,
    Lemon,
    Melon,
    Heart,
    Cherry,
}

impl Symbol {
    pub const ALL: [Symbol; 9] = [
        Symbol::Seven,
        Symbol::Diamond,
        Symbol::Bar,
        Symbol::Bell,
        Symbol::Shoe,
        Symbol::Lemon,
        Symbol::Melon,
        Symbol::Heart,
        Symbol::Cherry,
    ];

    /// Relative draw weight; higher is more common
    pub fn weight(self) -> u32 {
        match self {
            Symbol::Seven => 1,
            Symbol::Diamond => 2,
            Symbol::Bar => 4,
            Symbol::Bell => 6,
            Symbol::Shoe => 8,
            Symbol::Lemon => 10,
            Symbol::Melon => 12,
            Symbol::Heart => 14,
            Symbol::Cherry => 16,
        }
    }

    /// Multiplier for `count` matching reels of this symbol
    pub fn multiplier(self, count: usize) -> Option<f64> {
        let (three, two) = match self {
            Symbol::Seven => (500.0, 25.0),
            Symbol::Diamond => (25.0, 10.0),
            Symbol::Bar => (5.0, 3.0),
            Symbol::Bell => (3.0, 2.0),
            Symbol::Shoe => (2.0, 1.0),
            Symbol::Lemon => (1.0, 1.0),
            Symbol::Melon => (0.75, 1.0),
            Symbol::Heart => (0.5, 0.75),
            Symbol::Cherry => (0.5, 0.25),
        };
        match count {
            3 => Some(three),
            2 => Some(two),
            _ => None,
        }
    }
}

/// One reel strip: a weighted draw over [`Symbol::ALL`], with replacement
#[derive(Debug, Clone)]
pub struct Reel {
    weights: WeightedIndex<u32>,
}

impl Reel {
    pub fn new() -> Result<Self, WeightedError> {
        let weights = WeightedIndex::new(Symbol::ALL.map(Symbol::weight))?;
        Ok(Self { weights })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        Symbol::ALL[self.weights.sample(rng)]
    }

    /// Draw every reel independently
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> [Symbol; REELS] {
        std::array::from_fn(|_| self.draw(&mut *rng))
    }
}

/// Best multiplier any symbol in the result qualifies for; 0 when nothing matches
pub fn best_multiplier(reels: &[Symbol]) -> f64 {
    let mut counts: HashMap<Symbol, usize> = HashMap::new();
    for symbol in reels {
        *counts.entry(*symbol).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter_map(|(symbol, count)| symbol.multiplier(count))
        .fold(0.0, f64::max)
}

/// Resolved spin.
///
/// A matching result pays `trunc(multiplier * stake)` on top of the stake; a
/// non-matching result loses the stake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSpin {
    pub reels: [Symbol; REELS],
    pub stake: i64,
    pub multiplier: f64,
    pub payout: i64,
    pub net: i64,
}

impl SlotSpin {
    pub fn resolve(reels: [Symbol; REELS], stake: i64) -> Self {
        let multiplier = best_multiplier(&reels);
        let payout = (multiplier * stake as f64).trunc() as i64;
        let net = if multiplier > 0.0 { payout } else { -stake };
        Self {
            reels,
            stake,
            multiplier,
            payout,
            net,
        }
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome::from_net(self.net)
    }
}
