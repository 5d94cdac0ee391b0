//! Blackjack hand state machine
//!
//! `BlackjackGame` owns one session's deck and hands. Every transition is a
//! plain method call over (state, action); waiting for the player and the
//! action timeout live with the caller.

use crate::errors::CasinoError;
use crate::games::cards::{hand_value, is_soft, Card, Deck};
use crate::games::types::GameOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Dealer stands at or above this total
pub const DEALER_STAND: u32 = 17;
/// Hard-mode threshold when the dealer holds a two-card soft 17
pub const HARD_DEALER_STAND: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dealt,
    PlayerTurn,
    Resolving,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Hit,
    Stand,
    Double,
}

impl FromStr for PlayerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" | "h" => Ok(PlayerAction::Hit),
            "stand" | "s" => Ok(PlayerAction::Stand),
            "double" | "d" => Ok(PlayerAction::Double),
            other => Err(format!("unknown blackjack action '{}'", other)),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Hit => write!(f, "hit"),
            PlayerAction::Stand => write!(f, "stand"),
            PlayerAction::Double => write!(f, "double"),
        }
    }
}

/// Why the hand ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    BothBlackjack,
    PlayerBlackjack,
    DealerBlackjack,
    PlayerBust,
    DealerBust,
    PlayerHigher,
    DealerHigher,
    Tie,
    TimedOut,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Resolution::BothBlackjack => "Both have blackjack! Push!",
            Resolution::PlayerBlackjack => "Blackjack! You win!",
            Resolution::DealerBlackjack => "Dealer has blackjack! You lose!",
            Resolution::PlayerBust => "Bust! You lose!",
            Resolution::DealerBust => "Dealer busts! You win!",
            Resolution::PlayerHigher => "You win!",
            Resolution::DealerHigher => "Dealer wins!",
            Resolution::Tie => "Push!",
            Resolution::TimedOut => "Game timed out! You lose your bet.",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackjackError {
    #[error("this hand is already over")]
    NotPlayerTurn,
    #[error("you can only double down on your first two cards")]
    DoubleAfterHit,
    #[error("you need {required} cash to double down")]
    DoubleUnfunded { required: i64 },
    #[error("the deck ran out of cards")]
    DeckExhausted,
}

impl From<BlackjackError> for CasinoError {
    fn from(e: BlackjackError) -> Self {
        CasinoError::InvalidAction(e.to_string())
    }
}

/// What the player is shown while deciding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub player_hand: Vec<Card>,
    pub player_total: u32,
    pub dealer_upcard: Option<Card>,
    pub stake: i64,
    pub hard_mode: bool,
    pub can_double: bool,
    /// Why the previous action was refused, if it was
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlackjackGame {
    deck: Deck,
    player: Vec<Card>,
    dealer: Vec<Card>,
    stake: i64,
    hard: bool,
    phase: Phase,
    resolution: Option<Resolution>,
    net: i64,
}

impl BlackjackGame {
    /// Deal two cards each (player, player, dealer, dealer) and settle naturals
    pub fn deal(deck: Deck, stake: i64, hard: bool) -> Result<Self, BlackjackError> {
        let mut game = Self {
            deck,
            player: Vec::with_capacity(4),
            dealer: Vec::with_capacity(4),
            stake,
            hard,
            phase: Phase::Dealt,
            resolution: None,
            net: 0,
        };

        for _ in 0..2 {
            let card = game.draw()?;
            game.player.push(card);
        }
        for _ in 0..2 {
            let card = game.draw()?;
            game.dealer.push(card);
        }

        let player_natural = game.player_total() == 21;
        let dealer_natural = game.dealer_total() == 21;
        match (player_natural, dealer_natural) {
            (true, true) => game.settle(Resolution::BothBlackjack, 0),
            (true, false) => {
                let payout = game.stake.saturating_add(game.stake / 2);
                game.settle(Resolution::PlayerBlackjack, payout)
            }
            (false, true) => game.settle(Resolution::DealerBlackjack, -game.stake),
            (false, false) => game.phase = Phase::PlayerTurn,
        }

        Ok(game)
    }

    /// Apply one player action. A refused action leaves the game unchanged.
    pub fn act(&mut self, action: PlayerAction, available_cash: i64) -> Result<Phase, BlackjackError> {
        if self.phase != Phase::PlayerTurn {
            return Err(BlackjackError::NotPlayerTurn);
        }

        match action {
            PlayerAction::Hit => {
                let card = self.draw()?;
                self.player.push(card);
                if self.player_total() > 21 {
                    self.settle(Resolution::PlayerBust, -self.stake);
                }
            }
            PlayerAction::Stand => self.play_dealer()?,
            PlayerAction::Double => {
                self.check_double(available_cash)?;
                let card = self.draw()?;
                self.stake = self.stake.saturating_mul(2);
                self.player.push(card);
                if self.player_total() > 21 {
                    self.settle(Resolution::PlayerBust, -self.stake);
                } else {
                    self.play_dealer()?;
                }
            }
        }

        Ok(self.phase)
    }

    /// Settle as a full-stake loss. No-op unless waiting on the player.
    pub fn forfeit(&mut self) -> bool {
        if self.phase != Phase::PlayerTurn {
            return false;
        }
        self.settle(Resolution::TimedOut, -self.stake);
        true
    }

    pub fn check_double(&self, available_cash: i64) -> Result<(), BlackjackError> {
        if self.player.len() != 2 {
            return Err(BlackjackError::DoubleAfterHit);
        }
        let required = self.stake.saturating_mul(2);
        if available_cash < required {
            return Err(BlackjackError::DoubleUnfunded { required });
        }
        Ok(())
    }

    fn dealer_threshold(&self) -> u32 {
        let soft_seventeen = self.dealer.len() == 2 && self.dealer_total() == 17 && is_soft(&self.dealer);
        if self.hard && soft_seventeen {
            HARD_DEALER_STAND
        } else {
            DEALER_STAND
        }
    }

    fn play_dealer(&mut self) -> Result<(), BlackjackError> {
        self.phase = Phase::Resolving;
        let threshold = self.dealer_threshold();
        while self.dealer_total() < threshold {
            let card = self.draw()?;
            self.dealer.push(card);
        }

        let player = self.player_total();
        let dealer = self.dealer_total();
        if dealer > 21 {
            self.settle(Resolution::DealerBust, self.stake);
        } else if dealer > player {
            self.settle(Resolution::DealerHigher, -self.stake);
        } else if dealer < player {
            self.settle(Resolution::PlayerHigher, self.stake);
        } else {
            self.settle(Resolution::Tie, 0);
        }
        Ok(())
    }

    fn settle(&mut self, resolution: Resolution, net: i64) {
        self.resolution = Some(resolution);
        self.net = net;
        self.phase = Phase::Settled;
    }

    fn draw(&mut self) -> Result<Card, BlackjackError> {
        self.deck.draw().ok_or(BlackjackError::DeckExhausted)
    }

    pub fn view(&self, available_cash: i64, notice: Option<String>) -> TableView {
        TableView {
            player_hand: self.player.clone(),
            player_total: self.player_total(),
            dealer_upcard: self.dealer.first().copied(),
            stake: self.stake,
            hard_mode: self.hard,
            can_double: self.phase == Phase::PlayerTurn && self.check_double(available_cash).is_ok(),
            notice,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Signed cash change; only meaningful once settled
    pub fn net(&self) -> i64 {
        self.net
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.resolution.map(|_| GameOutcome::from_net(self.net))
    }

    pub fn stake(&self) -> i64 {
        self.stake
    }

    pub fn is_hard(&self) -> bool {
        self.hard
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer
    }

    pub fn player_total(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_total(&self) -> u32 {
        hand_value(&self.dealer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cards::{Rank, Suit};

    /// Deck dealing `ranks` in order, suits rotating so cards stay distinct enough
    fn deck(ranks: &[Rank]) -> Deck {
        Deck::stacked(
            ranks
                .iter()
                .enumerate()
                .map(|(i, &rank)| Card::new(rank, Suit::ALL[i % 4]))
                .collect(),
        )
    }

    // Deal order is player, player, dealer, dealer, then draws
    fn game(ranks: &[Rank], stake: i64, hard: bool) -> BlackjackGame {
        BlackjackGame::deal(deck(ranks), stake, hard).unwrap()
    }

    use Rank::*;

    #[test]
    fn test_both_naturals_push() {
        let g = game(&[Ace, King, Ace, Queen], 100, false);
        assert!(g.is_settled());
        assert_eq!(g.resolution(), Some(Resolution::BothBlackjack));
        assert_eq!(g.net(), 0);
        assert_eq!(g.outcome(), Some(GameOutcome::Push));
    }

    #[test]
    fn test_player_natural_pays_three_to_two() {
        let g = game(&[Ace, King, Nine, Eight], 101, false);
        assert_eq!(g.resolution(), Some(Resolution::PlayerBlackjack));
        assert_eq!(g.net(), 151);
    }

    #[test]
    fn test_dealer_natural_loses_stake() {
        let g = game(&[Nine, Eight, King, Ace], 100, false);
        assert_eq!(g.resolution(), Some(Resolution::DealerBlackjack));
        assert_eq!(g.net(), -100);
    }

    #[test]
    fn test_hit_until_bust() {
        let mut g = game(&[Two, Three, Ten, Seven, Four, King, Queen], 50, false);
        assert_eq!(g.phase(), Phase::PlayerTurn);

        assert_eq!(g.act(PlayerAction::Hit, 1000), Ok(Phase::PlayerTurn));
        assert_eq!(g.player_total(), 9);
        assert_eq!(g.act(PlayerAction::Hit, 1000), Ok(Phase::PlayerTurn));
        assert_eq!(g.player_total(), 19);
        assert_eq!(g.act(PlayerAction::Hit, 1000), Ok(Phase::Settled));
        assert_eq!(g.resolution(), Some(Resolution::PlayerBust));
        assert_eq!(g.net(), -50);
    }

    #[test]
    fn test_stand_comparisons() {
        let mut win = game(&[Ten, Nine, Ten, Seven], 40, false);
        win.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(win.resolution(), Some(Resolution::PlayerHigher));
        assert_eq!(win.net(), 40);

        let mut lose = game(&[Ten, Eight, Ten, Four, Five], 40, false);
        lose.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(lose.dealer_total(), 19);
        assert_eq!(lose.resolution(), Some(Resolution::DealerHigher));
        assert_eq!(lose.net(), -40);

        let mut bust = game(&[Ten, Eight, Ten, Six, King], 40, false);
        bust.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(bust.resolution(), Some(Resolution::DealerBust));
        assert_eq!(bust.net(), 40);

        let mut tie = game(&[Ten, Eight, Ten, Eight], 40, false);
        tie.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(tie.resolution(), Some(Resolution::Tie));
        assert_eq!(tie.outcome(), Some(GameOutcome::Push));
    }

    #[test]
    fn test_double_down_bust_loses_doubled_stake() {
        let mut g = game(&[Ten, Six, Ten, Seven, King], 100, false);
        assert_eq!(g.act(PlayerAction::Double, 1000), Ok(Phase::Settled));
        assert_eq!(g.stake(), 200);
        assert_eq!(g.player_hand().len(), 3);
        assert_eq!(g.resolution(), Some(Resolution::PlayerBust));
        assert_eq!(g.net(), -200);
    }

    #[test]
    fn test_double_down_win_pays_doubled_stake() {
        let mut g = game(&[Five, Six, Ten, Seven, Ten], 100, false);
        g.act(PlayerAction::Double, 200).unwrap();
        assert_eq!(g.player_total(), 21);
        assert_eq!(g.resolution(), Some(Resolution::PlayerHigher));
        assert_eq!(g.net(), 200);
    }

    #[test]
    fn test_refused_double_leaves_state_unchanged() {
        let mut g = game(&[Five, Six, Ten, Seven, Two, Ten], 100, false);

        assert_eq!(
            g.act(PlayerAction::Double, 199),
            Err(BlackjackError::DoubleUnfunded { required: 200 })
        );
        assert_eq!(g.stake(), 100);
        assert_eq!(g.player_hand().len(), 2);
        assert_eq!(g.phase(), Phase::PlayerTurn);
        assert!(!g.view(199, None).can_double);

        g.act(PlayerAction::Hit, 1000).unwrap();
        assert_eq!(g.act(PlayerAction::Double, 1000), Err(BlackjackError::DoubleAfterHit));
        assert_eq!(g.player_total(), 13);
    }

    #[test]
    fn test_hard_mode_hits_soft_seventeen() {
        let mut normal = game(&[Ten, Nine, Ace, Six, Two], 10, false);
        normal.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(normal.dealer_total(), 17);
        assert_eq!(normal.resolution(), Some(Resolution::PlayerHigher));

        let mut hard = game(&[Ten, Nine, Ace, Six, Two], 10, true);
        hard.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(hard.dealer_hand().len(), 3);
        assert_eq!(hard.dealer_total(), 19);
        assert_eq!(hard.resolution(), Some(Resolution::Tie));
    }

    #[test]
    fn test_hard_mode_keeps_hard_seventeen() {
        let mut g = game(&[Ten, Nine, Ten, Seven, Two], 10, true);
        g.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(g.dealer_hand().len(), 2);
        assert_eq!(g.resolution(), Some(Resolution::PlayerHigher));
    }

    #[test]
    fn test_hard_mode_stands_on_drawn_soft_seventeen() {
        // Dealer A,2 draws a four: soft 17 on three cards
        let mut g = game(&[Ten, Nine, Ace, Two, Four, Three], 10, true);
        g.act(PlayerAction::Stand, 1000).unwrap();
        assert_eq!(g.dealer_hand().len(), 3);
        assert_eq!(g.dealer_total(), 17);
        assert_eq!(g.resolution(), Some(Resolution::PlayerHigher));
    }

    #[test]
    fn test_forfeit_only_during_player_turn() {
        let mut g = game(&[Ten, Six, Ten, Seven], 300, false);
        assert!(g.forfeit());
        assert_eq!(g.resolution(), Some(Resolution::TimedOut));
        assert_eq!(g.net(), -300);

        assert!(!g.forfeit());
        assert_eq!(g.act(PlayerAction::Hit, 1000), Err(BlackjackError::NotPlayerTurn));
    }

    #[test]
    fn test_short_deck_reports_exhaustion() {
        assert_eq!(
            BlackjackGame::deal(deck(&[Ten, Six, Ten]), 10, false).err(),
            Some(BlackjackError::DeckExhausted)
        );
    }

    #[test]
    fn test_view_hides_dealer_hole_card() {
        let g = game(&[Ten, Six, Nine, Seven], 25, true);
        let view = g.view(50, Some("note".to_string()));
        assert_eq!(view.dealer_upcard.map(|c| c.rank), Some(Nine));
        assert_eq!(view.player_total, 16);
        assert!(view.can_double);
        assert!(view.hard_mode);
        assert_eq!(view.notice.as_deref(), Some("note"));
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("HIT".parse::<PlayerAction>(), Ok(PlayerAction::Hit));
        assert_eq!("d".parse::<PlayerAction>(), Ok(PlayerAction::Double));
        assert!("split".parse::<PlayerAction>().is_err());
    }
}
