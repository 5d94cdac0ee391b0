pub mod blackjack;
pub mod cards;
pub mod coinflip;
pub mod session;
pub mod slots;
pub mod types;

pub use blackjack::{BlackjackError, BlackjackGame, Phase, PlayerAction, Resolution, TableView};
pub use cards::{hand_value, is_soft, Card, Deck, Rank, Suit};
pub use coinflip::CoinFlip;
pub use session::{ActionSource, ChannelActions, ScriptedActions, SessionGuard, SessionTicket};
pub use slots::{Reel, SlotSpin, Symbol};
pub use types::*;
