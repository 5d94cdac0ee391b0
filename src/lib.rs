//! Rocket Casino - chat economy and gambling engine
//!
//! Users earn virtual cash through stipends and wager it on coin flips,
//! slots and interactive blackjack. Balances, progression and aggregate
//! stats live in a write-through JSON ledger; blackjack hands are driven by
//! an injected action source with a bounded wait per turn.

pub mod api;
pub mod bet;
pub mod casino;
pub mod config;
pub mod cooldowns;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod metrics;
pub mod storage;

pub use bet::parse_bet;
pub use casino::Casino;
pub use config::{CasinoConfig, ConfigBuilder, ConfigLoader};
pub use cooldowns::CooldownRegistry;
pub use errors::{CasinoError, CasinoResult};
pub use games::{ActionSource, BlackjackGame, ChannelActions, PlayerAction, SessionGuard};
pub use ledger::{Account, LedgerStore};
pub use storage::JsonLedger;
