//! Prometheus metrics for game and command activity

use crate::errors::CasinoResult;
use crate::games::{GameOutcome, GameType};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct CasinoMetrics {
    registry: Registry,
    games_total: IntCounterVec,
    wagered_total: IntCounter,
    active_sessions: IntGauge,
    rejected_total: IntCounterVec,
}

impl CasinoMetrics {
    pub fn new() -> CasinoResult<Self> {
        let registry = Registry::new_custom(Some("casino".to_string()), None)?;

        let games_total = IntCounterVec::new(
            Opts::new("games_total", "Settled games by game and outcome"),
            &["game", "outcome"],
        )?;
        let wagered_total = IntCounter::new("wagered_total", "Total cash staked across settled games")?;
        let active_sessions = IntGauge::new(
            "active_blackjack_sessions",
            "Blackjack sessions currently waiting on a player",
        )?;
        let rejected_total = IntCounterVec::new(
            Opts::new("commands_rejected_total", "Commands refused before settlement"),
            &["reason"],
        )?;

        registry.register(Box::new(games_total.clone()))?;
        registry.register(Box::new(wagered_total.clone()))?;
        registry.register(Box::new(active_sessions.clone()))?;
        registry.register(Box::new(rejected_total.clone()))?;

        Ok(Self {
            registry,
            games_total,
            wagered_total,
            active_sessions,
            rejected_total,
        })
    }

    pub fn record_game(&self, game: GameType, outcome: GameOutcome, stake: i64) {
        self.games_total
            .with_label_values(&[game.command(), &outcome.to_string()])
            .inc();
        self.wagered_total.inc_by(stake.max(0) as u64);
    }

    pub fn record_rejection(&self, reason: &str) {
        self.rejected_total.with_label_values(&[reason]).inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    /// Text exposition format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
