//! Command service
//!
//! `Casino` is the inbound surface the chat front end calls into: each
//! command takes a resolved user id plus raw argument strings and returns a
//! serializable report. It owns the ledger handle, cooldown registry, session
//! guard and metrics.

mod blackjack;
mod earnings;
mod reports;
mod standings;
mod wagers;

pub use reports::*;
pub use standings::DEFAULT_LEADERBOARD_SIZE;

use crate::bet::parse_bet;
use crate::config::CasinoConfig;
use crate::cooldowns::CooldownRegistry;
use crate::errors::{CasinoError, CasinoResult};
use crate::games::slots::Reel;
use crate::games::{GameOutcome, GameType, SessionGuard};
use crate::ledger::{Account, LedgerStore};
use crate::metrics::CasinoMetrics;
use std::sync::Arc;
use tracing::{debug, error};

pub struct Casino {
    store: Arc<dyn LedgerStore>,
    cooldowns: CooldownRegistry,
    sessions: SessionGuard,
    reel: Reel,
    metrics: Arc<CasinoMetrics>,
    config: CasinoConfig,
}

impl Casino {
    pub fn new(store: Arc<dyn LedgerStore>, config: CasinoConfig) -> CasinoResult<Self> {
        let metrics = Arc::new(CasinoMetrics::new()?);
        Self::with_metrics(store, config, metrics)
    }

    pub fn with_metrics(
        store: Arc<dyn LedgerStore>,
        config: CasinoConfig,
        metrics: Arc<CasinoMetrics>,
    ) -> CasinoResult<Self> {
        let cooldowns = CooldownRegistry::new(store.clone(), config.economy.cooldowns.clone());
        Ok(Self {
            store,
            cooldowns,
            sessions: SessionGuard::new(),
            reel: Reel::new()?,
            metrics,
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionGuard {
        &self.sessions
    }

    pub fn metrics(&self) -> &Arc<CasinoMetrics> {
        &self.metrics
    }

    pub fn cooldown_registry(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    /// Resolve a bet token against the account's balance
    fn validate_stake(raw_bet: &str, account: &Account) -> CasinoResult<i64> {
        let stake = parse_bet(raw_bet, account.cash);
        if stake < 1 {
            return Err(CasinoError::InvalidBet);
        }
        if stake > account.cash {
            return Err(CasinoError::InsufficientFunds {
                stake,
                available: account.cash,
            });
        }
        Ok(stake)
    }

    /// Book a resolved wager on the account and the global aggregate.
    ///
    /// With `require_funds` the balance is re-checked inside the atomic
    /// update, so a race that drained the account rejects instead of
    /// overdrawing.
    async fn settle(
        &self,
        user_id: &str,
        game: GameType,
        stake: i64,
        net: i64,
        xp: u64,
        require_funds: bool,
    ) -> CasinoResult<(Account, Option<u64>)> {
        let mut leveled_up = None;
        let account = self
            .store
            .modify_account(
                user_id,
                Box::new(|account: &mut Account| {
                    if require_funds && account.cash < stake {
                        return Err(CasinoError::InsufficientFunds {
                            stake,
                            available: account.cash,
                        });
                    }
                    leveled_up = account.settle_wager(net, xp);
                    Ok(())
                }),
            )
            .await?;

        self.store.record_wager(stake, net > 0).await?;
        let outcome = GameOutcome::from_net(net);
        self.metrics.record_game(game, outcome, stake);
        debug!(user_id, %game, stake, net, %outcome, "Wager settled");

        Ok((account, leveled_up))
    }

    /// Count rejections and log faults on the way out of a command
    fn observe<T>(&self, command: &str, user_id: &str, result: CasinoResult<T>) -> CasinoResult<T> {
        if let Err(e) = &result {
            if e.is_user_facing() {
                self.metrics.record_rejection(e.reason());
                debug!(user_id, command, reason = e.reason(), "Command rejected");
            } else {
                error!(user_id, command, "Command failed: {}", e);
            }
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::storage::JsonLedger;
    use tempfile::TempDir;

    pub async fn casino_with(config: CasinoConfig) -> (TempDir, Casino) {
        let dir = TempDir::new().unwrap();
        let ledger = JsonLedger::open(dir.path().join("data.json"), config.economy.starting_cash)
            .await
            .unwrap();
        let casino = Casino::new(Arc::new(ledger), config).unwrap();
        (dir, casino)
    }

    pub async fn casino() -> (TempDir, Casino) {
        casino_with(ConfigBuilder::new().without_cooldowns().build()).await
    }
}
