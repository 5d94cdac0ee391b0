//! Per-user command cooldowns
//!
//! Two-phase contract: `check` before running a command, `arm` only after it
//! completed successfully. A rejected or failed command leaves the cooldown as
//! it was.

use crate::errors::{CasinoError, CasinoResult};
use crate::ledger::LedgerStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Seconds since the Unix epoch as used for stored expiries
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// One stored cooldown, as listed to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub command: String,
    pub expires_at: f64,
    /// Seconds left; zero or less means ready
    pub remaining: f64,
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }
}

pub struct CooldownRegistry {
    store: Arc<dyn LedgerStore>,
    durations: BTreeMap<String, f64>,
}

impl CooldownRegistry {
    pub fn new(store: Arc<dyn LedgerStore>, durations: BTreeMap<String, f64>) -> Self {
        Self { store, durations }
    }

    /// Configured duration for `command`, if it has one
    pub fn duration(&self, command: &str) -> Option<f64> {
        self.durations.get(command).copied()
    }

    /// Remaining seconds, or `None` when the command is ready
    pub async fn check(&self, user_id: &str, command: &str) -> CasinoResult<Option<f64>> {
        self.check_at(user_id, command, unix_now()).await
    }

    pub async fn check_at(&self, user_id: &str, command: &str, now: f64) -> CasinoResult<Option<f64>> {
        let cooldowns = self.store.get_cooldowns(user_id).await?;
        Ok(cooldowns
            .get(command)
            .map(|expiry| expiry - now)
            .filter(|remaining| *remaining > 0.0))
    }

    /// `check`, turned into an error when still cooling down
    pub async fn ensure_ready(&self, user_id: &str, command: &str) -> CasinoResult<()> {
        match self.check(user_id, command).await? {
            Some(remaining) => Err(CasinoError::OnCooldown {
                command: command.to_string(),
                remaining,
            }),
            None => Ok(()),
        }
    }

    /// Start the configured cooldown; commands without one are left alone
    pub async fn arm(&self, user_id: &str, command: &str) -> CasinoResult<()> {
        match self.duration(command) {
            Some(secs) => self.arm_at(user_id, command, secs, unix_now()).await,
            None => Ok(()),
        }
    }

    pub async fn arm_for(&self, user_id: &str, command: &str, secs: f64) -> CasinoResult<()> {
        self.arm_at(user_id, command, secs, unix_now()).await
    }

    pub async fn arm_at(&self, user_id: &str, command: &str, secs: f64, now: f64) -> CasinoResult<()> {
        let expiry = now + secs;
        debug!(user_id, command, expiry, "Arming cooldown");
        self.store.set_cooldown(user_id, command, expiry).await
    }

    /// Every stored cooldown with its remaining time at `now`
    pub async fn list_at(&self, user_id: &str, now: f64) -> CasinoResult<Vec<CooldownStatus>> {
        let cooldowns = self.store.get_cooldowns(user_id).await?;
        Ok(cooldowns
            .into_iter()
            .map(|(command, expires_at)| CooldownStatus {
                command,
                expires_at,
                remaining: expires_at - now,
            })
            .collect())
    }

    pub async fn list(&self, user_id: &str) -> CasinoResult<Vec<CooldownStatus>> {
        self.list_at(user_id, unix_now()).await
    }
}
