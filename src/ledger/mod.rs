//! Ledger of per-user accounts and global wager aggregates
//!
//! `LedgerStore` is the storage seam: game logic only talks to this trait, so
//! the file-backed [`JsonLedger`](crate::storage::JsonLedger) can be swapped for
//! a transactional database without touching the games.

pub mod types;

pub use types::*;

use crate::errors::CasinoResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Atomic edit applied to one account under the store lock.
///
/// Returning an error leaves the stored account unchanged.
pub type AccountMutation<'a> = Box<dyn FnOnce(&mut Account) -> CasinoResult<()> + Send + 'a>;

/// Durable account store. Every operation is serialized against every other
/// operation on the same store instance.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Existing record, or a freshly defaulted one that is persisted first
    async fn get_or_create_account(&self, user_id: &str) -> CasinoResult<Account>;

    /// Overwrite the record entirely and persist before returning
    async fn replace_account(&self, user_id: &str, account: Account) -> CasinoResult<()>;

    /// Read-modify-write of a single account as one atomic step
    async fn modify_account(&self, user_id: &str, mutation: AccountMutation<'_>) -> CasinoResult<Account>;

    /// Accounts sorted descending by `field`, ties in id order, at most `limit`
    async fn rank_accounts(&self, field: RankField, limit: usize) -> CasinoResult<Vec<(String, Account)>>;

    /// Count one settled wager in the global aggregates
    async fn record_wager(&self, stake: i64, won: bool) -> CasinoResult<()>;

    /// Snapshot of the global aggregates
    async fn global_stats(&self) -> CasinoResult<GlobalStats>;

    /// Number of stored accounts
    async fn account_count(&self) -> CasinoResult<usize>;

    async fn get_cooldowns(&self, user_id: &str) -> CasinoResult<BTreeMap<String, f64>> {
        Ok(self.get_or_create_account(user_id).await?.cooldowns)
    }

    async fn set_cooldown(&self, user_id: &str, command: &str, expiry: f64) -> CasinoResult<()> {
        let command = command.to_string();
        self.modify_account(
            user_id,
            Box::new(move |account: &mut Account| {
                account.cooldowns.insert(command, expiry);
                Ok(())
            }),
        )
        .await?;
        Ok(())
    }
}
