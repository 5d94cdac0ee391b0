//! Stipends and the vote reward preview

use super::{Casino, EarningsReport, VoteReward};
use crate::errors::CasinoResult;
use crate::ledger::Account;
use tracing::info;

/// Pay for one shift of work at `level`
pub fn work_earnings(level: u64) -> i64 {
    100i64.saturating_add((level.min(i64::MAX as u64) as i64).saturating_mul(50))
}

/// Daily reward at `level`
pub fn daily_earnings(level: u64) -> i64 {
    1000i64.saturating_add((level.min(i64::MAX as u64) as i64).saturating_mul(500))
}

impl Casino {
    pub async fn work(&self, user_id: &str) -> CasinoResult<EarningsReport> {
        let xp = self.config.economy.xp.work;
        let result = self.collect(user_id, "work", work_earnings, xp).await;
        self.observe("work", user_id, result)
    }

    pub async fn daily(&self, user_id: &str) -> CasinoResult<EarningsReport> {
        let xp = self.config.economy.xp.daily;
        let result = self.collect(user_id, "daily", daily_earnings, xp).await;
        self.observe("daily", user_id, result)
    }

    /// Shared stipend path; earnings are computed from the level inside the
    /// atomic update
    async fn collect(
        &self,
        user_id: &str,
        command: &str,
        earnings_for: fn(u64) -> i64,
        xp: u64,
    ) -> CasinoResult<EarningsReport> {
        self.cooldowns.ensure_ready(user_id, command).await?;

        let mut earned = 0;
        let mut leveled_up = None;
        let account = self
            .store
            .modify_account(
                user_id,
                Box::new(|account: &mut Account| {
                    earned = earnings_for(account.level);
                    leveled_up = account.credit_earnings(earned, xp);
                    Ok(())
                }),
            )
            .await?;
        self.cooldowns.arm(user_id, command).await?;

        info!(user_id, command, earned, "Stipend collected");
        Ok(EarningsReport {
            command: command.to_string(),
            earned,
            cash: account.cash,
            level: account.level,
            xp: account.xp,
            leveled_up,
        })
    }

    /// What the user's next vote would pay. Read-only.
    pub async fn vote_preview(&self, user_id: &str) -> CasinoResult<VoteReward> {
        let account = self.store.get_or_create_account(user_id).await?;
        Ok(VoteReward::for_account(&account))
    }
}
