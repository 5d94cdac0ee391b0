//! Read-only account views

use super::{Casino, CooldownListing, LeaderboardEntry, Profile};
use crate::errors::{CasinoError, CasinoResult};
use crate::ledger::RankField;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

impl Casino {
    pub async fn profile(&self, user_id: &str) -> CasinoResult<Profile> {
        let account = self.store.get_or_create_account(user_id).await?;
        Ok(Profile::from_account(user_id, &account))
    }

    /// Top accounts by `category`, highest first
    pub async fn leaderboard(&self, category: &str, limit: usize) -> CasinoResult<Vec<LeaderboardEntry>> {
        let field: RankField = category.parse().map_err(CasinoError::InvalidArgument)?;
        let ranked = self.store.rank_accounts(field, limit).await?;

        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(i, (user_id, account))| {
                let key = field.key(&account);
                let value = i64::try_from(key).unwrap_or(if key > 0 { i64::MAX } else { i64::MIN });
                LeaderboardEntry {
                    rank: i + 1,
                    user_id,
                    field,
                    value,
                    level: account.level,
                }
            })
            .collect())
    }

    pub async fn cooldowns(&self, user_id: &str) -> CasinoResult<CooldownListing> {
        Ok(CooldownListing {
            user_id: user_id.to_string(),
            cooldowns: self.cooldowns.list(user_id).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::casino;
    use super::*;
    use crate::games::CoinSide;

    #[tokio::test]
    async fn test_leaderboard_by_profit() {
        let (_dir, casino) = casino().await;
        casino.coinflip_landing("a", "500", "heads", CoinSide::Heads).await.unwrap();
        casino.coinflip_landing("b", "200", "heads", CoinSide::Tails).await.unwrap();
        casino.coinflip_landing("c", "100", "heads", CoinSide::Heads).await.unwrap();

        let board = casino.leaderboard("profit", DEFAULT_LEADERBOARD_SIZE).await.unwrap();
        let order: Vec<(&str, i64)> = board.iter().map(|e| (e.user_id.as_str(), e.value)).collect();
        assert_eq!(order, vec![("a", 500), ("c", 100), ("b", -200)]);
        assert_eq!(board[0].rank, 1);

        let top_cash = casino.leaderboard("cash", 1).await.unwrap();
        assert_eq!(top_cash.len(), 1);
        assert_eq!(top_cash[0].value, 1500);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let (_dir, casino) = casino().await;
        assert!(matches!(
            casino.leaderboard("luck", 10).await,
            Err(CasinoError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_and_cooldown_listing() {
        let (_dir, casino) = casino().await;
        casino.coinflip_landing("p", "100", "tails", CoinSide::Tails).await.unwrap();
        casino.coinflip_landing("p", "100", "tails", CoinSide::Heads).await.unwrap();

        let profile = casino.profile("p").await.unwrap();
        assert_eq!(profile.games_played, 2);
        assert_eq!(profile.win_rate, Some(50.0));
        assert_eq!(profile.profit, 0);

        casino.cooldown_registry().arm_for("p", "work", 60.0).await.unwrap();
        let listing = casino.cooldowns("p").await.unwrap();
        assert_eq!(listing.cooldowns.len(), 1);
        assert!(!listing.cooldowns[0].is_ready());
    }
}
