//! Single-shot wagers: coin flip and slots

use super::{Casino, CoinFlipReport, SlotsReport};
use crate::errors::{CasinoError, CasinoResult};
use crate::games::coinflip::{self, CoinFlip};
use crate::games::slots::{SlotSpin, Symbol, REELS};
use crate::games::{CoinSide, GameType};
use tracing::info;

impl Casino {
    /// Call a side and flip
    pub async fn coinflip(&self, user_id: &str, raw_bet: &str, call: &str) -> CasinoResult<CoinFlipReport> {
        let landed = coinflip::flip(&mut rand::thread_rng());
        self.coinflip_landing(user_id, raw_bet, call, landed).await
    }

    /// Coin flip with the landed side supplied by the caller
    pub async fn coinflip_landing(
        &self,
        user_id: &str,
        raw_bet: &str,
        call: &str,
        landed: CoinSide,
    ) -> CasinoResult<CoinFlipReport> {
        let result = self.run_coinflip(user_id, raw_bet, call, landed).await;
        self.observe(GameType::CoinFlip.command(), user_id, result)
    }

    async fn run_coinflip(
        &self,
        user_id: &str,
        raw_bet: &str,
        call: &str,
        landed: CoinSide,
    ) -> CasinoResult<CoinFlipReport> {
        let command = GameType::CoinFlip.command();
        let call: CoinSide = call.parse().map_err(CasinoError::InvalidArgument)?;
        self.cooldowns.ensure_ready(user_id, command).await?;

        let account = self.store.get_or_create_account(user_id).await?;
        let stake = Self::validate_stake(raw_bet, &account)?;

        let flip = CoinFlip::resolve(call, landed, stake);
        let xp = self.config.economy.xp.coinflip;
        let (account, leveled_up) = self
            .settle(user_id, GameType::CoinFlip, stake, flip.net, xp, true)
            .await?;
        self.cooldowns.arm(user_id, command).await?;

        info!(user_id, stake, %call, %landed, net = flip.net, "Coin flip settled");
        Ok(CoinFlipReport {
            flip,
            outcome: flip.outcome(),
            cash: account.cash,
            leveled_up,
        })
    }

    /// Spin the three reels
    pub async fn slots(&self, user_id: &str, raw_bet: &str) -> CasinoResult<SlotsReport> {
        let reels = self.reel.spin(&mut rand::thread_rng());
        self.slots_showing(user_id, raw_bet, reels).await
    }

    /// Slots with the reel result supplied by the caller
    pub async fn slots_showing(&self, user_id: &str, raw_bet: &str, reels: [Symbol; REELS]) -> CasinoResult<SlotsReport> {
        let result = self.run_slots(user_id, raw_bet, reels).await;
        self.observe(GameType::Slots.command(), user_id, result)
    }

    async fn run_slots(&self, user_id: &str, raw_bet: &str, reels: [Symbol; REELS]) -> CasinoResult<SlotsReport> {
        let command = GameType::Slots.command();
        self.cooldowns.ensure_ready(user_id, command).await?;

        let account = self.store.get_or_create_account(user_id).await?;
        let stake = Self::validate_stake(raw_bet, &account)?;

        let spin = SlotSpin::resolve(reels, stake);
        let xp = self.config.economy.xp.slots;
        let (account, leveled_up) = self
            .settle(user_id, GameType::Slots, stake, spin.net, xp, true)
            .await?;
        self.cooldowns.arm(user_id, command).await?;

        info!(user_id, stake, multiplier = spin.multiplier, net = spin.net, "Slots settled");
        Ok(SlotsReport {
            spin,
            outcome: spin.outcome(),
            cash: account.cash,
            leveled_up,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{casino, casino_with};
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::games::GameOutcome;

    #[tokio::test]
    async fn test_coinflip_loss_deducts_stake() {
        let (_dir, casino) = casino().await;
        let report = casino
            .coinflip_landing("100", "500", "heads", CoinSide::Tails)
            .await
            .unwrap();
        assert_eq!(report.outcome, GameOutcome::Loss);
        assert_eq!(report.cash, 500);

        let account = casino.store().get_or_create_account("100").await.unwrap();
        assert_eq!(account.cash, 500);
        assert_eq!(account.losses, 1);
        assert_eq!(account.total_cash_lost, 500);
        assert_eq!(account.xp, 1);
    }

    #[tokio::test]
    async fn test_coinflip_win_and_aggregate() {
        let (_dir, casino) = casino().await;
        let report = casino
            .coinflip_landing("100", "1k", "h", CoinSide::Heads)
            .await
            .unwrap();
        assert_eq!(report.cash, 2000);

        let stats = casino.store().global_stats().await.unwrap();
        assert_eq!(stats.total_bets, 1);
        assert_eq!(stats.total_cash_won, 1000);
    }

    #[tokio::test]
    async fn test_invalid_input_has_no_side_effects() {
        let (_dir, casino) = casino().await;
        assert!(matches!(
            casino.coinflip_landing("1", "abc", "heads", CoinSide::Heads).await,
            Err(CasinoError::InvalidBet)
        ));
        assert!(matches!(
            casino.coinflip_landing("1", "10", "edge", CoinSide::Heads).await,
            Err(CasinoError::InvalidArgument(_))
        ));

        let stats = casino.store().global_stats().await.unwrap();
        assert_eq!(stats.total_bets, 0);
        let account = casino.store().get_or_create_account("1").await.unwrap();
        assert_eq!(account.games_played, 0);
        assert!(account.cooldowns.is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_armed_only_after_success() {
        let config = ConfigBuilder::new().without_cooldowns().cooldown("coinflip", 5.0).build();
        let (_dir, casino) = casino_with(config).await;

        // A rejected bet does not start the cooldown
        assert!(casino.coinflip_landing("1", "0", "heads", CoinSide::Heads).await.is_err());
        casino
            .coinflip_landing("1", "10", "heads", CoinSide::Heads)
            .await
            .unwrap();

        match casino.coinflip_landing("1", "10", "heads", CoinSide::Heads).await {
            Err(CasinoError::OnCooldown { command, .. }) => assert_eq!(command, "coinflip"),
            other => panic!("expected cooldown, got {:?}", other.map(|r| r.cash)),
        }
    }

    #[tokio::test]
    async fn test_slots_win_and_loss() {
        let (_dir, casino) = casino().await;

        let won = casino.slots_showing("7", "100", [Symbol::Bar; 3]).await.unwrap();
        assert_eq!(won.spin.net, 500);
        assert_eq!(won.cash, 1500);

        let lost = casino
            .slots_showing("7", "100", [Symbol::Seven, Symbol::Bar, Symbol::Cherry])
            .await
            .unwrap();
        assert_eq!(lost.outcome, GameOutcome::Loss);
        assert_eq!(lost.cash, 1400);

        let account = casino.store().get_or_create_account("7").await.unwrap();
        assert_eq!(account.wins, 1);
        assert_eq!(account.losses, 1);
        assert_eq!(account.xp, 6);
    }

    #[tokio::test]
    async fn test_random_commands_settle() {
        let (_dir, casino) = casino().await;
        let flip = casino.coinflip("9", "10", "tails").await.unwrap();
        assert!(flip.cash == 990 || flip.cash == 1010);
        casino.slots("9", "10").await.unwrap();

        let account = casino.store().get_or_create_account("9").await.unwrap();
        assert_eq!(account.games_played, 2);
    }
}
