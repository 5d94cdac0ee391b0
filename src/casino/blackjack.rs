//! Interactive blackjack sessions
//!
//! Order of a session: cooldown check, claim the user's session slot, validate
//! the stake, deal, drive player turns until settled, book the result, arm the
//! cooldown. The slot is released when the ticket drops, whichever way the
//! function exits.

use super::{BlackjackReport, Casino};
use crate::errors::{CasinoError, CasinoResult};
use crate::games::{ActionSource, BlackjackGame, Deck, GameOutcome, GameType, Phase, PlayerAction};
use tracing::{debug, info, warn};

impl Casino {
    /// Play one hand against a freshly shuffled deck
    pub async fn blackjack(
        &self,
        user_id: &str,
        raw_bet: &str,
        hard: bool,
        actions: &mut dyn ActionSource,
    ) -> CasinoResult<BlackjackReport> {
        let deck = Deck::shuffled(&mut rand::thread_rng());
        self.blackjack_with_deck(user_id, raw_bet, hard, deck, actions).await
    }

    /// Play one hand dealing from `deck`
    pub async fn blackjack_with_deck(
        &self,
        user_id: &str,
        raw_bet: &str,
        hard: bool,
        deck: Deck,
        actions: &mut dyn ActionSource,
    ) -> CasinoResult<BlackjackReport> {
        let result = self.run_blackjack(user_id, raw_bet, hard, deck, actions).await;
        self.metrics.set_active_sessions(self.sessions.active_count());
        self.observe(GameType::Blackjack.command(), user_id, result)
    }

    async fn run_blackjack(
        &self,
        user_id: &str,
        raw_bet: &str,
        hard: bool,
        deck: Deck,
        actions: &mut dyn ActionSource,
    ) -> CasinoResult<BlackjackReport> {
        let command = GameType::Blackjack.command();
        self.cooldowns.ensure_ready(user_id, command).await?;

        let ticket = self.sessions.try_acquire(user_id)?;
        self.metrics.set_active_sessions(self.sessions.active_count());

        let account = self.store.get_or_create_account(user_id).await?;
        let stake = Self::validate_stake(raw_bet, &account)?;

        let mut game = BlackjackGame::deal(deck, stake, hard)?;
        info!(
            user_id,
            session_id = ticket.session_id(),
            stake,
            hard,
            "Blackjack hand dealt"
        );

        self.drive_turns(user_id, &mut game, actions).await?;
        let resolution = game
            .resolution()
            .ok_or_else(|| CasinoError::InvalidAction("hand ended without a result".to_string()))?;

        // No escrow: the loss is booked even if the balance moved meanwhile
        let xp = self.config.economy.xp.blackjack;
        let (account, leveled_up) = self
            .settle(user_id, GameType::Blackjack, game.stake(), game.net(), xp, false)
            .await?;
        self.cooldowns.arm(user_id, command).await?;
        drop(ticket);

        info!(user_id, %resolution, stake = game.stake(), net = game.net(), "Blackjack hand settled");
        Ok(BlackjackReport {
            player_hand: game.player_hand().to_vec(),
            dealer_hand: game.dealer_hand().to_vec(),
            player_total: game.player_total(),
            dealer_total: game.dealer_total(),
            stake: game.stake(),
            hard_mode: game.is_hard(),
            resolution,
            outcome: GameOutcome::from_net(game.net()),
            net: game.net(),
            cash: account.cash,
            leveled_up,
        })
    }

    /// Wait for player actions until the hand leaves the player's turn.
    ///
    /// Each wait is bounded by the configured timeout; a timeout or a closed
    /// transport forfeits the hand.
    async fn drive_turns(
        &self,
        user_id: &str,
        game: &mut BlackjackGame,
        actions: &mut dyn ActionSource,
    ) -> CasinoResult<()> {
        let timeout = self.config.blackjack.action_timeout();
        let mut notice = None;

        while game.phase() == Phase::PlayerTurn {
            let cash = self.store.get_or_create_account(user_id).await?.cash;
            let view = game.view(cash, notice.take());

            let action = match tokio::time::timeout(timeout, actions.next_action(&view)).await {
                Ok(Some(action)) => action,
                Ok(None) => {
                    info!(user_id, "Action source closed, forfeiting hand");
                    game.forfeit();
                    break;
                }
                Err(_) => {
                    info!(user_id, timeout_secs = timeout.as_secs_f64(), "Blackjack action timed out");
                    game.forfeit();
                    break;
                }
            };

            // Funds for a double are checked against the balance as it is now
            let available = if action == PlayerAction::Double {
                self.store.get_or_create_account(user_id).await?.cash
            } else {
                cash
            };

            match game.act(action, available) {
                Ok(phase) => debug!(user_id, %action, ?phase, "Blackjack action applied"),
                Err(e) => {
                    warn!(user_id, %action, "Blackjack action refused: {}", e);
                    notice = Some(e.to_string());
                }
            }

            if game.phase() == Phase::Resolving {
                // Only reachable when the dealer could not finish drawing
                return Err(CasinoError::InvalidAction("the deck ran out of cards".to_string()));
            }
        }

        Ok(())
    }
}
