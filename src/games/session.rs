//! Blackjack session exclusivity and the player-action transport

use crate::errors::{CasinoError, CasinoResult};
use crate::games::blackjack::{PlayerAction, TableView};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Bookkeeping for a user's unresolved blackjack hand
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}

/// Thread-safe set of users with an unresolved blackjack session
#[derive(Clone, Default)]
pub struct SessionGuard {
    /// Map of user_id -> active session
    active: Arc<DashMap<String, ActiveSession>>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the user's slot. The existence check and insert happen under one
    /// shard lock, so two racing starts cannot both succeed.
    pub fn try_acquire(&self, user_id: &str) -> CasinoResult<SessionTicket> {
        match self.active.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(CasinoError::SessionActive {
                user_id: user_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                let session_id = uuid::Uuid::new_v4().to_string();
                slot.insert(ActiveSession {
                    session_id: session_id.clone(),
                    started_at: Utc::now(),
                });
                debug!(user_id, %session_id, "Blackjack session opened");
                Ok(SessionTicket {
                    active: Arc::clone(&self.active),
                    user_id: user_id.to_string(),
                    session_id,
                })
            }
        }
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.active.contains_key(user_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, user_id: &str) -> Option<ActiveSession> {
        self.active.get(user_id).map(|entry| entry.value().clone())
    }
}

/// Proof of a held session slot. Dropping it releases the slot, which covers
/// normal settlement, early returns and unwinding alike.
#[derive(Debug)]
pub struct SessionTicket {
    active: Arc<DashMap<String, ActiveSession>>,
    user_id: String,
    session_id: String,
}

impl SessionTicket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        let released = self
            .active
            .remove_if(&self.user_id, |_, session| session.session_id == self.session_id)
            .is_some();
        debug!(user_id = %self.user_id, session_id = %self.session_id, released, "Blackjack session closed");
    }
}

/// Delivers the player's next decision. `None` means the transport went away.
#[async_trait]
pub trait ActionSource: Send {
    async fn next_action(&mut self, view: &TableView) -> Option<PlayerAction>;
}

/// Action source fed through a tokio channel
pub struct ChannelActions {
    rx: mpsc::Receiver<PlayerAction>,
}

impl ChannelActions {
    pub fn new(rx: mpsc::Receiver<PlayerAction>) -> Self {
        Self { rx }
    }

    /// Bounded channel pair; the sender side goes to whatever reads player input
    pub fn channel(buffer: usize) -> (mpsc::Sender<PlayerAction>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ActionSource for ChannelActions {
    async fn next_action(&mut self, _view: &TableView) -> Option<PlayerAction> {
        self.rx.recv().await
    }
}

/// Replays a fixed list of actions, then reports the transport closed
pub struct ScriptedActions {
    actions: std::collections::VecDeque<PlayerAction>,
}

impl ScriptedActions {
    pub fn new<I: IntoIterator<Item = PlayerAction>>(actions: I) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ActionSource for ScriptedActions {
    async fn next_action(&mut self, _view: &TableView) -> Option<PlayerAction> {
        self.actions.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected() {
        let guard = SessionGuard::new();
        let ticket = guard.try_acquire("42").unwrap();
        let first_id = guard.get("42").unwrap().session_id;

        match guard.try_acquire("42") {
            Err(CasinoError::SessionActive { user_id }) => assert_eq!(user_id, "42"),
            other => panic!("expected conflict, got {:?}", other.map(|t| t.session_id().to_string())),
        }
        // The first session is untouched
        assert_eq!(guard.get("42").unwrap().session_id, first_id);
        assert_eq!(ticket.session_id(), first_id);
        assert!(guard.try_acquire("43").is_ok());
    }

    #[test]
    fn test_drop_releases_slot() {
        let guard = SessionGuard::new();
        {
            let _ticket = guard.try_acquire("7").unwrap();
            assert!(guard.is_active("7"));
            assert_eq!(guard.active_count(), 1);
        }
        assert!(!guard.is_active("7"));
        assert!(guard.try_acquire("7").is_ok());
    }

    #[test]
    fn test_release_on_panic() {
        let guard = SessionGuard::new();
        let cloned = guard.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _ticket = cloned.try_acquire("9").unwrap();
            panic!("fault mid-session");
        }));
        assert!(result.is_err());
        assert!(!guard.is_active("9"));
    }

    #[test]
    fn test_concurrent_acquire_admits_one() {
        let guard = SessionGuard::new();
        let barrier = Arc::new(std::sync::Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let guard = guard.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    // Hold the ticket until every thread has tried
                    let ticket = guard.try_acquire("race").ok();
                    std::thread::sleep(std::time::Duration::from_millis(200));
                    ticket.is_some()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(!guard.is_active("race"));
    }

    #[tokio::test]
    async fn test_channel_actions_close() {
        let (tx, mut source) = ChannelActions::channel(4);
        let view = TableView {
            player_hand: vec![],
            player_total: 0,
            dealer_upcard: None,
            stake: 1,
            hard_mode: false,
            can_double: false,
            notice: None,
        };

        tx.send(PlayerAction::Stand).await.unwrap();
        drop(tx);
        assert_eq!(source.next_action(&view).await, Some(PlayerAction::Stand));
        assert_eq!(source.next_action(&view).await, None);
    }
}
