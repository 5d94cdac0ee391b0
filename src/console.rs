//! Line-oriented command transport
//!
//! Each input line is `<user_id> <command> [args...]`. Blackjack hands run as
//! their own task; `hit`, `stand` and `double` lines are routed to the user's
//! open table.

use async_trait::async_trait;
use dashmap::DashMap;
use rocket_casino::{
    casino::{Casino, DEFAULT_LEADERBOARD_SIZE},
    games::{ActionSource, ChannelActions, PlayerAction, ScriptedActions, TableView},
    CasinoResult,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
commands (prefix each with a user id):
  coinflip <bet> <heads|tails>   slots <bet>
  blackjack <bet> [hard]         hit | stand | double
  work | daily | vote | profile | cooldowns
  leaderboard [cash|level|wins|profit]";

/// Open table: session number plus the channel feeding it
type Table = (u64, mpsc::Sender<PlayerAction>);

pub struct Console {
    casino: Arc<Casino>,
    tables: Arc<DashMap<String, Table>>,
    next_table: AtomicU64,
}

impl Console {
    pub fn new(casino: Arc<Casino>) -> Self {
        Self {
            casino,
            tables: Arc::new(DashMap::new()),
            next_table: AtomicU64::new(1),
        }
    }

    /// Read stdin until EOF
    pub async fn run(self) -> std::io::Result<()> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                self.dispatch(line).await;
            }
        }
        Ok(())
    }

    async fn dispatch(&self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (user_id, command, args) = match parts.as_slice() {
            [user_id, command, args @ ..] => (*user_id, command.to_lowercase(), args),
            _ => {
                println!("{}", HELP);
                return;
            }
        };
        let arg = |i: usize| args.get(i).copied().unwrap_or("");
        debug!(user_id, %command, "Console command");

        match command.as_str() {
            "coinflip" | "cf" => print_result(self.casino.coinflip(user_id, arg(0), arg(1)).await),
            "slots" => print_result(self.casino.slots(user_id, arg(0)).await),
            "blackjack" | "bj" => self.open_table(user_id, arg(0), arg(1).eq_ignore_ascii_case("hard")),
            "hit" | "stand" | "double" => self.route_action(user_id, &command).await,
            "work" => print_result(self.casino.work(user_id).await),
            "daily" => print_result(self.casino.daily(user_id).await),
            "vote" => print_result(self.casino.vote_preview(user_id).await),
            "profile" => print_result(self.casino.profile(user_id).await),
            "cooldowns" | "cd" => print_result(self.casino.cooldowns(user_id).await),
            "leaderboard" | "lb" => {
                let category = if arg(0).is_empty() { "cash" } else { arg(0) };
                print_result(self.casino.leaderboard(category, DEFAULT_LEADERBOARD_SIZE).await)
            }
            _ => println!("{}", HELP),
        }
    }

    fn open_table(&self, user_id: &str, raw_bet: &str, hard: bool) {
        let casino = self.casino.clone();
        let tables = self.tables.clone();
        let user = user_id.to_string();
        let bet = raw_bet.to_string();

        if self.tables.contains_key(user_id) {
            // Let the session guard produce the rejection
            tokio::spawn(async move {
                let mut none = ScriptedActions::new([]);
                print_result(casino.blackjack(&user, &bet, hard, &mut none).await);
            });
            return;
        }

        let table_id = self.next_table.fetch_add(1, Ordering::Relaxed);
        let (tx, actions) = ChannelActions::channel(8);
        self.tables.insert(user.clone(), (table_id, tx));

        tokio::spawn(async move {
            let mut table = ConsoleTable {
                user_id: user.clone(),
                inner: actions,
            };
            let result = casino.blackjack(&user, &bet, hard, &mut table).await;
            tables.remove_if(&user, |_, (id, _)| *id == table_id);
            print_result(result);
        });
    }

    async fn route_action(&self, user_id: &str, command: &str) {
        let action: PlayerAction = match command.parse() {
            Ok(action) => action,
            Err(e) => {
                println!("error: {}", e);
                return;
            }
        };

        let sender = self.tables.get(user_id).map(|entry| entry.value().1.clone());
        match sender {
            Some(tx) => {
                if tx.send(action).await.is_err() {
                    warn!(user_id, "Blackjack table closed before the action arrived");
                }
            }
            None => println!("error: {} has no active blackjack game", user_id),
        }
    }
}

/// Prints the table before each decision
struct ConsoleTable {
    user_id: String,
    inner: ChannelActions,
}

#[async_trait]
impl ActionSource for ConsoleTable {
    async fn next_action(&mut self, view: &TableView) -> Option<PlayerAction> {
        let prompt = turn_prompt(&self.user_id, view);
        print_json(&prompt, view);
        self.inner.next_action(view).await
    }
}

/// Header shown above the table, offering double only when it is allowed
fn turn_prompt(user_id: &str, view: &TableView) -> String {
    let choices = if view.can_double { "hit/stand/double" } else { "hit/stand" };
    format!("[{}] your move ({})", user_id, choices)
}

fn print_result<T: Serialize>(result: CasinoResult<T>) {
    match result {
        Ok(report) => print_json("ok", &report),
        Err(e) => println!("error: {}", e),
    }
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}\n{}", label, json),
        Err(e) => println!("error: failed to render output: {}", e),
    }
}
