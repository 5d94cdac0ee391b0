//! File-backed ledger store
//!
//! The whole document lives in memory behind one async mutex and is written
//! through to a JSON file on every mutation (temp file + rename). A failed
//! write is logged and the in-memory state stays authoritative.

use crate::errors::{CasinoResult, StorageError};
use crate::ledger::{Account, AccountMutation, GlobalStats, LedgerDocument, LedgerStore, RankField};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub struct JsonLedger {
    path: PathBuf,
    starting_cash: i64,
    state: Mutex<LedgerDocument>,
}

impl JsonLedger {
    /// Open the ledger at `path`, starting fresh when the file does not exist
    pub async fn open<P: AsRef<Path>>(path: P, starting_cash: i64) -> CasinoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = Self::load(&path).await?;

        Ok(Self {
            path,
            starting_cash,
            state: Mutex::new(document),
        })
    }

    async fn load(path: &Path) -> CasinoResult<LedgerDocument> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No ledger file found at {}, starting fresh", path.display());
                return Ok(LedgerDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!("Ledger file {} is empty, starting fresh", path.display());
            return Ok(LedgerDocument::default());
        }

        let document: LedgerDocument = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::CorruptedData(format!("Failed to decode ledger {}: {}", path.display(), e))
        })?;

        info!(
            accounts = document.users.len(),
            "Loaded ledger from {}",
            path.display()
        );
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the full document, for inspection tools
    pub async fn snapshot(&self) -> LedgerDocument {
        self.state.lock().await.clone()
    }

    /// Write the document through to disk. Failures are logged, not returned.
    async fn persist(&self, document: &LedgerDocument) {
        if let Err(e) = self.write_file(document).await {
            error!(path = %self.path.display(), "Error saving ledger: {}", e);
        } else {
            debug!(path = %self.path.display(), "Saved ledger");
        }
    }

    async fn write_file(&self, document: &LedgerDocument) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to encode ledger: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

#[async_trait]
impl LedgerStore for JsonLedger {
    async fn get_or_create_account(&self, user_id: &str) -> CasinoResult<Account> {
        let mut document = self.state.lock().await;
        if let Some(account) = document.users.get(user_id) {
            return Ok(account.clone());
        }

        let account = Account::new(self.starting_cash);
        document.users.insert(user_id.to_string(), account.clone());
        info!(user_id, "Created account");
        self.persist(&document).await;
        Ok(account)
    }

    async fn replace_account(&self, user_id: &str, mut account: Account) -> CasinoResult<()> {
        account.sync_level();
        let mut document = self.state.lock().await;
        document.users.insert(user_id.to_string(), account);
        self.persist(&document).await;
        Ok(())
    }

    async fn modify_account(&self, user_id: &str, mutation: AccountMutation<'_>) -> CasinoResult<Account> {
        let mut document = self.state.lock().await;
        let created = !document.users.contains_key(user_id);
        let starting_cash = self.starting_cash;
        let current = document
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| Account::new(starting_cash));

        let mut updated = current.clone();
        let outcome = mutation(&mut updated);
        if outcome.is_ok() {
            updated.sync_level();
            *current = updated.clone();
        }

        if outcome.is_ok() || created {
            self.persist(&document).await;
        }
        outcome.map(|_| updated)
    }

    async fn rank_accounts(&self, field: RankField, limit: usize) -> CasinoResult<Vec<(String, Account)>> {
        let document = self.state.lock().await;
        let mut ranked: Vec<(String, Account)> = document
            .users
            .iter()
            .map(|(id, account)| (id.clone(), account.clone()))
            .collect();

        // Stable sort keeps id order among equal keys
        ranked.sort_by(|(_, a), (_, b)| field.key(b).cmp(&field.key(a)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn record_wager(&self, stake: i64, won: bool) -> CasinoResult<()> {
        let mut document = self.state.lock().await;
        document.global_stats.record(stake, won);
        self.persist(&document).await;
        Ok(())
    }

    async fn global_stats(&self) -> CasinoResult<GlobalStats> {
        Ok(self.state.lock().await.global_stats)
    }

    async fn account_count(&self) -> CasinoResult<usize> {
        Ok(self.state.lock().await.users.len())
    }
}
