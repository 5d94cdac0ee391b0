//! Error types for the Rocket Casino engine
//!
//! Validation failures carry user-facing text in their `Display` output so the
//! command collaborator can relay them verbatim.

use thiserror::Error;

/// Root error type for all casino operations
#[derive(Debug, Error)]
pub enum CasinoError {
    /// Bet token did not resolve to a positive stake
    #[error("You need to bet at least 1 cash!")]
    InvalidBet,

    /// Stake exceeds the account balance
    #[error("You don't have enough cash! You have {available}.")]
    InsufficientFunds { stake: i64, available: i64 },

    /// A second blackjack session was attempted for the same user
    #[error("You already have an active blackjack game! Finish it before starting a new one.")]
    SessionActive { user_id: String },

    /// Earn or game command still cooling down
    #[error("This command is on cooldown. Try again in {remaining:.1} seconds.")]
    OnCooldown { command: String, remaining: f64 },

    /// Player action not permitted in the current session state
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Unrecognised command argument (coin side, leaderboard category)
    #[error("{0}")]
    InvalidArgument(String),

    /// Storage system errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Metrics registry errors
    #[error("Monitoring error: {0}")]
    Monitoring(String),
}

/// Ledger persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),
    #[error("Write failed: {0}")]
    WriteFailed(String),
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Missing required field: {0}")]
    MissingRequired(String),
    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl CasinoError {
    /// Whether the error is a rejected user input rather than a system fault
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CasinoError::InvalidBet
                | CasinoError::InsufficientFunds { .. }
                | CasinoError::SessionActive { .. }
                | CasinoError::OnCooldown { .. }
                | CasinoError::InvalidAction(_)
                | CasinoError::InvalidArgument(_)
        )
    }

    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            CasinoError::InvalidBet => "invalid_bet",
            CasinoError::InsufficientFunds { .. } => "insufficient_funds",
            CasinoError::SessionActive { .. } => "session_active",
            CasinoError::OnCooldown { .. } => "cooldown",
            CasinoError::InvalidAction(_) => "invalid_action",
            CasinoError::InvalidArgument(_) => "invalid_argument",
            CasinoError::Storage(_) => "storage",
            CasinoError::Configuration(_) => "configuration",
            CasinoError::Monitoring(_) => "monitoring",
        }
    }
}

// External error conversions
impl From<std::io::Error> for CasinoError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CasinoError::Storage(StorageError::PermissionDenied(e.to_string()))
            }
            _ => CasinoError::Storage(StorageError::ReadFailed(e.to_string())),
        }
    }
}

impl From<serde_json::Error> for CasinoError {
    fn from(e: serde_json::Error) -> Self {
        CasinoError::Storage(StorageError::CorruptedData(e.to_string()))
    }
}

impl From<prometheus::Error> for CasinoError {
    fn from(e: prometheus::Error) -> Self {
        CasinoError::Monitoring(e.to_string())
    }
}

impl From<rand::distributions::WeightedError> for CasinoError {
    fn from(e: rand::distributions::WeightedError) -> Self {
        CasinoError::Configuration(ConfigurationError::ValidationFailed(format!("slot reel weights: {}", e)))
    }
}

// Convenience type alias for Results
pub type CasinoResult<T> = Result<T, CasinoError>;
