//! Error types for the reserves SDK
//!
//! Setup code (wallet constructors, configuration loading) uses `eyre` for
//! ergonomic error handling with context. Everything that happens once a
//! wallet is connected is reported through [`ReservesError`], so callers can
//! branch on the failure kind.

pub use eyre::{eyre, Context, Report, Result};

use alloy::primitives::TxHash;
use thiserror::Error;

/// Typed failure taxonomy for handle acquisition, sequencing and queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservesError {
    /// No wallet provider is injected into the environment
    #[error("no wallet available")]
    NoWalletAvailable,

    /// The user declined the account-access prompt, or the wallet is locked
    #[error("user denied account access")]
    UserDeniedAccess,

    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// The method is not part of the contract's interface (or has the wrong kind)
    #[error("method {method} is not callable on {contract}")]
    UnsupportedMethod { contract: String, method: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The active wallet account or chain changed while a sequence was running
    #[error("signing identity changed mid-sequence")]
    IdentityChanged,

    /// The user declined to sign a specific transaction
    #[error("transaction rejected by user")]
    Rejected,

    /// The transaction was mined but its execution failed
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// No terminal status was observed within the confirmation timeout
    #[error("transaction {0} not confirmed before timeout")]
    Timeout(TxHash),

    /// Transport or network level failure talking to the wallet or node
    #[error("provider failure: {0}")]
    ProviderFailure(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("sequence cancelled")]
    Cancelled,

    #[error("invalid contract registry: {0}")]
    InvalidRegistry(String),
}
