//! KEL reserves SDK for Rust
//!
//! Wallet-backed access to the collateral and reserves contracts on BSC
//! testnet. The SDK never holds signing keys of its own: every transaction is
//! signed by a user-controlled wallet behind the [`WalletProvider`] trait.
//!
//! # Features
//!
//! - Deposit / withdraw link tokens as collateral
//! - Deposit / withdraw reserves with the KelCoin Teller
//! - Ordered approve-then-deposit sequences, each step confirmed before the next
//! - Balance snapshots of the active account
//!
//! # Example
//!
//! ```rust,ignore
//! use kel_reserves::{DepositParams, NetworkConfig, ReservesClient};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = NetworkConfig::from_env()?;
//!     let client = ReservesClient::connect(config).await?;
//!
//!     let outcome = client.deposit_collateral(DepositParams::new("100")).await?;
//!     if let Some(err) = outcome.error() {
//!         eprintln!("deposit failed: {}", err);
//!     }
//!
//!     let snapshot = client.snapshot().await?;
//!     println!("collateral: {}", snapshot.collateral_f64());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod registry;
pub mod signer;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use client::ReservesClient;
pub use config::{NetworkConfig, TimeoutConfig};
pub use error::{eyre, Context, Report, ReservesError, Result};
pub use handle::{ContractHandle, HandleFactory, TransactionRequest};
pub use orchestrator::{
    CancelHandle, SequenceOutcome, StepState, TransactionOrchestrator, TransactionSequence,
};
pub use registry::{ContractDescriptor, ContractName, ContractRegistry};
pub use signer::{
    FordefiConfig, FordefiWallet, InjectedWallet, LocalWallet, SignerResolver, SigningIdentity,
    TxRequest, WalletError, WalletProvider,
};
pub use types::{
    parse_token_amount, BlockRef, DepositParams, PendingTransaction, ReceiptStatus,
    ReservesSnapshot, TransactionReceipt, WithdrawParams,
};
pub use view::BalanceView;
