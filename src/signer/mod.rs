//! Wallet provider boundary and signer resolution
//!
//! A [`WalletProvider`] is the user-controlled wallet the SDK talks to. It
//! exposes account access, transaction submission and status polling. The
//! SDK never holds a signing key of its own; it only asks the wallet.
//!
//! Implementations:
//! - [`InjectedWallet`]: an EIP-1193 wallet reachable over JSON-RPC
//! - [`LocalWallet`]: a local private key
//! - [`FordefiWallet`]: Fordefi MPC wallet with console approval

mod fordefi;
mod injected;
mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod resolver;

pub use fordefi::{FordefiConfig, FordefiWallet};
pub use injected::InjectedWallet;
pub use local::LocalWallet;
pub use resolver::{SignerResolver, SigningIdentity};

use crate::constants::{EIP1193_UNAUTHORIZED, EIP1193_USER_REJECTED};
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::transports::TransportError;
use thiserror::Error;

/// Transaction request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Target contract address
    pub to: Address,
    /// Transaction value in wei
    pub value: U256,
    /// Encoded calldata
    pub data: Bytes,
    /// Optional gas limit override
    pub gas_limit: Option<u64>,
}

impl TxRequest {
    /// Create a new transaction request
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
            gas_limit: None,
        }
    }

    /// Set transaction value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Function selector of the calldata, if present
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }

    fn to_rpc(&self) -> alloy::rpc::types::TransactionRequest {
        use alloy::network::TransactionBuilder;

        let mut request = alloy::rpc::types::TransactionRequest::default()
            .with_to(self.to)
            .with_value(self.value)
            .with_input(self.data.clone());
        if let Some(gas_limit) = self.gas_limit {
            request = request.with_gas_limit(gas_limit);
        }
        request
    }
}

/// Mined status of a transaction, as reported by the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReceipt {
    /// `false` when execution reverted
    pub success: bool,
    pub block_number: u64,
    pub block_hash: B256,
}

impl From<&alloy::rpc::types::TransactionReceipt> for ChainReceipt {
    fn from(receipt: &alloy::rpc::types::TransactionReceipt) -> Self {
        Self {
            success: receipt.status(),
            block_number: receipt.block_number.unwrap_or_default(),
            block_hash: receipt.block_hash.unwrap_or_default(),
        }
    }
}

/// Failures reported by a wallet provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The user declined the request in the wallet
    #[error("user rejected the request")]
    UserRejected,

    /// The wallet refused to expose the account or method
    #[error("wallet request unauthorized")]
    Unauthorized,

    #[error("wallet transport error: {0}")]
    Transport(String),
}

impl From<TransportError> for WalletError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp().map(|payload| payload.code) {
            Some(EIP1193_USER_REJECTED) => Self::UserRejected,
            Some(EIP1193_UNAUTHORIZED) => Self::Unauthorized,
            _ => Self::Transport(err.to_string()),
        }
    }
}

/// A user-controlled wallet
///
/// Every method may suspend: account access and submission can wait on a
/// wallet prompt, status polling waits on the network.
pub trait WalletProvider: Send + Sync {
    /// Request access to the wallet's accounts; the active account comes first
    fn request_accounts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Address>, WalletError>> + Send;

    /// Chain the wallet is currently connected to
    fn chain_id(&self) -> impl std::future::Future<Output = Result<u64, WalletError>> + Send;

    /// Ask the wallet to sign and broadcast a transaction from `from`
    ///
    /// Resolves once the wallet acknowledged the request with a transaction hash.
    fn send_transaction(
        &self,
        from: Address,
        tx: TxRequest,
    ) -> impl std::future::Future<Output = Result<TxHash, WalletError>> + Send;

    /// Mined status of a transaction, `None` while it is still pending
    fn transaction_status(
        &self,
        tx_hash: TxHash,
    ) -> impl std::future::Future<Output = Result<Option<ChainReceipt>, WalletError>> + Send;

    /// Execute a read-only call
    fn call(
        &self,
        tx: TxRequest,
    ) -> impl std::future::Future<Output = Result<Bytes, WalletError>> + Send;
}
