//! Local private key wallet
//!
//! Behaves like an injected wallet that approves everything: one fixed
//! account, no prompts. Useful for scripts, bots and test networks.

use super::{ChainReceipt, TxRequest, WalletError, WalletProvider};
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use std::sync::Arc;

/// Wallet backed by a raw EVM private key
pub struct LocalWallet {
    /// Provider with wallet filler - handles nonce, gas, chain_id, and signing
    provider: Arc<dyn Provider<Ethereum>>,
    address: Address,
}

impl LocalWallet {
    /// Create a new LocalWallet from a private key hex string
    ///
    /// # Arguments
    ///
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    /// * `rpc_url` - RPC endpoint URL
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let wallet = LocalWallet::from_private_key(
    ///     "0x...",
    ///     "https://data-seed-prebsc-1-s1.bnbchain.org:8545"
    /// )?;
    /// ```
    pub fn from_private_key(private_key: impl AsRef<str>, rpc_url: impl AsRef<str>) -> Result<Self> {
        let key = private_key.as_ref();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key.parse().context("Failed to parse private key")?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url: Url = rpc_url.as_ref().parse().context("Invalid RPC URL")?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            provider: Arc::new(provider),
            address,
        })
    }

    /// Load the key from an environment variable
    pub fn from_env(var_name: &str, rpc_url: impl AsRef<str>) -> Result<Self> {
        let key = std::env::var(var_name)
            .with_context(|| format!("Environment variable {} not set", var_name))?;
        Self::from_private_key(key, rpc_url)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn send_transaction(&self, from: Address, tx: TxRequest) -> Result<TxHash, WalletError> {
        if from != self.address {
            return Err(WalletError::Unauthorized);
        }

        // Provider fills nonce, gas and chain_id, then signs
        let request = tx.to_rpc().with_from(from);
        let pending_tx = self.provider.send_transaction(request).await?;

        Ok(*pending_tx.tx_hash())
    }

    async fn transaction_status(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ChainReceipt>, WalletError> {
        let receipt: Option<TransactionReceipt> =
            self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.as_ref().map(ChainReceipt::from))
    }

    async fn call(&self, tx: TxRequest) -> Result<Bytes, WalletError> {
        let request = tx.to_rpc().with_from(self.address);
        Ok(self.provider.call(request).await?)
    }
}
