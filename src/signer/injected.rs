//! EIP-1193 wallet reachable over JSON-RPC
//!
//! Desktop wallet bridges (Frame, a browser extension relay, a dev node with
//! unlocked accounts) answer `eth_requestAccounts` and sign
//! `eth_sendTransaction` themselves, prompting the user as needed. Rejections
//! come back as JSON-RPC error 4001.

use super::{ChainReceipt, TxRequest, WalletError, WalletProvider};
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::http::reqwest::Url;
use eyre::{Context, Result};
use std::sync::Arc;

/// Wallet injected into the environment through an RPC endpoint
pub struct InjectedWallet {
    /// Provider without fillers: the wallet fills nonce, gas and signature
    provider: Arc<dyn Provider<Ethereum>>,
}

impl InjectedWallet {
    /// Connect to a wallet endpoint without probing it
    pub fn connect(wallet_url: impl AsRef<str>) -> Result<Self> {
        let url: Url = wallet_url.as_ref().parse().context("Invalid wallet URL")?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<Ethereum>()
            .connect_http(url);

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Connect to a wallet endpoint if one answers there
    ///
    /// Returns `Ok(None)` when nothing is listening, the environment's
    /// equivalent of "no wallet injected".
    pub async fn detect(wallet_url: impl AsRef<str>) -> Result<Option<Self>> {
        let wallet = Self::connect(wallet_url)?;
        match wallet.provider.get_chain_id().await {
            Ok(chain_id) => {
                tracing::info!("Detected injected wallet on chain {}", chain_id);
                Ok(Some(wallet))
            }
            Err(err) => {
                tracing::debug!("No injected wallet detected: {}", err);
                Ok(None)
            }
        }
    }
}

impl WalletProvider for InjectedWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let accounts: Vec<Address> = self
            .provider
            .client()
            .request_noparams("eth_requestAccounts")
            .await?;
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn send_transaction(&self, from: Address, tx: TxRequest) -> Result<TxHash, WalletError> {
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
        Ok(self.provider.call(tx.to_rpc()).await?)
    }
}
