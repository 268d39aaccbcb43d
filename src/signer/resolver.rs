//! Resolve the wallet's current signing identity

use super::{WalletError, WalletProvider};
use crate::error::ReservesError;
use alloy::primitives::Address;
use std::fmt;
use std::sync::Arc;

/// The wallet account able to authorize transactions, on a given chain
///
/// Identities are never cached: two identities compare equal only if both
/// the account and the chain match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigningIdentity {
    address: Address,
    chain_id: u64,
}

impl SigningIdentity {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self { address, chain_id }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

impl fmt::Display for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address, self.chain_id)
    }
}

/// Obtains the current signing identity from the injected wallet, if any
pub struct SignerResolver<W> {
    wallet: Option<Arc<W>>,
}

impl<W> Clone for SignerResolver<W> {
    fn clone(&self) -> Self {
        Self {
            wallet: self.wallet.clone(),
        }
    }
}

impl<W: WalletProvider> SignerResolver<W> {
    /// Resolver backed by an injected wallet
    pub fn new(wallet: W) -> Self {
        Self::from_shared(Arc::new(wallet))
    }

    pub fn from_shared(wallet: Arc<W>) -> Self {
        Self {
            wallet: Some(wallet),
        }
    }

    /// Resolver for an environment without any wallet
    pub fn absent() -> Self {
        Self { wallet: None }
    }

    /// Resolver for an optionally detected wallet
    pub fn from_option(wallet: Option<W>) -> Self {
        wallet.map_or_else(Self::absent, Self::new)
    }

    /// The injected wallet
    pub fn wallet(&self) -> Result<&Arc<W>, ReservesError> {
        self.wallet.as_ref().ok_or(ReservesError::NoWalletAvailable)
    }

    /// Query the wallet for its active account and chain
    ///
    /// May surface an account-access prompt. Never reuses an earlier result.
    pub async fn resolve_signer(&self) -> Result<SigningIdentity, ReservesError> {
        let wallet = self.wallet()?;

        let accounts = wallet.request_accounts().await.map_err(|err| match err {
            WalletError::UserRejected | WalletError::Unauthorized => {
                ReservesError::UserDeniedAccess
            }
            WalletError::Transport(msg) => ReservesError::ProviderFailure(msg),
        })?;
        let address = accounts
            .first()
            .copied()
            .ok_or(ReservesError::UserDeniedAccess)?;

        let chain_id = wallet
            .chain_id()
            .await
            .map_err(|err| ReservesError::ProviderFailure(err.to_string()))?;

        let identity = SigningIdentity::new(address, chain_id);
        tracing::debug!("Resolved signing identity {}", identity);
        Ok(identity)
    }
}
