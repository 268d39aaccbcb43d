//! Read-only balance and state queries
//!
//! Queries are independent of any transaction sequence and may be retried
//! freely; every failure surfaces as `QueryFailed`.

use crate::contracts::{ICollateralInterface, IGameAssetWarehouse, IKelCoinTeller, ILinkToken};
use crate::error::ReservesError;
use crate::handle::HandleFactory;
use crate::registry::ContractName;
use crate::signer::{SigningIdentity, WalletProvider};
use crate::types::ReservesSnapshot;
use alloy::primitives::{Address, U256};
use futures::future::try_join3;

/// Balance and allowance lookups over fresh contract handles
pub struct BalanceView<W> {
    factory: HandleFactory<W>,
}

impl<W: WalletProvider> BalanceView<W> {
    pub fn new(factory: HandleFactory<W>) -> Self {
        Self { factory }
    }

    /// Collateral deposited by `account`
    pub async fn collateral_of(&self, account: Address) -> Result<U256, ReservesError> {
        let handle = self.factory.handle(ContractName::CollateralInterface).await?;
        handle
            .query(ICollateralInterface::collateralOfCall { account })
            .await
    }

    /// Reserves deposited by `account`
    pub async fn reserves_of(&self, account: Address) -> Result<U256, ReservesError> {
        let handle = self.factory.handle(ContractName::KelCoinTeller).await?;
        handle
            .query(IKelCoinTeller::reservesOfCall { account })
            .await
    }

    /// Link token balance of `account`
    pub async fn link_balance(&self, account: Address) -> Result<U256, ReservesError> {
        let handle = self.factory.handle(ContractName::LinkToken).await?;
        handle.query(ILinkToken::balanceOfCall { account }).await
    }

    /// Link tokens `spender` may pull from `owner`
    pub async fn link_allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ReservesError> {
        let handle = self.factory.handle(ContractName::LinkToken).await?;
        handle
            .query(ILinkToken::allowanceCall { owner, spender })
            .await
    }

    /// Balance of in-game asset `id` held by `account`
    pub async fn asset_balance(&self, account: Address, id: U256) -> Result<U256, ReservesError> {
        let handle = self.factory.handle(ContractName::AssetWarehouse).await?;
        handle
            .query(IGameAssetWarehouse::balanceOfCall { account, id })
            .await
    }

    /// Collateral, reserves and link balance of the active account
    ///
    /// The three lookups run concurrently against one identity resolution.
    pub async fn snapshot(&self) -> Result<ReservesSnapshot, ReservesError> {
        let [collateral, teller, link] = self
            .factory
            .handles([
                ContractName::CollateralInterface,
                ContractName::KelCoinTeller,
                ContractName::LinkToken,
            ])
            .await?;
        let identity: SigningIdentity = link.identity();
        let account = identity.address();

        let (collateral, reserves, link_balance) = try_join3(
            collateral.query(ICollateralInterface::collateralOfCall { account }),
            teller.query(IKelCoinTeller::reservesOfCall { account }),
            link.query(ILinkToken::balanceOfCall { account }),
        )
        .await?;

        tracing::debug!(
            "Snapshot for {}: collateral={}, reserves={}, link={}",
            identity,
            collateral,
            reserves,
            link_balance
        );

        Ok(ReservesSnapshot {
            account,
            collateral,
            reserves,
            link_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ContractRegistry;
    use crate::signer::mock::MockWallet;
    use crate::signer::SignerResolver;
    use crate::types::parse_token_amount;
    use alloy::sol_types::SolCall;
    use std::sync::Arc;

    const ACCOUNT: Address = Address::repeat_byte(0xa1);

    fn view(wallet: Arc<MockWallet>) -> BalanceView<MockWallet> {
        let registry = ContractRegistry::new([
            (ContractName::CollateralInterface, Address::repeat_byte(0x01)),
            (ContractName::KelCoinTeller, Address::repeat_byte(0x02)),
            (ContractName::AssetWarehouse, Address::repeat_byte(0x03)),
            (ContractName::LinkToken, Address::repeat_byte(0x04)),
        ])
        .unwrap();
        BalanceView::new(HandleFactory::new(
            SignerResolver::from_shared(wallet),
            Arc::new(registry),
        ))
    }

    fn word(value: U256) -> Vec<u8> {
        value.to_be_bytes::<32>().to_vec()
    }

    #[tokio::test]
    async fn test_snapshot_of_active_account() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        wallet.set_call_result(
            ICollateralInterface::collateralOfCall::SELECTOR,
            word(parse_token_amount("25.0").unwrap()),
        );
        wallet.set_call_result(
            IKelCoinTeller::reservesOfCall::SELECTOR,
            word(parse_token_amount("10.0").unwrap()),
        );
        wallet.set_call_result(
            ILinkToken::balanceOfCall::SELECTOR,
            word(parse_token_amount("3.5").unwrap()),
        );

        let snapshot = tokio_test::assert_ok!(view(wallet.clone()).snapshot().await);

        assert_eq!(snapshot.account, ACCOUNT);
        assert_eq!(snapshot.collateral_f64(), 25.0);
        assert_eq!(snapshot.reserves_f64(), 10.0);
        assert_eq!(snapshot.link_balance_f64(), 3.5);
        assert_eq!(wallet.access_requests(), 1);
    }

    #[tokio::test]
    async fn test_typed_lookups() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        wallet.set_call_result(ILinkToken::allowanceCall::SELECTOR, word(U256::from(500)));
        wallet.set_call_result(
            IGameAssetWarehouse::balanceOfCall::SELECTOR,
            word(U256::from(7)),
        );
        let view = view(wallet);

        assert_eq!(
            view.link_allowance(ACCOUNT, Address::repeat_byte(0x01))
                .await
                .unwrap(),
            U256::from(500)
        );
        assert_eq!(
            view.asset_balance(ACCOUNT, U256::from(1)).await.unwrap(),
            U256::from(7)
        );
        // Unscripted reads decode as zero
        assert_eq!(view.collateral_of(ACCOUNT).await.unwrap(), U256::ZERO);
        assert_eq!(view.reserves_of(ACCOUNT).await.unwrap(), U256::ZERO);
        assert_eq!(view.link_balance(ACCOUNT).await.unwrap(), U256::ZERO);
    }

    #[tokio::test]
    async fn test_query_failures_are_retryable() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        wallet.fail_calls("rate limited");
        let view = view(wallet);

        let err = tokio_test::assert_err!(view.snapshot().await);
        assert!(matches!(err, ReservesError::QueryFailed(_)));
        assert!(matches!(
            view.collateral_of(ACCOUNT).await,
            Err(ReservesError::QueryFailed(_))
        ));
    }
}
