//! Contract handles bound to a signing identity
//!
//! A [`ContractHandle`] pairs a contract descriptor with the identity that
//! was active when the handle was created. Handles are owned by the call site
//! that requested them and are never shared between transaction sequences.

use crate::contracts::MethodKind;
use crate::error::ReservesError;
use crate::registry::{ContractDescriptor, ContractName, ContractRegistry};
use crate::signer::{SignerResolver, SigningIdentity, TxRequest, WalletProvider};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use std::fmt;
use std::sync::Arc;

/// A contract bound to the identity resolved when the handle was created
pub struct ContractHandle<W> {
    descriptor: ContractDescriptor,
    identity: SigningIdentity,
    wallet: Arc<W>,
}

impl<W> fmt::Debug for ContractHandle<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("contract", &self.descriptor.name)
            .field("address", &self.descriptor.address)
            .field("identity", &self.identity)
            .finish()
    }
}

impl<W: WalletProvider> ContractHandle<W> {
    pub fn new(descriptor: ContractDescriptor, identity: SigningIdentity, wallet: Arc<W>) -> Self {
        Self {
            descriptor,
            identity,
            wallet,
        }
    }

    pub fn name(&self) -> ContractName {
        self.descriptor.name
    }

    pub fn address(&self) -> Address {
        self.descriptor.address
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn identity(&self) -> SigningIdentity {
        self.identity
    }

    pub(crate) fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Build a state-changing call; consumes the handle into the request
    pub fn call<C: SolCall>(self, call: C) -> Result<TransactionRequest<W>, ReservesError> {
        let method = self
            .descriptor
            .require_method(C::SELECTOR, C::SIGNATURE, MethodKind::Write)?;

        Ok(TransactionRequest {
            method: method.signature,
            calldata: Bytes::from(call.abi_encode()),
            value: U256::ZERO,
            handle: self,
        })
    }

    /// Execute a view method and decode its return value
    ///
    /// Independent of any sequence; failures are `QueryFailed` and safe to retry.
    pub async fn query<C: SolCall>(&self, call: C) -> Result<C::Return, ReservesError> {
        self.descriptor
            .require_method(C::SELECTOR, C::SIGNATURE, MethodKind::Read)?;

        let tx = TxRequest::new(self.descriptor.address, call.abi_encode());
        let result = self.wallet.call(tx).await.map_err(|err| {
            ReservesError::QueryFailed(format!("{} on {}: {}", C::SIGNATURE, self.name(), err))
        })?;

        C::abi_decode_returns(&result).map_err(|err| {
            ReservesError::QueryFailed(format!(
                "failed to decode {} on {}: {}",
                C::SIGNATURE,
                self.name(),
                err
            ))
        })
    }
}

/// One step of a transaction sequence: a method call on a bound contract
///
/// Immutable once constructed apart from the consuming `with_value` builder.
pub struct TransactionRequest<W> {
    handle: ContractHandle<W>,
    method: &'static str,
    calldata: Bytes,
    value: U256,
}

impl<W> fmt::Debug for TransactionRequest<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRequest")
            .field("handle", &self.handle)
            .field("method", &self.method)
            .field("value", &self.value)
            .finish()
    }
}

impl<W: WalletProvider> TransactionRequest<W> {
    /// Attach native value (wei) to the call
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn handle(&self) -> &ContractHandle<W> {
        &self.handle
    }

    /// Solidity signature of the called method
    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn calldata(&self) -> &Bytes {
        &self.calldata
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    /// Wire form handed to the wallet
    pub fn to_tx(&self) -> TxRequest {
        TxRequest::new(self.handle.address(), self.calldata.clone()).with_value(self.value)
    }
}

/// Creates contract handles from the signer resolver and the registry
pub struct HandleFactory<W> {
    resolver: SignerResolver<W>,
    registry: Arc<ContractRegistry>,
}

impl<W> Clone for HandleFactory<W> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<W: WalletProvider> HandleFactory<W> {
    pub fn new(resolver: SignerResolver<W>, registry: Arc<ContractRegistry>) -> Self {
        Self { resolver, registry }
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &SignerResolver<W> {
        &self.resolver
    }

    /// Handle for a contract by logical name, bound to the current identity
    pub async fn get_handle(&self, logical_name: &str) -> Result<ContractHandle<W>, ReservesError> {
        let identity = self.resolver.resolve_signer().await?;
        let descriptor = self.registry.describe(logical_name)?;
        self.bind(descriptor, identity)
    }

    /// Handle for a contract by typed name, bound to the current identity
    pub async fn handle(&self, name: ContractName) -> Result<ContractHandle<W>, ReservesError> {
        let identity = self.resolver.resolve_signer().await?;
        let descriptor = self.registry.descriptor(name)?;
        self.bind(descriptor, identity)
    }

    /// Handles for several contracts, all bound to one identity resolution
    pub async fn handles<const N: usize>(
        &self,
        names: [ContractName; N],
    ) -> Result<[ContractHandle<W>; N], ReservesError> {
        let identity = self.resolver.resolve_signer().await?;
        let mut descriptors = Vec::with_capacity(N);
        for name in names {
            descriptors.push(self.registry.descriptor(name)?);
        }
        let handles: Vec<ContractHandle<W>> = descriptors
            .into_iter()
            .map(|descriptor| self.bind(descriptor, identity))
            .collect::<Result<_, _>>()?;
        handles
            .try_into()
            .map_err(|_| ReservesError::ProviderFailure("handle count mismatch".to_string()))
    }

    fn bind(
        &self,
        descriptor: ContractDescriptor,
        identity: SigningIdentity,
    ) -> Result<ContractHandle<W>, ReservesError> {
        let wallet = self.resolver.wallet()?.clone();
        Ok(ContractHandle::new(descriptor, identity, wallet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ICollateralInterface, ILinkToken};
    use crate::signer::mock::MockWallet;

    const ACCOUNT: Address = Address::repeat_byte(0xa1);

    fn factory(wallet: Arc<MockWallet>) -> HandleFactory<MockWallet> {
        let registry = ContractRegistry::new([
            (ContractName::CollateralInterface, Address::repeat_byte(0x01)),
            (ContractName::LinkToken, Address::repeat_byte(0x04)),
        ])
        .unwrap();
        HandleFactory::new(SignerResolver::from_shared(wallet), Arc::new(registry))
    }

    #[tokio::test]
    async fn test_get_handle_binds_current_identity() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        let handle = factory(wallet).get_handle("CollateralInterface").await.unwrap();

        assert_eq!(handle.name(), ContractName::CollateralInterface);
        assert_eq!(handle.address(), Address::repeat_byte(0x01));
        assert_eq!(handle.identity().address(), ACCOUNT);
        assert_eq!(handle.identity().chain_id(), 97);
    }

    #[tokio::test]
    async fn test_get_handle_propagates_errors() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        let factory = factory(wallet.clone());
        assert_eq!(
            factory.get_handle("AssetWarehouse").await.unwrap_err(),
            ReservesError::UnknownContract("AssetWarehouse".to_string())
        );

        wallet.deny_access();
        assert_eq!(
            factory.get_handle("LinkToken").await.unwrap_err(),
            ReservesError::UserDeniedAccess
        );

        let absent = HandleFactory::new(
            SignerResolver::<MockWallet>::absent(),
            Arc::new(ContractRegistry::default()),
        );
        assert_eq!(
            absent.get_handle("LinkToken").await.unwrap_err(),
            ReservesError::NoWalletAvailable
        );
    }

    #[tokio::test]
    async fn test_call_checks_interface() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        let factory = factory(wallet);

        let link = factory.handle(ContractName::LinkToken).await.unwrap();
        let request = link
            .call(ILinkToken::approveCall {
                spender: Address::repeat_byte(0x01),
                amount: U256::from(100),
            })
            .unwrap();
        assert_eq!(request.method(), "approve(address,uint256)");
        assert_eq!(request.to_tx().to, Address::repeat_byte(0x04));
        assert_eq!(request.to_tx().selector(), Some(ILinkToken::approveCall::SELECTOR));

        // A collateral method on the token handle is rejected
        let link = factory.handle(ContractName::LinkToken).await.unwrap();
        let err = link
            .call(ICollateralInterface::depositCollateralCall {
                amount: U256::from(100),
            })
            .unwrap_err();
        assert!(matches!(err, ReservesError::UnsupportedMethod { .. }));
    }

    #[tokio::test]
    async fn test_query_decodes_and_maps_failures() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        wallet.set_call_result(
            ILinkToken::balanceOfCall::SELECTOR,
            U256::from(1234).to_be_bytes::<32>().to_vec(),
        );
        let factory = factory(wallet.clone());
        let link = factory.handle(ContractName::LinkToken).await.unwrap();

        let balance = link
            .query(ILinkToken::balanceOfCall { account: ACCOUNT })
            .await
            .unwrap();
        assert_eq!(balance, U256::from(1234));

        // Writes cannot be queried
        let err = link
            .query(ILinkToken::approveCall {
                spender: ACCOUNT,
                amount: U256::ZERO,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ReservesError::UnsupportedMethod { .. }));

        wallet.fail_calls("node unreachable");
        let err = link
            .query(ILinkToken::balanceOfCall { account: ACCOUNT })
            .await
            .unwrap_err();
        assert!(matches!(err, ReservesError::QueryFailed(_)));
    }

    #[tokio::test]
    async fn test_handles_share_one_resolution() {
        let wallet = Arc::new(MockWallet::new(ACCOUNT));
        let factory = factory(wallet.clone());
        let [collateral, link] = factory
            .handles([ContractName::CollateralInterface, ContractName::LinkToken])
            .await
            .unwrap();
        assert_eq!(collateral.identity(), link.identity());
        assert_eq!(wallet.access_requests(), 1);
    }
}
