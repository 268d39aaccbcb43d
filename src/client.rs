//! ReservesClient - main entry point for the SDK

use crate::config::NetworkConfig;
use crate::contracts::{ICollateralInterface, IKelCoinTeller, ILinkToken};
use crate::error::ReservesError;
use crate::handle::{ContractHandle, HandleFactory};
use crate::orchestrator::{CancelHandle, SequenceOutcome, TransactionOrchestrator, TransactionSequence};
use crate::registry::{ContractName, ContractRegistry};
use crate::signer::{InjectedWallet, SignerResolver, WalletProvider};
use crate::types::{DepositParams, ReservesSnapshot, WithdrawParams};
use crate::view::BalanceView;
use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use std::sync::Arc;

/// Main client for the collateral and reserves contracts
pub struct ReservesClient<W> {
    config: NetworkConfig,
    factory: HandleFactory<W>,
    orchestrator: TransactionOrchestrator<W>,
    view: BalanceView<W>,
}

impl ReservesClient<InjectedWallet> {
    /// Create a client over the injected wallet configured in `wallet_url`
    ///
    /// Without a configured or reachable wallet the client is still created;
    /// every wallet operation then fails with `NoWalletAvailable`.
    pub async fn connect(config: NetworkConfig) -> eyre::Result<Self> {
        let wallet = match &config.wallet_url {
            Some(url) => InjectedWallet::detect(url).await?,
            None => None,
        };
        if wallet.is_none() {
            tracing::warn!("No injected wallet available");
        }
        Self::with_resolver(SignerResolver::from_option(wallet), config).map_err(Into::into)
    }
}

impl<W: WalletProvider> ReservesClient<W> {
    /// Create a client over `wallet` with the contracts listed in `config`
    pub fn new(wallet: W, config: NetworkConfig) -> Result<Self, ReservesError> {
        Self::with_resolver(SignerResolver::new(wallet), config)
    }

    pub fn with_resolver(
        resolver: SignerResolver<W>,
        config: NetworkConfig,
    ) -> Result<Self, ReservesError> {
        let registry = ContractRegistry::from_config(&config)?;
        Ok(Self::with_registry(resolver, registry, config))
    }

    /// Create a client with an explicit registry; addresses in `config` are ignored
    pub fn with_registry(
        resolver: SignerResolver<W>,
        registry: ContractRegistry,
        config: NetworkConfig,
    ) -> Self {
        let factory = HandleFactory::new(resolver.clone(), Arc::new(registry));
        Self {
            orchestrator: TransactionOrchestrator::new(resolver, config.timeouts),
            view: BalanceView::new(factory.clone()),
            factory,
            config,
        }
    }

    /// Get the network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        self.factory.registry()
    }

    pub fn view(&self) -> &BalanceView<W> {
        &self.view
    }

    /// Fresh handle for a contract, bound to the current signing identity
    pub async fn get_handle(&self, logical_name: &str) -> Result<ContractHandle<W>, ReservesError> {
        self.factory.get_handle(logical_name).await
    }

    // ========== Planning ==========

    /// `[approve(CollateralInterface, amount)?, depositCollateral(amount)]`
    pub async fn plan_collateral_deposit(
        &self,
        params: DepositParams,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let amount = params.scaled_amount()?;
        self.plan_deposit(
            ContractName::CollateralInterface,
            amount,
            ICollateralInterface::depositCollateralCall { amount },
        )
        .await
    }

    /// `[approve(KelCoinTeller, amount)?, depositReserves(amount)]`
    pub async fn plan_reserves_deposit(
        &self,
        params: DepositParams,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let amount = params.scaled_amount()?;
        self.plan_deposit(
            ContractName::KelCoinTeller,
            amount,
            IKelCoinTeller::depositReservesCall { amount },
        )
        .await
    }

    pub async fn plan_collateral_withdrawal(
        &self,
        params: WithdrawParams,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let amount = params.scaled_amount()?;
        self.plan_single(
            ContractName::CollateralInterface,
            ICollateralInterface::withdrawCollateralCall { amount },
        )
        .await
    }

    pub async fn plan_reserves_withdrawal(
        &self,
        params: WithdrawParams,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let amount = params.scaled_amount()?;
        self.plan_single(
            ContractName::KelCoinTeller,
            IKelCoinTeller::withdrawReservesCall { amount },
        )
        .await
    }

    /// Deposit into `target`, approving the link token first if the current
    /// allowance does not cover `amount`
    async fn plan_deposit<C: SolCall>(
        &self,
        target: ContractName,
        amount: U256,
        deposit: C,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let [link, target] = self
            .factory
            .handles([ContractName::LinkToken, target])
            .await?;
        let owner = link.identity().address();
        let spender = target.address();

        let allowance = link
            .query(ILinkToken::allowanceCall { owner, spender })
            .await?;

        let mut steps = Vec::with_capacity(2);
        if allowance < amount {
            tracing::debug!("Allowance {} below {}, adding approve step", allowance, amount);
            steps.push(link.call(ILinkToken::approveCall { spender, amount })?);
        } else {
            tracing::debug!("Allowance {} covers {}, skipping approve", allowance, amount);
        }
        steps.push(target.call(deposit)?);

        Ok(TransactionSequence::new(steps))
    }

    async fn plan_single<C: SolCall>(
        &self,
        target: ContractName,
        call: C,
    ) -> Result<TransactionSequence<W>, ReservesError> {
        let handle = self.factory.handle(target).await?;
        Ok(TransactionSequence::new([handle.call(call)?]))
    }

    // ========== Reserves Operations ==========

    /// Deposit link tokens as collateral
    ///
    /// Planning failures are returned as `Err`; once planned, the sequence's
    /// terminal outcome is returned as `Ok`, including failed ones.
    pub async fn deposit_collateral(
        &self,
        params: DepositParams,
    ) -> Result<SequenceOutcome, ReservesError> {
        let mut sequence = self.plan_collateral_deposit(params).await?;
        Ok(self.execute(&mut sequence, None).await)
    }

    /// Withdraw deposited collateral
    pub async fn withdraw_collateral(
        &self,
        params: WithdrawParams,
    ) -> Result<SequenceOutcome, ReservesError> {
        let mut sequence = self.plan_collateral_withdrawal(params).await?;
        Ok(self.execute(&mut sequence, None).await)
    }

    /// Deposit link tokens into reserves
    pub async fn deposit_reserves(
        &self,
        params: DepositParams,
    ) -> Result<SequenceOutcome, ReservesError> {
        let mut sequence = self.plan_reserves_deposit(params).await?;
        Ok(self.execute(&mut sequence, None).await)
    }

    /// Withdraw reserves
    pub async fn withdraw_reserves(
        &self,
        params: WithdrawParams,
    ) -> Result<SequenceOutcome, ReservesError> {
        let mut sequence = self.plan_reserves_withdrawal(params).await?;
        Ok(self.execute(&mut sequence, None).await)
    }

    /// Run a planned sequence; pass a [`CancelHandle`] to allow cancelling it
    pub async fn execute(
        &self,
        sequence: &mut TransactionSequence<W>,
        cancel: Option<&CancelHandle>,
    ) -> SequenceOutcome {
        match cancel {
            Some(cancel) => self.orchestrator.execute_with_cancel(sequence, cancel).await,
            None => self.orchestrator.execute_sequence(sequence).await,
        }
    }

    // ========== Queries ==========

    /// Execute a view method on a handle
    pub async fn query<C: SolCall>(
        &self,
        handle: &ContractHandle<W>,
        call: C,
    ) -> Result<C::Return, ReservesError> {
        handle.query(call).await
    }

    /// Collateral, reserves and link balance of the active account
    pub async fn snapshot(&self) -> Result<ReservesSnapshot, ReservesError> {
        self.view.snapshot().await
    }
}
