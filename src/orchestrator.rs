//! Transaction orchestrator: ordered, confirmation-gated transaction sequences
//!
//! A [`TransactionSequence`] is a list of calls where step N is only built and
//! submitted once step N-1 is confirmed on-chain. The first step that does not
//! confirm ends the sequence; earlier confirmed steps (e.g. an approval) stay
//! in effect, nothing is rolled back.
//!
//! Per-step lifecycle:
//!
//! ```text
//! not-started -> submitted -> pending -> confirmed
//!                    |           +-----> reverted | failed (timeout, transport)
//!                    +-> rejected-by-user | failed
//! ```

use crate::config::TimeoutConfig;
use crate::error::ReservesError;
use crate::handle::TransactionRequest;
use crate::signer::{SignerResolver, SigningIdentity, WalletError, WalletProvider};
use crate::types::{BlockRef, PendingTransaction, TransactionReceipt};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::Instant;

/// Progress of one step within a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    NotStarted,
    /// Handed to the wallet, no acknowledgement yet
    Submitted,
    /// Accepted by the wallet, waiting on the network
    Pending(PendingTransaction),
    Confirmed(TransactionReceipt),
    /// Terminal failure; `receipt` is absent when nothing reached the wallet
    Failed {
        receipt: Option<TransactionReceipt>,
        error: ReservesError,
    },
}

struct Step<W> {
    request: TransactionRequest<W>,
    state: StepState,
}

/// Ordered transaction steps with private per-step state
///
/// Running a sequence mutates it in place: a finished sequence replays its
/// outcome, an interrupted one resumes without submitting anything twice.
/// Retrying after a failure means building a new sequence.
pub struct TransactionSequence<W> {
    steps: Vec<Step<W>>,
    outcome: Option<SequenceOutcome>,
}

impl<W: WalletProvider> TransactionSequence<W> {
    pub fn new(requests: impl IntoIterator<Item = TransactionRequest<W>>) -> Self {
        Self {
            steps: requests
                .into_iter()
                .map(|request| Step {
                    request,
                    state: StepState::NotStarted,
                })
                .collect(),
            outcome: None,
        }
    }

    /// Append a step
    pub fn then(mut self, request: TransactionRequest<W>) -> Self {
        self.steps.push(Step {
            request,
            state: StepState::NotStarted,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Method signatures of the steps, in order
    pub fn methods(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.request.method()).collect()
    }

    pub fn step_state(&self, index: usize) -> Option<&StepState> {
        self.steps.get(index).map(|s| &s.state)
    }

    /// Outcome of a finished run, if any
    pub fn outcome(&self) -> Option<&SequenceOutcome> {
        self.outcome.as_ref()
    }

    /// Identity every step must be submitted with
    fn identity(&self) -> Option<SigningIdentity> {
        self.steps.first().map(|s| s.request.handle().identity())
    }

    /// Aggregate the current step states
    fn summarize(&self) -> SequenceOutcome {
        let mut receipts = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            match &step.state {
                StepState::Confirmed(receipt) => receipts.push(receipt.clone()),
                StepState::Failed { receipt, error } => {
                    receipts.extend(receipt.clone());
                    return SequenceOutcome::Failed {
                        step: index,
                        method: step.request.method(),
                        error: error.clone(),
                        receipts,
                    };
                }
                _ => break,
            }
        }
        SequenceOutcome::Success { receipts }
    }
}

/// Terminal result of a whole sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every step confirmed
    Success { receipts: Vec<TransactionReceipt> },
    /// Step `step` did not confirm; later steps were never attempted
    Failed {
        step: usize,
        method: &'static str,
        error: ReservesError,
        /// Receipts of the confirmed steps plus the failed step's, if it had one
        receipts: Vec<TransactionReceipt>,
    },
}

impl SequenceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&ReservesError> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn receipts(&self) -> &[TransactionReceipt] {
        match self {
            Self::Success { receipts } | Self::Failed { receipts, .. } => receipts,
        }
    }
}

struct CancelState {
    /// Whether the running sequence may currently be cancelled
    window_open: Mutex<bool>,
    requested: watch::Sender<bool>,
}

/// Requests cancellation of a running sequence
///
/// Cancellation is only possible between steps and while a step waits for
/// the user's signature. Once a step is pending on the network it runs to its
/// terminal state.
///
/// A handle covers a single run of a single sequence. A request is never
/// withdrawn, so a handle passed to another run cancels it before its first
/// step; create a fresh handle per run.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (requested, _) = watch::channel(false);
        Self {
            inner: Arc::new(CancelState {
                window_open: Mutex::new(true),
                requested,
            }),
        }
    }

    /// Request cancellation; `false` if a step is pending on the network or
    /// the sequence has finished
    ///
    /// A step the wallet acknowledges at the same moment still runs to its
    /// terminal state; the sequence then stops before the next step.
    pub fn cancel(&self) -> bool {
        let open = self
            .inner
            .window_open
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !*open {
            return false;
        }
        self.inner.requested.send_replace(true);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.requested.borrow()
    }

    fn set_window(&self, open: bool) {
        *self
            .inner
            .window_open
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = open;
    }

    async fn cancelled(&self) {
        let mut rx = self.inner.requested.subscribe();
        if rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless cancellation arrives first
    async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            output = fut => Some(output),
            _ = self.cancelled() => None,
        }
    }
}

/// Executes transaction sequences step by step
pub struct TransactionOrchestrator<W> {
    resolver: SignerResolver<W>,
    timeouts: TimeoutConfig,
}

impl<W: WalletProvider> TransactionOrchestrator<W> {
    pub fn new(resolver: SignerResolver<W>, timeouts: TimeoutConfig) -> Self {
        Self { resolver, timeouts }
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeouts
    }

    /// Run a sequence to completion or first failure
    pub async fn execute_sequence(&self, sequence: &mut TransactionSequence<W>) -> SequenceOutcome {
        self.execute_with_cancel(sequence, &CancelHandle::new()).await
    }

    /// Run a sequence, honouring cancellation requests made through `cancel`
    pub async fn execute_with_cancel(
        &self,
        sequence: &mut TransactionSequence<W>,
        cancel: &CancelHandle,
    ) -> SequenceOutcome {
        if let Some(outcome) = &sequence.outcome {
            tracing::debug!("Sequence already finished, replaying outcome");
            cancel.set_window(false);
            return outcome.clone();
        }

        self.drive(sequence, cancel).await;
        cancel.set_window(false);

        let outcome = sequence.summarize();
        match &outcome {
            SequenceOutcome::Success { receipts } => {
                tracing::info!("Sequence of {} steps confirmed", receipts.len())
            }
            SequenceOutcome::Failed {
                step, method, error, ..
            } => tracing::warn!("Sequence stopped at step {} ({}): {}", step, method, error),
        }
        sequence.outcome = Some(outcome.clone());
        outcome
    }

    /// Advance every step until one fails; states are written before each await
    async fn drive(&self, sequence: &mut TransactionSequence<W>, cancel: &CancelHandle) {
        let Some(sequence_identity) = sequence.identity() else {
            return;
        };
        let total = sequence.steps.len();

        for (index, step) in sequence.steps.iter_mut().enumerate() {
            let pending = match step.state.clone() {
                StepState::Confirmed(_) => continue,
                StepState::Failed { .. } => return,
                StepState::Submitted => {
                    // The wallet may or may not have accepted it; never resubmit
                    step.state = StepState::Failed {
                        receipt: Some(TransactionReceipt::failed_unsubmitted()),
                        error: ReservesError::ProviderFailure(
                            "submission interrupted before the wallet acknowledged it".to_string(),
                        ),
                    };
                    return;
                }
                StepState::Pending(pending) => {
                    tracing::info!("Resuming pending step {}: {}", index, pending.tx_hash());
                    cancel.set_window(false);
                    pending
                }
                StepState::NotStarted => {
                    cancel.set_window(true);
                    match self.submit(step, sequence_identity, cancel).await {
                        Ok(pending) => pending,
                        Err(failed) => {
                            step.state = failed;
                            return;
                        }
                    }
                }
            };

            step.state = self.confirm(step.request.handle().wallet(), pending).await;
            match &step.state {
                StepState::Confirmed(_) => {
                    tracing::info!(
                        "Step {}/{} confirmed: {} ({})",
                        index + 1,
                        total,
                        step.request.method(),
                        pending.tx_hash()
                    );
                }
                _ => return,
            }
        }
    }

    /// `not-started -> submitted -> pending`, or the step's terminal failure
    async fn submit(
        &self,
        step: &mut Step<W>,
        sequence_identity: SigningIdentity,
        cancel: &CancelHandle,
    ) -> Result<PendingTransaction, StepState> {
        let not_submitted = |error| StepState::Failed {
            receipt: None,
            error,
        };

        if cancel.is_cancelled() {
            return Err(not_submitted(ReservesError::Cancelled));
        }

        // Re-resolve: the account or chain may have changed since the handle was made
        let bound = step.request.handle().identity();
        let active = match cancel.guard(self.resolver.resolve_signer()).await {
            None => return Err(not_submitted(ReservesError::Cancelled)),
            Some(Err(err)) => return Err(not_submitted(err)),
            Some(Ok(active)) => active,
        };
        if bound != sequence_identity || active != bound {
            tracing::warn!(
                "Signing identity changed (handle {}, active {}); aborting before {}",
                bound,
                active,
                step.request.method()
            );
            return Err(not_submitted(ReservesError::IdentityChanged));
        }

        step.state = StepState::Submitted;
        tracing::info!(
            "Submitting {} to {} ({})",
            step.request.method(),
            step.request.handle().name(),
            step.request.handle().address()
        );

        let wallet = step.request.handle().wallet();
        let sent = cancel
            .guard(wallet.send_transaction(bound.address(), step.request.to_tx()))
            .await;

        match sent {
            None => Err(not_submitted(ReservesError::Cancelled)),
            Some(Ok(tx_hash)) => {
                cancel.set_window(false);
                let deadline = Instant::now() + self.timeouts.confirmation_timeout;
                let pending = PendingTransaction::new(tx_hash, deadline);
                step.state = StepState::Pending(pending);
                tracing::info!("Transaction {} pending", tx_hash);
                Ok(pending)
            }
            Some(Err(WalletError::UserRejected)) => Err(StepState::Failed {
                receipt: Some(TransactionReceipt::rejected()),
                error: ReservesError::Rejected,
            }),
            // The wallet refuses to sign for an account that is no longer active
            Some(Err(WalletError::Unauthorized)) => {
                Err(not_submitted(ReservesError::IdentityChanged))
            }
            Some(Err(WalletError::Transport(msg))) => Err(StepState::Failed {
                receipt: Some(TransactionReceipt::failed_unsubmitted()),
                error: ReservesError::ProviderFailure(msg),
            }),
        }
    }

    /// `pending -> {confirmed | reverted | failed}` before the transaction's deadline
    ///
    /// The deadline is fixed at acknowledgement, so a resumed step keeps its
    /// original time budget.
    async fn confirm(&self, wallet: &W, pending: PendingTransaction) -> StepState {
        let tx_hash = pending.tx_hash();
        let poll_interval = self.timeouts.poll_interval;

        let poll = async {
            loop {
                match wallet.transaction_status(tx_hash).await? {
                    Some(receipt) => return Ok::<_, WalletError>(receipt),
                    None => {
                        tracing::debug!("Transaction {} still pending", tx_hash);
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        };

        match tokio::time::timeout_at(pending.deadline(), poll).await {
            Ok(Ok(receipt)) => {
                let block = BlockRef {
                    number: receipt.block_number,
                    hash: receipt.block_hash,
                };
                if receipt.success {
                    StepState::Confirmed(pending.confirm(block))
                } else {
                    StepState::Failed {
                        receipt: Some(pending.revert(block)),
                        error: ReservesError::Reverted(tx_hash),
                    }
                }
            }
            Ok(Err(err)) => StepState::Failed {
                receipt: Some(pending.fail()),
                error: ReservesError::ProviderFailure(err.to_string()),
            },
            Err(_) => StepState::Failed {
                receipt: Some(pending.fail()),
                error: ReservesError::Timeout(tx_hash),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ICollateralInterface, ILinkToken};
    use crate::handle::{ContractHandle, HandleFactory};
    use crate::registry::{ContractName, ContractRegistry};
    use crate::signer::mock::{MockOutcome, MockWallet};
    use crate::types::ReceiptStatus;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolCall;
    use std::time::Duration;

    const ACCOUNT_A: Address = Address::repeat_byte(0xa1);
    const ACCOUNT_B: Address = Address::repeat_byte(0xb2);
    const COLLATERAL: Address = Address::repeat_byte(0x01);
    const APPROVE: [u8; 4] = ILinkToken::approveCall::SELECTOR;
    const DEPOSIT: [u8; 4] = ICollateralInterface::depositCollateralCall::SELECTOR;

    struct Harness {
        wallet: Arc<MockWallet>,
        factory: HandleFactory<MockWallet>,
        orchestrator: TransactionOrchestrator<MockWallet>,
    }

    fn harness() -> Harness {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let wallet = Arc::new(MockWallet::new(ACCOUNT_A));
        let registry = ContractRegistry::new([
            (ContractName::CollateralInterface, COLLATERAL),
            (ContractName::LinkToken, Address::repeat_byte(0x04)),
        ])
        .unwrap();
        let resolver = SignerResolver::from_shared(wallet.clone());
        let timeouts = TimeoutConfig {
            confirmation_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        };
        Harness {
            wallet,
            factory: HandleFactory::new(resolver.clone(), Arc::new(registry)),
            orchestrator: TransactionOrchestrator::new(resolver, timeouts),
        }
    }

    fn approve(link: ContractHandle<MockWallet>) -> TransactionRequest<MockWallet> {
        link.call(ILinkToken::approveCall {
            spender: COLLATERAL,
            amount: U256::from(100),
        })
        .unwrap()
    }

    fn deposit(collateral: ContractHandle<MockWallet>) -> TransactionRequest<MockWallet> {
        collateral
            .call(ICollateralInterface::depositCollateralCall {
                amount: U256::from(100),
            })
            .unwrap()
    }

    /// [approve(spender=Collateral, amount=100), deposit(amount=100)]
    async fn approve_then_deposit(h: &Harness) -> TransactionSequence<MockWallet> {
        let [link, collateral] = h
            .factory
            .handles([ContractName::LinkToken, ContractName::CollateralInterface])
            .await
            .unwrap();
        TransactionSequence::new([approve(link), deposit(collateral)])
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_steps_confirm_in_order() {
        let h = harness();
        let mut sequence = approve_then_deposit(&h).await;
        assert_eq!(
            sequence.methods(),
            vec!["approve(address,uint256)", "depositCollateral(uint256)"]
        );

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(outcome.is_success());
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE, DEPOSIT]);
        assert_eq!(outcome.receipts().len(), 2);
        for receipt in outcome.receipts() {
            assert_eq!(receipt.status, ReceiptStatus::Confirmed);
            assert!(receipt.transaction_id.is_some());
            assert!(receipt.block.is_some());
        }
        assert!(h
            .wallet
            .submissions()
            .iter()
            .all(|s| s.from == ACCOUNT_A));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_approve_stops_sequence() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::Reject);
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
        match outcome {
            SequenceOutcome::Failed {
                step,
                method,
                error,
                receipts,
            } => {
                assert_eq!(step, 0);
                assert_eq!(method, "approve(address,uint256)");
                assert_eq!(error, ReservesError::Rejected);
                assert_eq!(receipts, vec![TransactionReceipt::rejected()]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(sequence.step_state(1), Some(&StepState::NotStarted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_revert_prevents_later_steps() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::Revert);
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(matches!(outcome.error(), Some(ReservesError::Reverted(_))));
        assert_eq!(outcome.receipts()[0].status, ReceiptStatus::Reverted);
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revert_on_last_step_keeps_earlier_confirmation() {
        let h = harness();
        h.wallet.script(DEPOSIT, MockOutcome::Revert);
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        match &outcome {
            SequenceOutcome::Failed { step, receipts, .. } => {
                assert_eq!(*step, 1);
                assert_eq!(receipts[0].status, ReceiptStatus::Confirmed);
                assert_eq!(receipts[1].status, ReceiptStatus::Reverted);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_switch_between_steps() {
        let h = harness();
        h.wallet
            .script(APPROVE, MockOutcome::ConfirmThenSwitch(ACCOUNT_B));
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(outcome.error(), Some(&ReservesError::IdentityChanged));
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
        assert_eq!(outcome.receipts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_spanning_two_identities() {
        let h = harness();
        let link = h.factory.handle(ContractName::LinkToken).await.unwrap();
        h.wallet.switch_account(ACCOUNT_B);
        let collateral = h
            .factory
            .handle(ContractName::CollateralInterface)
            .await
            .unwrap();
        assert_ne!(link.identity(), collateral.identity());

        let mut sequence = TransactionSequence::new([approve(link), deposit(collateral)]);
        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(outcome.error(), Some(&ReservesError::IdentityChanged));
        assert!(h.wallet.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_past_timeout_is_timeout() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::Hang);
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(matches!(outcome.error(), Some(ReservesError::Timeout(_))));
        assert_eq!(outcome.receipts()[0].status, ReceiptStatus::Failed);
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_confirmation_within_timeout() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::ConfirmAfter(5));
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_are_provider_failures() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::DropConnection);
        let mut sequence = approve_then_deposit(&h).await;
        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;
        assert!(matches!(
            outcome.error(),
            Some(ReservesError::ProviderFailure(_))
        ));

        h.wallet.script(APPROVE, MockOutcome::SubmitFailure);
        let mut sequence = approve_then_deposit(&h).await;
        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;
        assert!(matches!(
            outcome.error(),
            Some(ReservesError::ProviderFailure(_))
        ));
        assert!(outcome.receipts()[0].transaction_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_sequence_is_not_resubmitted() {
        let h = harness();
        let mut sequence = approve_then_deposit(&h).await;

        let first = h.orchestrator.execute_sequence(&mut sequence).await;
        let second = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(first, second);
        assert_eq!(sequence.outcome(), Some(&first));
        assert_eq!(h.wallet.submissions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_pending_step_resumes_without_resubmitting() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::ConfirmAfter(10));
        let mut sequence = approve_then_deposit(&h).await;

        // Caller gives up on the future while approve is pending
        let interrupted = tokio::time::timeout(
            Duration::from_secs(3),
            h.orchestrator.execute_sequence(&mut sequence),
        )
        .await;
        assert!(interrupted.is_err());
        assert!(matches!(
            sequence.step_state(0),
            Some(StepState::Pending(_))
        ));

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(outcome.is_success());
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE, DEPOSIT]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_submission_fails_closed() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::AwaitSignature);
        let mut sequence = approve_then_deposit(&h).await;

        let interrupted = tokio::time::timeout(
            Duration::from_secs(3),
            h.orchestrator.execute_sequence(&mut sequence),
        )
        .await;
        assert!(interrupted.is_err());
        assert_eq!(sequence.step_state(0), Some(&StepState::Submitted));

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(matches!(
            outcome.error(),
            Some(ReservesError::ProviderFailure(_))
        ));
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let h = harness();
        let mut sequence = approve_then_deposit(&h).await;
        let cancel = CancelHandle::new();
        assert!(cancel.cancel());

        let outcome = h
            .orchestrator
            .execute_with_cancel(&mut sequence, &cancel)
            .await;

        assert_eq!(outcome.error(), Some(&ReservesError::Cancelled));
        assert!(h.wallet.submissions().is_empty());
        // Finished sequences can no longer be cancelled
        assert!(!cancel.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_awaiting_signature() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::AwaitSignature);
        let mut sequence = approve_then_deposit(&h).await;
        let cancel = CancelHandle::new();

        let (outcome, accepted) = tokio::join!(
            h.orchestrator.execute_with_cancel(&mut sequence, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel()
            }
        );

        assert!(accepted);
        assert_eq!(outcome.error(), Some(&ReservesError::Cancelled));
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_refused_while_pending() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::ConfirmAfter(5));
        let mut sequence = approve_then_deposit(&h).await;
        let cancel = CancelHandle::new();

        let (outcome, accepted) = tokio::join!(
            h.orchestrator.execute_with_cancel(&mut sequence, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                cancel.cancel()
            }
        );

        assert!(!accepted);
        assert!(outcome.is_success());
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE, DEPOSIT]);
    }

    #[tokio::test]
    async fn test_empty_sequence_succeeds() {
        let h = harness();
        let mut sequence = TransactionSequence::<MockWallet>::new([]);
        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;
        assert_eq!(outcome, SequenceOutcome::Success { receipts: vec![] });
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_gone_before_step() {
        let h = harness();
        let mut sequence = approve_then_deposit(&h).await;
        h.wallet.deny_access();

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(outcome.error(), Some(&ReservesError::UserDeniedAccess));
        assert!(h.wallet.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_switch_between_steps() {
        let h = harness();
        h.wallet
            .script(APPROVE, MockOutcome::ConfirmThenSwitchChain(56));
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        match &outcome {
            SequenceOutcome::Failed {
                step,
                error,
                receipts,
                ..
            } => {
                assert_eq!(*step, 1);
                assert_eq!(*error, ReservesError::IdentityChanged);
                assert_eq!(receipts.len(), 1);
                assert!(receipts[0].is_confirmed());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_switch_at_signing_prompt() {
        let h = harness();
        h.wallet
            .script(DEPOSIT, MockOutcome::SwitchBeforeSign(ACCOUNT_B));
        let mut sequence = approve_then_deposit(&h).await;

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert_eq!(outcome.error(), Some(&ReservesError::IdentityChanged));
        assert_eq!(
            sequence.step_state(1),
            Some(&StepState::Failed {
                receipt: None,
                error: ReservesError::IdentityChanged,
            })
        );
        // Only the confirmed approve has a receipt
        assert_eq!(outcome.receipts().len(), 1);
        let submissions = h.wallet.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[1].tx_hash, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumed_step_keeps_original_deadline() {
        let h = harness();
        h.wallet.script(APPROVE, MockOutcome::ConfirmAfter(100));
        let mut sequence = approve_then_deposit(&h).await;
        let started = Instant::now();

        let interrupted = tokio::time::timeout(
            Duration::from_secs(40),
            h.orchestrator.execute_sequence(&mut sequence),
        )
        .await;
        assert!(interrupted.is_err());

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(matches!(outcome.error(), Some(ReservesError::Timeout(_))));
        // 60s budget from acknowledgement, not 40s + a fresh 60s
        assert!(started.elapsed() <= Duration::from_secs(61));
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_closes_cancel_window() {
        let h = harness();
        let mut sequence = approve_then_deposit(&h).await;
        let first = h.orchestrator.execute_sequence(&mut sequence).await;

        let cancel = CancelHandle::new();
        let replayed = h
            .orchestrator
            .execute_with_cancel(&mut sequence, &cancel)
            .await;

        assert_eq!(replayed, first);
        assert!(!cancel.cancel());
        assert!(!cancel.is_cancelled());
        assert_eq!(h.wallet.submissions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_outcome_applies_to_unscripted_steps() {
        let h = harness();
        h.wallet.set_default_outcome(MockOutcome::Revert);
        let [link, collateral] = h
            .factory
            .handles([ContractName::LinkToken, ContractName::CollateralInterface])
            .await
            .unwrap();
        let mut sequence = TransactionSequence::new([approve(link)]).then(deposit(collateral));
        assert_eq!(sequence.len(), 2);

        let outcome = h.orchestrator.execute_sequence(&mut sequence).await;

        assert!(matches!(outcome.error(), Some(ReservesError::Reverted(_))));
        assert_eq!(h.wallet.submitted_selectors(), vec![APPROVE]);
    }
}
