//! Scripted in-memory wallet for tests
//!
//! Outcomes are scripted per function selector; every submission attempt is
//! recorded in order, including the ones the "user" rejects.

use super::{ChainReceipt, TxRequest, WalletError, WalletProvider};
use crate::constants::BSC_TESTNET_CHAIN_ID;
use alloy::primitives::{Address, Bytes, TxHash, B256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// What happens to a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// Mined successfully on the first poll
    Confirm,
    /// Mined with a failed execution status
    Revert,
    /// The user declines to sign
    Reject,
    /// The wallet fails to broadcast the transaction
    SubmitFailure,
    /// The signature prompt is never answered
    AwaitSignature,
    /// Accepted but never mined
    Hang,
    /// Status polling fails with a transport error
    DropConnection,
    /// Pending for the given number of polls, then confirmed
    ConfirmAfter(u32),
    /// Confirmed, after which the wallet's active account switches
    ConfirmThenSwitch(Address),
    /// Confirmed, after which the wallet moves to another chain
    ConfirmThenSwitchChain(u64),
    /// The user switches to another account while the prompt is open; the
    /// wallet then refuses to sign for the previous one
    SwitchBeforeSign(Address),
}

/// One recorded submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub from: Address,
    pub to: Address,
    pub selector: Option<[u8; 4]>,
    /// `None` when the submission was not acknowledged
    pub tx_hash: Option<TxHash>,
}

struct Mined {
    outcome: MockOutcome,
    polls: u32,
}

struct MockState {
    accounts: Vec<Address>,
    chain_id: u64,
    deny_access: bool,
    access_requests: usize,
    scripts: HashMap<[u8; 4], VecDeque<MockOutcome>>,
    default_outcome: MockOutcome,
    submissions: Vec<Submission>,
    mined: HashMap<TxHash, Mined>,
    call_results: HashMap<[u8; 4], Bytes>,
    call_failure: Option<String>,
    block_number: u64,
}

/// In-memory wallet with scripted transaction outcomes
pub struct MockWallet {
    state: Mutex<MockState>,
}

impl MockWallet {
    /// Unlocked wallet on BSC testnet with a single active account
    pub fn new(account: Address) -> Self {
        Self {
            state: Mutex::new(MockState {
                accounts: vec![account],
                chain_id: BSC_TESTNET_CHAIN_ID,
                deny_access: false,
                access_requests: 0,
                scripts: HashMap::new(),
                default_outcome: MockOutcome::Confirm,
                submissions: Vec::new(),
                mined: HashMap::new(),
                call_results: HashMap::new(),
                call_failure: None,
                block_number: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decline every account-access request
    pub fn deny_access(&self) {
        self.state().deny_access = true;
    }

    /// Expose no accounts
    pub fn lock(&self) {
        self.state().accounts.clear();
    }

    pub fn switch_account(&self, account: Address) {
        self.state().accounts = vec![account];
    }

    pub fn switch_chain(&self, chain_id: u64) {
        self.state().chain_id = chain_id;
    }

    /// Queue an outcome for the next submission of `selector`
    pub fn script(&self, selector: [u8; 4], outcome: MockOutcome) {
        self.state()
            .scripts
            .entry(selector)
            .or_default()
            .push_back(outcome);
    }

    /// Outcome for submissions without a queued script
    pub fn set_default_outcome(&self, outcome: MockOutcome) {
        self.state().default_outcome = outcome;
    }

    /// Return `result` from read calls to `selector`
    pub fn set_call_result(&self, selector: [u8; 4], result: impl Into<Bytes>) {
        self.state().call_results.insert(selector, result.into());
    }

    /// Make every read call fail
    pub fn fail_calls(&self, message: impl Into<String>) {
        self.state().call_failure = Some(message.into());
    }

    /// All submission attempts, in order
    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// Selectors of all submission attempts, in order
    pub fn submitted_selectors(&self) -> Vec<[u8; 4]> {
        self.state()
            .submissions
            .iter()
            .filter_map(|s| s.selector)
            .collect()
    }

    pub fn access_requests(&self) -> usize {
        self.state().access_requests
    }
}

impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let mut state = self.state();
        state.access_requests += 1;
        if state.deny_access {
            return Err(WalletError::UserRejected);
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.state().chain_id)
    }

    async fn send_transaction(&self, from: Address, tx: TxRequest) -> Result<TxHash, WalletError> {
        let outcome = {
            let mut guard = self.state();
            let state = &mut *guard;
            if state.accounts.first() != Some(&from) {
                return Err(WalletError::Unauthorized);
            }

            let selector = tx.selector();
            let outcome = selector
                .and_then(|s| state.scripts.get_mut(&s))
                .and_then(|queue| queue.pop_front())
                .unwrap_or(state.default_outcome);

            let accepted = !matches!(
                outcome,
                MockOutcome::Reject
                    | MockOutcome::SubmitFailure
                    | MockOutcome::AwaitSignature
                    | MockOutcome::SwitchBeforeSign(_)
            );
            let tx_hash = accepted.then(|| {
                let nonce = state.submissions.len() as u64 + 1;
                B256::left_padding_from(&nonce.to_be_bytes())
            });

            state.submissions.push(Submission {
                from,
                to: tx.to,
                selector,
                tx_hash,
            });

            match (outcome, tx_hash) {
                (MockOutcome::Reject, _) => return Err(WalletError::UserRejected),
                (MockOutcome::SubmitFailure, _) => {
                    return Err(WalletError::Transport("broadcast failed".to_string()))
                }
                (MockOutcome::SwitchBeforeSign(account), _) => {
                    state.accounts = vec![account];
                    return Err(WalletError::Unauthorized);
                }
                (_, Some(tx_hash)) => {
                    state.mined.insert(tx_hash, Mined { outcome, polls: 0 });
                    return Ok(tx_hash);
                }
                (outcome, None) => outcome,
            }
        };

        // Only an unanswered signature prompt reaches this point
        debug_assert_eq!(outcome, MockOutcome::AwaitSignature);
        std::future::pending().await
    }

    async fn transaction_status(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ChainReceipt>, WalletError> {
        let mut guard = self.state();
        let state = &mut *guard;
        state.block_number += 1;
        let block_number = state.block_number;

        let Some(mined) = state.mined.get_mut(&tx_hash) else {
            return Ok(None);
        };

        let mined_receipt = |success| ChainReceipt {
            success,
            block_number,
            block_hash: B256::left_padding_from(&block_number.to_be_bytes()),
        };

        match mined.outcome {
            MockOutcome::Revert => Ok(Some(mined_receipt(false))),
            MockOutcome::Hang => Ok(None),
            MockOutcome::DropConnection => {
                Err(WalletError::Transport("connection dropped".to_string()))
            }
            MockOutcome::ConfirmAfter(polls) if mined.polls < polls => {
                mined.polls += 1;
                Ok(None)
            }
            MockOutcome::ConfirmThenSwitch(account) => {
                state.accounts = vec![account];
                Ok(Some(mined_receipt(true)))
            }
            MockOutcome::ConfirmThenSwitchChain(chain_id) => {
                state.chain_id = chain_id;
                Ok(Some(mined_receipt(true)))
            }
            _ => Ok(Some(mined_receipt(true))),
        }
    }

    async fn call(&self, tx: TxRequest) -> Result<Bytes, WalletError> {
        let state = self.state();
        if let Some(message) = &state.call_failure {
            return Err(WalletError::Transport(message.clone()));
        }
        Ok(tx
            .selector()
            .and_then(|s| state.call_results.get(&s).cloned())
            // ABI encoding of zero / false / the zero address
            .unwrap_or_else(|| Bytes::from(vec![0u8; 32])))
    }
}
