//! Transaction receipts with a one-way status lifecycle
//!
//! A receipt starts `Pending` when the wallet acknowledges a submission and
//! moves exactly once to a terminal status. The transition consumes the
//! [`PendingTransaction`], so a terminal receipt can never become pending again.

use alloy::primitives::{TxHash, B256};
use std::fmt;
use tokio::time::Instant;

/// Lifecycle status of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Pending,
    Confirmed,
    Reverted,
    RejectedByUser,
    Failed,
}

impl ReceiptStatus {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Reverted => "reverted",
            Self::RejectedByUser => "rejected-by-user",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Block that included a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub number: u64,
    pub hash: B256,
}

/// Outcome record for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub status: ReceiptStatus,
    /// Present once the wallet accepted the transaction
    pub transaction_id: Option<TxHash>,
    /// Present once the transaction was included in a block
    pub block: Option<BlockRef>,
}

impl TransactionReceipt {
    /// Receipt for a transaction the user declined to sign
    pub fn rejected() -> Self {
        Self {
            status: ReceiptStatus::RejectedByUser,
            transaction_id: None,
            block: None,
        }
    }

    /// Receipt for a submission that failed before a transaction id was known
    pub fn failed_unsubmitted() -> Self {
        Self {
            status: ReceiptStatus::Failed,
            transaction_id: None,
            block: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReceiptStatus::Confirmed
    }
}

/// A transaction accepted by the wallet and awaiting its terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    tx_hash: TxHash,
    /// Fixed when the wallet acknowledged the transaction
    deadline: Instant,
}

impl PendingTransaction {
    pub fn new(tx_hash: TxHash, deadline: Instant) -> Self {
        Self { tx_hash, deadline }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Instant after which the transaction counts as timed out
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Snapshot of the in-flight receipt
    pub fn receipt(&self) -> TransactionReceipt {
        TransactionReceipt {
            status: ReceiptStatus::Pending,
            transaction_id: Some(self.tx_hash),
            block: None,
        }
    }

    pub fn confirm(self, block: BlockRef) -> TransactionReceipt {
        self.settle(ReceiptStatus::Confirmed, Some(block))
    }

    pub fn revert(self, block: BlockRef) -> TransactionReceipt {
        self.settle(ReceiptStatus::Reverted, Some(block))
    }

    /// Terminal failure (timeout, transport error) with no block observed
    pub fn fail(self) -> TransactionReceipt {
        self.settle(ReceiptStatus::Failed, None)
    }

    fn settle(self, status: ReceiptStatus, block: Option<BlockRef>) -> TransactionReceipt {
        TransactionReceipt {
            status,
            transaction_id: Some(self.tx_hash),
            block,
        }
    }
}
