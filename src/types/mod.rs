//! Types for user-facing API

pub mod receipt;
pub mod reserves;

pub use receipt::{BlockRef, PendingTransaction, ReceiptStatus, TransactionReceipt};
pub use reserves::{parse_token_amount, DepositParams, ReservesSnapshot, WithdrawParams};
