//! Reserves types for user-facing API

use crate::constants::{unscale_token, TOKEN_DECIMALS};
use crate::error::ReservesError;
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};

/// Parameters for depositing collateral or reserves
#[derive(Debug, Clone)]
pub struct DepositParams {
    /// Decimal amount of link tokens to deposit, e.g. `"100.1"`
    pub amount: String,
}

impl DepositParams {
    /// Create deposit params from a decimal amount (`"100.1"` or `100.1`)
    pub fn new(amount: impl ToString) -> Self {
        Self {
            amount: amount.to_string(),
        }
    }

    /// Validated amount in 18-decimal base units
    pub fn scaled_amount(&self) -> Result<U256, ReservesError> {
        parse_token_amount(&self.amount)
    }
}

/// Parameters for withdrawing collateral or reserves
#[derive(Debug, Clone)]
pub struct WithdrawParams {
    /// Decimal amount to withdraw
    pub amount: String,
}

impl WithdrawParams {
    /// Create withdraw params from a decimal amount
    pub fn new(amount: impl ToString) -> Self {
        Self {
            amount: amount.to_string(),
        }
    }

    /// Validated amount in 18-decimal base units
    pub fn scaled_amount(&self) -> Result<U256, ReservesError> {
        parse_token_amount(&self.amount)
    }
}

/// Parse a positive decimal token amount into base units, without rounding
pub fn parse_token_amount(amount: &str) -> Result<U256, ReservesError> {
    let amount = amount.trim();
    let parsed = parse_units(amount, TOKEN_DECIMALS).map_err(|err| {
        ReservesError::InvalidAmount(format!("invalid amount {:?}: {}", amount, err))
    })?;
    if parsed.is_negative() {
        return Err(ReservesError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    let scaled = parsed.get_absolute();
    if scaled.is_zero() {
        return Err(ReservesError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(scaled)
}

/// Current on-chain reserves position of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservesSnapshot {
    pub account: Address,
    /// Collateral deposited in the Collateral Interface
    pub collateral: U256,
    /// Reserves deposited with the KelCoin Teller
    pub reserves: U256,
    /// Link token wallet balance
    pub link_balance: U256,
}

impl ReservesSnapshot {
    pub fn collateral_f64(&self) -> f64 {
        unscale_token(self.collateral)
    }

    pub fn reserves_f64(&self) -> f64 {
        unscale_token(self.reserves)
    }

    pub fn link_balance_f64(&self) -> f64 {
        unscale_token(self.link_balance)
    }
}
