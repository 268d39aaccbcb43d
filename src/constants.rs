//! Constants and precision values for the reserves SDK

use alloy::primitives::utils::format_units;
use alloy::primitives::{address, Address, U256};
use std::time::Duration;

/// BSC testnet chain ID
pub const BSC_TESTNET_CHAIN_ID: u64 = 97;

/// Public BSC testnet RPC endpoint
pub const BSC_TESTNET_RPC_URL: &str = "https://data-seed-prebsc-1-s1.bnbchain.org:8545";

/// Chainlink LINK token on BSC testnet (the bridging token)
pub const BSC_TESTNET_LINK_TOKEN: Address = address!("84b9b910527ad5c03a9ca831909e21e236ea7b06");

/// LINK, collateral and reserve balances all use 18 decimals
pub const TOKEN_DECIMALS: u8 = 18;

/// Default time to wait for a submitted transaction to reach a terminal state
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Default receipt polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// EIP-1193: user rejected the request
pub const EIP1193_USER_REJECTED: i64 = 4001;

/// EIP-1193: the requested account or method is not authorized
pub const EIP1193_UNAUTHORIZED: i64 = 4100;

/// Unscale a U256 value to floating point with specified decimals
///
/// For display only; exact amounts stay in base units.
pub fn unscale_from_decimals(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals)
        .ok()
        .and_then(|formatted| formatted.parse().ok())
        .unwrap_or(f64::INFINITY)
}

/// Unscale a token amount (18 decimals)
pub fn unscale_token(amount: U256) -> f64 {
    unscale_from_decimals(amount, TOKEN_DECIMALS)
}
