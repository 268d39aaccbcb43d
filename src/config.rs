//! Network configuration for the reserves SDK

use crate::constants::{
    BSC_TESTNET_CHAIN_ID, BSC_TESTNET_LINK_TOKEN, BSC_TESTNET_RPC_URL,
    DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL,
};
use alloy::primitives::Address;
use eyre::{Context, Result};
use std::time::Duration;

/// Network configuration containing RPC URLs and contract addresses
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain ID (97 for BSC testnet)
    pub chain_id: u64,
    /// RPC endpoint URL used for reads and receipts
    pub rpc_url: String,
    /// Endpoint of an injected (EIP-1193) wallet, if one is available
    pub wallet_url: Option<String>,
    /// Collateral Interface contract address
    pub collateral_interface: Option<Address>,
    /// KelCoin Teller (reserve token teller) contract address
    pub kel_coin_teller: Option<Address>,
    /// Game Asset Warehouse contract address
    pub asset_warehouse: Option<Address>,
    /// Link (bridging) token address
    pub link_token: Option<Address>,
    /// Transaction timing
    pub timeouts: TimeoutConfig,
}

/// How long the orchestrator waits on the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Upper bound on the wait for a submitted transaction's terminal status
    pub confirmation_timeout: Duration,
    /// Receipt polling interval
    pub poll_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::bsc_testnet()
    }
}

impl NetworkConfig {
    /// BSC testnet configuration with only the LINK token registered
    ///
    /// Reserves contract addresses are deployment specific; set them with
    /// the `with_*` builders or load them through [`NetworkConfig::from_env`].
    pub fn bsc_testnet() -> Self {
        Self {
            chain_id: BSC_TESTNET_CHAIN_ID,
            rpc_url: BSC_TESTNET_RPC_URL.to_string(),
            wallet_url: None,
            collateral_interface: None,
            kel_coin_teller: None,
            asset_warehouse: None,
            link_token: Some(BSC_TESTNET_LINK_TOKEN),
            timeouts: TimeoutConfig::default(),
        }
    }

    /// Load configuration from the environment (and `.env`, if present)
    ///
    /// Unset variables keep their BSC testnet defaults. Recognised variables:
    /// `RESERVES_RPC_URL`, `RESERVES_CHAIN_ID`, `WALLET_URL`,
    /// `COLLATERAL_INTERFACE_ADDRESS`, `KEL_COIN_TELLER_ADDRESS`,
    /// `ASSET_WAREHOUSE_ADDRESS`, `LINK_TOKEN_ADDRESS`,
    /// `CONFIRMATION_TIMEOUT_SECS`, `POLL_INTERVAL_MS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::bsc_testnet();

        if let Some(rpc_url) = lookup("RESERVES_RPC_URL") {
            config.rpc_url = rpc_url;
        }
        if let Some(chain_id) = lookup("RESERVES_CHAIN_ID") {
            config.chain_id = chain_id.parse().context("Invalid RESERVES_CHAIN_ID")?;
        }
        config.wallet_url = lookup("WALLET_URL");

        let address = |key: &str| -> Result<Option<Address>> {
            lookup(key)
                .map(|value| value.parse().with_context(|| format!("Invalid {}", key)))
                .transpose()
        };
        config.collateral_interface = address("COLLATERAL_INTERFACE_ADDRESS")?;
        config.kel_coin_teller = address("KEL_COIN_TELLER_ADDRESS")?;
        config.asset_warehouse = address("ASSET_WAREHOUSE_ADDRESS")?;
        if let Some(link_token) = address("LINK_TOKEN_ADDRESS")? {
            config.link_token = Some(link_token);
        }

        if let Some(secs) = lookup("CONFIRMATION_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("Invalid CONFIRMATION_TIMEOUT_SECS")?;
            config.timeouts.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = lookup("POLL_INTERVAL_MS") {
            let ms: u64 = ms.parse().context("Invalid POLL_INTERVAL_MS")?;
            config.timeouts.poll_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Create custom configuration with specific RPC URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set the chain ID
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the injected wallet endpoint
    pub fn with_wallet_url(mut self, wallet_url: impl Into<String>) -> Self {
        self.wallet_url = Some(wallet_url.into());
        self
    }

    /// Set the Collateral Interface address
    pub fn with_collateral_interface(mut self, address: Address) -> Self {
        self.collateral_interface = Some(address);
        self
    }

    /// Set the KelCoin Teller address
    pub fn with_kel_coin_teller(mut self, address: Address) -> Self {
        self.kel_coin_teller = Some(address);
        self
    }

    /// Set the Asset Warehouse address
    pub fn with_asset_warehouse(mut self, address: Address) -> Self {
        self.asset_warehouse = Some(address);
        self
    }

    /// Set the Link token address
    pub fn with_link_token(mut self, address: Address) -> Self {
        self.link_token = Some(address);
        self
    }

    /// Set transaction timing
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }
}
