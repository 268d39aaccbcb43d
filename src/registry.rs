//! Contract registry: logical contract names to addresses and interfaces
//!
//! The registry is built once at startup and is read-only afterwards. It is
//! the only place that knows raw contract addresses.

use crate::config::NetworkConfig;
use crate::contracts::{
    MethodKind, MethodSpec, ASSET_WAREHOUSE_METHODS, COLLATERAL_INTERFACE_METHODS,
    KEL_COIN_TELLER_METHODS, LINK_TOKEN_METHODS,
};
use crate::error::ReservesError;
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Logical role of a contract in the reserves system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum ContractName {
    /// Collateral manager
    CollateralInterface,
    /// Reserve token teller
    KelCoinTeller,
    /// Game asset warehouse
    AssetWarehouse,
    /// Bridging token
    LinkToken,
}

impl ContractName {
    pub const ALL: [ContractName; 4] = [
        Self::CollateralInterface,
        Self::KelCoinTeller,
        Self::AssetWarehouse,
        Self::LinkToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollateralInterface => "CollateralInterface",
            Self::KelCoinTeller => "KelCoinTeller",
            Self::AssetWarehouse => "AssetWarehouse",
            Self::LinkToken => "LinkToken",
        }
    }

    /// Static interface of the contract
    pub fn interface(&self) -> &'static [MethodSpec] {
        match self {
            Self::CollateralInterface => COLLATERAL_INTERFACE_METHODS,
            Self::KelCoinTeller => KEL_COIN_TELLER_METHODS,
            Self::AssetWarehouse => ASSET_WAREHOUSE_METHODS,
            Self::LinkToken => LINK_TOKEN_METHODS,
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractName {
    type Err = ReservesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "collateralinterface" | "collateral" | "collateralmanager" => {
                Ok(Self::CollateralInterface)
            }
            "kelcointeller" | "teller" | "reserveteller" | "reservetokenteller" => {
                Ok(Self::KelCoinTeller)
            }
            "assetwarehouse" | "gameassetwarehouse" | "warehouse" => Ok(Self::AssetWarehouse),
            "linktoken" | "link" | "bridgingtoken" | "bsclinktoken" => Ok(Self::LinkToken),
            _ => Err(ReservesError::UnknownContract(s.to_string())),
        }
    }
}

/// Address and interface of one registered contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub name: ContractName,
    pub address: Address,
    pub interface: &'static [MethodSpec],
}

impl ContractDescriptor {
    /// Look up a method by its 4-byte selector
    pub fn method(&self, selector: [u8; 4]) -> Option<&'static MethodSpec> {
        self.interface.iter().find(|m| m.selector == selector)
    }

    /// Look up a method of a given kind, failing with `UnsupportedMethod`
    pub fn require_method(
        &self,
        selector: [u8; 4],
        signature: &str,
        kind: MethodKind,
    ) -> Result<&'static MethodSpec, ReservesError> {
        self.method(selector)
            .filter(|m| m.kind == kind)
            .ok_or_else(|| ReservesError::UnsupportedMethod {
                contract: self.name.to_string(),
                method: signature.to_string(),
            })
    }
}

/// Read-only table of contract descriptors
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<ContractName, ContractDescriptor>,
}

/// On-disk form of the registry table
#[derive(Debug, Deserialize)]
struct RegistryTable {
    contracts: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    name: ContractName,
    address: Address,
}

impl ContractRegistry {
    /// Build a registry from `(name, address)` pairs
    ///
    /// Fails on duplicate names and on the zero address.
    pub fn new(
        entries: impl IntoIterator<Item = (ContractName, Address)>,
    ) -> Result<Self, ReservesError> {
        let mut contracts = HashMap::new();
        for (name, address) in entries {
            if address == Address::ZERO {
                return Err(ReservesError::InvalidRegistry(format!(
                    "{} has the zero address",
                    name
                )));
            }
            let descriptor = ContractDescriptor {
                name,
                address,
                interface: name.interface(),
            };
            if contracts.insert(name, descriptor).is_some() {
                return Err(ReservesError::InvalidRegistry(format!(
                    "{} registered twice",
                    name
                )));
            }
        }
        Ok(Self { contracts })
    }

    /// Build a registry from the addresses configured for a network
    pub fn from_config(config: &NetworkConfig) -> Result<Self, ReservesError> {
        let entries = [
            (ContractName::CollateralInterface, config.collateral_interface),
            (ContractName::KelCoinTeller, config.kel_coin_teller),
            (ContractName::AssetWarehouse, config.asset_warehouse),
            (ContractName::LinkToken, config.link_token),
        ];
        Self::new(
            entries
                .into_iter()
                .filter_map(|(name, address)| address.map(|a| (name, a))),
        )
    }

    /// Parse a JSON table: `{"contracts":[{"name":"LinkToken","address":"0x…"}]}`
    pub fn from_json(json: &str) -> Result<Self, ReservesError> {
        let table: RegistryTable = serde_json::from_str(json)
            .map_err(|e| ReservesError::InvalidRegistry(e.to_string()))?;
        Self::new(table.contracts.into_iter().map(|e| (e.name, e.address)))
    }

    /// Describe a contract by logical name
    pub fn describe(&self, logical_name: &str) -> Result<ContractDescriptor, ReservesError> {
        let name: ContractName = logical_name.parse()?;
        self.contracts
            .get(&name)
            .cloned()
            .ok_or_else(|| ReservesError::UnknownContract(logical_name.to_string()))
    }

    /// Describe a contract by its typed name
    pub fn descriptor(&self, name: ContractName) -> Result<ContractDescriptor, ReservesError> {
        self.contracts
            .get(&name)
            .cloned()
            .ok_or_else(|| ReservesError::UnknownContract(name.to_string()))
    }

    /// Registered contract names
    pub fn names(&self) -> impl Iterator<Item = ContractName> + '_ {
        self.contracts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
