//! Contract bindings for the reserves contracts
//!
//! Each binding module also exports the static method table the registry
//! uses as the contract's interface descriptor.

pub mod asset_warehouse;
pub mod collateral_interface;
pub mod kel_coin_teller;
pub mod link_token;

pub use asset_warehouse::*;
pub use collateral_interface::*;
pub use kel_coin_teller::*;
pub use link_token::*;

use alloy::sol_types::SolCall;

/// Whether a method mutates chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// View function, answered with `eth_call`
    Read,
    /// State-changing function, needs a signed transaction
    Write,
}

/// One callable method of a contract interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Solidity signature, e.g. `approve(address,uint256)`
    pub signature: &'static str,
    /// 4-byte function selector
    pub selector: [u8; 4],
    pub kind: MethodKind,
}

impl MethodSpec {
    /// Describe a view method
    pub const fn read<C: SolCall>() -> Self {
        Self {
            signature: C::SIGNATURE,
            selector: C::SELECTOR,
            kind: MethodKind::Read,
        }
    }

    /// Describe a state-changing method
    pub const fn write<C: SolCall>() -> Self {
        Self {
            signature: C::SIGNATURE,
            selector: C::SELECTOR,
            kind: MethodKind::Write,
        }
    }

    /// Method name without the argument list
    pub fn name(&self) -> &'static str {
        self.signature
            .split_once('(')
            .map_or(self.signature, |(name, _)| name)
    }
}
