//! Collateral Interface bindings
//!
//! Holds link tokens posted as collateral for in-game reserves.

use super::MethodSpec;
use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ICollateralInterface {
        /// Token accepted as collateral
        function collateralToken() external view returns (address);

        /// Collateral currently deposited by an account
        function collateralOf(address account) external view returns (uint256);

        function totalCollateral() external view returns (uint256);

        /// Pull `amount` of the collateral token from the caller (requires allowance)
        function depositCollateral(uint256 amount) external;

        /// Return `amount` of deposited collateral to the caller
        function withdrawCollateral(uint256 amount) external;

        event CollateralDeposited(address indexed account, uint256 amount);

        event CollateralWithdrawn(address indexed account, uint256 amount);
    }
}

/// Callable surface of the Collateral Interface
pub static COLLATERAL_INTERFACE_METHODS: &[MethodSpec] = &[
    MethodSpec::read::<ICollateralInterface::collateralTokenCall>(),
    MethodSpec::read::<ICollateralInterface::collateralOfCall>(),
    MethodSpec::read::<ICollateralInterface::totalCollateralCall>(),
    MethodSpec::write::<ICollateralInterface::depositCollateralCall>(),
    MethodSpec::write::<ICollateralInterface::withdrawCollateralCall>(),
];
