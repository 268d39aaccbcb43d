//! KelCoin Teller (reserve token teller) bindings

use super::MethodSpec;
use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IKelCoinTeller {
        /// The KelCoin reserve token minted against deposits
        function kelCoin() external view returns (address);

        /// Reserves deposited by an account
        function reservesOf(address account) external view returns (uint256);

        function totalReserves() external view returns (uint256);

        /// Deposit `amount` of link tokens into reserves (requires allowance)
        function depositReserves(uint256 amount) external;

        /// Withdraw `amount` of reserves back to the caller
        function withdrawReserves(uint256 amount) external;

        event ReservesDeposited(address indexed account, uint256 amount);

        event ReservesWithdrawn(address indexed account, uint256 amount);
    }
}

/// Callable surface of the KelCoin Teller
pub static KEL_COIN_TELLER_METHODS: &[MethodSpec] = &[
    MethodSpec::read::<IKelCoinTeller::kelCoinCall>(),
    MethodSpec::read::<IKelCoinTeller::reservesOfCall>(),
    MethodSpec::read::<IKelCoinTeller::totalReservesCall>(),
    MethodSpec::write::<IKelCoinTeller::depositReservesCall>(),
    MethodSpec::write::<IKelCoinTeller::withdrawReservesCall>(),
];
