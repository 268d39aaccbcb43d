//! Game Asset Warehouse bindings (ERC1155-style in-game assets)

use super::MethodSpec;
use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IGameAssetWarehouse {
        /// Balance of asset `id` held by `account`
        function balanceOf(address account, uint256 id) external view returns (uint256);

        function isApprovedForAll(address account, address operator) external view returns (bool);

        /// Allow `operator` to move all of the caller's assets
        function setApprovalForAll(address operator, bool approved) external;

        function safeTransferFrom(
            address from,
            address to,
            uint256 id,
            uint256 amount,
            bytes calldata data
        ) external;

        event TransferSingle(
            address indexed operator,
            address indexed from,
            address indexed to,
            uint256 id,
            uint256 value
        );
    }
}

/// Callable surface of the Asset Warehouse
pub static ASSET_WAREHOUSE_METHODS: &[MethodSpec] = &[
    MethodSpec::read::<IGameAssetWarehouse::balanceOfCall>(),
    MethodSpec::read::<IGameAssetWarehouse::isApprovedForAllCall>(),
    MethodSpec::write::<IGameAssetWarehouse::setApprovalForAllCall>(),
    MethodSpec::write::<IGameAssetWarehouse::safeTransferFromCall>(),
];
