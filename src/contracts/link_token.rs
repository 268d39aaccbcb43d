//! Link token (bridging token) bindings: ERC20 plus ERC677 `transferAndCall`

use super::MethodSpec;
use alloy::sol;

sol! {
    /// LINK token interface
    #[sol(rpc)]
    interface ILinkToken {
        /// Returns the name of the token
        function name() external view returns (string memory);

        /// Returns the symbol of the token
        function symbol() external view returns (string memory);

        /// Returns the decimals of the token
        function decimals() external view returns (uint8);

        /// Returns the total supply of the token
        function totalSupply() external view returns (uint256);

        /// Returns the balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Returns the allowance of a spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Approves a spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Transfers tokens to a recipient
        function transfer(address to, uint256 amount) external returns (bool);

        /// Transfers tokens and notifies the receiving contract (ERC677)
        function transferAndCall(address to, uint256 value, bytes calldata data) external returns (bool);

        event Transfer(address indexed from, address indexed to, uint256 value);

        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}

/// Callable surface of the link token
pub static LINK_TOKEN_METHODS: &[MethodSpec] = &[
    MethodSpec::read::<ILinkToken::nameCall>(),
    MethodSpec::read::<ILinkToken::symbolCall>(),
    MethodSpec::read::<ILinkToken::decimalsCall>(),
    MethodSpec::read::<ILinkToken::totalSupplyCall>(),
    MethodSpec::read::<ILinkToken::balanceOfCall>(),
    MethodSpec::read::<ILinkToken::allowanceCall>(),
    MethodSpec::write::<ILinkToken::approveCall>(),
    MethodSpec::write::<ILinkToken::transferCall>(),
    MethodSpec::write::<ILinkToken::transferAndCallCall>(),
];
