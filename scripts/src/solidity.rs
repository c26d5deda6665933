//! Definitions of Solidity functions called during deployment and bootstrap

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ILiblock {
        function setDistributor(address distributor) external;
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IOwnable {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IRLiblock {
        function balanceOf(address account) external view returns (uint256);
        function getVotes(address account) external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ILiblocked {
        function lock17(uint256 amount) external;
        function lock186(uint256 amount) external;
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IProposal {
        function balancingCount() external view returns (uint256);
        function balancing(uint256 index) external view returns (uint256);
        function virtualPowerUsed(address account, uint256 index) external view returns (uint256);
        function createProposal(string title, string text) external;
    }
}
