//! Message types for the interchain swap contract.

use common::ChannelInfo;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Coin};

use crate::state::{InterchainLiquidityPool, MultiAssetDepositOrder, PoolAsset};

// ============================================================================
// Instantiate & Migrate
// ============================================================================

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for configuration updates
    pub admin: String,
    /// Seconds until an outgoing packet times out
    pub packet_lifetime: u64,
    /// Highest swap fee a new pool may charge, in basis points
    pub max_swap_fee_bps: u32,
    /// Allowed deviation of a two-sided deposit from the pool ratio, in basis points
    pub multi_deposit_tolerance_bps: u32,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Proposes a pool. Sent by the creator with the Source asset attached.
#[cw_serde]
pub struct MakePoolMsg {
    pub source_port: String,
    pub source_channel: String,
    pub creator: String,
    /// Address on the counterparty chain allowed to take the pool
    pub counterparty_creator: String,
    /// Exactly one Source and one Destination asset. The balances are the
    /// initial liquidity each creator must provide.
    pub liquidity: Vec<PoolAsset>,
    pub swap_fee_bps: u32,
}

/// Provides the Destination liquidity of a pool made on the counterparty.
#[cw_serde]
pub struct TakePoolMsg {
    pub creator: String,
    pub pool_id: String,
}

#[cw_serde]
pub struct CancelPoolMsg {
    pub creator: String,
    pub pool_id: String,
}

#[cw_serde]
pub struct SingleAssetDepositMsg {
    pub pool_id: String,
    pub sender: String,
    /// Must be this chain's asset of the pool
    pub token: Coin,
}

/// Opens a two-sided deposit. The maker pays this chain's share; the named
/// taker pays the other share on the counterparty chain.
#[cw_serde]
pub struct MakeMultiAssetDepositMsg {
    pub pool_id: String,
    pub source_maker: String,
    pub destination_taker: String,
    /// One deposit per pool asset
    pub deposits: Vec<Coin>,
}

#[cw_serde]
pub struct TakeMultiAssetDepositMsg {
    pub sender: String,
    pub pool_id: String,
    pub order_id: String,
}

#[cw_serde]
pub struct CancelMultiAssetDepositMsg {
    pub sender: String,
    pub pool_id: String,
    pub order_id: String,
}

/// Redeems pool tokens for both assets. This chain's asset goes to
/// `receiver`, the counterparty's to `counterparty_receiver`.
#[cw_serde]
pub struct MultiAssetWithdrawMsg {
    pub pool_id: String,
    /// Holder of the pool tokens on this chain
    pub sender: String,
    pub receiver: String,
    pub counterparty_receiver: String,
    pub pool_token: Coin,
}

#[cw_serde]
pub enum SwapType {
    /// Exact input: sell all of `token_in`
    Left,
    /// Exact output: buy `token_out`, spending at most `token_in`
    Right,
}

#[cw_serde]
pub struct SwapMsg {
    pub swap_type: SwapType,
    pub sender: String,
    pub pool_id: String,
    /// Tokens sold on this chain; the cap for right swaps
    pub token_in: Coin,
    /// Tokens bought on the counterparty chain
    pub token_out: Coin,
    /// Left swaps fail when the output falls more than this below `token_out`
    pub slippage_bps: u32,
    /// Receives `token_out` on the counterparty chain
    pub recipient: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    MakePool(MakePoolMsg),
    TakePool(TakePoolMsg),
    CancelPool(CancelPoolMsg),
    SingleAssetDeposit(SingleAssetDepositMsg),
    MakeMultiAssetDeposit(MakeMultiAssetDepositMsg),
    TakeMultiAssetDeposit(TakeMultiAssetDepositMsg),
    CancelMultiAssetDeposit(CancelMultiAssetDepositMsg),
    MultiAssetWithdraw(MultiAssetWithdrawMsg),
    Swap(SwapMsg),

    /// Admin only
    UpdateConfig {
        admin: Option<String>,
        packet_lifetime: Option<u64>,
        max_swap_fee_bps: Option<u32>,
        multi_deposit_tolerance_bps: Option<u32>,
    },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(InterchainLiquidityPool)]
    Pool { pool_id: String },

    #[returns(PoolsResponse)]
    Pools {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(MultiAssetDepositOrder)]
    DepositOrder { order_id: String },

    #[returns(DepositOrdersResponse)]
    DepositOrders {
        pool_id: Option<String>,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Pool token balance held on this chain
    #[returns(cw20::BalanceResponse)]
    LpBalance { pool_id: String, address: String },

    #[returns(EscrowAddressResponse)]
    EscrowAddress { port_id: String, channel_id: String },

    #[returns(EscrowBalanceResponse)]
    EscrowBalance {
        port_id: String,
        channel_id: String,
        denom: String,
    },

    /// Quote a swap against the current pool state. Left swaps only use
    /// the denom of `token_out`.
    #[returns(EstimateSwapResponse)]
    EstimateSwap {
        pool_id: String,
        swap_type: SwapType,
        token_in: Coin,
        token_out: Coin,
    },

    #[returns(EstimateDepositResponse)]
    EstimateSingleDeposit { pool_id: String, token: Coin },

    /// Single-sided redemption quote
    #[returns(EstimateWithdrawResponse)]
    EstimateWithdraw {
        pool_id: String,
        pool_token: Coin,
        denom_out: String,
    },

    #[returns(ChannelInfo)]
    Channel { channel_id: String },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub packet_lifetime: u64,
    pub max_swap_fee_bps: u32,
    pub multi_deposit_tolerance_bps: u32,
}

#[cw_serde]
pub struct PoolsResponse {
    pub pools: Vec<InterchainLiquidityPool>,
}

#[cw_serde]
pub struct DepositOrdersResponse {
    pub orders: Vec<MultiAssetDepositOrder>,
    /// Order id to resume from when the listing stopped before the end
    pub next_start_after: Option<String>,
}

#[cw_serde]
pub struct EscrowAddressResponse {
    pub address: String,
}

#[cw_serde]
pub struct EscrowBalanceResponse {
    pub address: String,
    pub balance: Coin,
}

#[cw_serde]
pub struct EstimateSwapResponse {
    pub token_in: Coin,
    pub token_out: Coin,
}

#[cw_serde]
pub struct EstimateDepositResponse {
    pub pool_token: Coin,
}

#[cw_serde]
pub struct EstimateWithdrawResponse {
    pub token: Coin,
}
