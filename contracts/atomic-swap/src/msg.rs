//! Message types for the atomic swap contract.

use common::ChannelInfo;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Coin};

use crate::state::AtomicSwapOrder;

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
    /// Stored order count above which terminal orders are trimmed
    pub max_orders: u64,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Posts an order. Sent by the maker with `sell_token` attached.
#[cw_serde]
pub struct MakeSwapMsg {
    /// Local port the order packet leaves from
    pub source_port: String,
    /// Local channel the order packet leaves from
    pub source_channel: String,
    /// Tokens the maker escrows on this chain
    pub sell_token: Coin,
    /// Tokens the maker wants on the counterparty chain
    pub buy_token: Coin,
    /// Maker address on this chain, refunded on failure
    pub maker_address: String,
    /// Maker address on the counterparty chain, paid by the taker
    pub maker_receiving_address: String,
    /// Only this counterparty address may take the order
    pub desired_taker: Option<String>,
    /// Unix seconds after which the order can no longer be taken
    pub expiration_timestamp: Option<u64>,
}

/// Fills a remote order. Sent by the taker with `sell_token` attached.
#[cw_serde]
pub struct TakeSwapMsg {
    pub order_id: String,
    /// Must equal the order's `buy_token`
    pub sell_token: Coin,
    /// Taker address on this chain, refunded on failure
    pub taker_address: String,
    /// Taker address on the maker's chain, paid from the maker's escrow
    pub taker_receiving_address: String,
}

#[cw_serde]
pub struct CancelSwapMsg {
    pub order_id: String,
    pub maker_address: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    MakeSwap(MakeSwapMsg),
    TakeSwap(TakeSwapMsg),
    CancelSwap(CancelSwapMsg),

    /// Admin only
    UpdateConfig {
        admin: Option<String>,
        packet_lifetime: Option<u64>,
        max_orders: Option<u64>,
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

    #[returns(AtomicSwapOrder)]
    Order { order_id: String },

    /// Orders oldest first, paginated by queue position
    #[returns(OrdersResponse)]
    Orders {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(OrdersResponse)]
    OrdersByMaker {
        maker: String,
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(EscrowAddressResponse)]
    EscrowAddress { port_id: String, channel_id: String },

    #[returns(EscrowBalanceResponse)]
    EscrowBalance {
        port_id: String,
        channel_id: String,
        denom: String,
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
    pub max_orders: u64,
}

#[cw_serde]
pub struct OrderEntry {
    /// Position in the insertion queue
    pub position: u64,
    pub order: AtomicSwapOrder,
}

#[cw_serde]
pub struct OrdersResponse {
    pub orders: Vec<OrderEntry>,
    /// Queue position to resume from when the listing stopped before the end
    pub next_start_after: Option<u64>,
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
