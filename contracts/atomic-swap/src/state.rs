//! State definitions for the atomic swap contract.

use common::OrderPath;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use crate::msg::{MakeSwapMsg, TakeSwapMsg};

pub const CONTRACT_NAME: &str = "crates.io:atomic-swap";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Channel version negotiated during the handshake
pub const SWAP_VERSION: &str = "ics100-1";

// ============================================================================
// Configuration
// ============================================================================

#[cw_serde]
pub struct Config {
    /// Admin address for configuration updates
    pub admin: Addr,
    /// Seconds until an outgoing packet times out
    pub packet_lifetime: u64,
    /// Stored order count above which terminal orders are trimmed
    pub max_orders: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");

// ============================================================================
// Orders
// ============================================================================

#[cw_serde]
pub enum Side {
    /// Made on this chain; the maker's tokens are escrowed here
    Native,
    /// Mirror of an order made on the counterparty chain
    Remote,
}

#[cw_serde]
pub enum Status {
    Initial,
    Sync,
    Cancel,
    Complete,
}

impl Status {
    /// Takes and cancels are only allowed while the order is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Status::Initial | Status::Sync)
    }
}

#[cw_serde]
pub struct AtomicSwapOrder {
    pub id: String,
    pub side: Side,
    pub status: Status,
    pub path: OrderPath,
    pub maker: MakeSwapMsg,
    pub taker: Option<TakeSwapMsg>,
    pub create_timestamp: u64,
    pub cancel_timestamp: Option<u64>,
    pub complete_timestamp: Option<u64>,
}

impl AtomicSwapOrder {
    pub fn is_expired(&self, now: u64) -> bool {
        self.maker
            .expiration_timestamp
            .map_or(false, |expiration| now >= expiration)
    }
}

pub const ORDERS: Map<&str, AtomicSwapOrder> = Map::new("orders");

/// Tokens this chain holds in escrow for an order. Removed before every
/// payout or refund, so each escrow is released at most once.
pub const ORDER_ESCROW: Map<&str, Coin> = Map::new("order_escrow");

/// Insertion queue: position -> order id
pub const ORDER_QUEUE: Map<u64, String> = Map::new("order_queue");
/// Position of the oldest stored order
pub const QUEUE_HEAD: Item<u64> = Item::new("queue_head");
/// Position the next order is stored at
pub const QUEUE_TAIL: Item<u64> = Item::new("queue_tail");

/// Appends an order to the queue, then trims the oldest terminal orders while
/// more than `max_orders` are stored. A live order stops the trim.
pub fn insert_order(
    storage: &mut dyn Storage,
    order: &AtomicSwapOrder,
    max_orders: u64,
) -> StdResult<Vec<String>> {
    ORDERS.save(storage, &order.id, order)?;

    let tail = QUEUE_TAIL.may_load(storage)?.unwrap_or_default();
    ORDER_QUEUE.save(storage, tail, &order.id)?;
    QUEUE_TAIL.save(storage, &(tail + 1))?;

    let mut head = QUEUE_HEAD.may_load(storage)?.unwrap_or_default();
    let mut trimmed = vec![];
    while tail + 1 - head > max_orders {
        let Some(id) = ORDER_QUEUE.may_load(storage, head)? else {
            break;
        };
        if let Some(oldest) = ORDERS.may_load(storage, &id)? {
            if oldest.status.is_open() {
                break;
            }
            ORDERS.remove(storage, &id);
        }
        ORDER_QUEUE.remove(storage, head);
        trimmed.push(id);
        head += 1;
    }
    QUEUE_HEAD.save(storage, &head)?;

    Ok(trimmed)
}

pub fn load_order(
    storage: &dyn Storage,
    order_id: &str,
) -> Result<AtomicSwapOrder, crate::ContractError> {
    ORDERS
        .may_load(storage, order_id)?
        .ok_or_else(|| crate::ContractError::OrderNotFound {
            order_id: order_id.to_string(),
        })
}
