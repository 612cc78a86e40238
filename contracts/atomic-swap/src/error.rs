use common::RelayError;
use cosmwasm_std::{Coin, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Relay(#[from] RelayError),

    #[error("Unauthorized")]
    Unauthorized,

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Sender {sender} does not match {expected}")]
    InvalidSender { sender: String, expected: String },

    #[error("Invalid expiration: {expiration} is not after {now}")]
    InvalidExpiration { expiration: u64, now: u64 },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Order id mismatch: packet carries {got}, computed {expected}")]
    OrderIdMismatch { expected: String, got: String },

    #[error("Packet does not travel along the order path {path}")]
    PathMismatch { path: String },

    #[error("Packet is missing its {field}")]
    MalformedPacket { field: String },

    // ========================================================================
    // Order State Errors
    // ========================================================================

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("Order already exists: {order_id}")]
    OrderAlreadyExists { order_id: String },

    #[error("order is not in valid state")]
    InvalidOrderState,

    #[error("order is not in a valid state for cancellation")]
    InvalidCancelState,

    #[error("order has already been taken")]
    AlreadyTaken,

    #[error("Order {order_id} was not made on this chain")]
    NotNativeOrder { order_id: String },

    #[error("Order {order_id} can only be taken on the counterparty chain")]
    NotRemoteOrder { order_id: String },

    #[error("Order expired at {expiration}")]
    OrderExpired { expiration: u64 },

    #[error("Taker {taker} is not the desired taker")]
    NotDesiredTaker { taker: String },

    #[error("Token mismatch: order wants {expected}, got {got}")]
    TokenMismatch { expected: Coin, got: Coin },

    #[error("No escrow recorded for order {order_id}")]
    EscrowNotFound { order_id: String },
}
