use common::RelayError;
use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

use crate::market_maker::MarketMakerError;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Relay(#[from] RelayError),

    #[error("{0}")]
    MarketMaker(#[from] MarketMakerError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized")]
    Unauthorized,

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Sender {sender} does not match {expected}")]
    InvalidSender { sender: String, expected: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid pool: {reason}")]
    InvalidPool { reason: String },

    #[error("Pool id mismatch: packet carries {got}, computed {expected}")]
    PoolIdMismatch { expected: String, got: String },

    #[error("Packet is missing its {field}")]
    MalformedPacket { field: String },

    #[error("Denom {denom} has no supply on this chain")]
    DenomNotFound { denom: String },

    #[error("Invalid swap: {reason}")]
    InvalidSwap { reason: String },

    #[error("Slippage exceeded: expected at least {min_out}, got {out}")]
    SlippageExceeded { min_out: Uint128, out: Uint128 },

    // ========================================================================
    // Pool State Errors
    // ========================================================================

    #[error("Pool not found: {pool_id}")]
    PoolNotFound { pool_id: String },

    #[error("Pool already exists: {pool_id}")]
    PoolAlreadyExists { pool_id: String },

    #[error("Pool {pool_id} is not in a valid state for this operation")]
    InvalidPoolState { pool_id: String },

    #[error("Asset {denom} is not part of pool {pool_id}")]
    AssetNotInPool { pool_id: String, denom: String },

    #[error("Asset {denom} is not native to this chain")]
    NotLocalAsset { denom: String },

    #[error("Pool {pool_id} was not made on this chain")]
    NotSourceChain { pool_id: String },

    #[error("Pool {pool_id} can only be taken on the counterparty chain")]
    NotDestinationChain { pool_id: String },

    #[error("Liquidity for pool {pool_id} is already locked")]
    LiquidityLocked { pool_id: String },

    #[error("No locked liquidity for pool {pool_id}")]
    LiquidityNotFound { pool_id: String },

    #[error("Insufficient pool tokens: available {available}, requested {requested}")]
    InsufficientPoolTokens {
        available: Uint128,
        requested: Uint128,
    },

    // ========================================================================
    // Deposit Order Errors
    // ========================================================================

    #[error("Deposit order not found: {order_id}")]
    DepositOrderNotFound { order_id: String },

    #[error("Deposit order already exists: {order_id}")]
    DepositOrderAlreadyExists { order_id: String },

    #[error("Deposit order {order_id} is not pending")]
    DepositOrderNotPending { order_id: String },

    #[error("Deposit order {order_id} cannot be taken on the chain it was made on")]
    SelfFill { order_id: String },

    #[error("Deposit order {order_id} was not made on this chain")]
    NotMakerChain { order_id: String },
}
