//! Error types shared by the swap contracts' IBC plumbing.

use cosmwasm_std::{StdError, Uint128};
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RelayError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    // ========================================================================
    // Channel Errors
    // ========================================================================

    #[error("Channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },

    #[error("Channel is closed: {channel_id}")]
    ChannelClosed { channel_id: String },

    #[error("Sequence not found for channel {channel_id}")]
    SequenceNotFound { channel_id: String },

    #[error("Port mismatch: channel is bound to {expected}, got {got}")]
    PortMismatch { expected: String, got: String },

    #[error("Packet does not belong to a channel owned by this contract: {channel_id}")]
    UnauthenticatedPacket { channel_id: String },

    #[error("Invalid IBC channel version - got ({actual}), expected ({expected})")]
    InvalidVersion { actual: String, expected: String },

    #[error("Channels may not be closed")]
    CantCloseChannel,

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid identifier: {id}")]
    InvalidIdentifier { id: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Insufficient balance: expected {expected}, got {got}")]
    InsufficientBalance { expected: Uint128, got: Uint128 },

    #[error("Attached funds do not match: expected {expected}, got {got}")]
    FundsMismatch { expected: Uint128, got: Uint128 },

    // ========================================================================
    // Escrow Errors
    // ========================================================================

    #[error("Insufficient escrow for {denom}: available {available}, requested {requested}")]
    InsufficientEscrow {
        denom: String,
        available: Uint128,
        requested: Uint128,
    },
}
