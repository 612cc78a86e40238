//! Atomic Swap Contract (ICS-100)
//!
//! A maker escrows tokens on one chain and posts an order to the counterparty
//! chain; a taker fills it by escrowing the requested tokens there. Both
//! escrows are released once the take packet is acknowledged, and every
//! failed or timed-out packet refunds exactly what it locked.
//!
//! - `contract` - instantiate/execute/query/migrate entry points
//! - `ibc` - channel handshake and packet entry points
//! - `execute` - user-facing MakeSwap/TakeSwap/CancelSwap and admin handlers
//! - `relay` - packet receive, acknowledgement and refund handling
//! - `state` - orders, FIFO queue and per-order escrow records

pub mod contract;
pub mod error;
pub mod execute;
pub mod ibc;
pub mod msg;
pub mod packet;
pub mod query;
pub mod relay;
pub mod state;

pub use crate::error::ContractError;
