//! Common - Shared IBC Plumbing for the Swap Contracts
//!
//! This package provides the pieces both the atomic swap (ICS-100) and the
//! interchain swap (ICS-101) contracts need to talk over an IBC channel:
//!
//! - `channel` - handshake validation, channel registry, packet authentication
//! - `ack` - the acknowledgement envelope shared with the counterparty
//! - `escrow` - per-channel escrow addresses and custody bookkeeping
//! - `funds` - validation of attached funds and identifiers
//! - `hash` - keccak256 based id derivation

pub mod ack;
pub mod channel;
pub mod error;
pub mod escrow;
pub mod funds;
pub mod hash;

pub use ack::{parse_ack, Ack};
pub use channel::{ChannelInfo, OrderPath};
pub use error::RelayError;
