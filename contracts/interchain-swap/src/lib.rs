//! Interchain Swap Contract (ICS-101)
//!
//! A two-asset weighted pool whose assets live on two chains. Each chain
//! escrows its native asset and keeps a mirror of the pool record; packets
//! carry the MarketMaker quote computed on the sending chain so the
//! receiving chain applies the same balance and supply changes.
//!
//! - `contract` - instantiate/execute/query/migrate entry points
//! - `ibc` - channel handshake and packet entry points
//! - `execute` - pool, deposit, withdraw, swap and admin handlers
//! - `relay` - packet receive, acknowledgement and refund handling
//! - `market_maker` - weighted constant-product pricing
//! - `math` - fixed-point `ln`, `exp` and `pow`
//! - `lp` - pool token ledger

pub mod contract;
pub mod error;
pub mod execute;
pub mod ibc;
pub mod lp;
pub mod market_maker;
pub mod math;
pub mod msg;
pub mod packet;
pub mod query;
pub mod relay;
pub mod state;

pub use crate::error::ContractError;
