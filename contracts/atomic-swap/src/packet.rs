//! Packet envelope exchanged between two atomic swap contracts.

use common::OrderPath;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_vec, StdResult};

use crate::msg::{CancelSwapMsg, MakeSwapMsg, TakeSwapMsg};

#[cw_serde]
pub enum SwapPacket {
    MakeSwap(MakeSwapMsg),
    TakeSwap(TakeSwapMsg),
    CancelSwap(CancelSwapMsg),
}

impl SwapPacket {
    pub fn kind(&self) -> &'static str {
        match self {
            SwapPacket::MakeSwap(_) => "make_swap",
            SwapPacket::TakeSwap(_) => "take_swap",
            SwapPacket::CancelSwap(_) => "cancel_swap",
        }
    }
}

#[cw_serde]
pub struct AtomicSwapPacketData {
    pub payload: SwapPacket,
    /// Set on make packets; the receiver recomputes and checks it
    pub order_id: Option<String>,
    /// Set on make packets
    pub path: Option<OrderPath>,
    pub memo: Option<String>,
}

impl AtomicSwapPacketData {
    pub fn new(payload: SwapPacket) -> Self {
        Self {
            payload,
            order_id: None,
            path: None,
            memo: None,
        }
    }
}

/// Order id: keccak256 over the rendered path and the canonical JSON of the
/// make message. Both chains compute it from the same bytes.
pub fn generate_order_id(path: &OrderPath, msg: &MakeSwapMsg) -> StdResult<String> {
    let bytes = to_json_vec(msg)?;
    Ok(common::hash::derive_id(&[path.to_string().as_bytes(), &bytes]))
}
