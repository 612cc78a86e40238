//! Packet envelope exchanged between two interchain swap contracts.

use common::hash::derive_id;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Coin;

use crate::msg::{
    CancelMultiAssetDepositMsg, CancelPoolMsg, MakeMultiAssetDepositMsg, MakePoolMsg,
    MultiAssetWithdrawMsg, SingleAssetDepositMsg, SwapMsg, TakeMultiAssetDepositMsg, TakePoolMsg,
};

#[cw_serde]
pub enum PoolPacket {
    MakePool(MakePoolMsg),
    TakePool(TakePoolMsg),
    CancelPool(CancelPoolMsg),
    SingleAssetDeposit(SingleAssetDepositMsg),
    MakeMultiAssetDeposit(MakeMultiAssetDepositMsg),
    TakeMultiAssetDeposit(TakeMultiAssetDepositMsg),
    CancelMultiAssetDeposit(CancelMultiAssetDepositMsg),
    MultiAssetWithdraw(MultiAssetWithdrawMsg),
    Swap(SwapMsg),
}

impl PoolPacket {
    pub fn kind(&self) -> &'static str {
        match self {
            PoolPacket::MakePool(_) => "make_pool",
            PoolPacket::TakePool(_) => "take_pool",
            PoolPacket::CancelPool(_) => "cancel_pool",
            PoolPacket::SingleAssetDeposit(_) => "single_asset_deposit",
            PoolPacket::MakeMultiAssetDeposit(_) => "make_multi_asset_deposit",
            PoolPacket::TakeMultiAssetDeposit(_) => "take_multi_asset_deposit",
            PoolPacket::CancelMultiAssetDeposit(_) => "cancel_multi_asset_deposit",
            PoolPacket::MultiAssetWithdraw(_) => "multi_asset_withdraw",
            PoolPacket::Swap(_) => "swap",
        }
    }
}

/// The quote computed by the sending chain. The receiver and the
/// acknowledgement handler apply it as-is.
#[cw_serde]
#[derive(Default)]
pub struct StateChange {
    pub pool_id: Option<String>,
    /// Chain the packet was sent from
    pub source_chain_id: Option<String>,
    pub multi_deposit_order_id: Option<String>,
    /// Pool tokens issued or redeemed
    pub pool_tokens: Vec<Coin>,
    pub in_tokens: Vec<Coin>,
    pub out_tokens: Vec<Coin>,
}

#[cw_serde]
pub struct IbcSwapPacketData {
    pub payload: PoolPacket,
    pub state_change: Option<StateChange>,
    pub memo: Option<String>,
}

impl IbcSwapPacketData {
    pub fn new(payload: PoolPacket, state_change: StateChange) -> Self {
        Self {
            payload,
            state_change: Some(state_change),
            memo: None,
        }
    }
}

/// Pool id: "pool" followed by keccak256 over the source chain id and the
/// sorted asset denoms. The id doubles as the pool token denom.
pub fn generate_pool_id(source_chain_id: &str, denoms: &[&str]) -> String {
    let mut denoms = denoms.to_vec();
    denoms.sort_unstable();
    let mut parts: Vec<&[u8]> = vec![source_chain_id.as_bytes()];
    parts.extend(denoms.iter().map(|denom| denom.as_bytes()));
    format!("pool{}", derive_id(&parts))
}

/// Deposit order id, unique per maker chain and send sequence.
pub fn generate_deposit_order_id(
    pool_id: &str,
    chain_id: &str,
    maker: &str,
    sequence: u64,
) -> String {
    derive_id(&[
        pool_id.as_bytes(),
        chain_id.as_bytes(),
        maker.as_bytes(),
        &sequence.to_be_bytes(),
    ])
}
