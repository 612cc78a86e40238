//! MultiAssetWithdraw handler.

use common::escrow::escrow_address;
use cosmwasm_std::{DepsMut, Env, MessageInfo, Response};

use super::{ensure_sender, pool_channel, send_packet};
use crate::error::ContractError;
use crate::lp;
use crate::market_maker::MarketMaker;
use crate::msg::MultiAssetWithdrawMsg;
use crate::packet::{IbcSwapPacketData, PoolPacket, StateChange};
use crate::state::{load_pool, CONFIG};

/// Moves the redeemed pool tokens to the escrow address and quotes both
/// outputs. The counterparty pays its asset on receipt; this chain burns the
/// tokens and pays its asset on acknowledgement.
pub fn execute_multi_asset_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: MultiAssetWithdrawMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    pool.ensure_active()?;
    ensure_sender(&info, &msg.sender)?;
    deps.api.addr_validate(&msg.receiver)?;
    if msg.counterparty_receiver.trim().is_empty() {
        return Err(ContractError::InvalidSender {
            sender: msg.counterparty_receiver,
            expected: "a counterparty receiver".to_string(),
        });
    }

    let outs = MarketMaker::new(&pool).multi_asset_withdraw(&msg.pool_token)?;
    let channel = pool_channel(deps.storage, &pool)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lp::transfer(
        deps.storage,
        &pool.id,
        info.sender.as_str(),
        &escrow,
        msg.pool_token.amount,
    )?;

    let redeemed = msg.pool_token.to_string();
    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        pool_tokens: vec![msg.pool_token.clone()],
        out_tokens: outs.clone(),
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::MultiAssetWithdraw(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    let outs: Vec<String> = outs.iter().map(|out| out.to_string()).collect();
    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "multi_asset_withdraw")
        .add_attribute("pool_id", pool.id)
        .add_attribute("pool_tokens", redeemed)
        .add_attribute("out_tokens", outs.join(",")))
}
