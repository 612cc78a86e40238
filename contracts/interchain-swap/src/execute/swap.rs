//! Swap handler.
//!
//! The input is always this chain's asset and the output is paid on the
//! counterparty chain to `recipient`.

use common::escrow::{escrow_address, lock};
use common::funds::must_pay_exact;
use cosmwasm_std::{coin, BankMsg, DepsMut, Env, MessageInfo, Response};

use super::{ensure_sender, pool_channel, send_packet};
use crate::error::ContractError;
use crate::market_maker::MarketMaker;
use crate::msg::{SwapMsg, SwapType};
use crate::packet::{IbcSwapPacketData, PoolPacket, StateChange};
use crate::state::{load_pool, BPS_DENOMINATOR, CONFIG};

pub fn execute_swap(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: SwapMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    pool.ensure_active()?;
    ensure_sender(&info, &msg.sender)?;
    if msg.recipient.trim().is_empty() {
        return Err(ContractError::InvalidSwap {
            reason: "recipient must not be empty".to_string(),
        });
    }
    if msg.slippage_bps > BPS_DENOMINATOR {
        return Err(ContractError::InvalidSwap {
            reason: format!("slippage must not exceed {} bps", BPS_DENOMINATOR),
        });
    }
    let local = pool.local_asset(&env.block.chain_id)?;
    if msg.token_in.denom != local.balance.denom {
        return Err(ContractError::NotLocalAsset {
            denom: msg.token_in.denom,
        });
    }

    let market_maker = MarketMaker::new(&pool);
    let (token_in, token_out) = match msg.swap_type {
        SwapType::Left => {
            let out = market_maker.left_swap(&msg.token_in, &msg.token_out.denom)?;
            let min_out = msg
                .token_out
                .amount
                .multiply_ratio(BPS_DENOMINATOR - msg.slippage_bps, BPS_DENOMINATOR);
            if out.amount < min_out {
                return Err(ContractError::SlippageExceeded {
                    min_out,
                    out: out.amount,
                });
            }
            (msg.token_in.clone(), out)
        }
        SwapType::Right => {
            let required = market_maker.right_swap(&msg.token_in, &msg.token_out)?;
            (required, msg.token_out.clone())
        }
    };

    let channel = pool_channel(deps.storage, &pool)?;
    // The whole input (the cap for right swaps) is attached.
    must_pay_exact(&info, &msg.token_in)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &token_in)?;

    let unused = msg.token_in.amount.checked_sub(token_in.amount)?;
    let mut response = Response::new();
    if !unused.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![coin(unused.u128(), &token_in.denom)],
        });
    }

    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        in_tokens: vec![token_in.clone()],
        out_tokens: vec![token_out.clone()],
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::Swap(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(response
        .add_message(send)
        .add_attribute("method", "swap")
        .add_attribute("pool_id", pool.id)
        .add_attribute("token_in", token_in.to_string())
        .add_attribute("token_out", token_out.to_string())
        .add_attribute("unused", unused.to_string()))
}
