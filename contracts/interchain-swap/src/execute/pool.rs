//! MakePool, TakePool and CancelPool handlers.
//!
//! The source chain makes the pool and locks the Source liquidity; the named
//! counterparty creator takes it on the destination chain by locking the
//! Destination liquidity. Until the take lands the source creator may cancel.

use std::collections::HashSet;

use common::channel::{load_open_channel, validate_identifier};
use common::escrow::{escrow_address, lock};
use common::funds::{ensure_positive, must_pay_exact};
use cosmwasm_std::{coin, DepsMut, Env, MessageInfo, Response};

use super::{ensure_sender, pool_channel, send_packet};
use crate::error::ContractError;
use crate::market_maker::MarketMaker;
use crate::msg::{CancelPoolMsg, MakePoolMsg, TakePoolMsg};
use crate::packet::{generate_pool_id, IbcSwapPacketData, PoolPacket, StateChange};
use crate::state::{
    load_pool, InitialLiquidity, InterchainLiquidityPool, PoolAsset, PoolSide, PoolStatus,
    BPS_DENOMINATOR, CONFIG, INITIAL_LIQUIDITY, POOLS, TOTAL_WEIGHT,
};

/// Checks the proposed assets and returns the (Source, Destination) pair.
pub(crate) fn validate_liquidity(
    liquidity: &[PoolAsset],
) -> Result<(&PoolAsset, &PoolAsset), ContractError> {
    let invalid = |reason: &str| ContractError::InvalidPool {
        reason: reason.to_string(),
    };
    let [first, second] = liquidity else {
        return Err(invalid("a pool has exactly two assets"));
    };
    let (source, destination) = match (&first.side, &second.side) {
        (PoolSide::Source, PoolSide::Destination) => (first, second),
        (PoolSide::Destination, PoolSide::Source) => (second, first),
        _ => return Err(invalid("assets must be one Source and one Destination")),
    };

    let denoms: HashSet<&str> = liquidity.iter().map(|a| a.balance.denom.as_str()).collect();
    if denoms.len() != liquidity.len() {
        return Err(invalid("asset denoms must differ"));
    }
    for asset in liquidity {
        ensure_positive(&asset.balance)?;
        if asset.weight == 0 || asset.weight > TOTAL_WEIGHT {
            return Err(invalid("weights must be in (0, 100]"));
        }
    }
    if first.weight + second.weight != TOTAL_WEIGHT {
        return Err(invalid("weights must sum to 100"));
    }

    Ok((source, destination))
}

pub(crate) fn validate_swap_fee(swap_fee_bps: u32, max_swap_fee_bps: u32) -> Result<(), ContractError> {
    if swap_fee_bps > max_swap_fee_bps || swap_fee_bps >= BPS_DENOMINATOR {
        return Err(ContractError::InvalidPool {
            reason: format!("swap fee {} bps exceeds the limit of {} bps", swap_fee_bps, max_swap_fee_bps),
        });
    }
    Ok(())
}

// ============================================================================
// MakePool
// ============================================================================

pub fn execute_make_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: MakePoolMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    validate_identifier(&msg.source_port)?;
    validate_identifier(&msg.source_channel)?;
    ensure_sender(&info, &msg.creator)?;
    if msg.counterparty_creator.trim().is_empty() {
        return Err(ContractError::InvalidPool {
            reason: "counterparty_creator must not be empty".to_string(),
        });
    }
    let (source, destination) = validate_liquidity(&msg.liquidity)?;
    validate_swap_fee(msg.swap_fee_bps, config.max_swap_fee_bps)?;

    let channel = load_open_channel(deps.storage, &msg.source_port, &msg.source_channel)?;
    let pool_id = generate_pool_id(
        &env.block.chain_id,
        &[&source.balance.denom, &destination.balance.denom],
    );
    if POOLS.has(deps.storage, &pool_id) {
        return Err(ContractError::PoolAlreadyExists { pool_id });
    }
    must_pay_exact(&info, &source.balance)?;

    let pool = InterchainLiquidityPool {
        id: pool_id.clone(),
        assets: msg.liquidity.clone(),
        supply: coin(0, &pool_id),
        status: PoolStatus::Initialized,
        source_creator: msg.creator.clone(),
        destination_creator: msg.counterparty_creator.clone(),
        port: channel.endpoint.port_id.clone(),
        channel: channel.id.clone(),
        counterparty_port: channel.counterparty_endpoint.port_id.clone(),
        counterparty_channel: channel.counterparty_endpoint.channel_id.clone(),
        swap_fee_bps: msg.swap_fee_bps,
        source_chain_id: env.block.chain_id.clone(),
    };
    let seed = MarketMaker::new(&pool).deposit_single_asset(&source.balance)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &source.balance)?;
    INITIAL_LIQUIDITY.save(
        deps.storage,
        &pool_id,
        &InitialLiquidity {
            owner: info.sender.clone(),
            coin: source.balance.clone(),
        },
    )?;
    POOLS.save(deps.storage, &pool_id, &pool)?;

    let state_change = StateChange {
        pool_id: Some(pool_id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        pool_tokens: vec![seed.clone()],
        ..StateChange::default()
    };
    let liquidity = source.balance.to_string();
    let packet = IbcSwapPacketData::new(PoolPacket::MakePool(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "make_pool")
        .add_attribute("pool_id", pool_id)
        .add_attribute("creator", info.sender)
        .add_attribute("liquidity", liquidity)
        .add_attribute("pool_tokens", seed.to_string())
        .add_attribute("escrow", escrow))
}

// ============================================================================
// TakePool
// ============================================================================

pub fn execute_take_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: TakePoolMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    if pool.status != PoolStatus::Initialized {
        return Err(ContractError::InvalidPoolState { pool_id: pool.id });
    }
    if pool.local_side(&env.block.chain_id) != PoolSide::Destination {
        return Err(ContractError::NotDestinationChain { pool_id: pool.id });
    }
    ensure_sender(&info, &pool.destination_creator)?;
    if msg.creator != pool.destination_creator {
        return Err(ContractError::Unauthorized);
    }
    if INITIAL_LIQUIDITY.has(deps.storage, &pool.id) {
        return Err(ContractError::LiquidityLocked { pool_id: pool.id });
    }

    let liquidity = pool.local_asset(&env.block.chain_id)?.balance.clone();
    let share = MarketMaker::new(&pool).deposit_single_asset(&liquidity)?;
    let channel = pool_channel(deps.storage, &pool)?;
    must_pay_exact(&info, &liquidity)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &liquidity)?;
    INITIAL_LIQUIDITY.save(
        deps.storage,
        &pool.id,
        &InitialLiquidity {
            owner: info.sender.clone(),
            coin: liquidity.clone(),
        },
    )?;

    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        pool_tokens: vec![share.clone()],
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::TakePool(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "take_pool")
        .add_attribute("pool_id", pool.id)
        .add_attribute("creator", info.sender)
        .add_attribute("liquidity", liquidity.to_string())
        .add_attribute("pool_tokens", share.to_string())
        .add_attribute("escrow", escrow))
}

// ============================================================================
// CancelPool
// ============================================================================

/// The creator's liquidity is refunded once the counterparty acknowledges
/// that it deleted its mirror of the pool.
pub fn execute_cancel_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: CancelPoolMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    if pool.local_side(&env.block.chain_id) != PoolSide::Source {
        return Err(ContractError::NotSourceChain { pool_id: pool.id });
    }
    ensure_sender(&info, &pool.source_creator)?;
    if msg.creator != pool.source_creator {
        return Err(ContractError::Unauthorized);
    }
    if pool.status != PoolStatus::Initialized {
        return Err(ContractError::InvalidPoolState { pool_id: pool.id });
    }
    if !INITIAL_LIQUIDITY.has(deps.storage, &pool.id) {
        return Err(ContractError::LiquidityNotFound { pool_id: pool.id });
    }

    let channel = pool_channel(deps.storage, &pool)?;
    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::CancelPool(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "cancel_pool")
        .add_attribute("pool_id", pool.id)
        .add_attribute("status", "pending_acknowledgement"))
}
