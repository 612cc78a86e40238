//! Single-sided and two-sided deposit handlers.

use common::channel::{load_open_channel, next_sequence_send};
use common::escrow::{escrow_address, lock};
use common::funds::must_pay_exact;
use cosmwasm_std::{DepsMut, Env, MessageInfo, Response};

use super::{ensure_sender, pool_channel, send_packet};
use crate::error::ContractError;
use crate::market_maker::MarketMaker;
use crate::msg::{
    CancelMultiAssetDepositMsg, MakeMultiAssetDepositMsg, SingleAssetDepositMsg,
    TakeMultiAssetDepositMsg,
};
use crate::packet::{generate_deposit_order_id, IbcSwapPacketData, PoolPacket, StateChange};
use crate::state::{
    load_deposit_order, load_pool, DepositStatus, MultiAssetDepositOrder, CONFIG, DEPOSIT_ORDERS,
};

// ============================================================================
// SingleAssetDeposit
// ============================================================================

pub fn execute_single_asset_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: SingleAssetDepositMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    pool.ensure_active()?;
    ensure_sender(&info, &msg.sender)?;
    let local = pool.local_asset(&env.block.chain_id)?;
    if msg.token.denom != local.balance.denom {
        return Err(ContractError::NotLocalAsset {
            denom: msg.token.denom,
        });
    }

    let issued = MarketMaker::new(&pool).deposit_single_asset(&msg.token)?;
    let channel = pool_channel(deps.storage, &pool)?;
    must_pay_exact(&info, &msg.token)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &msg.token)?;

    let token = msg.token.to_string();
    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        pool_tokens: vec![issued.clone()],
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::SingleAssetDeposit(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "single_asset_deposit")
        .add_attribute("pool_id", pool.id)
        .add_attribute("token", token)
        .add_attribute("pool_tokens", issued.to_string()))
}

// ============================================================================
// MultiAssetDeposit
// ============================================================================

/// Opens a Pending order and locks the maker's deposit of this chain's asset.
pub fn execute_make_multi_asset_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: MakeMultiAssetDepositMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;

    pool.ensure_active()?;
    ensure_sender(&info, &msg.source_maker)?;
    if msg.destination_taker.trim().is_empty() {
        return Err(ContractError::InvalidSender {
            sender: msg.destination_taker,
            expected: "a destination taker".to_string(),
        });
    }
    // Checks both denoms belong to the pool and the ratio is within tolerance.
    MarketMaker::new(&pool).deposit_multi_asset(&msg.deposits, config.multi_deposit_tolerance_bps)?;

    let local = pool.local_asset(&env.block.chain_id)?;
    let local_deposit = msg
        .deposits
        .iter()
        .find(|deposit| deposit.denom == local.balance.denom)
        .cloned()
        .ok_or_else(|| ContractError::NotLocalAsset {
            denom: local.balance.denom.clone(),
        })?;

    let channel = pool_channel(deps.storage, &pool)?;
    let sequence = next_sequence_send(deps.storage, &channel.id)?;
    let order_id =
        generate_deposit_order_id(&pool.id, &env.block.chain_id, &msg.source_maker, sequence);
    if DEPOSIT_ORDERS.has(deps.storage, &order_id) {
        return Err(ContractError::DepositOrderAlreadyExists { order_id });
    }
    must_pay_exact(&info, &local_deposit)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &local_deposit)?;

    let order = MultiAssetDepositOrder {
        id: order_id.clone(),
        pool_id: pool.id.clone(),
        chain_id: env.block.chain_id.clone(),
        source_maker: msg.source_maker.clone(),
        destination_taker: msg.destination_taker.clone(),
        deposits: msg.deposits.clone(),
        local_deposit: local_deposit.clone(),
        port: pool.port.clone(),
        channel: pool.channel.clone(),
        status: DepositStatus::Pending,
        created_at: env.block.time.seconds(),
    };
    DEPOSIT_ORDERS.save(deps.storage, &order_id, &order)?;

    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        multi_deposit_order_id: Some(order_id.clone()),
        in_tokens: msg.deposits.clone(),
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::MakeMultiAssetDeposit(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "make_multi_asset_deposit")
        .add_attribute("pool_id", pool.id)
        .add_attribute("order_id", order_id)
        .add_attribute("deposit", local_deposit.to_string()))
}

/// Fills a Pending order made on the counterparty chain. The order is marked
/// Complete right away so a cancel arriving later is rejected; an error
/// acknowledgement puts it back to Pending.
pub fn execute_take_multi_asset_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: TakeMultiAssetDepositMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut order = load_deposit_order(deps.storage, &msg.order_id)?;

    if order.pool_id != msg.pool_id {
        return Err(ContractError::DepositOrderNotFound {
            order_id: msg.order_id,
        });
    }
    if order.status != DepositStatus::Pending {
        return Err(ContractError::DepositOrderNotPending { order_id: order.id });
    }
    if order.chain_id == env.block.chain_id {
        return Err(ContractError::SelfFill { order_id: order.id });
    }
    ensure_sender(&info, &order.destination_taker)?;
    if msg.sender != order.destination_taker {
        return Err(ContractError::Unauthorized);
    }

    let pool = load_pool(deps.storage, &order.pool_id)?;
    pool.ensure_active()?;
    let issued = MarketMaker::new(&pool)
        .deposit_multi_asset(&order.deposits, config.multi_deposit_tolerance_bps)?;

    let local = pool.local_asset(&env.block.chain_id)?;
    let local_deposit = order
        .deposit_of(&local.balance.denom)
        .cloned()
        .ok_or_else(|| ContractError::NotLocalAsset {
            denom: local.balance.denom.clone(),
        })?;

    let channel = pool_channel(deps.storage, &pool)?;
    must_pay_exact(&info, &local_deposit)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    lock(deps.storage, &escrow, &local_deposit)?;

    order.status = DepositStatus::Complete;
    DEPOSIT_ORDERS.save(deps.storage, &order.id, &order)?;

    let state_change = StateChange {
        pool_id: Some(pool.id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        multi_deposit_order_id: Some(order.id.clone()),
        pool_tokens: issued.clone(),
        in_tokens: order.deposits.clone(),
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::TakeMultiAssetDeposit(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "take_multi_asset_deposit")
        .add_attribute("pool_id", pool.id)
        .add_attribute("order_id", order.id)
        .add_attribute("deposit", local_deposit.to_string()))
}

/// Cancels a Pending order on the chain it was made on. The maker is
/// refunded once the counterparty acknowledges.
pub fn execute_cancel_multi_asset_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: CancelMultiAssetDepositMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let order = load_deposit_order(deps.storage, &msg.order_id)?;

    if order.pool_id != msg.pool_id {
        return Err(ContractError::DepositOrderNotFound {
            order_id: msg.order_id,
        });
    }
    if order.chain_id != env.block.chain_id {
        return Err(ContractError::NotMakerChain { order_id: order.id });
    }
    ensure_sender(&info, &order.source_maker)?;
    if msg.sender != order.source_maker {
        return Err(ContractError::Unauthorized);
    }
    if order.status != DepositStatus::Pending {
        return Err(ContractError::DepositOrderNotPending { order_id: order.id });
    }

    // The pool may already be gone; the order knows its channel.
    let channel = load_open_channel(deps.storage, &order.port, &order.channel)?;
    let state_change = StateChange {
        pool_id: Some(order.pool_id.clone()),
        source_chain_id: Some(env.block.chain_id.clone()),
        multi_deposit_order_id: Some(order.id.clone()),
        ..StateChange::default()
    };
    let packet = IbcSwapPacketData::new(PoolPacket::CancelMultiAssetDeposit(msg), state_change);
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "cancel_multi_asset_deposit")
        .add_attribute("pool_id", order.pool_id)
        .add_attribute("order_id", order.id)
        .add_attribute("status", "pending_acknowledgement"))
}
