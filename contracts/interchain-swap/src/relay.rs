//! Packet receive, acknowledgement and refund handling.
//!
//! Receive handlers run inside a transaction that commits even when they
//! fail (the failure becomes an error acknowledgement), so each one works on
//! an in-memory copy of the pool and writes only after every check passed.
//! The quote in the packet's `StateChange` is applied as-is on both chains.

use common::escrow::{escrow_address, release};
use common::Ack;
use cosmwasm_std::{
    attr, Attribute, Coin, CosmosMsg, DepsMut, Env, IbcBasicResponse, IbcEndpoint, IbcPacket,
    IbcReceiveResponse, Storage, Uint128,
};

use crate::error::ContractError;
use crate::execute::{validate_liquidity, validate_swap_fee};
use crate::lp;
use crate::msg::{
    CancelMultiAssetDepositMsg, CancelPoolMsg, MakeMultiAssetDepositMsg, MakePoolMsg,
    MultiAssetWithdrawMsg, SingleAssetDepositMsg, SwapMsg, TakeMultiAssetDepositMsg, TakePoolMsg,
};
use crate::packet::{generate_pool_id, IbcSwapPacketData, PoolPacket, StateChange};
use crate::state::{
    load_deposit_order, load_pool, DepositStatus, InterchainLiquidityPool, MultiAssetDepositOrder,
    PoolSide, PoolStatus, CONFIG, DEPOSIT_ORDERS, INITIAL_LIQUIDITY, POOLS,
};

type Handled = (Vec<CosmosMsg>, Vec<Attribute>);

fn required<T>(value: Option<T>, field: &str) -> Result<T, ContractError> {
    value.ok_or_else(|| ContractError::MalformedPacket {
        field: field.to_string(),
    })
}

fn first_token(tokens: &[Coin], field: &str) -> Result<Coin, ContractError> {
    required(tokens.first().cloned(), field)
}

/// The issued share paired with the deposit of `denom`.
fn share_of(deposits: &[Coin], issued: &[Coin], denom: &str) -> Result<Coin, ContractError> {
    if deposits.len() != issued.len() {
        return Err(ContractError::MalformedPacket {
            field: "pool_tokens".to_string(),
        });
    }
    required(
        deposits
            .iter()
            .zip(issued)
            .find(|(deposit, _)| deposit.denom == denom)
            .map(|(_, share)| share.clone()),
        "pool_tokens",
    )
}

fn total_amount(tokens: &[Coin]) -> Result<Uint128, ContractError> {
    let mut total = Uint128::zero();
    for token in tokens {
        total = total.checked_add(token.amount)?;
    }
    Ok(total)
}

/// Releases `token` from escrow unless it rounds to nothing.
fn payout(
    storage: &mut dyn Storage,
    escrow: &str,
    recipient: &str,
    token: &Coin,
) -> Result<Vec<CosmosMsg>, ContractError> {
    if token.amount.is_zero() {
        return Ok(vec![]);
    }
    Ok(vec![release(storage, escrow, recipient, token)?])
}

/// Packets for a pool must arrive on the channel the pool is bound to.
fn ensure_pool_channel(
    pool: &InterchainLiquidityPool,
    local: &IbcEndpoint,
) -> Result<(), ContractError> {
    if pool.port != local.port_id || pool.channel != local.channel_id {
        return Err(ContractError::InvalidPool {
            reason: format!("pool {} is bound to channel {}", pool.id, pool.channel),
        });
    }
    Ok(())
}

fn local_denom(pool: &InterchainLiquidityPool, env: &Env) -> Result<String, ContractError> {
    Ok(pool.local_asset(&env.block.chain_id)?.balance.denom.clone())
}

/// Saves the pool, or removes it once every pool token was redeemed.
fn save_or_remove(
    storage: &mut dyn Storage,
    pool: &InterchainLiquidityPool,
) -> Result<(), ContractError> {
    if pool.supply.amount.is_zero() {
        POOLS.remove(storage, &pool.id);
    } else {
        POOLS.save(storage, &pool.id, pool)?;
    }
    Ok(())
}

// ============================================================================
// Receive
// ============================================================================

pub fn on_recv_packet(
    deps: DepsMut,
    env: Env,
    packet: &IbcPacket,
    data: IbcSwapPacketData,
) -> Result<IbcReceiveResponse, ContractError> {
    let kind = data.payload.kind();
    let state_change = data.state_change.unwrap_or_default();
    let (messages, attributes) = match data.payload {
        PoolPacket::MakePool(msg) => {
            on_received_make_pool(deps, &env, packet, msg, state_change)?
        }
        PoolPacket::TakePool(msg) => {
            on_received_take_pool(deps, &env, packet, msg, state_change)?
        }
        PoolPacket::CancelPool(msg) => on_received_cancel_pool(deps, packet, msg)?,
        PoolPacket::SingleAssetDeposit(msg) => {
            on_received_single_deposit(deps, packet, msg, state_change)?
        }
        PoolPacket::MakeMultiAssetDeposit(msg) => {
            on_received_make_multi_deposit(deps, &env, packet, msg, state_change)?
        }
        PoolPacket::TakeMultiAssetDeposit(msg) => {
            on_received_take_multi_deposit(deps, &env, packet, msg, state_change)?
        }
        PoolPacket::CancelMultiAssetDeposit(msg) => {
            on_received_cancel_multi_deposit(deps, msg)?
        }
        PoolPacket::MultiAssetWithdraw(msg) => {
            on_received_withdraw(deps, &env, packet, msg, state_change)?
        }
        PoolPacket::Swap(msg) => on_received_swap(deps, &env, packet, msg, state_change)?,
    };

    Ok(IbcReceiveResponse::new()
        .set_ack(Ack::success(&kind)?)
        .add_messages(messages)
        .add_attribute("method", "ibc_packet_receive")
        .add_attribute("packet", kind)
        .add_attributes(attributes))
}

/// Mirrors a pool made on the counterparty chain. The Destination asset must
/// exist here, and the pool id is recomputed from the received assets.
fn on_received_make_pool(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: MakePoolMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let pool_id = required(state_change.pool_id, "pool_id")?;
    let source_chain_id = required(state_change.source_chain_id, "source_chain_id")?;
    let seed = first_token(&state_change.pool_tokens, "pool_tokens")?;

    let (source, destination) = validate_liquidity(&msg.liquidity)?;
    let config = CONFIG.load(deps.storage)?;
    validate_swap_fee(msg.swap_fee_bps, config.max_swap_fee_bps)?;
    if source_chain_id == env.block.chain_id {
        return Err(ContractError::NotDestinationChain { pool_id });
    }

    let expected = generate_pool_id(
        &source_chain_id,
        &[&source.balance.denom, &destination.balance.denom],
    );
    if expected != pool_id {
        return Err(ContractError::PoolIdMismatch {
            expected,
            got: pool_id,
        });
    }
    if seed.denom != pool_id {
        return Err(ContractError::MalformedPacket {
            field: "pool_tokens".to_string(),
        });
    }
    if POOLS.has(deps.storage, &pool_id) {
        return Err(ContractError::PoolAlreadyExists { pool_id });
    }

    let supply = deps.querier.query_supply(&destination.balance.denom)?;
    if supply.amount.is_zero() {
        return Err(ContractError::DenomNotFound {
            denom: destination.balance.denom.clone(),
        });
    }
    deps.api.addr_validate(&msg.counterparty_creator)?;

    let pool = InterchainLiquidityPool {
        id: pool_id.clone(),
        assets: msg.liquidity.clone(),
        supply: seed,
        status: PoolStatus::Initialized,
        source_creator: msg.creator,
        destination_creator: msg.counterparty_creator,
        port: packet.dest.port_id.clone(),
        channel: packet.dest.channel_id.clone(),
        counterparty_port: packet.src.port_id.clone(),
        counterparty_channel: packet.src.channel_id.clone(),
        swap_fee_bps: msg.swap_fee_bps,
        source_chain_id,
    };
    POOLS.save(deps.storage, &pool_id, &pool)?;

    Ok((vec![], vec![attr("pool_id", pool_id)]))
}

/// The destination creator's liquidity is locked on the counterparty; the
/// pool becomes Active and the creator's locked liquidity joins it.
fn on_received_take_pool(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: TakePoolMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let share = first_token(&state_change.pool_tokens, "pool_tokens")?;
    let mut pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;

    if pool.local_side(&env.block.chain_id) != PoolSide::Source {
        return Err(ContractError::NotSourceChain { pool_id: pool.id });
    }
    if pool.status != PoolStatus::Initialized {
        return Err(ContractError::InvalidPoolState { pool_id: pool.id });
    }
    if msg.creator != pool.destination_creator {
        return Err(ContractError::Unauthorized);
    }
    if !INITIAL_LIQUIDITY.has(deps.storage, &pool.id) {
        return Err(ContractError::LiquidityNotFound { pool_id: pool.id });
    }
    if share.denom != pool.id {
        return Err(ContractError::MalformedPacket {
            field: "pool_tokens".to_string(),
        });
    }

    pool.status = PoolStatus::Active;
    pool.add_supply(share.amount)?;
    INITIAL_LIQUIDITY.remove(deps.storage, &pool.id);
    POOLS.save(deps.storage, &pool.id, &pool)?;

    Ok((vec![], vec![attr("pool_id", pool.id), attr("status", "active")]))
}

/// Deletes the mirror of an untaken pool. Rejected while this chain's take
/// liquidity is locked, so a take in flight always wins.
fn on_received_cancel_pool(
    deps: DepsMut,
    packet: &IbcPacket,
    msg: CancelPoolMsg,
) -> Result<Handled, ContractError> {
    let pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;

    if pool.status != PoolStatus::Initialized {
        return Err(ContractError::InvalidPoolState { pool_id: pool.id });
    }
    if msg.creator != pool.source_creator {
        return Err(ContractError::Unauthorized);
    }
    if INITIAL_LIQUIDITY.has(deps.storage, &pool.id) {
        return Err(ContractError::LiquidityLocked { pool_id: pool.id });
    }

    POOLS.remove(deps.storage, &pool.id);
    Ok((vec![], vec![attr("pool_id", pool.id)]))
}

fn on_received_single_deposit(
    deps: DepsMut,
    packet: &IbcPacket,
    msg: SingleAssetDepositMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let issued = first_token(&state_change.pool_tokens, "pool_tokens")?;
    let mut pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;
    pool.ensure_active()?;

    pool.add_asset(&msg.token)?;
    pool.add_supply(issued.amount)?;
    POOLS.save(deps.storage, &pool.id, &pool)?;

    Ok((
        vec![],
        vec![
            attr("pool_id", pool.id),
            attr("token", msg.token.to_string()),
            attr("pool_tokens", issued.to_string()),
        ],
    ))
}

/// Records the mirror of a two-sided deposit order made on the counterparty.
fn on_received_make_multi_deposit(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: MakeMultiAssetDepositMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let order_id = required(state_change.multi_deposit_order_id, "multi_deposit_order_id")?;
    let source_chain_id = required(state_change.source_chain_id, "source_chain_id")?;
    let pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;
    pool.ensure_active()?;

    if msg.deposits.len() != pool.assets.len() {
        return Err(ContractError::MalformedPacket {
            field: "deposits".to_string(),
        });
    }
    for deposit in &msg.deposits {
        if pool.asset(&deposit.denom).is_none() {
            return Err(ContractError::AssetNotInPool {
                pool_id: pool.id,
                denom: deposit.denom.clone(),
            });
        }
    }
    if source_chain_id == env.block.chain_id {
        return Err(ContractError::SelfFill { order_id });
    }
    deps.api.addr_validate(&msg.destination_taker)?;
    if DEPOSIT_ORDERS.has(deps.storage, &order_id) {
        return Err(ContractError::DepositOrderAlreadyExists { order_id });
    }
    let denom = local_denom(&pool, env)?;
    let local_deposit = required(
        msg.deposits.iter().find(|deposit| deposit.denom == denom).cloned(),
        "deposits",
    )?;

    let order = MultiAssetDepositOrder {
        id: order_id.clone(),
        pool_id: pool.id.clone(),
        chain_id: source_chain_id,
        source_maker: msg.source_maker,
        destination_taker: msg.destination_taker,
        deposits: msg.deposits,
        local_deposit,
        port: pool.port.clone(),
        channel: pool.channel.clone(),
        status: DepositStatus::Pending,
        created_at: env.block.time.seconds(),
    };
    DEPOSIT_ORDERS.save(deps.storage, &order_id, &order)?;

    Ok((vec![], vec![attr("pool_id", pool.id), attr("order_id", order_id)]))
}

/// The taker's deposit is locked on the counterparty. Both deposits join the
/// pool and the maker receives the share of this chain's deposit.
fn on_received_take_multi_deposit(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: TakeMultiAssetDepositMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let order = load_deposit_order(deps.storage, &msg.order_id)?;
    if order.pool_id != msg.pool_id {
        return Err(ContractError::DepositOrderNotFound {
            order_id: msg.order_id,
        });
    }
    if order.chain_id != env.block.chain_id {
        return Err(ContractError::NotMakerChain { order_id: order.id });
    }
    if order.status != DepositStatus::Pending {
        return Err(ContractError::DepositOrderNotPending { order_id: order.id });
    }
    if msg.sender != order.destination_taker {
        return Err(ContractError::Unauthorized);
    }

    let mut pool = load_pool(deps.storage, &order.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;
    pool.ensure_active()?;

    let issued = state_change.pool_tokens;
    let maker_share = share_of(&order.deposits, &issued, &local_denom(&pool, env)?)?;
    for deposit in &order.deposits {
        pool.add_asset(deposit)?;
    }
    pool.add_supply(total_amount(&issued)?)?;

    lp::mint(deps.storage, &pool.id, &order.source_maker, maker_share.amount)?;
    POOLS.save(deps.storage, &pool.id, &pool)?;
    // Filled; the taker chain drops its copy when this is acknowledged.
    DEPOSIT_ORDERS.remove(deps.storage, &order.id);

    Ok((
        vec![],
        vec![
            attr("pool_id", pool.id),
            attr("order_id", order.id),
            attr("pool_tokens", maker_share.to_string()),
        ],
    ))
}

/// Deletes the mirror of a Pending order. Once taken here the order is
/// Complete and the cancel is rejected.
fn on_received_cancel_multi_deposit(
    deps: DepsMut,
    msg: CancelMultiAssetDepositMsg,
) -> Result<Handled, ContractError> {
    let order = load_deposit_order(deps.storage, &msg.order_id)?;
    if order.pool_id != msg.pool_id {
        return Err(ContractError::DepositOrderNotFound {
            order_id: msg.order_id,
        });
    }
    if order.status != DepositStatus::Pending {
        return Err(ContractError::DepositOrderNotPending { order_id: order.id });
    }
    if msg.sender != order.source_maker {
        return Err(ContractError::Unauthorized);
    }

    DEPOSIT_ORDERS.remove(deps.storage, &order.id);
    Ok((vec![], vec![attr("order_id", order.id)]))
}

/// Pays this chain's share of a withdrawal to the counterparty receiver.
fn on_received_withdraw(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: MultiAssetWithdrawMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let redeemed = first_token(&state_change.pool_tokens, "pool_tokens")?;
    let mut pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;
    pool.ensure_active()?;
    let receiver = deps.api.addr_validate(&msg.counterparty_receiver)?;

    let denom = local_denom(&pool, env)?;
    let local_out = required(
        state_change
            .out_tokens
            .iter()
            .find(|out| out.denom == denom)
            .cloned(),
        "out_tokens",
    )?;
    for out in &state_change.out_tokens {
        pool.subtract_asset(out)?;
    }
    pool.subtract_supply(redeemed.amount)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    let messages = payout(deps.storage, &escrow, receiver.as_str(), &local_out)?;
    save_or_remove(deps.storage, &pool)?;

    Ok((
        messages,
        vec![
            attr("pool_id", pool.id),
            attr("paid", local_out.to_string()),
            attr("recipient", receiver),
        ],
    ))
}

/// Pays the swap output to the recipient and books both sides of the trade.
fn on_received_swap(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    msg: SwapMsg,
    state_change: StateChange,
) -> Result<Handled, ContractError> {
    let token_in = first_token(&state_change.in_tokens, "in_tokens")?;
    let token_out = first_token(&state_change.out_tokens, "out_tokens")?;
    let mut pool = load_pool(deps.storage, &msg.pool_id)?;
    ensure_pool_channel(&pool, &packet.dest)?;
    pool.ensure_active()?;
    let recipient = deps.api.addr_validate(&msg.recipient)?;

    if token_out.denom != local_denom(&pool, env)? {
        return Err(ContractError::NotLocalAsset {
            denom: token_out.denom,
        });
    }
    pool.add_asset(&token_in)?;
    pool.subtract_asset(&token_out)?;

    let escrow = escrow_address(&pool.port, &pool.channel);
    let messages = payout(deps.storage, &escrow, recipient.as_str(), &token_out)?;
    POOLS.save(deps.storage, &pool.id, &pool)?;

    Ok((
        messages,
        vec![
            attr("pool_id", pool.id),
            attr("token_in", token_in.to_string()),
            attr("token_out", token_out.to_string()),
            attr("recipient", recipient),
        ],
    ))
}

// ============================================================================
// Acknowledgement
// ============================================================================

pub fn on_acknowledgement(
    deps: DepsMut,
    env: Env,
    packet: &IbcPacket,
    data: IbcSwapPacketData,
    ack: Ack,
) -> Result<IbcBasicResponse, ContractError> {
    if let Some(error) = ack.error() {
        let error = error.to_string();
        return Ok(refund_packet_token(deps, packet, data)?.add_attribute("ack_error", error));
    }

    let kind = data.payload.kind();
    let state_change = data.state_change.unwrap_or_default();
    let (messages, attributes) = match data.payload {
        PoolPacket::MakePool(msg) => {
            let pool_id = required(state_change.pool_id, "pool_id")?;
            let seed = first_token(&state_change.pool_tokens, "pool_tokens")?;
            let mut pool = load_pool(deps.storage, &pool_id)?;
            pool.add_supply(seed.amount)?;
            lp::mint(deps.storage, &pool.id, &msg.creator, seed.amount)?;
            POOLS.save(deps.storage, &pool.id, &pool)?;
            (vec![], vec![attr("pool_id", pool.id), attr("pool_tokens", seed.to_string())])
        }
        PoolPacket::TakePool(msg) => {
            let share = first_token(&state_change.pool_tokens, "pool_tokens")?;
            let mut pool = load_pool(deps.storage, &msg.pool_id)?;
            pool.status = PoolStatus::Active;
            pool.add_supply(share.amount)?;
            lp::mint(deps.storage, &pool.id, &msg.creator, share.amount)?;
            INITIAL_LIQUIDITY.remove(deps.storage, &pool.id);
            POOLS.save(deps.storage, &pool.id, &pool)?;
            (
                vec![],
                vec![
                    attr("pool_id", pool.id),
                    attr("status", "active"),
                    attr("pool_tokens", share.to_string()),
                ],
            )
        }
        PoolPacket::CancelPool(msg) => {
            let messages = unwind_pool(deps.storage, &msg.pool_id, packet)?;
            (messages, vec![attr("pool_id", msg.pool_id)])
        }
        PoolPacket::SingleAssetDeposit(msg) => {
            let issued = first_token(&state_change.pool_tokens, "pool_tokens")?;
            let mut pool = load_pool(deps.storage, &msg.pool_id)?;
            pool.add_asset(&msg.token)?;
            pool.add_supply(issued.amount)?;
            lp::mint(deps.storage, &pool.id, &msg.sender, issued.amount)?;
            POOLS.save(deps.storage, &pool.id, &pool)?;
            (vec![], vec![attr("pool_id", pool.id), attr("pool_tokens", issued.to_string())])
        }
        // The order stays Pending until the taker fills it.
        PoolPacket::MakeMultiAssetDeposit(msg) => (vec![], vec![attr("pool_id", msg.pool_id)]),
        PoolPacket::TakeMultiAssetDeposit(msg) => {
            let order = load_deposit_order(deps.storage, &msg.order_id)?;
            let mut pool = load_pool(deps.storage, &order.pool_id)?;
            let issued = state_change.pool_tokens;
            let taker_share = share_of(&order.deposits, &issued, &local_denom(&pool, &env)?)?;
            for deposit in &order.deposits {
                pool.add_asset(deposit)?;
            }
            pool.add_supply(total_amount(&issued)?)?;
            lp::mint(deps.storage, &pool.id, &msg.sender, taker_share.amount)?;
            POOLS.save(deps.storage, &pool.id, &pool)?;
            DEPOSIT_ORDERS.remove(deps.storage, &order.id);
            (
                vec![],
                vec![
                    attr("pool_id", pool.id),
                    attr("order_id", order.id),
                    attr("pool_tokens", taker_share.to_string()),
                ],
            )
        }
        PoolPacket::CancelMultiAssetDeposit(msg) => {
            let mut messages = vec![];
            if let Some(order) = DEPOSIT_ORDERS.may_load(deps.storage, &msg.order_id)? {
                if order.status == DepositStatus::Pending {
                    messages = refund_deposit(deps.storage, &order, &order.source_maker)?;
                    DEPOSIT_ORDERS.remove(deps.storage, &order.id);
                }
            }
            (messages, vec![attr("order_id", msg.order_id)])
        }
        PoolPacket::MultiAssetWithdraw(msg) => {
            let redeemed = first_token(&state_change.pool_tokens, "pool_tokens")?;
            let mut pool = load_pool(deps.storage, &msg.pool_id)?;
            let denom = local_denom(&pool, &env)?;
            let local_out = required(
                state_change
                    .out_tokens
                    .iter()
                    .find(|out| out.denom == denom)
                    .cloned(),
                "out_tokens",
            )?;
            for out in &state_change.out_tokens {
                pool.subtract_asset(out)?;
            }
            pool.subtract_supply(redeemed.amount)?;

            let escrow = escrow_address(&pool.port, &pool.channel);
            lp::burn(deps.storage, &pool.id, &escrow, redeemed.amount)?;
            let messages = payout(deps.storage, &escrow, &msg.receiver, &local_out)?;
            save_or_remove(deps.storage, &pool)?;
            (
                messages,
                vec![attr("pool_id", pool.id), attr("paid", local_out.to_string())],
            )
        }
        PoolPacket::Swap(msg) => {
            let token_in = first_token(&state_change.in_tokens, "in_tokens")?;
            let token_out = first_token(&state_change.out_tokens, "out_tokens")?;
            let mut pool = load_pool(deps.storage, &msg.pool_id)?;
            pool.add_asset(&token_in)?;
            pool.subtract_asset(&token_out)?;
            POOLS.save(deps.storage, &pool.id, &pool)?;
            (vec![], vec![attr("pool_id", pool.id)])
        }
    };

    Ok(IbcBasicResponse::new()
        .add_messages(messages)
        .add_attribute("method", "ibc_packet_ack")
        .add_attribute("packet", kind)
        .add_attribute("success", "true")
        .add_attributes(attributes))
}

/// Burns the creator's pool tokens, refunds the locked liquidity and deletes
/// the pool.
fn unwind_pool(
    storage: &mut dyn Storage,
    pool_id: &str,
    packet: &IbcPacket,
) -> Result<Vec<CosmosMsg>, ContractError> {
    let Some(pool) = POOLS.may_load(storage, pool_id)? else {
        return Ok(vec![]);
    };
    let minted = lp::balance(storage, pool_id, &pool.source_creator)?;
    if !minted.is_zero() {
        lp::burn(storage, pool_id, &pool.source_creator, minted)?;
    }
    let messages = refund_initial_liquidity(storage, pool_id, packet)?;
    POOLS.remove(storage, pool_id);
    Ok(messages)
}

// ============================================================================
// Refund
// ============================================================================

/// Undoes what sending the packet locked. Runs on error acknowledgements and
/// timeouts alike, and never assumes the counterparty applied anything.
pub fn refund_packet_token(
    deps: DepsMut,
    packet: &IbcPacket,
    data: IbcSwapPacketData,
) -> Result<IbcBasicResponse, ContractError> {
    let kind = data.payload.kind();
    let state_change = data.state_change.unwrap_or_default();
    let escrow = escrow_address(&packet.src.port_id, &packet.src.channel_id);

    let messages = match data.payload {
        PoolPacket::MakePool(_) => {
            let pool_id = required(state_change.pool_id, "pool_id")?;
            let messages = refund_initial_liquidity(deps.storage, &pool_id, packet)?;
            POOLS.remove(deps.storage, &pool_id);
            messages
        }
        // The pool stays Initialized; the taker may try again.
        PoolPacket::TakePool(msg) => refund_initial_liquidity(deps.storage, &msg.pool_id, packet)?,
        PoolPacket::CancelPool(_) => vec![],
        PoolPacket::SingleAssetDeposit(msg) => {
            payout(deps.storage, &escrow, &msg.sender, &msg.token)?
        }
        PoolPacket::MakeMultiAssetDeposit(msg) => {
            let order_id = required(state_change.multi_deposit_order_id, "multi_deposit_order_id")?;
            match DEPOSIT_ORDERS.may_load(deps.storage, &order_id)? {
                Some(order) if order.status == DepositStatus::Pending => {
                    let messages = refund_deposit(deps.storage, &order, &msg.source_maker)?;
                    DEPOSIT_ORDERS.remove(deps.storage, &order_id);
                    messages
                }
                _ => vec![],
            }
        }
        PoolPacket::TakeMultiAssetDeposit(msg) => {
            match DEPOSIT_ORDERS.may_load(deps.storage, &msg.order_id)? {
                Some(mut order) if order.status == DepositStatus::Complete => {
                    let messages = refund_deposit(deps.storage, &order, &msg.sender)?;
                    order.status = DepositStatus::Pending;
                    DEPOSIT_ORDERS.save(deps.storage, &order.id, &order)?;
                    messages
                }
                _ => vec![],
            }
        }
        PoolPacket::CancelMultiAssetDeposit(_) => vec![],
        PoolPacket::MultiAssetWithdraw(msg) => {
            let redeemed = first_token(&state_change.pool_tokens, "pool_tokens")?;
            lp::transfer(deps.storage, &msg.pool_id, &escrow, &msg.sender, redeemed.amount)?;
            vec![]
        }
        PoolPacket::Swap(msg) => {
            let token_in = first_token(&state_change.in_tokens, "in_tokens")?;
            payout(deps.storage, &escrow, &msg.sender, &token_in)?
        }
    };

    Ok(IbcBasicResponse::new()
        .add_messages(messages)
        .add_attribute("method", "refund_packet_token")
        .add_attribute("packet", kind))
}

/// Returns the liquidity locked by MakePool or TakePool to its owner.
fn refund_initial_liquidity(
    storage: &mut dyn Storage,
    pool_id: &str,
    packet: &IbcPacket,
) -> Result<Vec<CosmosMsg>, ContractError> {
    let Some(locked) = INITIAL_LIQUIDITY.may_load(storage, pool_id)? else {
        return Ok(vec![]);
    };
    INITIAL_LIQUIDITY.remove(storage, pool_id);
    let escrow = escrow_address(&packet.src.port_id, &packet.src.channel_id);
    payout(storage, &escrow, locked.owner.as_str(), &locked.coin)
}

/// Returns this chain's deposit of a two-sided order to `recipient`. Works
/// from the order alone since the pool may have been removed meanwhile.
fn refund_deposit(
    storage: &mut dyn Storage,
    order: &MultiAssetDepositOrder,
    recipient: &str,
) -> Result<Vec<CosmosMsg>, ContractError> {
    let escrow = escrow_address(&order.port, &order.channel);
    payout(storage, &escrow, recipient, &order.local_deposit)
}
