//! MakeSwap, TakeSwap and CancelSwap handlers.
//!
//! Each handler validates everything before its first write, locks the
//! attached funds in the escrow of the order's local channel end and queues
//! the packet in the same response.

use common::channel::{load_open_channel, next_sequence_send, validate_identifier};
use common::escrow::{escrow_address, lock};
use common::funds::{ensure_positive, must_pay_exact};
use common::OrderPath;
use cosmwasm_std::{
    to_json_binary, DepsMut, Env, IbcMsg, IbcTimeout, MessageInfo, Response,
};

use crate::error::ContractError;
use crate::msg::{CancelSwapMsg, MakeSwapMsg, TakeSwapMsg};
use crate::packet::{generate_order_id, AtomicSwapPacketData, SwapPacket};
use crate::state::{
    insert_order, load_order, AtomicSwapOrder, Side, Status, CONFIG, ORDERS, ORDER_ESCROW,
};

fn send_packet(
    env: &Env,
    channel_id: String,
    packet: &AtomicSwapPacketData,
    packet_lifetime: u64,
) -> Result<IbcMsg, ContractError> {
    Ok(IbcMsg::SendPacket {
        channel_id,
        data: to_json_binary(packet)?,
        timeout: IbcTimeout::with_timestamp(env.block.time.plus_seconds(packet_lifetime)),
    })
}

fn ensure_sender(info: &MessageInfo, expected: &str) -> Result<(), ContractError> {
    if info.sender != expected {
        return Err(ContractError::InvalidSender {
            sender: info.sender.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

fn ensure_not_blank(address: &str, field: &str) -> Result<(), ContractError> {
    if address.trim().is_empty() {
        return Err(ContractError::InvalidAddress {
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

// ============================================================================
// MakeSwap
// ============================================================================

/// Escrow the maker's sell token and post the order to the counterparty.
pub fn execute_make_swap(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: MakeSwapMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();

    validate_identifier(&msg.source_port)?;
    validate_identifier(&msg.source_channel)?;
    ensure_positive(&msg.sell_token)?;
    ensure_positive(&msg.buy_token)?;
    ensure_sender(&info, &msg.maker_address)?;
    ensure_not_blank(&msg.maker_receiving_address, "maker_receiving_address")?;
    if let Some(desired_taker) = &msg.desired_taker {
        ensure_not_blank(desired_taker, "desired_taker")?;
    }
    if let Some(expiration) = msg.expiration_timestamp {
        if expiration <= now {
            return Err(ContractError::InvalidExpiration { expiration, now });
        }
    }

    let channel = load_open_channel(deps.storage, &msg.source_port, &msg.source_channel)?;
    must_pay_exact(&info, &msg.sell_token)?;

    let sequence = next_sequence_send(deps.storage, &channel.id)?;
    let path = OrderPath::outbound(&channel, sequence);
    let order_id = generate_order_id(&path, &msg)?;
    if ORDERS.has(deps.storage, &order_id) {
        return Err(ContractError::OrderAlreadyExists { order_id });
    }

    let escrow = escrow_address(&path.source_port, &path.source_channel);
    lock(deps.storage, &escrow, &msg.sell_token)?;
    ORDER_ESCROW.save(deps.storage, &order_id, &msg.sell_token)?;

    let order = AtomicSwapOrder {
        id: order_id.clone(),
        side: Side::Native,
        status: Status::Initial,
        path: path.clone(),
        maker: msg.clone(),
        taker: None,
        create_timestamp: now,
        cancel_timestamp: None,
        complete_timestamp: None,
    };
    let trimmed = insert_order(deps.storage, &order, config.max_orders)?;

    let packet = AtomicSwapPacketData {
        order_id: Some(order_id.clone()),
        path: Some(path.clone()),
        ..AtomicSwapPacketData::new(SwapPacket::MakeSwap(msg.clone()))
    };
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "make_swap")
        .add_attribute("order_id", order_id)
        .add_attribute("path", path.to_string())
        .add_attribute("maker", msg.maker_address)
        .add_attribute("sell_token", msg.sell_token.to_string())
        .add_attribute("buy_token", msg.buy_token.to_string())
        .add_attribute("escrow", escrow)
        .add_attribute("trimmed_orders", trimmed.len().to_string()))
}

// ============================================================================
// TakeSwap
// ============================================================================

/// Escrow the taker's tokens against a remote order and notify the maker
/// chain. The escrow and channel come from the stored order path.
pub fn execute_take_swap(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: TakeSwapMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();
    let mut order = load_order(deps.storage, &msg.order_id)?;

    if order.side != Side::Remote {
        return Err(ContractError::NotRemoteOrder {
            order_id: order.id,
        });
    }
    if !order.status.is_open() {
        return Err(ContractError::InvalidOrderState);
    }
    if order.taker.is_some() {
        return Err(ContractError::AlreadyTaken);
    }
    if order.is_expired(now) {
        return Err(ContractError::OrderExpired {
            expiration: order.maker.expiration_timestamp.unwrap_or_default(),
        });
    }

    ensure_sender(&info, &msg.taker_address)?;
    ensure_not_blank(&msg.taker_receiving_address, "taker_receiving_address")?;
    if let Some(desired_taker) = &order.maker.desired_taker {
        if desired_taker != &msg.taker_address {
            return Err(ContractError::NotDesiredTaker {
                taker: msg.taker_address,
            });
        }
    }
    if msg.sell_token != order.maker.buy_token {
        return Err(ContractError::TokenMismatch {
            expected: order.maker.buy_token,
            got: msg.sell_token,
        });
    }

    // The taker chain is the destination end of the order path.
    let channel = load_open_channel(
        deps.storage,
        &order.path.destination_port,
        &order.path.destination_channel,
    )?;
    must_pay_exact(&info, &msg.sell_token)?;

    let escrow = escrow_address(&order.path.destination_port, &order.path.destination_channel);
    lock(deps.storage, &escrow, &msg.sell_token)?;
    ORDER_ESCROW.save(deps.storage, &order.id, &msg.sell_token)?;

    order.taker = Some(msg.clone());
    ORDERS.save(deps.storage, &order.id, &order)?;

    let packet = AtomicSwapPacketData {
        order_id: Some(order.id.clone()),
        ..AtomicSwapPacketData::new(SwapPacket::TakeSwap(msg.clone()))
    };
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "take_swap")
        .add_attribute("order_id", order.id)
        .add_attribute("taker", msg.taker_address)
        .add_attribute("sell_token", msg.sell_token.to_string())
        .add_attribute("escrow", escrow))
}

// ============================================================================
// CancelSwap
// ============================================================================

/// Cancel an open native order. The maker is refunded when the counterparty
/// acknowledges the cancellation. If the make packet already failed and the
/// escrow was refunded, the order is cancelled locally without a packet.
pub fn execute_cancel_swap(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: CancelSwapMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut order = load_order(deps.storage, &msg.order_id)?;

    if order.side != Side::Native {
        return Err(ContractError::NotNativeOrder {
            order_id: order.id,
        });
    }
    ensure_sender(&info, &order.maker.maker_address)?;
    if msg.maker_address != order.maker.maker_address {
        return Err(ContractError::Unauthorized);
    }
    if !order.status.is_open() || order.taker.is_some() {
        return Err(ContractError::InvalidCancelState);
    }

    if !ORDER_ESCROW.has(deps.storage, &order.id) {
        order.status = Status::Cancel;
        order.cancel_timestamp = Some(env.block.time.seconds());
        ORDERS.save(deps.storage, &order.id, &order)?;
        return Ok(Response::new()
            .add_attribute("method", "cancel_swap")
            .add_attribute("order_id", order.id)
            .add_attribute("status", "cancelled_locally"));
    }

    let channel = load_open_channel(
        deps.storage,
        &order.path.source_port,
        &order.path.source_channel,
    )?;
    let packet = AtomicSwapPacketData {
        order_id: Some(order.id.clone()),
        ..AtomicSwapPacketData::new(SwapPacket::CancelSwap(msg))
    };
    let send = send_packet(&env, channel.id, &packet, config.packet_lifetime)?;

    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "cancel_swap")
        .add_attribute("order_id", order.id)
        .add_attribute("status", "pending_acknowledgement"))
}
