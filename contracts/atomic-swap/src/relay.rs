//! Packet receive, acknowledgement and refund handling.
//!
//! Receive handlers run inside a transaction that commits even when they
//! fail (the failure becomes an error acknowledgement), so each one checks
//! every precondition before its first write.

use common::escrow::{escrow_address, release};
use common::{Ack, OrderPath};
use cosmwasm_std::{
    attr, Attribute, CosmosMsg, DepsMut, Env, IbcBasicResponse, IbcPacket, IbcReceiveResponse,
    Storage,
};

use crate::error::ContractError;
use crate::msg::{CancelSwapMsg, MakeSwapMsg, TakeSwapMsg};
use crate::packet::{generate_order_id, AtomicSwapPacketData, SwapPacket};
use crate::state::{
    insert_order, load_order, AtomicSwapOrder, Side, Status, CONFIG, ORDERS, ORDER_ESCROW,
};

// ============================================================================
// Receive
// ============================================================================

pub fn on_recv_packet(
    deps: DepsMut,
    env: Env,
    packet: &IbcPacket,
    data: AtomicSwapPacketData,
) -> Result<IbcReceiveResponse, ContractError> {
    let kind = data.payload.kind();
    let (messages, attributes) = match data.payload {
        SwapPacket::MakeSwap(msg) => {
            let path = data.path.ok_or_else(|| ContractError::MalformedPacket {
                field: "path".to_string(),
            })?;
            let order_id = data.order_id.ok_or_else(|| ContractError::MalformedPacket {
                field: "order_id".to_string(),
            })?;
            on_received_make(deps, &env, packet, path, order_id, msg)?
        }
        SwapPacket::TakeSwap(msg) => on_received_take(deps, &env, msg)?,
        SwapPacket::CancelSwap(msg) => on_received_cancel(deps, &env, msg)?,
    };

    Ok(IbcReceiveResponse::new()
        .set_ack(Ack::success(&kind)?)
        .add_messages(messages)
        .add_attribute("method", "ibc_packet_receive")
        .add_attribute("packet", kind)
        .add_attributes(attributes))
}

type Handled = (Vec<CosmosMsg>, Vec<Attribute>);

/// Records the mirror of an order made on the counterparty chain.
fn on_received_make(
    deps: DepsMut,
    env: &Env,
    packet: &IbcPacket,
    path: OrderPath,
    order_id: String,
    msg: MakeSwapMsg,
) -> Result<Handled, ContractError> {
    if !path.matches_packet(packet) {
        return Err(ContractError::PathMismatch {
            path: path.to_string(),
        });
    }
    let expected = generate_order_id(&path, &msg)?;
    if expected != order_id {
        return Err(ContractError::OrderIdMismatch {
            expected,
            got: order_id,
        });
    }
    if ORDERS.has(deps.storage, &order_id) {
        return Err(ContractError::OrderAlreadyExists { order_id });
    }

    common::funds::ensure_positive(&msg.sell_token)?;
    common::funds::ensure_positive(&msg.buy_token)?;
    // The maker is paid on this chain once the take is acknowledged.
    deps.api.addr_validate(&msg.maker_receiving_address)?;
    if let Some(desired_taker) = &msg.desired_taker {
        deps.api.addr_validate(desired_taker)?;
    }

    let config = CONFIG.load(deps.storage)?;
    let order = AtomicSwapOrder {
        id: order_id.clone(),
        side: Side::Remote,
        status: Status::Initial,
        path,
        maker: msg,
        taker: None,
        create_timestamp: env.block.time.seconds(),
        cancel_timestamp: None,
        complete_timestamp: None,
    };
    insert_order(deps.storage, &order, config.max_orders)?;

    Ok((vec![], vec![attr("order_id", order_id)]))
}

/// Pays the maker's escrow to the taker and completes the order.
fn on_received_take(
    deps: DepsMut,
    env: &Env,
    msg: TakeSwapMsg,
) -> Result<Handled, ContractError> {
    let mut order = load_order(deps.storage, &msg.order_id)?;
    if order.side != Side::Native {
        return Err(ContractError::NotNativeOrder { order_id: order.id });
    }
    if !order.status.is_open() {
        return Err(ContractError::InvalidOrderState);
    }
    if order.taker.is_some() {
        return Err(ContractError::AlreadyTaken);
    }
    let now = env.block.time.seconds();
    if order.is_expired(now) {
        return Err(ContractError::OrderExpired {
            expiration: order.maker.expiration_timestamp.unwrap_or_default(),
        });
    }
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
    let recipient = deps.api.addr_validate(&msg.taker_receiving_address)?;
    let locked = ORDER_ESCROW
        .may_load(deps.storage, &order.id)?
        .ok_or_else(|| ContractError::EscrowNotFound {
            order_id: order.id.clone(),
        })?;

    ORDER_ESCROW.remove(deps.storage, &order.id);
    let escrow = escrow_address(&order.path.source_port, &order.path.source_channel);
    let payout = release(deps.storage, &escrow, recipient.as_str(), &locked)?;

    order.taker = Some(msg);
    order.status = Status::Complete;
    order.complete_timestamp = Some(now);
    ORDERS.save(deps.storage, &order.id, &order)?;

    Ok((
        vec![payout],
        vec![
            attr("order_id", order.id),
            attr("paid", locked.to_string()),
            attr("recipient", recipient),
        ],
    ))
}

/// Cancels the mirror of a remote order that nobody has taken.
fn on_received_cancel(
    deps: DepsMut,
    env: &Env,
    msg: CancelSwapMsg,
) -> Result<Handled, ContractError> {
    let mut order = load_order(deps.storage, &msg.order_id)?;
    if order.side != Side::Remote {
        return Err(ContractError::NotRemoteOrder { order_id: order.id });
    }
    if msg.maker_address != order.maker.maker_address {
        return Err(ContractError::Unauthorized);
    }
    if !order.status.is_open() {
        return Err(ContractError::InvalidCancelState);
    }
    if order.taker.is_some() {
        return Err(ContractError::AlreadyTaken);
    }

    order.status = Status::Cancel;
    order.cancel_timestamp = Some(env.block.time.seconds());
    ORDERS.save(deps.storage, &order.id, &order)?;

    Ok((vec![], vec![attr("order_id", order.id)]))
}

// ============================================================================
// Acknowledgement
// ============================================================================

pub fn on_acknowledgement(
    deps: DepsMut,
    env: Env,
    data: AtomicSwapPacketData,
    ack: Ack,
) -> Result<IbcBasicResponse, ContractError> {
    if let Some(error) = ack.error() {
        let error = error.to_string();
        return Ok(refund_packet_token(deps, data)?.add_attribute("ack_error", error));
    }

    let kind = data.payload.kind();
    let (messages, attributes) = match data.payload {
        SwapPacket::MakeSwap(_) => {
            let order_id = packet_order_id(&data.order_id)?;
            let mut order = load_order(deps.storage, order_id)?;
            if order.status == Status::Initial {
                order.status = Status::Sync;
                ORDERS.save(deps.storage, &order.id, &order)?;
            }
            (vec![], vec![attr("order_id", order.id)])
        }
        SwapPacket::TakeSwap(msg) => {
            let mut order = load_order(deps.storage, &msg.order_id)?;
            let mut messages = vec![];
            if let Some(locked) = ORDER_ESCROW.may_load(deps.storage, &order.id)? {
                ORDER_ESCROW.remove(deps.storage, &order.id);
                let escrow =
                    escrow_address(&order.path.destination_port, &order.path.destination_channel);
                messages.push(release(
                    deps.storage,
                    &escrow,
                    &order.maker.maker_receiving_address,
                    &locked,
                )?);
            }
            order.status = Status::Complete;
            order.complete_timestamp = Some(env.block.time.seconds());
            ORDERS.save(deps.storage, &order.id, &order)?;
            (messages, vec![attr("order_id", order.id)])
        }
        SwapPacket::CancelSwap(msg) => {
            let mut order = load_order(deps.storage, &msg.order_id)?;
            let messages = refund_escrow(deps.storage, &order, &order.maker.maker_address)?;
            order.status = Status::Cancel;
            order.cancel_timestamp = Some(env.block.time.seconds());
            ORDERS.save(deps.storage, &order.id, &order)?;
            (messages, vec![attr("order_id", order.id)])
        }
    };

    Ok(IbcBasicResponse::new()
        .add_messages(messages)
        .add_attribute("method", "ibc_packet_ack")
        .add_attribute("packet", kind)
        .add_attribute("success", "true")
        .add_attributes(attributes))
}

// ============================================================================
// Refund
// ============================================================================

/// Undoes what sending the packet locked. Safe to run when the packet never
/// reached the counterparty, and a no-op when the escrow is already gone.
pub fn refund_packet_token(
    deps: DepsMut,
    data: AtomicSwapPacketData,
) -> Result<IbcBasicResponse, ContractError> {
    let kind = data.payload.kind();
    let (messages, order_id) = match data.payload {
        SwapPacket::MakeSwap(msg) => {
            let order_id = packet_order_id(&data.order_id)?.to_string();
            // The order stays open; the maker may cancel it locally.
            let order = load_order(deps.storage, &order_id)?;
            (refund_escrow(deps.storage, &order, &msg.maker_address)?, order_id)
        }
        SwapPacket::TakeSwap(msg) => {
            let mut order = load_order(deps.storage, &msg.order_id)?;
            let messages = refund_escrow(deps.storage, &order, &msg.taker_address)?;
            if order.taker.as_ref() == Some(&msg) {
                order.taker = None;
                ORDERS.save(deps.storage, &order.id, &order)?;
            }
            (messages, msg.order_id)
        }
        // A cancel locks nothing.
        SwapPacket::CancelSwap(msg) => (vec![], msg.order_id),
    };

    Ok(IbcBasicResponse::new()
        .add_messages(messages)
        .add_attribute("method", "refund_packet_token")
        .add_attribute("packet", kind)
        .add_attribute("order_id", order_id))
}

/// Releases the order's escrow record, if any, from the escrow of the order's
/// local channel end.
fn refund_escrow(
    storage: &mut dyn Storage,
    order: &AtomicSwapOrder,
    recipient: &str,
) -> Result<Vec<CosmosMsg>, ContractError> {
    let Some(locked) = ORDER_ESCROW.may_load(storage, &order.id)? else {
        return Ok(vec![]);
    };
    ORDER_ESCROW.remove(storage, &order.id);
    let escrow = match order.side {
        Side::Native => escrow_address(&order.path.source_port, &order.path.source_channel),
        Side::Remote => {
            escrow_address(&order.path.destination_port, &order.path.destination_channel)
        }
    };
    Ok(vec![release(storage, &escrow, recipient, &locked)?])
}

fn packet_order_id(order_id: &Option<String>) -> Result<&str, ContractError> {
    order_id
        .as_deref()
        .ok_or_else(|| ContractError::MalformedPacket {
            field: "order_id".to_string(),
        })
}
