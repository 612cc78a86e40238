//! IBC entry points: channel handshake and packet lifecycle.

use common::channel::{
    authenticate_inbound, authenticate_outbound, mark_channel_closed, register_channel,
    validate_order_and_version,
};
use common::{parse_ack, Ack, RelayError};
use cosmwasm_std::{
    entry_point, from_json, DepsMut, Env, IbcBasicResponse, IbcChannelCloseMsg, IbcChannelConnectMsg,
    IbcChannelOpenMsg, IbcChannelOpenResponse, IbcPacketAckMsg, IbcPacketReceiveMsg,
    IbcPacketTimeoutMsg, IbcReceiveResponse, Never,
};

use crate::error::ContractError;
use crate::packet::AtomicSwapPacketData;
use crate::relay::{on_acknowledgement, on_recv_packet, refund_packet_token};
use crate::state::SWAP_VERSION;

// ============================================================================
// Channel Handshake
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_open(
    _deps: DepsMut,
    _env: Env,
    msg: IbcChannelOpenMsg,
) -> Result<IbcChannelOpenResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version(), SWAP_VERSION)?;
    Ok(None)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_connect(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelConnectMsg,
) -> Result<IbcBasicResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version(), SWAP_VERSION)?;
    let channel = register_channel(deps.storage, msg.channel())?;

    Ok(IbcBasicResponse::new()
        .add_attribute("method", "ibc_channel_connect")
        .add_attribute("channel_id", channel.id)
        .add_attribute("counterparty_port", channel.counterparty_endpoint.port_id)
        .add_attribute("counterparty_channel", channel.counterparty_endpoint.channel_id))
}

/// Closing from this side is refused. A close confirmed by the counterparty
/// stops new sends but keeps the channel registered for in-flight refunds.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_close(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelCloseMsg,
) -> Result<IbcBasicResponse, ContractError> {
    match msg {
        IbcChannelCloseMsg::CloseInit { .. } => Err(RelayError::CantCloseChannel.into()),
        IbcChannelCloseMsg::CloseConfirm { channel } => {
            mark_channel_closed(deps.storage, &channel.endpoint.channel_id)?;
            Ok(IbcBasicResponse::new()
                .add_attribute("method", "ibc_channel_close")
                .add_attribute("channel_id", channel.endpoint.channel_id))
        }
    }
}

// ============================================================================
// Packet Lifecycle
// ============================================================================

/// Failures are returned to the sender as error acknowledgements.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_receive(
    deps: DepsMut,
    env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse, Never> {
    let packet = msg.packet;
    let result = authenticate_inbound(deps.storage, &packet)
        .map_err(ContractError::from)
        .and_then(|_| Ok(from_json::<AtomicSwapPacketData>(&packet.data)?))
        .and_then(|data| on_recv_packet(deps, env, &packet, data));

    Ok(result.unwrap_or_else(|err| {
        IbcReceiveResponse::new()
            .set_ack(Ack::fail(err.to_string()))
            .add_attribute("method", "ibc_packet_receive")
            .add_attribute("error", err.to_string())
    }))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_ack(
    deps: DepsMut,
    env: Env,
    msg: IbcPacketAckMsg,
) -> Result<IbcBasicResponse, ContractError> {
    authenticate_outbound(deps.storage, &msg.original_packet)?;
    let data: AtomicSwapPacketData = from_json(&msg.original_packet.data)?;
    on_acknowledgement(deps, env, data, parse_ack(&msg.acknowledgement))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_timeout(
    deps: DepsMut,
    _env: Env,
    msg: IbcPacketTimeoutMsg,
) -> Result<IbcBasicResponse, ContractError> {
    authenticate_outbound(deps.storage, &msg.packet)?;
    let data: AtomicSwapPacketData = from_json(&msg.packet.data)?;
    Ok(refund_packet_token(deps, data)?.add_attribute("reason", "timeout"))
}
