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
use crate::packet::IbcSwapPacketData;
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

/// Pools are bound to their channel, so closing from this side is refused.
/// A close confirmed by the counterparty stops new sends only.
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

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_receive(
    deps: DepsMut,
    env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse, Never> {
    let packet = msg.packet;
    let result = authenticate_inbound(deps.storage, &packet)
        .map_err(ContractError::from)
        .and_then(|_| Ok(from_json::<IbcSwapPacketData>(&packet.data)?))
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
    let data: IbcSwapPacketData = from_json(&msg.original_packet.data)?;
    on_acknowledgement(
        deps,
        env,
        &msg.original_packet,
        data,
        parse_ack(&msg.acknowledgement),
    )
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_timeout(
    deps: DepsMut,
    _env: Env,
    msg: IbcPacketTimeoutMsg,
) -> Result<IbcBasicResponse, ContractError> {
    authenticate_outbound(deps.storage, &msg.packet)?;
    let data: IbcSwapPacketData = from_json(&msg.packet.data)?;
    Ok(refund_packet_token(deps, &msg.packet, data)?.add_attribute("reason", "timeout"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_env};
    use cosmwasm_std::{IbcChannel, IbcEndpoint, IbcOrder};

    fn channel(version: &str, order: IbcOrder) -> IbcChannel {
        IbcChannel::new(
            IbcEndpoint {
                port_id: "wasm.poola".to_string(),
                channel_id: "channel-0".to_string(),
            },
            IbcEndpoint {
                port_id: "wasm.poolb".to_string(),
                channel_id: "channel-1".to_string(),
            },
            order,
            version,
            "connection-0",
        )
    }

    #[test]
    fn test_open_accepts_both_orderings() {
        let mut deps = mock_dependencies();
        for order in [IbcOrder::Ordered, IbcOrder::Unordered] {
            let msg = IbcChannelOpenMsg::new_init(channel(SWAP_VERSION, order));
            assert_eq!(ibc_channel_open(deps.as_mut(), mock_env(), msg).unwrap(), None);
        }

        let atomic = IbcChannelOpenMsg::new_init(channel("ics100-1", IbcOrder::Unordered));
        assert!(matches!(
            ibc_channel_open(deps.as_mut(), mock_env(), atomic).unwrap_err(),
            ContractError::Relay(RelayError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_unknown_channel_packet_is_rejected_with_error_ack() {
        let mut deps = mock_dependencies();
        let packet = cosmwasm_std::IbcPacket::new(
            b"{}".to_vec(),
            IbcEndpoint {
                port_id: "wasm.poolb".to_string(),
                channel_id: "channel-1".to_string(),
            },
            IbcEndpoint {
                port_id: "wasm.poola".to_string(),
                channel_id: "channel-0".to_string(),
            },
            1,
            cosmwasm_std::IbcTimeout::with_timestamp(mock_env().block.time.plus_seconds(60)),
        );
        let res = ibc_packet_receive(
            deps.as_mut(),
            mock_env(),
            IbcPacketReceiveMsg::new(packet, cosmwasm_std::Addr::unchecked("relayer")),
        )
        .unwrap();

        let ack = parse_ack(&cosmwasm_std::IbcAcknowledgement::new(res.acknowledgement));
        assert!(!ack.is_success());
        assert!(res.attributes.iter().any(|a| a.key == "error"));
    }
}
