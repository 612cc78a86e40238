//! Channel registry and packet authentication.
//!
//! The host only lets this contract send on channels bound to its own port,
//! but inbound packets, acknowledgements and timeouts must still be matched
//! against the channels this contract actually completed a handshake for.
//! Channels are recorded on connect and never removed, so packets in flight
//! when the counterparty closes a channel can still be refunded.

use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{IbcChannel, IbcEndpoint, IbcPacket, StdResult, Storage};
use cw_storage_plus::Map;

use crate::error::RelayError;

/// A channel this contract completed the handshake for.
#[cw_serde]
pub struct ChannelInfo {
    /// Local channel id
    pub id: String,
    /// Local end of the channel
    pub endpoint: IbcEndpoint,
    /// Remote end of the channel
    pub counterparty_endpoint: IbcEndpoint,
    /// Underlying IBC connection
    pub connection_id: String,
    /// False once the counterparty closed the channel
    pub open: bool,
}

/// Registered channels, keyed by local channel id.
pub const CHANNELS: Map<&str, ChannelInfo> = Map::new("channels");

/// Next send sequence per local channel id.
pub const NEXT_SEQUENCE_SEND: Map<&str, u64> = Map::new("next_sequence_send");

/// Where an order travels: both channel ends plus the send sequence on the
/// originating chain.
#[cw_serde]
pub struct OrderPath {
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub sequence: u64,
}

impl OrderPath {
    /// Path for a packet leaving `channel` with the given sequence.
    pub fn outbound(channel: &ChannelInfo, sequence: u64) -> Self {
        Self {
            source_port: channel.endpoint.port_id.clone(),
            source_channel: channel.endpoint.channel_id.clone(),
            destination_port: channel.counterparty_endpoint.port_id.clone(),
            destination_channel: channel.counterparty_endpoint.channel_id.clone(),
            sequence,
        }
    }

    /// True when the packet travelled along this path.
    pub fn matches_packet(&self, packet: &IbcPacket) -> bool {
        self.source_port == packet.src.port_id
            && self.source_channel == packet.src.channel_id
            && self.destination_port == packet.dest.port_id
            && self.destination_channel == packet.dest.channel_id
    }
}

impl fmt::Display for OrderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel/{}/port/{}/channel/{}/port/{}/{}",
            self.source_channel,
            self.source_port,
            self.destination_channel,
            self.destination_port,
            self.sequence
        )
    }
}

/// Validates the version on both ends of a handshake. Both ordered and
/// unordered channels are accepted.
pub fn validate_order_and_version(
    channel: &IbcChannel,
    counterparty_version: Option<&str>,
    expected_version: &str,
) -> Result<(), RelayError> {
    if channel.version != expected_version {
        return Err(RelayError::InvalidVersion {
            actual: channel.version.to_string(),
            expected: expected_version.to_string(),
        });
    }

    // The counterparty version is only known during OpenTry and OpenAck.
    if let Some(counterparty_version) = counterparty_version {
        if counterparty_version != expected_version {
            return Err(RelayError::InvalidVersion {
                actual: counterparty_version.to_string(),
                expected: expected_version.to_string(),
            });
        }
    }

    Ok(())
}

/// Records a connected channel and initialises its send sequence.
pub fn register_channel(storage: &mut dyn Storage, channel: &IbcChannel) -> StdResult<ChannelInfo> {
    let info = ChannelInfo {
        id: channel.endpoint.channel_id.clone(),
        endpoint: channel.endpoint.clone(),
        counterparty_endpoint: channel.counterparty_endpoint.clone(),
        connection_id: channel.connection_id.clone(),
        open: true,
    };
    CHANNELS.save(storage, &info.id, &info)?;
    if NEXT_SEQUENCE_SEND.may_load(storage, &info.id)?.is_none() {
        NEXT_SEQUENCE_SEND.save(storage, &info.id, &1u64)?;
    }
    Ok(info)
}

/// Marks a channel closed by the counterparty.
pub fn mark_channel_closed(storage: &mut dyn Storage, channel_id: &str) -> StdResult<()> {
    if let Some(mut info) = CHANNELS.may_load(storage, channel_id)? {
        info.open = false;
        CHANNELS.save(storage, channel_id, &info)?;
    }
    Ok(())
}

pub fn load_channel(storage: &dyn Storage, channel_id: &str) -> Result<ChannelInfo, RelayError> {
    CHANNELS
        .may_load(storage, channel_id)?
        .ok_or_else(|| RelayError::ChannelNotFound {
            channel_id: channel_id.to_string(),
        })
}

/// Loads a channel that can carry new packets from `port_id`.
pub fn load_open_channel(
    storage: &dyn Storage,
    port_id: &str,
    channel_id: &str,
) -> Result<ChannelInfo, RelayError> {
    let channel = load_channel(storage, channel_id)?;
    if !channel.open {
        return Err(RelayError::ChannelClosed {
            channel_id: channel_id.to_string(),
        });
    }
    if channel.endpoint.port_id != port_id {
        return Err(RelayError::PortMismatch {
            expected: channel.endpoint.port_id,
            got: port_id.to_string(),
        });
    }
    Ok(channel)
}

/// Returns the next send sequence for a channel and advances it.
pub fn next_sequence_send(storage: &mut dyn Storage, channel_id: &str) -> Result<u64, RelayError> {
    let sequence = NEXT_SEQUENCE_SEND
        .may_load(storage, channel_id)?
        .ok_or_else(|| RelayError::SequenceNotFound {
            channel_id: channel_id.to_string(),
        })?;
    NEXT_SEQUENCE_SEND.save(storage, channel_id, &(sequence + 1))?;
    Ok(sequence)
}

/// Authenticates a packet delivered to this contract.
pub fn authenticate_inbound(
    storage: &dyn Storage,
    packet: &IbcPacket,
) -> Result<ChannelInfo, RelayError> {
    authenticate(storage, &packet.dest, &packet.src)
}

/// Authenticates the original packet of an acknowledgement or timeout.
pub fn authenticate_outbound(
    storage: &dyn Storage,
    packet: &IbcPacket,
) -> Result<ChannelInfo, RelayError> {
    authenticate(storage, &packet.src, &packet.dest)
}

fn authenticate(
    storage: &dyn Storage,
    local: &IbcEndpoint,
    remote: &IbcEndpoint,
) -> Result<ChannelInfo, RelayError> {
    let unauthenticated = || RelayError::UnauthenticatedPacket {
        channel_id: local.channel_id.clone(),
    };
    let channel = CHANNELS
        .may_load(storage, &local.channel_id)?
        .ok_or_else(unauthenticated)?;
    if &channel.endpoint != local || &channel.counterparty_endpoint != remote {
        return Err(unauthenticated());
    }
    Ok(channel)
}

/// Validates a port or channel identifier (ICS-24 character set).
pub fn validate_identifier(id: &str) -> Result<(), RelayError> {
    let valid_char =
        |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-' | '#' | '[' | ']' | '<' | '>');
    if id.len() < 2 || id.len() > 128 || !id.chars().all(valid_char) {
        return Err(RelayError::InvalidIdentifier { id: id.to_string() });
    }
    Ok(())
}
