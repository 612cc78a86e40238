//! Acknowledgement envelope exchanged with the counterparty contract.
//!
//! The layout matches ICS-20 so relayers and explorers can read it:
//! `{"result": "<base64>"}` on success and `{"error": "<message>"}` on failure.

use cosmwasm_std::{from_json, to_json_binary, Binary, IbcAcknowledgement, StdResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    Result(Binary),
    Error(String),
}

impl Ack {
    /// Create a serialized success acknowledgement carrying `data`.
    pub fn success(data: &impl Serialize) -> StdResult<Binary> {
        let res = to_json_binary(data)?;
        to_json_binary(&Ack::Result(res))
    }

    /// Create a serialized error acknowledgement.
    pub fn fail(err: impl Into<String>) -> Binary {
        // A single string field always serializes.
        to_json_binary(&Ack::Error(err.into())).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Ack::Result(_))
    }

    /// Returns the error message of a failed acknowledgement.
    pub fn error(&self) -> Option<&str> {
        match self {
            Ack::Result(_) => None,
            Ack::Error(err) => Some(err),
        }
    }
}

/// Parses an acknowledgement written by the counterparty.
///
/// Some acknowledgements are written by the host chain rather than the
/// counterparty contract, for example when the packet failed basic
/// validation. Anything that does not parse as an [`Ack`] is therefore
/// treated as a failure carrying the base64 of the raw bytes.
pub fn parse_ack(ack: &IbcAcknowledgement) -> Ack {
    from_json(&ack.data).unwrap_or_else(|_| Ack::Error(ack.data.to_base64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_round_trip() {
        let bin = Ack::success(&"order-1").unwrap();
        let ack = parse_ack(&IbcAcknowledgement::new(bin));
        assert!(ack.is_success());
        match ack {
            Ack::Result(data) => {
                let id: String = from_json(&data).unwrap();
                assert_eq!(id, "order-1");
            }
            Ack::Error(_) => panic!("expected success"),
        }
    }

    #[test]
    fn test_fail_layout() {
        let bin = Ack::fail("order has already been taken");
        assert_eq!(
            String::from_utf8(bin.to_vec()).unwrap(),
            r#"{"error":"order has already been taken"}"#
        );
    }

    #[test]
    fn test_unparsable_ack_is_error() {
        let raw = Binary::from(b"not json".to_vec());
        let ack = parse_ack(&IbcAcknowledgement::new(raw.clone()));
        assert_eq!(ack.error(), Some(raw.to_base64().as_str()));
    }
}
