//! Per-channel escrow bookkeeping.
//!
//! All escrowed coins sit in the contract's own bank account. Each
//! (port, channel) pair owns a deterministic escrow address, and storage
//! tracks how much of every denom the contract holds on behalf of it, so a
//! release can never pay out more than its channel locked.

use cosmwasm_std::{BankMsg, Coin, CosmosMsg, StdResult, Storage, Uint128};
use cw_storage_plus::Map;

use crate::error::RelayError;
use crate::hash::{bytes_to_hex, keccak256};

/// Escrowed amounts keyed by (escrow address, denom).
pub const ESCROW_BALANCES: Map<(&str, &str), Uint128> = Map::new("escrow_balances");

/// Deterministic escrow address of a (port, channel) pair.
///
/// The first 20 bytes of `keccak256("escrow" ‖ 0x00 ‖ "{port}/{channel}")`,
/// hex encoded with a 0x prefix.
pub fn escrow_address(port_id: &str, channel_id: &str) -> String {
    let mut preimage = Vec::with_capacity(8 + port_id.len() + channel_id.len());
    preimage.extend_from_slice(b"escrow");
    preimage.push(0);
    preimage.extend_from_slice(format!("{}/{}", port_id, channel_id).as_bytes());
    let hash = keccak256(&preimage);
    bytes_to_hex(&hash[..20])
}

pub fn escrow_balance(storage: &dyn Storage, escrow: &str, denom: &str) -> StdResult<Uint128> {
    Ok(ESCROW_BALANCES
        .may_load(storage, (escrow, denom))?
        .unwrap_or_default())
}

/// Records `coin` as held for `escrow`. The coins themselves must already be
/// attached to the message that calls this.
pub fn lock(storage: &mut dyn Storage, escrow: &str, coin: &Coin) -> Result<(), RelayError> {
    ESCROW_BALANCES.update(storage, (escrow, &coin.denom), |held| -> StdResult<_> {
        Ok(held.unwrap_or_default().checked_add(coin.amount)?)
    })?;
    Ok(())
}

/// Debits `coin` from `escrow` and returns the bank transfer paying it to
/// `recipient`.
pub fn release(
    storage: &mut dyn Storage,
    escrow: &str,
    recipient: &str,
    coin: &Coin,
) -> Result<CosmosMsg, RelayError> {
    let available = escrow_balance(storage, escrow, &coin.denom)?;
    let remaining = available
        .checked_sub(coin.amount)
        .map_err(|_| RelayError::InsufficientEscrow {
            denom: coin.denom.clone(),
            available,
            requested: coin.amount,
        })?;

    if remaining.is_zero() {
        ESCROW_BALANCES.remove(storage, (escrow, &coin.denom));
    } else {
        ESCROW_BALANCES.save(storage, (escrow, &coin.denom), &remaining)?;
    }

    Ok(BankMsg::Send {
        to_address: recipient.to_string(),
        amount: vec![coin.clone()],
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::coin;
    use cosmwasm_std::testing::mock_dependencies;

    #[test]
    fn test_escrow_address_is_deterministic() {
        let a = escrow_address("wasm.swap", "channel-0");
        assert_eq!(a, escrow_address("wasm.swap", "channel-0"));
        assert_eq!(a.len(), 42);
        assert!(a.starts_with("0x"));
        assert_ne!(a, escrow_address("wasm.swap", "channel-1"));
    }

    #[test]
    fn test_lock_and_release() {
        let mut deps = mock_dependencies();
        let escrow = escrow_address("wasm.swap", "channel-0");

        lock(deps.as_mut().storage, &escrow, &coin(100, "uatom")).unwrap();
        lock(deps.as_mut().storage, &escrow, &coin(50, "uatom")).unwrap();
        assert_eq!(
            escrow_balance(deps.as_ref().storage, &escrow, "uatom").unwrap(),
            Uint128::new(150)
        );

        let msg = release(deps.as_mut().storage, &escrow, "alice", &coin(120, "uatom")).unwrap();
        assert_eq!(
            msg,
            CosmosMsg::Bank(BankMsg::Send {
                to_address: "alice".to_string(),
                amount: vec![coin(120, "uatom")],
            })
        );
        assert_eq!(
            escrow_balance(deps.as_ref().storage, &escrow, "uatom").unwrap(),
            Uint128::new(30)
        );
    }

    #[test]
    fn test_release_more_than_locked_fails() {
        let mut deps = mock_dependencies();
        let escrow = escrow_address("wasm.swap", "channel-0");
        lock(deps.as_mut().storage, &escrow, &coin(10, "uatom")).unwrap();

        let err = release(deps.as_mut().storage, &escrow, "alice", &coin(11, "uatom")).unwrap_err();
        assert_eq!(
            err,
            RelayError::InsufficientEscrow {
                denom: "uatom".to_string(),
                available: Uint128::new(10),
                requested: Uint128::new(11),
            }
        );

        // Escrows of other channels are not shared.
        let other = escrow_address("wasm.swap", "channel-1");
        assert!(release(deps.as_mut().storage, &other, "alice", &coin(1, "uatom")).is_err());
    }
}
