//! Pool token ledger.
//!
//! Pool tokens only exist inside this contract. Balances are tracked per
//! (pool, holder) and each chain's pool record carries the total supply.

use cosmwasm_std::{StdResult, Storage, Uint128};

use crate::error::ContractError;
use crate::state::LP_BALANCES;

pub fn balance(storage: &dyn Storage, pool_id: &str, holder: &str) -> StdResult<Uint128> {
    Ok(LP_BALANCES
        .may_load(storage, (pool_id, holder))?
        .unwrap_or_default())
}

pub fn mint(
    storage: &mut dyn Storage,
    pool_id: &str,
    holder: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    let current = balance(storage, pool_id, holder)?;
    LP_BALANCES.save(storage, (pool_id, holder), &current.checked_add(amount)?)?;
    Ok(())
}

pub fn burn(
    storage: &mut dyn Storage,
    pool_id: &str,
    holder: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    let current = balance(storage, pool_id, holder)?;
    let remaining = current
        .checked_sub(amount)
        .map_err(|_| ContractError::InsufficientPoolTokens {
            available: current,
            requested: amount,
        })?;
    if remaining.is_zero() {
        LP_BALANCES.remove(storage, (pool_id, holder));
    } else {
        LP_BALANCES.save(storage, (pool_id, holder), &remaining)?;
    }
    Ok(())
}

pub fn transfer(
    storage: &mut dyn Storage,
    pool_id: &str,
    from: &str,
    to: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    burn(storage, pool_id, from, amount)?;
    mint(storage, pool_id, to, amount)
}
