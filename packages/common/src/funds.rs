//! Validation of amounts and attached funds.

use cosmwasm_std::{Coin, MessageInfo};
use cw_utils::{must_pay, PaymentError};

use crate::error::RelayError;

/// Rejects zero amounts and empty denoms.
pub fn ensure_positive(coin: &Coin) -> Result<(), RelayError> {
    if coin.amount.is_zero() {
        return Err(RelayError::InvalidAmount {
            reason: format!("{} amount must be positive", coin.denom),
        });
    }
    if coin.denom.trim().is_empty() {
        return Err(RelayError::InvalidAmount {
            reason: "denom must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Requires the sender to attach exactly `expected`, and nothing else.
pub fn must_pay_exact(info: &MessageInfo, expected: &Coin) -> Result<(), RelayError> {
    let paid = match must_pay(info, &expected.denom) {
        Ok(paid) => paid,
        Err(PaymentError::NoFunds {}) | Err(PaymentError::MissingDenom(_)) => {
            return Err(RelayError::InsufficientBalance {
                expected: expected.amount,
                got: Default::default(),
            })
        }
        Err(err) => return Err(err.into()),
    };
    if paid < expected.amount {
        return Err(RelayError::InsufficientBalance {
            expected: expected.amount,
            got: paid,
        });
    }
    if paid != expected.amount {
        return Err(RelayError::FundsMismatch {
            expected: expected.amount,
            got: paid,
        });
    }
    Ok(())
}
