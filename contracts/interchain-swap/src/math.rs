//! Deterministic fixed-point math for the weighted pool curve.
//!
//! Every value is a `Decimal256` with 18 fractional digits, so both chains
//! compute bit-identical results. `pow` is evaluated as `exp(e * ln b)`:
//! - `ln` halves its argument into [1, 2) and sums the atanh series
//!   `ln x = 2 * (y + y^3/3 + y^5/5 + ...)` with `y = (x - 1) / (x + 1)`
//! - `exp` subtracts multiples of ln 2 and sums the Taylor series of the rest
//!
//! Bases below one are handled as `1 / pow(1 / b, e)` so no intermediate value
//! is ever negative.

use cosmwasm_std::{CheckedFromRatioError, Decimal256, OverflowError};
use thiserror::Error;

/// ln 2 with 18 decimal places
pub const LN_2: Decimal256 = Decimal256::raw(693_147_180_559_945_309);

/// Upper bound on series terms; every series here converges well before it.
const MAX_TERMS: u32 = 100;

/// `exp` overflows `Decimal256` well before this many halvings.
const MAX_EXP_STEPS: u32 = 200;

#[derive(Error, Debug, PartialEq)]
pub enum MathError {
    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    Ratio(#[from] CheckedFromRatioError),

    #[error("Logarithm is only defined here for values >= 1, got {value}")]
    LogDomain { value: Decimal256 },

    #[error("Exponent too large: {value}")]
    ExpOverflow { value: Decimal256 },
}

/// Natural logarithm of `x >= 1`.
pub fn ln(x: Decimal256) -> Result<Decimal256, MathError> {
    if x < Decimal256::one() {
        return Err(MathError::LogDomain { value: x });
    }

    let two = Decimal256::from_ratio(2u8, 1u8);
    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced >= two {
        reduced = reduced.checked_div(two)?;
        halvings += 1;
    }

    let y = (reduced - Decimal256::one()).checked_div(reduced + Decimal256::one())?;
    let y_squared = y.checked_mul(y)?;
    let mut power = y;
    let mut sum = Decimal256::zero();
    for n in 0..MAX_TERMS {
        let term = power.checked_div(Decimal256::from_ratio(2 * n + 1, 1u8))?;
        if term.is_zero() {
            break;
        }
        sum = sum.checked_add(term)?;
        power = power.checked_mul(y_squared)?;
    }

    let scaled = LN_2.checked_mul(Decimal256::from_ratio(halvings, 1u8))?;
    Ok(scaled.checked_add(sum.checked_add(sum)?)?)
}

/// e raised to `x >= 0`.
pub fn exp(x: Decimal256) -> Result<Decimal256, MathError> {
    let mut rest = x;
    let mut doublings = 0u32;
    while rest >= LN_2 {
        rest -= LN_2;
        doublings += 1;
        if doublings > MAX_EXP_STEPS {
            return Err(MathError::ExpOverflow { value: x });
        }
    }

    let mut term = Decimal256::one();
    let mut sum = Decimal256::one();
    for n in 1..MAX_TERMS {
        term = term
            .checked_mul(rest)?
            .checked_div(Decimal256::from_ratio(n, 1u8))?;
        if term.is_zero() {
            break;
        }
        sum = sum.checked_add(term)?;
    }

    let two = Decimal256::from_ratio(2u8, 1u8);
    for _ in 0..doublings {
        sum = sum.checked_mul(two)?;
    }
    Ok(sum)
}

/// `base` raised to a fractional `exponent`.
pub fn pow(base: Decimal256, exponent: Decimal256) -> Result<Decimal256, MathError> {
    if exponent.is_zero() || base == Decimal256::one() {
        return Ok(Decimal256::one());
    }
    if base.is_zero() {
        return Ok(Decimal256::zero());
    }
    if base > Decimal256::one() {
        return exp(ln(base)?.checked_mul(exponent)?);
    }
    let inverse = Decimal256::one().checked_div(base)?;
    Ok(Decimal256::one().checked_div(pow(inverse, exponent)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal256 {
        Decimal256::from_str(s).unwrap()
    }

    fn assert_close(actual: Decimal256, expected: &str) {
        let expected = dec(expected);
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(
            diff <= dec("0.000000000001"),
            "got {}, expected {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_ln() {
        assert_eq!(ln(Decimal256::one()).unwrap(), Decimal256::zero());
        assert_close(ln(dec("2")).unwrap(), "0.693147180559945309");
        assert_close(ln(dec("10")).unwrap(), "2.302585092994045684");
        assert_close(ln(dec("1.5")).unwrap(), "0.405465108108164382");
        assert!(matches!(
            ln(dec("0.5")).unwrap_err(),
            MathError::LogDomain { .. }
        ));
    }

    #[test]
    fn test_exp() {
        assert_eq!(exp(Decimal256::zero()).unwrap(), Decimal256::one());
        assert_close(exp(Decimal256::one()).unwrap(), "2.718281828459045235");
        assert_close(exp(dec("3.5")).unwrap(), "33.115451958692313750");
        assert!(matches!(
            exp(dec("1000")).unwrap_err(),
            MathError::ExpOverflow { .. }
        ));
    }

    #[test]
    fn test_pow() {
        assert_close(pow(dec("2"), dec("0.5")).unwrap(), "1.414213562373095048");
        assert_close(pow(dec("0.5"), dec("2")).unwrap(), "0.25");
        assert_close(pow(dec("1.1"), dec("0.3")).unwrap(), "1.029005759421095048");
        assert_close(pow(dec("0.9"), dec("1.5")).unwrap(), "0.853814968245462420");
        assert_close(pow(dec("3"), dec("4")).unwrap(), "81");
        assert_eq!(pow(Decimal256::zero(), dec("0.5")).unwrap(), Decimal256::zero());
        assert_eq!(pow(dec("7"), Decimal256::zero()).unwrap(), Decimal256::one());
    }
}
