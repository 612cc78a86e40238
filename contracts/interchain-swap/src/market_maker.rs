//! Weighted constant-product pricing.
//!
//! Pure functions over a pool snapshot. Callers apply the returned amounts to
//! the stored pool only after the matching funds have moved. Amounts paid out
//! are rounded down and amounts required from a user are rounded up.

use cosmwasm_std::{
    coin, CheckedFromRatioError, Coin, ConversionOverflowError, Decimal256, OverflowError,
    Uint128, Uint256,
};
use thiserror::Error;

use crate::math::{pow, MathError};
use crate::state::{
    InterchainLiquidityPool, PoolAsset, PoolStatus, BPS_DENOMINATOR, TOTAL_WEIGHT,
};

#[derive(Error, Debug, PartialEq)]
pub enum MarketMakerError {
    #[error("{0}")]
    Math(#[from] MathError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    Ratio(#[from] CheckedFromRatioError),

    #[error("{0}")]
    Conversion(#[from] ConversionOverflowError),

    #[error("Asset not found in pool: {denom}")]
    AssetNotFound { denom: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Pool is not active")]
    PoolNotActive,

    #[error("Initial deposit mismatch for {denom}: expected {expected}, got {got}")]
    InitialDepositMismatch {
        denom: String,
        expected: Uint128,
        got: Uint128,
    },

    #[error("Deposit ratio deviates from the pool ratio by more than {tolerance_bps} bps")]
    RatioMismatch { tolerance_bps: u32 },

    #[error("Invalid deposit: {reason}")]
    InvalidDeposit { reason: String },

    #[error("Invalid pool token: expected {expected}, got {got}")]
    InvalidRedeemDenom { expected: String, got: String },

    #[error("Redeem amount {requested} exceeds pool supply {supply}")]
    RedeemExceedsSupply { supply: Uint128, requested: Uint128 },

    #[error("Insufficient liquidity of {denom}")]
    InsufficientLiquidity { denom: String },

    #[error("Cannot swap {denom} for itself")]
    SameDenom { denom: String },

    #[error("Swap output rounds to zero")]
    ZeroOutput,

    #[error("Slippage exceeded: limit {limit}, required {required}")]
    SlippageExceeded { limit: Uint128, required: Uint128 },
}

type MmResult<T> = Result<T, MarketMakerError>;

fn dec(amount: Uint128) -> Decimal256 {
    Decimal256::from_ratio(amount, 1u8)
}

fn floor(value: Decimal256) -> MmResult<Uint128> {
    Ok(Uint128::try_from(value.to_uint_floor())?)
}

fn ceil(value: Decimal256) -> MmResult<Uint128> {
    Ok(Uint128::try_from(value.to_uint_ceil())?)
}

fn ensure_positive(token: &Coin) -> MmResult<()> {
    if token.amount.is_zero() {
        return Err(MarketMakerError::InvalidAmount {
            reason: format!("{} amount must be positive", token.denom),
        });
    }
    Ok(())
}

pub struct MarketMaker<'a> {
    pool: &'a InterchainLiquidityPool,
}

impl<'a> MarketMaker<'a> {
    pub fn new(pool: &'a InterchainLiquidityPool) -> Self {
        Self { pool }
    }

    fn asset(&self, denom: &str) -> MmResult<&'a PoolAsset> {
        self.pool
            .asset(denom)
            .ok_or_else(|| MarketMakerError::AssetNotFound {
                denom: denom.to_string(),
            })
    }

    fn ensure_active(&self) -> MmResult<()> {
        if self.pool.status != PoolStatus::Active {
            return Err(MarketMakerError::PoolNotActive);
        }
        Ok(())
    }

    fn pool_token(&self, amount: Uint128) -> Coin {
        coin(amount.u128(), &self.pool.supply.denom)
    }

    /// `1 - fee`, as a fraction
    fn fee_factor(&self) -> MmResult<Decimal256> {
        let fee = self.pool.swap_fee_bps.min(BPS_DENOMINATOR);
        Ok(Decimal256::checked_from_ratio(
            BPS_DENOMINATOR - fee,
            BPS_DENOMINATOR,
        )?)
    }

    /// Seed share of an asset while the pool is Initialized: the sum of the
    /// initial balances weighted by the asset's weight.
    fn seed_share(&self, asset: &PoolAsset) -> MmResult<Uint128> {
        let mut total = Uint128::zero();
        for asset in &self.pool.assets {
            total = total.checked_add(asset.balance.amount)?;
        }
        Ok(total.multiply_ratio(asset.weight, TOTAL_WEIGHT))
    }

    fn ensure_initial_amount(asset: &PoolAsset, token: &Coin) -> MmResult<()> {
        if token.amount != asset.balance.amount {
            return Err(MarketMakerError::InitialDepositMismatch {
                denom: token.denom.clone(),
                expected: asset.balance.amount,
                got: token.amount,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Deposits
    // ========================================================================

    /// Pool tokens issued for a one-sided deposit.
    pub fn deposit_single_asset(&self, token: &Coin) -> MmResult<Coin> {
        ensure_positive(token)?;
        let asset = self.asset(&token.denom)?;

        let issued = match self.pool.status {
            PoolStatus::Initialized => {
                Self::ensure_initial_amount(asset, token)?;
                self.seed_share(asset)?
            }
            PoolStatus::Active => {
                if asset.balance.amount.is_zero() {
                    return Err(MarketMakerError::InsufficientLiquidity {
                        denom: token.denom.clone(),
                    });
                }
                let growth = Decimal256::one()
                    .checked_add(Decimal256::checked_from_ratio(token.amount, asset.balance.amount)?)?;
                let weight = Decimal256::from_ratio(asset.weight, TOTAL_WEIGHT);
                let factor = pow(growth, weight)?.checked_sub(Decimal256::one())?;
                floor(dec(self.pool.supply.amount).checked_mul(factor)?)?
            }
        };
        Ok(self.pool_token(issued))
    }

    /// Pool tokens issued for each side of a two-sided deposit, in the order
    /// of `tokens`. The amounts must keep the pool ratio within
    /// `tolerance_bps`, or equal the initial liquidity of an Initialized pool.
    pub fn deposit_multi_asset(&self, tokens: &[Coin], tolerance_bps: u32) -> MmResult<Vec<Coin>> {
        let [first, second] = tokens else {
            return Err(MarketMakerError::InvalidDeposit {
                reason: format!("expected 2 tokens, got {}", tokens.len()),
            });
        };
        if first.denom == second.denom {
            return Err(MarketMakerError::InvalidDeposit {
                reason: format!("both tokens are {}", first.denom),
            });
        }
        ensure_positive(first)?;
        ensure_positive(second)?;
        let asset_first = self.asset(&first.denom)?;
        let asset_second = self.asset(&second.denom)?;

        if self.pool.status == PoolStatus::Initialized {
            Self::ensure_initial_amount(asset_first, first)?;
            Self::ensure_initial_amount(asset_second, second)?;
            return Ok(vec![
                self.pool_token(self.seed_share(asset_first)?),
                self.pool_token(self.seed_share(asset_second)?),
            ]);
        }

        if asset_first.balance.amount.is_zero() || asset_second.balance.amount.is_zero() {
            return Err(MarketMakerError::InsufficientLiquidity {
                denom: self.pool.id.clone(),
            });
        }

        // first / second against balance_first / balance_second, cross-multiplied
        let deposit_cross = first.amount.full_mul(asset_second.balance.amount);
        let pool_cross = second.amount.full_mul(asset_first.balance.amount);
        let deviation = if deposit_cross > pool_cross {
            deposit_cross - pool_cross
        } else {
            pool_cross - deposit_cross
        };
        let allowed = pool_cross.checked_mul(Uint256::from(tolerance_bps))?;
        if deviation.checked_mul(Uint256::from(BPS_DENOMINATOR))? > allowed {
            return Err(MarketMakerError::RatioMismatch { tolerance_bps });
        }

        let supply = dec(self.pool.supply.amount);
        [(first, asset_first), (second, asset_second)]
            .into_iter()
            .map(|(token, asset)| {
                let share = Decimal256::checked_from_ratio(token.amount, asset.balance.amount)?
                    .checked_mul(Decimal256::from_ratio(asset.weight, TOTAL_WEIGHT))?;
                Ok(self.pool_token(floor(supply.checked_mul(share)?)?))
            })
            .collect()
    }

    // ========================================================================
    // Withdrawals
    // ========================================================================

    fn ensure_redeemable(&self, redeem: &Coin) -> MmResult<()> {
        self.ensure_active()?;
        ensure_positive(redeem)?;
        if redeem.denom != self.pool.supply.denom {
            return Err(MarketMakerError::InvalidRedeemDenom {
                expected: self.pool.supply.denom.clone(),
                got: redeem.denom.clone(),
            });
        }
        if redeem.amount > self.pool.supply.amount {
            return Err(MarketMakerError::RedeemExceedsSupply {
                supply: self.pool.supply.amount,
                requested: redeem.amount,
            });
        }
        Ok(())
    }

    /// Single-sided redemption of `redeem` pool tokens for `denom_out`:
    /// `balance * (1 - (1 - redeem / supply) ^ (100 / weight))`.
    pub fn withdraw(&self, redeem: &Coin, denom_out: &str) -> MmResult<Coin> {
        self.ensure_redeemable(redeem)?;
        let asset = self.asset(denom_out)?;

        let remaining = Decimal256::one().checked_sub(Decimal256::checked_from_ratio(
            redeem.amount,
            self.pool.supply.amount,
        )?)?;
        let exponent = Decimal256::checked_from_ratio(TOTAL_WEIGHT, asset.weight)?;
        let share = Decimal256::one().checked_sub(pow(remaining, exponent)?)?;
        let out = floor(dec(asset.balance.amount).checked_mul(share)?)?;

        Ok(coin(out.u128(), denom_out))
    }

    /// Proportional redemption of `redeem` pool tokens for both assets.
    pub fn multi_asset_withdraw(&self, redeem: &Coin) -> MmResult<Vec<Coin>> {
        self.ensure_redeemable(redeem)?;
        Ok(self
            .pool
            .assets
            .iter()
            .map(|asset| {
                coin(
                    asset
                        .balance
                        .amount
                        .multiply_ratio(redeem.amount, self.pool.supply.amount)
                        .u128(),
                    &asset.balance.denom,
                )
            })
            .collect())
    }

    // ========================================================================
    // Swaps
    // ========================================================================

    fn swap_assets(&self, denom_in: &str, denom_out: &str) -> MmResult<(&'a PoolAsset, &'a PoolAsset)> {
        self.ensure_active()?;
        if denom_in == denom_out {
            return Err(MarketMakerError::SameDenom {
                denom: denom_in.to_string(),
            });
        }
        Ok((self.asset(denom_in)?, self.asset(denom_out)?))
    }

    /// Exact-in swap: how much of `denom_out` `amount_in` buys after the fee.
    pub fn left_swap(&self, amount_in: &Coin, denom_out: &str) -> MmResult<Coin> {
        ensure_positive(amount_in)?;
        let (asset_in, asset_out) = self.swap_assets(&amount_in.denom, denom_out)?;

        let net_in = dec(amount_in.amount).checked_mul(self.fee_factor()?)?;
        let balance_in = dec(asset_in.balance.amount);
        let ratio = balance_in.checked_div(balance_in.checked_add(net_in)?)?;
        let exponent = Decimal256::checked_from_ratio(asset_in.weight, asset_out.weight)?;
        let share = Decimal256::one().checked_sub(pow(ratio, exponent)?)?;
        let out = floor(dec(asset_out.balance.amount).checked_mul(share)?)?;

        if out.is_zero() {
            return Err(MarketMakerError::ZeroOutput);
        }
        if out >= asset_out.balance.amount {
            return Err(MarketMakerError::InsufficientLiquidity {
                denom: denom_out.to_string(),
            });
        }
        Ok(coin(out.u128(), denom_out))
    }

    /// Exact-out swap: how much of the cap's denom buys `amount_out`,
    /// fee included. Fails when that exceeds `amount_in_cap`.
    pub fn right_swap(&self, amount_in_cap: &Coin, amount_out: &Coin) -> MmResult<Coin> {
        ensure_positive(amount_in_cap)?;
        ensure_positive(amount_out)?;
        let (asset_in, asset_out) = self.swap_assets(&amount_in_cap.denom, &amount_out.denom)?;
        if amount_out.amount >= asset_out.balance.amount {
            return Err(MarketMakerError::InsufficientLiquidity {
                denom: amount_out.denom.clone(),
            });
        }

        let remaining_out = asset_out.balance.amount - amount_out.amount;
        let ratio = Decimal256::checked_from_ratio(asset_out.balance.amount, remaining_out)?;
        let exponent = Decimal256::checked_from_ratio(asset_out.weight, asset_in.weight)?;
        let growth = pow(ratio, exponent)?.checked_sub(Decimal256::one())?;
        let required = ceil(
            dec(asset_in.balance.amount)
                .checked_mul(growth)?
                .checked_div(self.fee_factor()?)?,
        )?;

        if required > amount_in_cap.amount {
            return Err(MarketMakerError::SlippageExceeded {
                limit: amount_in_cap.amount,
                required,
            });
        }
        Ok(coin(required.u128(), &amount_in_cap.denom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PoolSide;

    fn pool(status: PoolStatus, a: u128, b: u128, weights: (u32, u32), supply: u128, fee: u32) -> InterchainLiquidityPool {
        InterchainLiquidityPool {
            id: "pool1".to_string(),
            assets: vec![
                PoolAsset {
                    side: PoolSide::Source,
                    balance: coin(a, "atoma"),
                    weight: weights.0,
                    decimals: 6,
                },
                PoolAsset {
                    side: PoolSide::Destination,
                    balance: coin(b, "atomb"),
                    weight: weights.1,
                    decimals: 6,
                },
            ],
            supply: coin(supply, "pool1"),
            status,
            source_creator: "alice".to_string(),
            destination_creator: "bob".to_string(),
            port: "wasm.poola".to_string(),
            channel: "channel-0".to_string(),
            counterparty_port: "wasm.poolb".to_string(),
            counterparty_channel: "channel-1".to_string(),
            swap_fee_bps: fee,
            source_chain_id: "chain-a".to_string(),
        }
    }

    fn active(fee: u32) -> InterchainLiquidityPool {
        pool(PoolStatus::Active, 1_000_000, 1_000_000, (50, 50), 2_000_000, fee)
    }

    #[test]
    fn test_seed_deposit_requires_initial_amount() {
        let pool = pool(PoolStatus::Initialized, 1_000, 4_000, (20, 80), 0, 30);
        let mm = MarketMaker::new(&pool);

        assert_eq!(mm.deposit_single_asset(&coin(1_000, "atoma")).unwrap(), coin(1_000, "pool1"));
        assert_eq!(mm.deposit_single_asset(&coin(4_000, "atomb")).unwrap(), coin(4_000, "pool1"));
        assert_eq!(
            mm.deposit_single_asset(&coin(999, "atoma")).unwrap_err(),
            MarketMakerError::InitialDepositMismatch {
                denom: "atoma".to_string(),
                expected: Uint128::new(1_000),
                got: Uint128::new(999),
            }
        );
    }

    #[test]
    fn test_single_deposit_on_active_pool() {
        let pool = active(30);
        let mm = MarketMaker::new(&pool);

        // 2_000_000 * (2^0.5 - 1)
        let issued = mm.deposit_single_asset(&coin(1_000_000, "atoma")).unwrap();
        assert_eq!(issued, coin(828_427, "pool1"));

        assert!(matches!(
            mm.deposit_single_asset(&coin(10, "atomc")).unwrap_err(),
            MarketMakerError::AssetNotFound { .. }
        ));
        assert!(matches!(
            mm.deposit_single_asset(&coin(0, "atoma")).unwrap_err(),
            MarketMakerError::InvalidAmount { .. }
        ));
    }

    #[test]
    fn test_multi_asset_deposit_ratio() {
        let pool = active(30);
        let mm = MarketMaker::new(&pool);

        let issued = mm
            .deposit_multi_asset(&[coin(1_000, "atoma"), coin(1_000, "atomb")], 100)
            .unwrap();
        assert_eq!(issued, vec![coin(1_000, "pool1"), coin(1_000, "pool1")]);

        // 0.5% off with a 1% tolerance
        assert!(mm
            .deposit_multi_asset(&[coin(1_005, "atoma"), coin(1_000, "atomb")], 100)
            .is_ok());
        assert_eq!(
            mm.deposit_multi_asset(&[coin(1_050, "atoma"), coin(1_000, "atomb")], 100)
                .unwrap_err(),
            MarketMakerError::RatioMismatch { tolerance_bps: 100 }
        );
        assert!(matches!(
            mm.deposit_multi_asset(&[coin(1_000, "atoma"), coin(1_000, "atoma")], 100)
                .unwrap_err(),
            MarketMakerError::InvalidDeposit { .. }
        ));
    }

    #[test]
    fn test_multi_asset_deposit_on_initialized_pool() {
        let pool = pool(PoolStatus::Initialized, 1_000, 4_000, (50, 50), 0, 30);
        let mm = MarketMaker::new(&pool);

        let issued = mm
            .deposit_multi_asset(&[coin(4_000, "atomb"), coin(1_000, "atoma")], 0)
            .unwrap();
        assert_eq!(issued, vec![coin(2_500, "pool1"), coin(2_500, "pool1")]);
        assert!(matches!(
            mm.deposit_multi_asset(&[coin(1_000, "atoma"), coin(4_001, "atomb")], 10_000)
                .unwrap_err(),
            MarketMakerError::InitialDepositMismatch { .. }
        ));
    }

    #[test]
    fn test_withdraw() {
        let pool = active(30);
        let mm = MarketMaker::new(&pool);

        // Redeeming everything drains the asset.
        assert_eq!(
            mm.withdraw(&coin(2_000_000, "pool1"), "atoma").unwrap(),
            coin(1_000_000, "atoma")
        );
        // 1_000_000 * (1 - 0.75^2), give or take the last unit of rounding
        let out = mm.withdraw(&coin(500_000, "pool1"), "atomb").unwrap();
        assert_eq!(out.denom, "atomb");
        assert!(out.amount >= Uint128::new(437_499) && out.amount <= Uint128::new(437_500));
        assert!(matches!(
            mm.withdraw(&coin(2_000_001, "pool1"), "atoma").unwrap_err(),
            MarketMakerError::RedeemExceedsSupply { .. }
        ));
        assert!(matches!(
            mm.withdraw(&coin(10, "pool2"), "atoma").unwrap_err(),
            MarketMakerError::InvalidRedeemDenom { .. }
        ));

        let initialized = pool_with_status(PoolStatus::Initialized);
        assert_eq!(
            MarketMaker::new(&initialized)
                .withdraw(&coin(10, "pool1"), "atoma")
                .unwrap_err(),
            MarketMakerError::PoolNotActive
        );
    }

    fn pool_with_status(status: PoolStatus) -> InterchainLiquidityPool {
        pool(status, 1_000_000, 1_000_000, (50, 50), 2_000_000, 30)
    }

    #[test]
    fn test_multi_asset_withdraw_is_proportional() {
        let pool = pool(PoolStatus::Active, 1_000, 3_000, (50, 50), 4_000, 30);
        let outs = MarketMaker::new(&pool)
            .multi_asset_withdraw(&coin(1_000, "pool1"))
            .unwrap();
        assert_eq!(outs, vec![coin(250, "atoma"), coin(750, "atomb")]);
    }

    #[test]
    fn test_left_swap_then_right_swap_recovers_input() {
        let pool = active(30);
        let mm = MarketMaker::new(&pool);

        let out = mm.left_swap(&coin(1_000, "atoma"), "atomb").unwrap();
        assert_eq!(out, coin(996, "atomb"));

        let required = mm.right_swap(&coin(1_000, "atoma"), &out).unwrap();
        assert!(required.amount <= Uint128::new(1_000));
        assert!(required.amount >= Uint128::new(998));
    }

    #[test]
    fn test_uneven_weights_round_trip() {
        let pool = pool(PoolStatus::Active, 200_000, 800_000, (20, 80), 1_000_000, 25);
        let mm = MarketMaker::new(&pool);

        let out = mm.left_swap(&coin(5_000, "atomb"), "atoma").unwrap();
        let required = mm.right_swap(&coin(5_000, "atomb"), &out).unwrap();
        assert!(required.amount <= Uint128::new(5_000));
        assert!(required.amount >= Uint128::new(4_990));
    }

    #[test]
    fn test_fee_lowers_output() {
        let with_fee = active(30);
        let without_fee = active(0);

        let paid = MarketMaker::new(&with_fee)
            .left_swap(&coin(1_000, "atoma"), "atomb")
            .unwrap();
        let free = MarketMaker::new(&without_fee)
            .left_swap(&coin(1_000, "atoma"), "atomb")
            .unwrap();
        assert_eq!(free, coin(999, "atomb"));
        assert!(paid.amount < free.amount);
    }

    #[test]
    fn test_swap_errors() {
        let pool = active(30);
        let mm = MarketMaker::new(&pool);

        assert_eq!(
            mm.right_swap(&coin(10, "atoma"), &coin(1_000, "atomb")).unwrap_err(),
            MarketMakerError::SlippageExceeded {
                limit: Uint128::new(10),
                required: mm
                    .right_swap(&coin(1_000_000, "atoma"), &coin(1_000, "atomb"))
                    .unwrap()
                    .amount,
            }
        );
        assert!(matches!(
            mm.right_swap(&coin(10, "atoma"), &coin(1_000_000, "atomb")).unwrap_err(),
            MarketMakerError::InsufficientLiquidity { .. }
        ));
        assert!(matches!(
            mm.left_swap(&coin(10, "atoma"), "atoma").unwrap_err(),
            MarketMakerError::SameDenom { .. }
        ));
        assert!(matches!(
            mm.left_swap(&coin(1, "atoma"), "atomb").unwrap_err(),
            MarketMakerError::ZeroOutput
        ));

        let initialized = pool_with_status(PoolStatus::Initialized);
        assert_eq!(
            MarketMaker::new(&initialized)
                .left_swap(&coin(10, "atoma"), "atomb")
                .unwrap_err(),
            MarketMakerError::PoolNotActive
        );
    }
}
