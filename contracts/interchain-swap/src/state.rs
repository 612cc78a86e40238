//! State definitions for the interchain swap contract.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;

pub const CONTRACT_NAME: &str = "crates.io:interchain-swap";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Channel version negotiated during the handshake
pub const SWAP_VERSION: &str = "ics101-1";

/// Basis point denominator
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Pool weights are percentages
pub const TOTAL_WEIGHT: u32 = 100;

// ============================================================================
// Configuration
// ============================================================================

#[cw_serde]
pub struct Config {
    /// Admin address for configuration updates
    pub admin: Addr,
    /// Seconds until an outgoing packet times out
    pub packet_lifetime: u64,
    /// Highest swap fee a new pool may charge, in basis points
    pub max_swap_fee_bps: u32,
    /// Allowed deviation of a two-sided deposit from the pool ratio, in basis points
    pub multi_deposit_tolerance_bps: u32,
}

pub const CONFIG: Item<Config> = Item::new("config");

// ============================================================================
// Pools
// ============================================================================

#[cw_serde]
pub enum PoolSide {
    /// Asset native to the chain that made the pool
    Source,
    /// Asset native to the chain that took the pool
    Destination,
}

#[cw_serde]
pub enum PoolStatus {
    /// Made on the source chain, waiting for the destination liquidity
    Initialized,
    Active,
}

#[cw_serde]
pub struct PoolAsset {
    pub side: PoolSide,
    /// Current balance; the initial liquidity while the pool is Initialized
    pub balance: Coin,
    /// Percentage weight in (0, 100]
    pub weight: u32,
    pub decimals: u32,
}

#[cw_serde]
pub struct InterchainLiquidityPool {
    pub id: String,
    pub assets: Vec<PoolAsset>,
    /// Outstanding pool tokens; the denom is the pool id
    pub supply: Coin,
    pub status: PoolStatus,
    pub source_creator: String,
    pub destination_creator: String,
    /// This chain's end of the pool channel
    pub port: String,
    pub channel: String,
    /// The counterparty's end of the pool channel
    pub counterparty_port: String,
    pub counterparty_channel: String,
    pub swap_fee_bps: u32,
    pub source_chain_id: String,
}

impl InterchainLiquidityPool {
    pub fn asset(&self, denom: &str) -> Option<&PoolAsset> {
        self.assets.iter().find(|asset| asset.balance.denom == denom)
    }

    pub fn asset_by_side(&self, side: &PoolSide) -> Option<&PoolAsset> {
        self.assets.iter().find(|asset| &asset.side == side)
    }

    /// The side whose tokens are escrowed on the chain with `chain_id`.
    pub fn local_side(&self, chain_id: &str) -> PoolSide {
        if self.source_chain_id == chain_id {
            PoolSide::Source
        } else {
            PoolSide::Destination
        }
    }

    /// The asset whose tokens are escrowed on the chain with `chain_id`.
    pub fn local_asset(&self, chain_id: &str) -> Result<&PoolAsset, ContractError> {
        let side = self.local_side(chain_id);
        self.asset_by_side(&side)
            .ok_or_else(|| ContractError::InvalidPool {
                reason: format!("pool {} has no {:?} asset", self.id, side),
            })
    }

    pub fn ensure_active(&self) -> Result<(), ContractError> {
        if self.status != PoolStatus::Active {
            return Err(ContractError::InvalidPoolState {
                pool_id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn add_asset(&mut self, token: &Coin) -> Result<(), ContractError> {
        let asset = self.asset_mut(&token.denom)?;
        asset.balance.amount = asset.balance.amount.checked_add(token.amount)?;
        Ok(())
    }

    pub fn subtract_asset(&mut self, token: &Coin) -> Result<(), ContractError> {
        let asset = self.asset_mut(&token.denom)?;
        asset.balance.amount = asset.balance.amount.checked_sub(token.amount)?;
        Ok(())
    }

    pub fn add_supply(&mut self, amount: Uint128) -> Result<(), ContractError> {
        self.supply.amount = self.supply.amount.checked_add(amount)?;
        Ok(())
    }

    pub fn subtract_supply(&mut self, amount: Uint128) -> Result<(), ContractError> {
        self.supply.amount = self.supply.amount.checked_sub(amount)?;
        Ok(())
    }

    fn asset_mut(&mut self, denom: &str) -> Result<&mut PoolAsset, ContractError> {
        let pool_id = self.id.clone();
        self.assets
            .iter_mut()
            .find(|asset| asset.balance.denom == denom)
            .ok_or_else(|| ContractError::AssetNotInPool {
                pool_id,
                denom: denom.to_string(),
            })
    }
}

pub const POOLS: Map<&str, InterchainLiquidityPool> = Map::new("pools");

/// Creator liquidity locked for a pool that is not active yet.
#[cw_serde]
pub struct InitialLiquidity {
    pub owner: Addr,
    pub coin: Coin,
}

/// pool id -> liquidity locked by MakePool (source chain) or TakePool
/// (destination chain) until the pool becomes active
pub const INITIAL_LIQUIDITY: Map<&str, InitialLiquidity> = Map::new("initial_liquidity");

// ============================================================================
// Multi-Asset Deposits
// ============================================================================

#[cw_serde]
pub enum DepositStatus {
    Pending,
    Complete,
}

#[cw_serde]
pub struct MultiAssetDepositOrder {
    pub id: String,
    pub pool_id: String,
    /// Chain the order was made on
    pub chain_id: String,
    pub source_maker: String,
    pub destination_taker: String,
    pub deposits: Vec<Coin>,
    /// The deposit of the asset escrowed on this chain, refunded from the
    /// escrow of `port`/`channel` even after the pool is gone
    pub local_deposit: Coin,
    /// This chain's end of the pool channel
    pub port: String,
    pub channel: String,
    pub status: DepositStatus,
    pub created_at: u64,
}

impl MultiAssetDepositOrder {
    /// The deposit paid on the chain with this local asset denom.
    pub fn deposit_of(&self, denom: &str) -> Option<&Coin> {
        self.deposits.iter().find(|coin| coin.denom == denom)
    }
}

/// Pending orders and, on the taker chain, Complete orders whose take is
/// still in flight. An order is removed once both chains applied it.
pub const DEPOSIT_ORDERS: Map<&str, MultiAssetDepositOrder> = Map::new("deposit_orders");

// ============================================================================
// LP Ledger
// ============================================================================

/// (pool id, holder) -> pool token balance. Pool tokens locked by an in-flight
/// withdrawal are held under the pool channel's escrow address.
pub const LP_BALANCES: Map<(&str, &str), Uint128> = Map::new("lp_balances");

pub fn load_pool(
    storage: &dyn Storage,
    pool_id: &str,
) -> Result<InterchainLiquidityPool, ContractError> {
    POOLS
        .may_load(storage, pool_id)?
        .ok_or_else(|| ContractError::PoolNotFound {
            pool_id: pool_id.to_string(),
        })
}

pub fn load_deposit_order(
    storage: &dyn Storage,
    order_id: &str,
) -> Result<MultiAssetDepositOrder, ContractError> {
    DEPOSIT_ORDERS
        .may_load(storage, order_id)?
        .ok_or_else(|| ContractError::DepositOrderNotFound {
            order_id: order_id.to_string(),
        })
}
