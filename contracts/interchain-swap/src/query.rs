//! Query handlers for the interchain swap contract.

use common::channel::CHANNELS;
use common::escrow::{escrow_address, escrow_balance};
use common::ChannelInfo;
use cosmwasm_std::{coin, Coin, Deps, Order, StdError, StdResult};
use cw20::BalanceResponse;
use cw_storage_plus::Bound;

use crate::lp;
use crate::market_maker::{MarketMaker, MarketMakerError};
use crate::msg::{
    ConfigResponse, DepositOrdersResponse, EscrowAddressResponse, EscrowBalanceResponse,
    EstimateDepositResponse, EstimateSwapResponse, EstimateWithdrawResponse, PoolsResponse,
    SwapType,
};
use crate::state::{
    InterchainLiquidityPool, MultiAssetDepositOrder, CONFIG, DEPOSIT_ORDERS, POOLS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;
/// Deposit orders a single listing call walks at most
const MAX_SCAN: usize = 300;

fn quote_error(err: MarketMakerError) -> StdError {
    StdError::generic_err(err.to_string())
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        packet_lifetime: config.packet_lifetime,
        max_swap_fee_bps: config.max_swap_fee_bps,
        multi_deposit_tolerance_bps: config.multi_deposit_tolerance_bps,
    })
}

pub fn query_pool(deps: Deps, pool_id: String) -> StdResult<InterchainLiquidityPool> {
    POOLS
        .may_load(deps.storage, &pool_id)?
        .ok_or_else(|| StdError::not_found(format!("pool {}", pool_id)))
}

pub fn query_pools(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<PoolsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let pools = POOLS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, pool)| pool))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(PoolsResponse { pools })
}

pub fn query_deposit_order(deps: Deps, order_id: String) -> StdResult<MultiAssetDepositOrder> {
    DEPOSIT_ORDERS
        .may_load(deps.storage, &order_id)?
        .ok_or_else(|| StdError::not_found(format!("deposit order {}", order_id)))
}

pub fn query_deposit_orders(
    deps: Deps,
    pool_id: Option<String>,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<DepositOrdersResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let mut orders = vec![];
    let mut last_scanned = None;
    for item in DEPOSIT_ORDERS
        .range(deps.storage, start, None, Order::Ascending)
        .take(MAX_SCAN)
    {
        let (id, order) = item?;
        if pool_id.as_ref().map_or(true, |pool_id| &order.pool_id == pool_id) {
            orders.push(order);
        }
        last_scanned = Some(id);
        if orders.len() >= limit {
            break;
        }
    }

    let next_start_after = last_scanned.filter(|id| {
        DEPOSIT_ORDERS
            .keys(deps.storage, Some(Bound::exclusive(id.as_str())), None, Order::Ascending)
            .next()
            .is_some()
    });
    Ok(DepositOrdersResponse {
        orders,
        next_start_after,
    })
}

pub fn query_lp_balance(deps: Deps, pool_id: String, address: String) -> StdResult<BalanceResponse> {
    Ok(BalanceResponse {
        balance: lp::balance(deps.storage, &pool_id, &address)?,
    })
}

pub fn query_escrow_address(port_id: String, channel_id: String) -> EscrowAddressResponse {
    EscrowAddressResponse {
        address: escrow_address(&port_id, &channel_id),
    }
}

pub fn query_escrow_balance(
    deps: Deps,
    port_id: String,
    channel_id: String,
    denom: String,
) -> StdResult<EscrowBalanceResponse> {
    let address = escrow_address(&port_id, &channel_id);
    let amount = escrow_balance(deps.storage, &address, &denom)?;
    Ok(EscrowBalanceResponse {
        address,
        balance: coin(amount.u128(), denom),
    })
}

pub fn query_estimate_swap(
    deps: Deps,
    pool_id: String,
    swap_type: SwapType,
    token_in: Coin,
    token_out: Coin,
) -> StdResult<EstimateSwapResponse> {
    let pool = query_pool(deps, pool_id)?;
    let market_maker = MarketMaker::new(&pool);
    match swap_type {
        SwapType::Left => {
            let token_out = market_maker
                .left_swap(&token_in, &token_out.denom)
                .map_err(quote_error)?;
            Ok(EstimateSwapResponse { token_in, token_out })
        }
        SwapType::Right => {
            let token_in = market_maker
                .right_swap(&token_in, &token_out)
                .map_err(quote_error)?;
            Ok(EstimateSwapResponse { token_in, token_out })
        }
    }
}

pub fn query_estimate_single_deposit(
    deps: Deps,
    pool_id: String,
    token: Coin,
) -> StdResult<EstimateDepositResponse> {
    let pool = query_pool(deps, pool_id)?;
    let pool_token = MarketMaker::new(&pool)
        .deposit_single_asset(&token)
        .map_err(quote_error)?;
    Ok(EstimateDepositResponse { pool_token })
}

pub fn query_estimate_withdraw(
    deps: Deps,
    pool_id: String,
    pool_token: Coin,
    denom_out: String,
) -> StdResult<EstimateWithdrawResponse> {
    let pool = query_pool(deps, pool_id)?;
    let token = MarketMaker::new(&pool)
        .withdraw(&pool_token, &denom_out)
        .map_err(quote_error)?;
    Ok(EstimateWithdrawResponse { token })
}

pub fn query_channel(deps: Deps, channel_id: String) -> StdResult<ChannelInfo> {
    CHANNELS
        .may_load(deps.storage, &channel_id)?
        .ok_or_else(|| StdError::not_found(format!("channel {}", channel_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DepositStatus;
    use cosmwasm_std::testing::mock_dependencies;

    fn order(id: &str, pool_id: &str) -> MultiAssetDepositOrder {
        MultiAssetDepositOrder {
            id: id.to_string(),
            pool_id: pool_id.to_string(),
            chain_id: "chain-a".to_string(),
            source_maker: "alice".to_string(),
            destination_taker: "bob".to_string(),
            deposits: vec![coin(100, "atoma"), coin(100, "atomb")],
            local_deposit: coin(100, "atoma"),
            port: "wasm.poola".to_string(),
            channel: "channel-0".to_string(),
            status: DepositStatus::Pending,
            created_at: 0,
        }
    }

    #[test]
    fn test_sparse_pool_listing_resumes_after_scan_cap() {
        let mut deps = mock_dependencies();
        for i in 0..MAX_SCAN {
            let id = format!("busy{:03}", i);
            DEPOSIT_ORDERS
                .save(deps.as_mut().storage, &id, &order(&id, "busy"))
                .unwrap();
        }
        DEPOSIT_ORDERS
            .save(deps.as_mut().storage, "rare", &order("rare", "rare"))
            .unwrap();

        let first =
            query_deposit_orders(deps.as_ref(), Some("rare".to_string()), None, None).unwrap();
        assert!(first.orders.is_empty());
        assert_eq!(first.next_start_after, Some(format!("busy{:03}", MAX_SCAN - 1)));

        let second = query_deposit_orders(
            deps.as_ref(),
            Some("rare".to_string()),
            first.next_start_after,
            None,
        )
        .unwrap();
        assert_eq!(second.orders.len(), 1);
        assert_eq!(second.orders[0].id, "rare");
        assert_eq!(second.next_start_after, None);
    }
}
