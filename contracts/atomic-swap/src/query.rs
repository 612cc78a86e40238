//! Query handlers for the atomic swap contract.

use common::channel::CHANNELS;
use common::escrow::{escrow_address, escrow_balance};
use common::ChannelInfo;
use cosmwasm_std::{coin, Deps, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{
    ConfigResponse, EscrowAddressResponse, EscrowBalanceResponse, OrderEntry, OrdersResponse,
};
use crate::state::{AtomicSwapOrder, CONFIG, ORDERS, ORDER_QUEUE};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;
/// Queue entries a single listing call walks at most
const MAX_SCAN: usize = 300;

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        packet_lifetime: config.packet_lifetime,
        max_orders: config.max_orders,
    })
}

pub fn query_order(deps: Deps, order_id: String) -> StdResult<AtomicSwapOrder> {
    ORDERS
        .may_load(deps.storage, &order_id)?
        .ok_or_else(|| StdError::not_found(format!("order {}", order_id)))
}

/// Orders in insertion order, oldest first.
pub fn query_orders(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<OrdersResponse> {
    collect_orders(deps, start_after, limit, |_| true)
}

pub fn query_orders_by_maker(
    deps: Deps,
    maker: String,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<OrdersResponse> {
    collect_orders(deps, start_after, limit, |order| {
        order.maker.maker_address == maker
    })
}

fn collect_orders(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
    filter: impl Fn(&AtomicSwapOrder) -> bool,
) -> StdResult<OrdersResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let mut orders = vec![];
    let mut last_scanned = None;
    for item in ORDER_QUEUE
        .range(deps.storage, start, None, Order::Ascending)
        .take(MAX_SCAN)
    {
        let (position, order_id) = item?;
        last_scanned = Some(position);
        if let Some(order) = ORDERS.may_load(deps.storage, &order_id)? {
            if filter(&order) {
                orders.push(OrderEntry { position, order });
            }
        }
        if orders.len() >= limit {
            break;
        }
    }

    let next_start_after = last_scanned.filter(|position| {
        ORDER_QUEUE
            .keys(deps.storage, Some(Bound::exclusive(*position)), None, Order::Ascending)
            .next()
            .is_some()
    });
    Ok(OrdersResponse {
        orders,
        next_start_after,
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

pub fn query_channel(deps: Deps, channel_id: String) -> StdResult<ChannelInfo> {
    CHANNELS
        .may_load(deps.storage, &channel_id)?
        .ok_or_else(|| StdError::not_found(format!("channel {}", channel_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::MakeSwapMsg;
    use crate::state::{insert_order, Side, Status};
    use common::OrderPath;
    use cosmwasm_std::testing::mock_dependencies;

    fn order(id: &str, maker: &str) -> AtomicSwapOrder {
        AtomicSwapOrder {
            id: id.to_string(),
            side: Side::Native,
            status: Status::Initial,
            path: OrderPath {
                source_port: "wasm.swapa".to_string(),
                source_channel: "channel-0".to_string(),
                destination_port: "wasm.swapb".to_string(),
                destination_channel: "channel-1".to_string(),
                sequence: 1,
            },
            maker: MakeSwapMsg {
                source_port: "wasm.swapa".to_string(),
                source_channel: "channel-0".to_string(),
                sell_token: coin(100, "atoma"),
                buy_token: coin(50, "atomb"),
                maker_address: maker.to_string(),
                maker_receiving_address: maker.to_string(),
                desired_taker: None,
                expiration_timestamp: None,
            },
            taker: None,
            create_timestamp: 0,
            cancel_timestamp: None,
            complete_timestamp: None,
        }
    }

    #[test]
    fn test_sparse_maker_listing_resumes_after_scan_cap() {
        let mut deps = mock_dependencies();
        for i in 0..MAX_SCAN {
            insert_order(deps.as_mut().storage, &order(&format!("busy{}", i), "busy"), 1_000)
                .unwrap();
        }
        insert_order(deps.as_mut().storage, &order("rare", "rare"), 1_000).unwrap();

        let first = query_orders_by_maker(deps.as_ref(), "rare".to_string(), None, None).unwrap();
        assert!(first.orders.is_empty());
        assert_eq!(first.next_start_after, Some(MAX_SCAN as u64 - 1));

        let second =
            query_orders_by_maker(deps.as_ref(), "rare".to_string(), first.next_start_after, None)
                .unwrap();
        assert_eq!(second.orders.len(), 1);
        assert_eq!(second.orders[0].order.id, "rare");
        assert_eq!(second.orders[0].position, MAX_SCAN as u64);
        assert_eq!(second.next_start_after, None);
    }

    #[test]
    fn test_full_page_reports_next_position() {
        let mut deps = mock_dependencies();
        for id in ["a", "b", "c"] {
            insert_order(deps.as_mut().storage, &order(id, "maker"), 10).unwrap();
        }

        let page = query_orders(deps.as_ref(), None, Some(2)).unwrap();
        assert_eq!(page.orders.len(), 2);
        assert_eq!(page.next_start_after, Some(1));

        let rest = query_orders(deps.as_ref(), page.next_start_after, Some(2)).unwrap();
        assert_eq!(rest.orders[0].order.id, "c");
        assert_eq!(rest.next_start_after, None);
    }
}
