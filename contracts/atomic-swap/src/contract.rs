//! Atomic Swap Contract - Entry Points
//!
//! IBC entry points live in `ibc`. The implementation is split into:
//! - `execute/` - execute message handlers
//! - `query` - query message handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    execute_cancel_swap, execute_make_swap, execute_take_swap, execute_update_config,
    validate_config,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_channel, query_config, query_escrow_address, query_escrow_balance, query_order,
    query_orders, query_orders_by_maker,
};
use crate::state::{Config, CONFIG, CONTRACT_NAME, CONTRACT_VERSION};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    validate_config(msg.packet_lifetime, msg.max_orders)?;

    let config = Config {
        admin,
        packet_lifetime: msg.packet_lifetime,
        max_orders: msg.max_orders,
    };
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("packet_lifetime", config.packet_lifetime.to_string())
        .add_attribute("max_orders", config.max_orders.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::MakeSwap(msg) => execute_make_swap(deps, env, info, msg),
        ExecuteMsg::TakeSwap(msg) => execute_take_swap(deps, env, info, msg),
        ExecuteMsg::CancelSwap(msg) => execute_cancel_swap(deps, env, info, msg),
        ExecuteMsg::UpdateConfig {
            admin,
            packet_lifetime,
            max_orders,
        } => execute_update_config(deps, info, admin, packet_lifetime, max_orders),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Order { order_id } => to_json_binary(&query_order(deps, order_id)?),
        QueryMsg::Orders { start_after, limit } => {
            to_json_binary(&query_orders(deps, start_after, limit)?)
        }
        QueryMsg::OrdersByMaker {
            maker,
            start_after,
            limit,
        } => to_json_binary(&query_orders_by_maker(deps, maker, start_after, limit)?),
        QueryMsg::EscrowAddress {
            port_id,
            channel_id,
        } => to_json_binary(&query_escrow_address(port_id, channel_id)),
        QueryMsg::EscrowBalance {
            port_id,
            channel_id,
            denom,
        } => to_json_binary(&query_escrow_balance(deps, port_id, channel_id, denom)?),
        QueryMsg::Channel { channel_id } => to_json_binary(&query_channel(deps, channel_id)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new()
        .add_attribute("method", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
