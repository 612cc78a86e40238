//! Interchain Swap Contract - Entry Points
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
    execute_cancel_multi_asset_deposit, execute_cancel_pool, execute_make_multi_asset_deposit,
    execute_make_pool, execute_multi_asset_withdraw, execute_single_asset_deposit, execute_swap,
    execute_take_multi_asset_deposit, execute_take_pool, execute_update_config, validate_config,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_channel, query_config, query_deposit_order, query_deposit_orders, query_escrow_address,
    query_escrow_balance, query_estimate_single_deposit, query_estimate_swap,
    query_estimate_withdraw, query_lp_balance, query_pool, query_pools,
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

    let config = Config {
        admin: deps.api.addr_validate(&msg.admin)?,
        packet_lifetime: msg.packet_lifetime,
        max_swap_fee_bps: msg.max_swap_fee_bps,
        multi_deposit_tolerance_bps: msg.multi_deposit_tolerance_bps,
    };
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("packet_lifetime", config.packet_lifetime.to_string())
        .add_attribute("max_swap_fee_bps", config.max_swap_fee_bps.to_string())
        .add_attribute(
            "multi_deposit_tolerance_bps",
            config.multi_deposit_tolerance_bps.to_string(),
        ))
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
        ExecuteMsg::MakePool(msg) => execute_make_pool(deps, env, info, msg),
        ExecuteMsg::TakePool(msg) => execute_take_pool(deps, env, info, msg),
        ExecuteMsg::CancelPool(msg) => execute_cancel_pool(deps, env, info, msg),
        ExecuteMsg::SingleAssetDeposit(msg) => execute_single_asset_deposit(deps, env, info, msg),
        ExecuteMsg::MakeMultiAssetDeposit(msg) => {
            execute_make_multi_asset_deposit(deps, env, info, msg)
        }
        ExecuteMsg::TakeMultiAssetDeposit(msg) => {
            execute_take_multi_asset_deposit(deps, env, info, msg)
        }
        ExecuteMsg::CancelMultiAssetDeposit(msg) => {
            execute_cancel_multi_asset_deposit(deps, env, info, msg)
        }
        ExecuteMsg::MultiAssetWithdraw(msg) => execute_multi_asset_withdraw(deps, env, info, msg),
        ExecuteMsg::Swap(msg) => execute_swap(deps, env, info, msg),
        ExecuteMsg::UpdateConfig {
            admin,
            packet_lifetime,
            max_swap_fee_bps,
            multi_deposit_tolerance_bps,
        } => execute_update_config(
            deps,
            info,
            admin,
            packet_lifetime,
            max_swap_fee_bps,
            multi_deposit_tolerance_bps,
        ),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Pool { pool_id } => to_json_binary(&query_pool(deps, pool_id)?),
        QueryMsg::Pools { start_after, limit } => {
            to_json_binary(&query_pools(deps, start_after, limit)?)
        }
        QueryMsg::DepositOrder { order_id } => {
            to_json_binary(&query_deposit_order(deps, order_id)?)
        }
        QueryMsg::DepositOrders {
            pool_id,
            start_after,
            limit,
        } => to_json_binary(&query_deposit_orders(deps, pool_id, start_after, limit)?),
        QueryMsg::LpBalance { pool_id, address } => {
            to_json_binary(&query_lp_balance(deps, pool_id, address)?)
        }
        QueryMsg::EscrowAddress {
            port_id,
            channel_id,
        } => to_json_binary(&query_escrow_address(port_id, channel_id)),
        QueryMsg::EscrowBalance {
            port_id,
            channel_id,
            denom,
        } => to_json_binary(&query_escrow_balance(deps, port_id, channel_id, denom)?),
        QueryMsg::EstimateSwap {
            pool_id,
            swap_type,
            token_in,
            token_out,
        } => to_json_binary(&query_estimate_swap(
            deps, pool_id, swap_type, token_in, token_out,
        )?),
        QueryMsg::EstimateSingleDeposit { pool_id, token } => {
            to_json_binary(&query_estimate_single_deposit(deps, pool_id, token)?)
        }
        QueryMsg::EstimateWithdraw {
            pool_id,
            pool_token,
            denom_out,
        } => to_json_binary(&query_estimate_withdraw(deps, pool_id, pool_token, denom_out)?),
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
