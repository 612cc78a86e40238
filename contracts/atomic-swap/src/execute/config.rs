//! Admin configuration handler.

use cosmwasm_std::{DepsMut, MessageInfo, Response};

use crate::error::ContractError;
use crate::state::CONFIG;

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    admin: Option<String>,
    packet_lifetime: Option<u64>,
    max_orders: Option<u64>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    if let Some(admin) = admin {
        config.admin = deps.api.addr_validate(&admin)?;
    }
    if let Some(packet_lifetime) = packet_lifetime {
        config.packet_lifetime = packet_lifetime;
    }
    if let Some(max_orders) = max_orders {
        config.max_orders = max_orders;
    }
    validate_config(config.packet_lifetime, config.max_orders)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute("admin", config.admin)
        .add_attribute("packet_lifetime", config.packet_lifetime.to_string())
        .add_attribute("max_orders", config.max_orders.to_string()))
}

pub(crate) fn validate_config(packet_lifetime: u64, max_orders: u64) -> Result<(), ContractError> {
    if packet_lifetime == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "packet_lifetime must be positive".to_string(),
        });
    }
    if max_orders == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max_orders must be positive".to_string(),
        });
    }
    Ok(())
}
