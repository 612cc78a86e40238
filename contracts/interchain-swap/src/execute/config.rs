//! Admin configuration handler.

use cosmwasm_std::{DepsMut, MessageInfo, Response};

use crate::error::ContractError;
use crate::state::{Config, BPS_DENOMINATOR, CONFIG};

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    admin: Option<String>,
    packet_lifetime: Option<u64>,
    max_swap_fee_bps: Option<u32>,
    multi_deposit_tolerance_bps: Option<u32>,
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
    if let Some(max_swap_fee_bps) = max_swap_fee_bps {
        config.max_swap_fee_bps = max_swap_fee_bps;
    }
    if let Some(tolerance) = multi_deposit_tolerance_bps {
        config.multi_deposit_tolerance_bps = tolerance;
    }
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute("admin", config.admin)
        .add_attribute("packet_lifetime", config.packet_lifetime.to_string())
        .add_attribute("max_swap_fee_bps", config.max_swap_fee_bps.to_string())
        .add_attribute(
            "multi_deposit_tolerance_bps",
            config.multi_deposit_tolerance_bps.to_string(),
        ))
}

pub(crate) fn validate_config(config: &Config) -> Result<(), ContractError> {
    if config.packet_lifetime == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "packet_lifetime must be positive".to_string(),
        });
    }
    // A 100% fee leaves nothing to swap.
    if config.max_swap_fee_bps >= BPS_DENOMINATOR {
        return Err(ContractError::InvalidConfig {
            reason: format!("max_swap_fee_bps must be below {}", BPS_DENOMINATOR),
        });
    }
    if config.multi_deposit_tolerance_bps > BPS_DENOMINATOR {
        return Err(ContractError::InvalidConfig {
            reason: format!("multi_deposit_tolerance_bps must not exceed {}", BPS_DENOMINATOR),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::instantiate;
    use crate::msg::InstantiateMsg;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};

    #[test]
    fn test_update_config() {
        let mut deps = mock_dependencies();
        instantiate(
            deps.as_mut(),
            mock_env(),
            mock_info("admin", &[]),
            InstantiateMsg {
                admin: "admin".to_string(),
                packet_lifetime: 600,
                max_swap_fee_bps: 100,
                multi_deposit_tolerance_bps: 100,
            },
        )
        .unwrap();

        let err = execute_update_config(deps.as_mut(), mock_info("mallory", &[]), None, Some(60), None, None)
            .unwrap_err();
        assert_eq!(err, ContractError::Unauthorized);

        let err = execute_update_config(deps.as_mut(), mock_info("admin", &[]), None, Some(0), None, None)
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidConfig { .. }));

        execute_update_config(
            deps.as_mut(),
            mock_info("admin", &[]),
            Some("operator".to_string()),
            None,
            Some(300),
            None,
        )
        .unwrap();
        let config = CONFIG.load(deps.as_ref().storage).unwrap();
        assert_eq!(config.admin, "operator");
        assert_eq!(config.packet_lifetime, 600);
        assert_eq!(config.max_swap_fee_bps, 300);

        // The previous admin lost its rights.
        let err = execute_update_config(deps.as_mut(), mock_info("admin", &[]), None, None, None, Some(50))
            .unwrap_err();
        assert_eq!(err, ContractError::Unauthorized);
    }
}
