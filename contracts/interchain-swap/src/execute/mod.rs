//! Execute message handlers.
//!
//! - `pool` - MakePool, TakePool and CancelPool
//! - `deposit` - single and two-sided deposits
//! - `withdraw` - MultiAssetWithdraw
//! - `swap` - left and right swaps
//! - `config` - admin configuration updates
//!
//! Every handler validates before its first write, locks the attached funds
//! in the escrow of the pool's local channel end and queues the packet in the
//! same response. Pool balances change when the packet is acknowledged.

mod config;
mod deposit;
mod pool;
mod swap;
mod withdraw;

pub use config::execute_update_config;
pub use deposit::{
    execute_cancel_multi_asset_deposit, execute_make_multi_asset_deposit,
    execute_single_asset_deposit, execute_take_multi_asset_deposit,
};
pub use pool::{execute_cancel_pool, execute_make_pool, execute_take_pool};
pub use swap::execute_swap;
pub use withdraw::execute_multi_asset_withdraw;
pub(crate) use config::validate_config;
pub(crate) use pool::{validate_liquidity, validate_swap_fee};

use common::channel::load_open_channel;
use common::ChannelInfo;
use cosmwasm_std::{to_json_binary, Env, IbcMsg, IbcTimeout, MessageInfo, Storage};

use crate::error::ContractError;
use crate::packet::IbcSwapPacketData;
use crate::state::InterchainLiquidityPool;

fn send_packet(
    env: &Env,
    channel_id: String,
    packet: &IbcSwapPacketData,
    packet_lifetime: u64,
) -> Result<IbcMsg, ContractError> {
    Ok(IbcMsg::SendPacket {
        channel_id,
        data: to_json_binary(packet)?,
        timeout: IbcTimeout::with_timestamp(env.block.time.plus_seconds(packet_lifetime)),
    })
}

fn ensure_sender(info: &MessageInfo, expected: &str) -> Result<(), ContractError> {
    if info.sender != expected {
        return Err(ContractError::InvalidSender {
            sender: info.sender.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

/// The pool's local channel end, which must still accept new packets.
fn pool_channel(
    storage: &dyn Storage,
    pool: &InterchainLiquidityPool,
) -> Result<ChannelInfo, ContractError> {
    Ok(load_open_channel(storage, &pool.port, &pool.channel)?)
}
