//! Execute message handlers.
//!
//! - `swap` - MakeSwap, TakeSwap and CancelSwap
//! - `config` - admin configuration updates

mod config;
mod swap;

pub use config::execute_update_config;
pub use swap::{execute_cancel_swap, execute_make_swap, execute_take_swap};
pub(crate) use config::validate_config;
