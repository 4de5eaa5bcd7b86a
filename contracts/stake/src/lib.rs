#![no_std]
mod contract;
mod error;
mod msg;
mod rewards;
mod storage;

pub use contract::{Staking, StakingClient};
pub use error::ContractError;
pub use msg::{ConfigResponse, StakedResponse, UnstakeResponse};
pub use storage::{Config, StakePosition};
