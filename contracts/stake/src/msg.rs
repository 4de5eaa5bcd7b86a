use soroban_sdk::{contracttype, Vec};

use crate::storage::{Config, StakePosition};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigResponse {
    pub config: Config,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedResponse {
    pub stakes: Vec<StakePosition>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakeResponse {
    /// Stake token returned, always the full principal of the position
    pub principal: i128,
    /// Reward token paid out together with the principal
    pub reward: i128,
}
