use soroban_sdk::{
    contracttype, log, panic_with_error, symbol_short, Address, ConversionError, Env, Symbol,
    TryFromVal, Val, Vec,
};
use stake_common::ttl::{
    INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL, PERSISTENT_RENEWAL_THRESHOLD,
    PERSISTENT_TARGET_TTL,
};

use crate::error::ContractError;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Token locked by stakers and handed back on unstake
    pub stake_token: Address,
    /// Token paid out as rewards from the reserve held by this contract
    pub reward_token: Address,
    /// Annual rate in basis points
    pub fixed_apy: u64,
    /// Yield factor applied to locks shorter than `max_locking_period`, 1_000_000 = 1.0
    pub lock_multiplier: u64,
    /// Seconds that must pass between two claims on a position, and before the first one
    pub claim_delay: u64,
    /// Longest lock a new position may choose, in seconds
    pub max_locking_period: u64,
    pub staking_paused: bool,
    pub unstaking_paused: bool,
}
const CONFIG: Symbol = symbol_short!("CONFIG");

pub fn get_config(env: &Env) -> Config {
    let config = env.storage().instance().get(&CONFIG).unwrap_or_else(|| {
        log!(env, "Stake: Config not set");
        panic_with_error!(env, ContractError::ConfigNotSet)
    });
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

    config
}

pub fn save_config(env: &Env, config: &Config) {
    env.storage().instance().set(&CONFIG, config);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePosition {
    /// Slot in the owner's list of positions. Not stable: unstaking an earlier
    /// position moves the last one into the freed slot.
    pub index: u32,
    /// Amount of stake token locked, returned in full on unstake
    pub principal: i128,
    /// Lock chosen at stake time, in seconds
    pub lock_duration: u64,
    /// Lock was shorter than `max_locking_period` at stake time, so its yield is
    /// scaled by the lock multiplier
    pub short_lock: bool,
    pub start_time: u64,
    /// Equals `start_time` until the first claim
    pub last_claim_time: u64,
    /// Reward tokens already paid out for this position
    pub rewards_collected_total: i128,
}

pub fn get_stakes(env: &Env, key: &Address) -> Vec<StakePosition> {
    let stakes = env
        .storage()
        .persistent()
        .get::<_, Vec<StakePosition>>(key)
        .unwrap_or_else(|| Vec::new(env));
    if !stakes.is_empty() {
        env.storage().persistent().extend_ttl(
            key,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );
    }

    stakes
}

pub fn save_stakes(env: &Env, key: &Address, stakes: &Vec<StakePosition>) {
    if stakes.is_empty() {
        env.storage().persistent().remove(key);
        return;
    }
    env.storage().persistent().set(key, stakes);
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );
}

pub mod utils {
    use super::*;

    pub const PENDING_OWNER: Symbol = symbol_short!("PENDING");

    #[derive(Clone, Copy)]
    #[repr(u32)]
    pub enum DataKey {
        Owner = 0,
        TotalStaked = 1,
        Initialized = 2,
    }

    impl TryFromVal<Env, DataKey> for Val {
        type Error = ConversionError;

        fn try_from_val(_env: &Env, v: &DataKey) -> Result<Self, Self::Error> {
            Ok((*v as u32).into())
        }
    }

    pub fn is_initialized(e: &Env) -> bool {
        e.storage()
            .instance()
            .get(&DataKey::Initialized)
            .unwrap_or(false)
    }

    pub fn set_initialized(e: &Env) {
        e.storage().instance().set(&DataKey::Initialized, &true);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn save_owner(e: &Env, address: &Address) {
        e.storage().instance().set(&DataKey::Owner, address);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn get_owner(e: &Env) -> Address {
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        e.storage()
            .instance()
            .get(&DataKey::Owner)
            .unwrap_or_else(|| {
                log!(e, "Stake: Owner not set");
                panic_with_error!(e, ContractError::OwnerNotSet)
            })
    }

    pub fn save_pending_owner(e: &Env, address: &Address) {
        e.storage().instance().set(&PENDING_OWNER, address);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn get_pending_owner(e: &Env) -> Option<Address> {
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        e.storage().instance().get(&PENDING_OWNER)
    }

    pub fn remove_pending_owner(e: &Env) {
        e.storage().instance().remove(&PENDING_OWNER);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn init_total_staked(e: &Env) {
        e.storage().instance().set(&DataKey::TotalStaked, &0i128);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn increase_total_staked(e: &Env, amount: i128) -> Result<(), ContractError> {
        let total = get_total_staked_counter(e)
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;
        e.storage().instance().set(&DataKey::TotalStaked, &total);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        Ok(())
    }

    pub fn decrease_total_staked(e: &Env, amount: i128) -> Result<(), ContractError> {
        let total = get_total_staked_counter(e)
            .checked_sub(amount)
            .filter(|total| *total >= 0)
            .ok_or_else(|| {
                log!(e, "Stake: Total staked would drop below zero");
                ContractError::ContractMathError
            })?;
        e.storage().instance().set(&DataKey::TotalStaked, &total);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        Ok(())
    }

    pub fn get_total_staked_counter(e: &Env) -> i128 {
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        e.storage()
            .instance()
            .get(&DataKey::TotalStaked)
            .unwrap_or(0i128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Staking;
    use stake_common::ttl::DAY_IN_LEDGERS;

    use soroban_sdk::{
        testutils::{storage::Instance as _, Address as _, Ledger},
        vec,
    };

    fn position(index: u32, principal: i128) -> StakePosition {
        StakePosition {
            index,
            principal,
            lock_duration: 100,
            short_lock: true,
            start_time: 10,
            last_claim_time: 10,
            rewards_collected_total: 0,
        }
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #515)")]
    fn get_config_before_initialize_fails() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        env.as_contract(&contract, || {
            get_config(&env);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #516)")]
    fn get_owner_before_initialize_fails() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        env.as_contract(&contract, || {
            utils::get_owner(&env);
        });
    }

    #[test]
    fn unknown_account_has_no_stakes() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        let user = Address::generate(&env);
        env.as_contract(&contract, || {
            assert!(get_stakes(&env, &user).is_empty());
        });
    }

    #[test]
    fn saving_empty_stakes_removes_the_entry() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        let user = Address::generate(&env);
        env.as_contract(&contract, || {
            save_stakes(&env, &user, &vec![&env, position(0, 1_000)]);
            assert!(env.storage().persistent().has(&user));

            save_stakes(&env, &user, &Vec::new(&env));
            assert!(!env.storage().persistent().has(&user));
            assert!(get_stakes(&env, &user).is_empty());
        });
    }

    #[test]
    fn total_staked_counter() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        env.as_contract(&contract, || {
            utils::init_total_staked(&env);
            utils::increase_total_staked(&env, 300).unwrap();
            utils::increase_total_staked(&env, 200).unwrap();
            utils::decrease_total_staked(&env, 100).unwrap();
            assert_eq!(utils::get_total_staked_counter(&env), 400);

            assert_eq!(
                utils::decrease_total_staked(&env, 401),
                Err(ContractError::ContractMathError)
            );
            assert_eq!(utils::get_total_staked_counter(&env), 400);
        });
    }

    #[test]
    fn pending_owner_roundtrip() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        let candidate = Address::generate(&env);
        env.as_contract(&contract, || {
            assert_eq!(utils::get_pending_owner(&env), None);
            utils::save_pending_owner(&env, &candidate);
            assert_eq!(utils::get_pending_owner(&env), Some(candidate.clone()));
            utils::remove_pending_owner(&env);
            assert_eq!(utils::get_pending_owner(&env), None);
        });
    }

    #[test]
    fn owner_and_counter_access_renews_instance_ttl() {
        let env = Env::default();
        let contract = env.register(Staking, ());
        let candidate = Address::generate(&env);
        env.as_contract(&contract, || {
            utils::init_total_staked(&env);
            utils::save_pending_owner(&env, &candidate);
        });

        let accessors: [fn(&Env); 5] = [
            |e| {
                utils::get_pending_owner(e);
            },
            |e| {
                utils::get_total_staked_counter(e);
            },
            |e| utils::increase_total_staked(e, 10).unwrap(),
            |e| utils::decrease_total_staked(e, 10).unwrap(),
            utils::remove_pending_owner,
        ];
        for access in accessors {
            // let the instance drop under its renewal threshold
            env.ledger()
                .with_mut(|li| li.sequence_number += 2 * DAY_IN_LEDGERS);
            env.as_contract(&contract, || {
                assert!(env.storage().instance().get_ttl() < INSTANCE_RENEWAL_THRESHOLD);
                access(&env);
                assert_eq!(env.storage().instance().get_ttl(), INSTANCE_TARGET_TTL);
            });
        }
    }
}
