use soroban_sdk::{contract, contractimpl, contractmeta, log, token, Address, Env, Vec};

use stake_common::utils::has_elapsed;

use crate::{
    error::ContractError,
    msg::{ConfigResponse, StakedResponse, UnstakeResponse},
    rewards::RewardCurve,
    storage::{
        get_config, get_stakes, save_config, save_stakes,
        utils::{self, get_owner, get_pending_owner, get_total_staked_counter},
        Config, StakePosition,
    },
};

// Metadata that is added on to the WASM custom section
contractmeta!(
    key = "Description",
    val = "Time-locked token staking with back-loaded fixed APY rewards"
);

#[contract]
pub struct Staking;

pub trait StakingTrait {
    // Sets the owner, both tokens and the reward parameters
    // max_locking_period and claim_delay are in seconds
    // lock_multiplier uses 1_000_000 as 1.0, fixed_apy is in basis points
    fn initialize(
        env: Env,
        owner: Address,
        stake_token: Address,
        reward_token: Address,
        max_locking_period: u64,
        claim_delay: u64,
        lock_multiplier: u64,
        fixed_apy: u64,
    ) -> Result<(), ContractError>;

    fn stake(env: Env, sender: Address, amount: i128, lock_duration: u64)
        -> Result<u32, ContractError>;

    fn claim_rewards(env: Env, sender: Address, index: u32) -> Result<i128, ContractError>;

    fn unstake(env: Env, sender: Address, index: u32) -> Result<UnstakeResponse, ContractError>;

    fn fund_rewards(env: Env, sender: Address, amount: i128) -> Result<(), ContractError>;

    // ADMIN

    fn update_apy(env: Env, sender: Address, new_apy: u64) -> Result<(), ContractError>;

    fn update_lock_multiplier(
        env: Env,
        sender: Address,
        new_value: u64,
    ) -> Result<(), ContractError>;

    fn update_claim_delay(env: Env, sender: Address, new_value: u64)
        -> Result<(), ContractError>;

    fn update_max_locking_period(
        env: Env,
        sender: Address,
        new_value: u64,
    ) -> Result<(), ContractError>;

    fn pause_unpause_staking(env: Env, sender: Address) -> Result<bool, ContractError>;

    fn pause_unpause_unstaking(env: Env, sender: Address) -> Result<bool, ContractError>;

    fn transfer_ownership(
        env: Env,
        sender: Address,
        candidate: Address,
    ) -> Result<Address, ContractError>;

    fn accept_ownership(env: Env, sender: Address) -> Result<Address, ContractError>;

    fn revoke_ownership_transfer(env: Env, sender: Address) -> Result<(), ContractError>;

    // QUERIES

    fn query_config(env: Env) -> ConfigResponse;

    fn query_owner(env: Env) -> Address;

    fn query_pending_owner(env: Env) -> Option<Address>;

    fn query_fixed_apy(env: Env) -> u64;

    fn query_lock_multiplier(env: Env) -> u64;

    fn query_claim_delay(env: Env) -> u64;

    fn query_max_locking_period(env: Env) -> u64;

    fn query_staking_paused(env: Env) -> bool;

    fn query_unstaking_paused(env: Env) -> bool;

    fn query_all_stakes(env: Env, address: Address) -> StakedResponse;

    fn query_stake(env: Env, address: Address, index: u32) -> Result<StakePosition, ContractError>;

    fn query_rewards(env: Env, address: Address, index: u32) -> Result<i128, ContractError>;

    fn query_total_staked(env: Env) -> i128;

    fn query_reward_reserve(env: Env) -> Result<i128, ContractError>;
}

#[contractimpl]
impl StakingTrait for Staking {
    fn initialize(
        env: Env,
        owner: Address,
        stake_token: Address,
        reward_token: Address,
        max_locking_period: u64,
        claim_delay: u64,
        lock_multiplier: u64,
        fixed_apy: u64,
    ) -> Result<(), ContractError> {
        if utils::is_initialized(&env) {
            log!(&env, "Stake: Initialize: initializing contract twice is not allowed");
            return Err(ContractError::AlreadyInitialized);
        }
        if max_locking_period == 0 {
            log!(&env, "Stake: Initialize: max locking period must be bigger than 0");
            return Err(ContractError::InvalidParameter);
        }
        if stake_token == reward_token {
            log!(&env, "Stake: Initialize: stake and reward token must differ");
            return Err(ContractError::InvalidParameter);
        }

        utils::set_initialized(&env);

        env.events()
            .publish(("initialize", "stake token"), &stake_token);

        let config = Config {
            stake_token,
            reward_token,
            fixed_apy,
            lock_multiplier,
            claim_delay,
            max_locking_period,
            staking_paused: false,
            unstaking_paused: false,
        };
        save_config(&env, &config);

        utils::save_owner(&env, &owner);
        utils::init_total_staked(&env);

        Ok(())
    }

    fn stake(
        env: Env,
        sender: Address,
        amount: i128,
        lock_duration: u64,
    ) -> Result<u32, ContractError> {
        sender.require_auth();

        let config = get_config(&env);

        if config.staking_paused {
            log!(&env, "Stake: Stake: staking is paused");
            return Err(ContractError::StakingPaused);
        }
        if lock_duration == 0 || lock_duration > config.max_locking_period {
            log!(
                &env,
                "Stake: Stake: lock duration of {} seconds is outside of 1..={}",
                lock_duration,
                config.max_locking_period
            );
            return Err(ContractError::InvalidLockDuration);
        }
        if amount <= 0 {
            log!(&env, "Stake: Stake: trying to stake {}", amount);
            return Err(ContractError::InvalidAmount);
        }

        let balance = token_balance(&env, &config.stake_token, &sender)?;
        if balance < amount {
            log!(
                &env,
                "Stake: Stake: balance of {} is not enough to stake {}",
                balance,
                amount
            );
            return Err(ContractError::InsufficientBalance);
        }

        let now = env.ledger().timestamp();
        let mut stakes = get_stakes(&env, &sender);
        let index = stakes.len();
        stakes.push_back(StakePosition {
            index,
            principal: amount,
            lock_duration,
            short_lock: lock_duration < config.max_locking_period,
            start_time: now,
            last_claim_time: now,
            rewards_collected_total: 0,
        });

        transfer_tokens(
            &env,
            &config.stake_token,
            &sender,
            &env.current_contract_address(),
            amount,
        )?;

        save_stakes(&env, &sender, &stakes);
        utils::increase_total_staked(&env, amount)?;

        env.events().publish(("Staked", sender.clone()), (amount, index));

        Ok(index)
    }

    fn claim_rewards(env: Env, sender: Address, index: u32) -> Result<i128, ContractError> {
        sender.require_auth();

        let config = get_config(&env);
        let mut stakes = get_stakes(&env, &sender);
        let mut position = find_stake(&env, &stakes, index)?;

        let now = env.ledger().timestamp();
        if !has_elapsed(now, position.last_claim_time, config.claim_delay) {
            log!(
                &env,
                "Stake: Claim rewards: claim delay not expired, last claim at {}",
                position.last_claim_time
            );
            return Err(ContractError::ClaimDelayNotExpired);
        }

        let reward = claimable_reward(&env, &config, &position, now)?;

        position.last_claim_time = now;
        position.rewards_collected_total = position
            .rewards_collected_total
            .checked_add(reward)
            .ok_or(ContractError::ContractMathError)?;
        stakes.set(index, position);

        pay_reward(&env, &config, &sender, reward)?;

        save_stakes(&env, &sender, &stakes);

        env.events().publish(("Claimed", sender.clone()), (reward, index));

        Ok(reward)
    }

    fn unstake(env: Env, sender: Address, index: u32) -> Result<UnstakeResponse, ContractError> {
        sender.require_auth();

        let config = get_config(&env);

        if config.unstaking_paused {
            log!(&env, "Stake: Unstake: unstaking is paused");
            return Err(ContractError::UnstakingPaused);
        }

        let mut stakes = get_stakes(&env, &sender);
        let position = find_stake(&env, &stakes, index)?;

        let now = env.ledger().timestamp();
        if !has_elapsed(now, position.start_time, position.lock_duration) {
            log!(
                &env,
                "Stake: Unstake: lock of position {} runs until {}",
                index,
                position.start_time.saturating_add(position.lock_duration)
            );
            return Err(ContractError::LockNotExpired);
        }

        let reward = claimable_reward(&env, &config, &position, now)?;
        swap_remove_stake(&mut stakes, index);

        pay_reward(&env, &config, &sender, reward)?;
        transfer_tokens(
            &env,
            &config.stake_token,
            &env.current_contract_address(),
            &sender,
            position.principal,
        )?;

        save_stakes(&env, &sender, &stakes);
        utils::decrease_total_staked(&env, position.principal)?;

        env.events().publish(("Unstaked", sender.clone()), index);

        Ok(UnstakeResponse {
            principal: position.principal,
            reward,
        })
    }

    fn fund_rewards(env: Env, sender: Address, amount: i128) -> Result<(), ContractError> {
        sender.require_auth();

        if amount <= 0 {
            log!(&env, "Stake: Fund rewards: trying to fund {}", amount);
            return Err(ContractError::InvalidAmount);
        }

        let config = get_config(&env);
        let balance = token_balance(&env, &config.reward_token, &sender)?;
        if balance < amount {
            log!(
                &env,
                "Stake: Fund rewards: balance of {} is not enough to fund {}",
                balance,
                amount
            );
            return Err(ContractError::InsufficientBalance);
        }

        transfer_tokens(
            &env,
            &config.reward_token,
            &sender,
            &env.current_contract_address(),
            amount,
        )?;

        env.events().publish(("fund_rewards", sender.clone()), amount);

        Ok(())
    }

    fn update_apy(env: Env, sender: Address, new_apy: u64) -> Result<(), ContractError> {
        ensure_owner(&env, &sender)?;

        let mut config = get_config(&env);
        config.fixed_apy = new_apy;
        save_config(&env, &config);

        env.events().publish(("ApyChanged",), new_apy);

        Ok(())
    }

    fn update_lock_multiplier(
        env: Env,
        sender: Address,
        new_value: u64,
    ) -> Result<(), ContractError> {
        ensure_owner(&env, &sender)?;

        let mut config = get_config(&env);
        config.lock_multiplier = new_value;
        save_config(&env, &config);

        env.events().publish(("LockMultiplierChanged",), new_value);

        Ok(())
    }

    fn update_claim_delay(
        env: Env,
        sender: Address,
        new_value: u64,
    ) -> Result<(), ContractError> {
        ensure_owner(&env, &sender)?;

        let mut config = get_config(&env);
        config.claim_delay = new_value;
        save_config(&env, &config);

        env.events().publish(("ClaimDelayChanged",), new_value);

        Ok(())
    }

    fn update_max_locking_period(
        env: Env,
        sender: Address,
        new_value: u64,
    ) -> Result<(), ContractError> {
        ensure_owner(&env, &sender)?;

        if new_value == 0 {
            log!(&env, "Stake: Update max locking period: must be bigger than 0");
            return Err(ContractError::InvalidParameter);
        }

        let mut config = get_config(&env);
        config.max_locking_period = new_value;
        save_config(&env, &config);

        env.events().publish(("MaxLockingPeriodChanged",), new_value);

        Ok(())
    }

    fn pause_unpause_staking(env: Env, sender: Address) -> Result<bool, ContractError> {
        ensure_owner(&env, &sender)?;

        let mut config = get_config(&env);
        config.staking_paused = !config.staking_paused;
        save_config(&env, &config);

        env.events()
            .publish(("PausedOrUnpausedStaking",), config.staking_paused);

        Ok(config.staking_paused)
    }

    fn pause_unpause_unstaking(env: Env, sender: Address) -> Result<bool, ContractError> {
        ensure_owner(&env, &sender)?;

        let mut config = get_config(&env);
        config.unstaking_paused = !config.unstaking_paused;
        save_config(&env, &config);

        env.events()
            .publish(("PausedOrUnpausedUnstaking",), config.unstaking_paused);

        Ok(config.unstaking_paused)
    }

    fn transfer_ownership(
        env: Env,
        sender: Address,
        candidate: Address,
    ) -> Result<Address, ContractError> {
        ensure_owner(&env, &sender)?;

        if candidate == sender {
            log!(&env, "Stake: Transfer ownership: candidate already owns the contract");
            return Err(ContractError::SameOwner);
        }

        utils::save_pending_owner(&env, &candidate);

        env.events()
            .publish(("transfer_ownership", "candidate"), &candidate);

        Ok(candidate)
    }

    fn accept_ownership(env: Env, sender: Address) -> Result<Address, ContractError> {
        sender.require_auth();

        if get_pending_owner(&env).as_ref() != Some(&sender) {
            log!(&env, "Stake: Accept ownership: {} is not the pending owner", sender);
            return Err(ContractError::Unauthorized);
        }

        utils::save_owner(&env, &sender);
        utils::remove_pending_owner(&env);

        env.events().publish(("accept_ownership", "owner"), &sender);

        Ok(sender)
    }

    fn revoke_ownership_transfer(env: Env, sender: Address) -> Result<(), ContractError> {
        ensure_owner(&env, &sender)?;

        if get_pending_owner(&env).is_none() {
            log!(&env, "Stake: Revoke ownership transfer: no transfer in place");
            return Err(ContractError::NoOwnershipTransferInPlace);
        }

        utils::remove_pending_owner(&env);

        env.events()
            .publish(("revoke_ownership_transfer", "owner"), &sender);

        Ok(())
    }

    // QUERIES

    fn query_config(env: Env) -> ConfigResponse {
        ConfigResponse {
            config: get_config(&env),
        }
    }

    fn query_owner(env: Env) -> Address {
        get_owner(&env)
    }

    fn query_pending_owner(env: Env) -> Option<Address> {
        get_pending_owner(&env)
    }

    fn query_fixed_apy(env: Env) -> u64 {
        get_config(&env).fixed_apy
    }

    fn query_lock_multiplier(env: Env) -> u64 {
        get_config(&env).lock_multiplier
    }

    fn query_claim_delay(env: Env) -> u64 {
        get_config(&env).claim_delay
    }

    fn query_max_locking_period(env: Env) -> u64 {
        get_config(&env).max_locking_period
    }

    fn query_staking_paused(env: Env) -> bool {
        get_config(&env).staking_paused
    }

    fn query_unstaking_paused(env: Env) -> bool {
        get_config(&env).unstaking_paused
    }

    fn query_all_stakes(env: Env, address: Address) -> StakedResponse {
        StakedResponse {
            stakes: get_stakes(&env, &address),
        }
    }

    fn query_stake(env: Env, address: Address, index: u32) -> Result<StakePosition, ContractError> {
        find_stake(&env, &get_stakes(&env, &address), index)
    }

    fn query_rewards(env: Env, address: Address, index: u32) -> Result<i128, ContractError> {
        let config = get_config(&env);
        let position = find_stake(&env, &get_stakes(&env, &address), index)?;

        claimable_reward(&env, &config, &position, env.ledger().timestamp())
    }

    fn query_total_staked(env: Env) -> i128 {
        get_total_staked_counter(&env)
    }

    fn query_reward_reserve(env: Env) -> Result<i128, ContractError> {
        let config = get_config(&env);

        token_balance(&env, &config.reward_token, &env.current_contract_address())
    }
}

fn ensure_owner(env: &Env, sender: &Address) -> Result<(), ContractError> {
    sender.require_auth();

    if *sender != get_owner(env) {
        log!(env, "Stake: {} is not the owner of the contract", sender);
        return Err(ContractError::Unauthorized);
    }

    Ok(())
}

fn find_stake(
    env: &Env,
    stakes: &Vec<StakePosition>,
    index: u32,
) -> Result<StakePosition, ContractError> {
    stakes.get(index).ok_or_else(|| {
        log!(
            env,
            "Stake: No position at index {}, account has {}",
            index,
            stakes.len()
        );
        ContractError::InvalidIndex
    })
}

// Removes the position at `index` by moving the last position into its slot.
// The moved position gets its `index` rewritten, so indices stay dense.
fn swap_remove_stake(stakes: &mut Vec<StakePosition>, index: u32) -> Option<StakePosition> {
    let removed = stakes.get(index)?;
    let last = stakes.len() - 1;

    if index != last {
        let mut moved = stakes.get_unchecked(last);
        moved.index = index;
        stakes.set(index, moved);
    }
    stakes.pop_back();

    Some(removed)
}

fn claimable_reward(
    env: &Env,
    config: &Config,
    position: &StakePosition,
    now: u64,
) -> Result<i128, ContractError> {
    RewardCurve::from(config)
        .claimable(position, now)
        .ok_or_else(|| {
            log!(
                env,
                "Stake: Rewards: overflow while computing reward for principal {}",
                position.principal
            );
            ContractError::ContractMathError
        })
}

fn pay_reward(
    env: &Env,
    config: &Config,
    receiver: &Address,
    reward: i128,
) -> Result<(), ContractError> {
    if reward == 0 {
        return Ok(());
    }

    let contract = env.current_contract_address();
    let reserve = token_balance(env, &config.reward_token, &contract)?;
    if reserve < reward {
        log!(
            env,
            "Stake: Rewards: reserve of {} cannot cover reward of {}",
            reserve,
            reward
        );
        return Err(ContractError::InsufficientBalance);
    }

    transfer_tokens(env, &config.reward_token, &contract, receiver, reward)
}

fn token_balance(env: &Env, token: &Address, account: &Address) -> Result<i128, ContractError> {
    match token::Client::new(env, token).try_balance(account) {
        Ok(Ok(balance)) => Ok(balance),
        _ => {
            log!(env, "Stake: Token {} failed to report a balance", token);
            Err(ContractError::TransferFailed)
        }
    }
}

fn transfer_tokens(
    env: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    token::Client::new(env, token)
        .try_transfer(from, to, &amount)
        .map_err(|_| {
            log!(env, "Stake: Token {} rejected a transfer of {}", token, amount);
            ContractError::TransferFailed
        })?
        .map_err(|_| ContractError::TransferFailed)
}
