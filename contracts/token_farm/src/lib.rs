#![no_std]

pub mod events;
pub mod fees;
pub mod ledger;
pub mod pool;
pub mod registry;
pub mod rewards;

use soroban_sdk::{contract, contractimpl, log, Address, Env, Vec};

use fees::FeeSplit;
use ledger::TokenLedger;
use pool::{FarmConfig, PoolState, RewardSource};
use registry::StakingRecord;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientAllowance = 5,
    InsufficientBalance = 6,
    NoStake = 7,
    InvalidFee = 8,
    InvariantViolation = 9,
    TokensIdentical = 10,
    ArithmeticOverflow = 11,
    InvalidRewardRate = 12,
    InvalidOwner = 13,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct TokenFarm;

#[contractimpl]
impl TokenFarm {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the farm.
    ///
    /// * `owner`  – may change the withdrawal fee, reward rate and treasury,
    ///   and hand ownership over.
    /// * `config` – assets, emission rate, initial fee, clock and reward source.
    pub fn initialize(env: Env, owner: Address, config: FarmConfig) -> Result<(), ContractError> {
        if pool::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if config.stake_token == config.reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if config.reward_rate < 0 {
            return Err(ContractError::InvalidRewardRate);
        }
        fees::validate_bps(config.withdrawal_fee_bps)?;

        let now = config.clock.now(&env);
        let state = PoolState::new(owner, config, now);
        pool::save(&env, &state);

        events::publish_initialized(
            &env,
            state.owner,
            state.stake_token,
            state.reward_token,
            state.reward_rate,
            state.withdrawal_fee_bps,
            state.clock,
            state.reward_source,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` of the stake asset.
    ///
    /// The caller must have approved the farm for at least `amount` on the
    /// stake token. Rewards on the existing balance are settled first so the
    /// new tokens never earn retroactively.
    pub fn deposit(env: Env, caller: Address, amount: i128) -> Result<(), ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = state.clock.now(&env);
        let mut record = registry::get(&env, &caller);
        rewards::settle(&env, &mut state, &mut record, now)?;

        let new_balance = record
            .balance
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        record.set_balance(new_balance)?;
        state.increase_total_staked(amount)?;

        TokenLedger::new(&env).transfer_from(&state.stake_token, &caller, amount)?;

        registry::save(&env, &caller, &record);
        pool::save(&env, &state);

        events::publish_deposited(&env, caller, amount, new_balance, state.total_staked);

        Ok(())
    }

    /// Withdraw the caller's whole balance, minus the withdrawal fee.
    ///
    /// Settled rewards stay claimable after the balance reaches zero.
    pub fn withdraw(env: Env, caller: Address) -> Result<FeeSplit, ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;

        let mut record = registry::get(&env, &caller);
        if !record.is_staking() {
            return Err(ContractError::NoStake);
        }

        let now = state.clock.now(&env);
        rewards::settle(&env, &mut state, &mut record, now)?;

        let balance = record.balance;
        let split = fees::split(balance, state.withdrawal_fee_bps)?;
        record.set_balance(0)?;
        state.decrease_total_staked(balance)?;

        let fee_recipient = state.fee_recipient();
        let ledger = TokenLedger::new(&env);
        ledger.transfer(&state.stake_token, &caller, split.payout)?;
        ledger.transfer(&state.stake_token, &fee_recipient, split.fee)?;

        registry::save(&env, &caller, &record);
        pool::save(&env, &state);

        events::publish_withdrawn(
            &env,
            caller,
            split.payout,
            split.fee,
            fee_recipient,
            state.total_staked,
        );

        Ok(split)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything the caller has accrued.
    ///
    /// Returns the amount paid; nothing accrued is a successful no-op.
    pub fn claim_rewards(env: Env, caller: Address) -> Result<i128, ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;

        let Some(mut record) = registry::find(&env, &caller) else {
            return Ok(0);
        };

        let now = state.clock.now(&env);
        rewards::settle(&env, &mut state, &mut record, now)?;

        let amount = record.take_accrued_rewards();
        if amount > 0 {
            Self::pay_reward(&env, &state, &caller, amount)?;
        }

        registry::save(&env, &caller, &record);
        pool::save(&env, &state);

        if amount > 0 {
            events::publish_rewards_claimed(&env, caller, amount);
        }

        Ok(amount)
    }

    /// Settle every known participant in one pass.
    ///
    /// Only credits accrued rewards; nothing is paid out. Returns the number
    /// of participants settled. Large pools use `distribute_rewards_page`.
    pub fn distribute_rewards_all(env: Env) -> Result<u32, ContractError> {
        Self::distribute_rewards_page(env.clone(), 0, registry::participant_count(&env))
    }

    /// Settle up to `limit` participants starting at index position `start`.
    ///
    /// Pages are independent: settling any subset never changes what the
    /// others are owed.
    pub fn distribute_rewards_page(env: Env, start: u32, limit: u32) -> Result<u32, ContractError> {
        let mut state = pool::load(&env)?;
        let now = state.clock.now(&env);

        let distribution = rewards::settle_page(&env, &mut state, start, limit, now)?;
        pool::save(&env, &state);

        events::publish_rewards_distributed(
            &env,
            distribution.participants,
            distribution.settled,
        );

        Ok(distribution.participants)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the participant's record, zeroed if they never deposited.
    pub fn get_staker_info(env: Env, participant: Address) -> StakingRecord {
        registry::get(&env, &participant)
    }

    /// Settled plus not-yet-settled rewards, without mutating state.
    pub fn get_pending_rewards(env: Env, participant: Address) -> Result<i128, ContractError> {
        let state = pool::load(&env)?;
        let record = registry::get(&env, &participant);
        rewards::pending(&env, &state, &record, state.clock.now(&env))
    }

    /// Preview the split a `withdraw` would apply right now.
    pub fn quote_withdrawal(env: Env, participant: Address) -> Result<FeeSplit, ContractError> {
        let state = pool::load(&env)?;
        let record = registry::get(&env, &participant);
        fees::split(record.balance, state.withdrawal_fee_bps)
    }

    pub fn get_pool(env: Env) -> Result<PoolState, ContractError> {
        pool::load(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        Ok(pool::load(&env)?.owner)
    }

    pub fn get_withdrawal_fee(env: Env) -> Result<u32, ContractError> {
        Ok(pool::load(&env)?.withdrawal_fee_bps)
    }

    pub fn get_reward_rate(env: Env) -> Result<i128, ContractError> {
        Ok(pool::load(&env)?.reward_rate)
    }

    pub fn get_total_staked(env: Env) -> Result<i128, ContractError> {
        Ok(pool::load(&env)?.total_staked)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        Ok(pool::load(&env)?.stake_token)
    }

    pub fn get_reward_token(env: Env) -> Result<Address, ContractError> {
        Ok(pool::load(&env)?.reward_token)
    }

    pub fn get_fee_recipient(env: Env) -> Result<Address, ContractError> {
        Ok(pool::load(&env)?.fee_recipient())
    }

    /// Up to `limit` participants from index position `start`.
    pub fn get_participants(env: Env, start: u32, limit: u32) -> Vec<Address> {
        registry::participants(&env, start, limit)
    }

    pub fn get_participant_count(env: Env) -> u32 {
        registry::participant_count(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        pool::is_initialized(&env)
    }

    // ── Owner functions ──────────────────────────────────────────────────────

    /// Set the withdrawal fee in basis points. 10_000 (100%) is allowed.
    pub fn update_withdrawal_fee(
        env: Env,
        caller: Address,
        new_bps: u32,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;
        state.require_owner(&env, &caller)?;
        fees::validate_bps(new_bps)?;

        let old_bps = state.withdrawal_fee_bps;
        state.withdrawal_fee_bps = new_bps;
        pool::save(&env, &state);

        events::publish_withdrawal_fee_updated(&env, old_bps, new_bps);

        Ok(())
    }

    /// Change the emission rate.
    ///
    /// The reward index is brought up to date at the old rate first, so the
    /// change is never applied retroactively.
    pub fn set_reward_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;
        state.require_owner(&env, &caller)?;

        if new_rate < 0 {
            return Err(ContractError::InvalidRewardRate);
        }

        let now = state.clock.now(&env);
        rewards::update_pool(&env, &mut state, now)?;

        state.reward_rate = new_rate;
        pool::save(&env, &state);

        events::publish_reward_rate_set(&env, new_rate);

        Ok(())
    }

    /// Route withdrawal fees to `treasury`, or back to the owner with `None`.
    pub fn set_treasury(
        env: Env,
        caller: Address,
        treasury: Option<Address>,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;
        state.require_owner(&env, &caller)?;

        state.treasury = treasury.clone();
        pool::save(&env, &state);

        events::publish_treasury_set(&env, treasury);

        Ok(())
    }

    /// Hand ownership to `new_owner` in a single step.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        let mut state = pool::load(&env)?;
        state.require_owner(&env, &caller)?;

        if new_owner == env.current_contract_address() {
            return Err(ContractError::InvalidOwner);
        }

        let old_owner = core::mem::replace(&mut state.owner, new_owner.clone());
        pool::save(&env, &state);

        events::publish_ownership_transferred(&env, old_owner, new_owner);

        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn pay_reward(
        env: &Env,
        state: &PoolState,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let ledger = TokenLedger::new(env);
        match state.reward_source {
            RewardSource::Mint => ledger.mint(&state.reward_token, to, amount),
            RewardSource::Reserve => {
                ledger.transfer(&state.reward_token, to, amount).map_err(|err| {
                    log!(env, "token farm: reward reserve cannot cover {}", amount);
                    err
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
