use soroban_sdk::{contracttype, log, symbol_short, Address, Env, Symbol};

use crate::ContractError;

// ── Storage ──────────────────────────────────────────────────────────────────

const POOL: Symbol = symbol_short!("POOL");

const INSTANCE_TTL_THRESHOLD: u32 = 518_400;
const INSTANCE_TTL_EXTEND_TO: u32 = 1_036_800;

// ── Types ────────────────────────────────────────────────────────────────────

/// Monotonic counter that reward accrual is measured against.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccrualClock {
    /// One unit per closed ledger (block-based emission).
    LedgerSequence,
    /// Ledger close time in seconds.
    Timestamp,
}

impl AccrualClock {
    /// Current reading of the clock. Read once per operation.
    pub fn now(&self, env: &Env) -> u64 {
        match self {
            AccrualClock::LedgerSequence => u64::from(env.ledger().sequence()),
            AccrualClock::Timestamp => env.ledger().timestamp(),
        }
    }
}

/// Where claimed rewards come from.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RewardSource {
    /// The farm mints new reward supply; it must administer the reward token.
    Mint,
    /// The farm pays out of its own pre-funded reward balance.
    Reserve,
}

/// Deploy-time configuration accepted by `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    pub stake_token: Address,
    pub reward_token: Address,
    /// Reward units emitted per clock unit across the whole pool.
    pub reward_rate: i128,
    pub withdrawal_fee_bps: u32,
    pub clock: AccrualClock,
    pub reward_source: RewardSource,
}

/// Pool-wide singleton. Only the farm controller mutates it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub total_staked: i128,
    pub reward_rate: i128,
    pub withdrawal_fee_bps: u32,
    pub clock: AccrualClock,
    pub reward_source: RewardSource,
    /// Designated fee recipient. Fees go to `owner` while unset.
    pub treasury: Option<Address>,
    /// Cumulative reward per staked unit, scaled by `rewards::PRECISION`.
    pub reward_per_token: i128,
    /// Clock reading the index was last brought up to.
    pub last_update: u64,
}

impl PoolState {
    pub fn new(owner: Address, config: FarmConfig, now: u64) -> Self {
        PoolState {
            owner,
            stake_token: config.stake_token,
            reward_token: config.reward_token,
            total_staked: 0,
            reward_rate: config.reward_rate,
            withdrawal_fee_bps: config.withdrawal_fee_bps,
            clock: config.clock,
            reward_source: config.reward_source,
            treasury: None,
            reward_per_token: 0,
            last_update: now,
        }
    }

    pub fn fee_recipient(&self) -> Address {
        match &self.treasury {
            Some(treasury) => treasury.clone(),
            None => self.owner.clone(),
        }
    }

    /// Guard: fail with `Unauthorized` unless `caller` is the pool owner.
    pub fn require_owner(&self, env: &Env, caller: &Address) -> Result<(), ContractError> {
        if *caller != self.owner {
            log!(env, "token farm: rejected privileged call from {}", caller.clone());
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn increase_total_staked(&mut self, amount: i128) -> Result<(), ContractError> {
        if amount < 0 {
            return Err(ContractError::InvariantViolation);
        }
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn decrease_total_staked(&mut self, amount: i128) -> Result<(), ContractError> {
        if amount < 0 || amount > self.total_staked {
            return Err(ContractError::InvariantViolation);
        }
        self.total_staked -= amount;
        Ok(())
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&POOL)
}

pub fn load(env: &Env) -> Result<PoolState, ContractError> {
    let pool = env
        .storage()
        .instance()
        .get(&POOL)
        .ok_or(ContractError::NotInitialized)?;
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    Ok(pool)
}

pub fn save(env: &Env, pool: &PoolState) {
    env.storage().instance().set(&POOL, pool);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
}
