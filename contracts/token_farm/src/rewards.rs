//! Reward accrual.
//!
//! The pool keeps a cumulative reward-per-token index. Between two pool
//! updates `total_staked` is constant, so each step adds
//! `elapsed * rate * PRECISION / total_staked`. A participant is owed
//! `balance * (index - reward_per_token_paid) / PRECISION`, which is the
//! proportional share priced interval by interval at the pool size that
//! held during it.
//!
//! The index must be brought up to "now" before `total_staked` or the rate
//! changes; [`settle`] does this itself.

use soroban_sdk::{log, Env, Vec, I256};

use crate::{
    pool::PoolState,
    registry::{self, StakingRecord},
    ContractError,
};

/// Fixed-point scale of the reward-per-token index.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Outcome of a batch settlement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Distribution {
    pub participants: u32,
    pub settled: i128,
}

/// Growth of the index over `elapsed` clock units at a fixed pool size.
///
/// An empty pool accrues nothing; the emission for that stretch is never
/// owed to anyone.
pub fn index_delta(
    env: &Env,
    elapsed: u64,
    rate: i128,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if rate < 0 || total_staked < 0 {
        return Err(ContractError::InvariantViolation);
    }
    if elapsed == 0 || rate == 0 || total_staked == 0 {
        return Ok(0);
    }

    let emitted = i128::from(elapsed)
        .checked_mul(rate)
        .ok_or(ContractError::ArithmeticOverflow)?;

    I256::from_i128(env, emitted)
        .mul(&I256::from_i128(env, PRECISION))
        .div(&I256::from_i128(env, total_staked))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Reward owed to `balance` for an index move from `paid` to `index`, floored.
pub fn earned(env: &Env, balance: i128, index: i128, paid: i128) -> Result<i128, ContractError> {
    if balance < 0 || index < paid {
        return Err(ContractError::InvariantViolation);
    }
    if balance == 0 || index == paid {
        return Ok(0);
    }

    // balance * index can exceed i128 for 18-decimal tokens.
    I256::from_i128(env, balance)
        .mul(&I256::from_i128(env, index - paid))
        .div(&I256::from_i128(env, PRECISION))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// The pool index as of `now`, without writing anything.
pub fn current_index(env: &Env, pool: &PoolState, now: u64) -> Result<i128, ContractError> {
    let elapsed = now.saturating_sub(pool.last_update);
    let delta = index_delta(env, elapsed, pool.reward_rate, pool.total_staked)?;
    pool.reward_per_token
        .checked_add(delta)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Bring the pool index up to `now`. Idempotent for a fixed `now`.
pub fn update_pool(env: &Env, pool: &mut PoolState, now: u64) -> Result<(), ContractError> {
    pool.reward_per_token = current_index(env, pool, now)?;
    if now > pool.last_update {
        pool.last_update = now;
    }
    Ok(())
}

/// Reward settled plus reward pending at `now`, without writing anything.
pub fn pending(
    env: &Env,
    pool: &PoolState,
    record: &StakingRecord,
    now: u64,
) -> Result<i128, ContractError> {
    let index = current_index(env, pool, now)?;
    let delta = earned(env, record.balance, index, record.reward_per_token_paid)?;
    record
        .accrued_rewards
        .checked_add(delta)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Credit `record` against an already updated pool index.
fn credit(
    env: &Env,
    pool: &PoolState,
    record: &mut StakingRecord,
    now: u64,
) -> Result<i128, ContractError> {
    let delta = earned(
        env,
        record.balance,
        pool.reward_per_token,
        record.reward_per_token_paid,
    )?;
    record.add_accrued_rewards(delta)?;
    record.set_reward_per_token_paid(pool.reward_per_token)?;
    record.set_checkpoint(now);
    Ok(delta)
}

/// Update the pool to `now`, then credit `record` with everything it is owed.
///
/// Idempotent for a fixed `now`. The caller persists both `pool` and `record`.
pub fn settle(
    env: &Env,
    pool: &mut PoolState,
    record: &mut StakingRecord,
    now: u64,
) -> Result<i128, ContractError> {
    update_pool(env, pool, now)?;
    credit(env, pool, record, now)
}

/// Settle up to `limit` participants from position `start` of the index.
///
/// All records in the page are computed before any is written, so a failure
/// leaves the registry untouched. The caller persists `pool`.
pub fn settle_page(
    env: &Env,
    pool: &mut PoolState,
    start: u32,
    limit: u32,
    now: u64,
) -> Result<Distribution, ContractError> {
    update_pool(env, pool, now)?;

    if pool.total_staked == 0 {
        log!(env, "token farm: pool empty, settlement only advances checkpoints");
    }

    let page = registry::participants(env, start, limit);

    let mut settled_records: Vec<StakingRecord> = Vec::new(env);
    let mut settled: i128 = 0;
    for participant in page.iter() {
        let mut record = registry::get(env, &participant);
        let delta = credit(env, pool, &mut record, now)?;
        settled = settled
            .checked_add(delta)
            .ok_or(ContractError::ArithmeticOverflow)?;
        settled_records.push_back(record);
    }

    for (participant, record) in page.iter().zip(settled_records.iter()) {
        registry::save(env, &participant, &record);
    }

    Ok(Distribution {
        participants: page.len(),
        settled,
    })
}
