//! Staking registry: one [`StakingRecord`] per participant identity.
//!
//! Records are created on a participant's first deposit and are never
//! removed; a full withdrawal zeroes the balance and the slot is reused on
//! the next deposit. Mutators only refuse to go negative, everything else
//! is the controller's job.
//!
//! The participant index lives under one key per slot so batch settlement
//! can walk it a page at a time.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::ContractError;

// Per-participant persistent storage uses tuple keys: (prefix, participant)
const RECORD: Symbol = symbol_short!("STAKER");
// Index slots: (prefix, position)
const PARTICIPANT_AT: Symbol = symbol_short!("STAKERS");
const PARTICIPANT_COUNT: Symbol = symbol_short!("STAKER_N");

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

/// A participant's position.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakingRecord {
    /// Stake asset currently locked, in smallest units.
    pub balance: i128,
    /// Reward asset settled but not yet claimed.
    pub accrued_rewards: i128,
    /// Pool reward-per-token index at the last settlement.
    pub reward_per_token_paid: i128,
    /// Clock reading at the last settlement.
    pub last_checkpoint: u64,
}

impl StakingRecord {
    pub fn is_staking(&self) -> bool {
        self.balance > 0
    }

    pub fn set_balance(&mut self, balance: i128) -> Result<(), ContractError> {
        if balance < 0 {
            return Err(ContractError::InvariantViolation);
        }
        self.balance = balance;
        Ok(())
    }

    pub fn add_accrued_rewards(&mut self, delta: i128) -> Result<(), ContractError> {
        if delta < 0 {
            return Err(ContractError::InvariantViolation);
        }
        self.accrued_rewards = self
            .accrued_rewards
            .checked_add(delta)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Zero the accrued rewards and return what was there.
    pub fn take_accrued_rewards(&mut self) -> i128 {
        core::mem::take(&mut self.accrued_rewards)
    }

    /// Snapshot the pool index. The index only grows.
    pub fn set_reward_per_token_paid(&mut self, index: i128) -> Result<(), ContractError> {
        if index < self.reward_per_token_paid {
            return Err(ContractError::InvariantViolation);
        }
        self.reward_per_token_paid = index;
        Ok(())
    }

    /// Move the checkpoint forward to `now`. Never moves it backwards.
    pub fn set_checkpoint(&mut self, now: u64) {
        if now > self.last_checkpoint {
            self.last_checkpoint = now;
        }
    }
}

fn record_key(participant: &Address) -> (Symbol, Address) {
    (RECORD, participant.clone())
}

fn slot_key(position: u32) -> (Symbol, u32) {
    (PARTICIPANT_AT, position)
}

/// The participant's record, or `None` if they never deposited.
pub fn find(env: &Env, participant: &Address) -> Option<StakingRecord> {
    let key = record_key(participant);
    let record = env.storage().persistent().get::<_, StakingRecord>(&key)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Some(record)
}

/// Returns the participant's record, or a zeroed one if they never deposited.
pub fn get(env: &Env, participant: &Address) -> StakingRecord {
    find(env, participant).unwrap_or_default()
}

pub(crate) fn save(env: &Env, participant: &Address, record: &StakingRecord) {
    let key = record_key(participant);
    if !env.storage().persistent().has(&key) {
        track(env, participant);
    }
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Number of identities that ever held a record.
pub fn participant_count(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&PARTICIPANT_COUNT)
        .unwrap_or(0)
}

pub fn participant_at(env: &Env, position: u32) -> Option<Address> {
    let key = slot_key(position);
    let participant = env.storage().persistent().get::<_, Address>(&key)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Some(participant)
}

/// Up to `limit` participants from `start`, in first-deposit order.
pub fn participants(env: &Env, start: u32, limit: u32) -> Vec<Address> {
    let end = start.saturating_add(limit).min(participant_count(env));
    let mut page = Vec::new(env);
    for position in start..end {
        if let Some(participant) = participant_at(env, position) {
            page.push_back(participant);
        }
    }
    page
}

fn track(env: &Env, participant: &Address) {
    let position = participant_count(env);
    let key = slot_key(position);
    env.storage().persistent().set(&key, participant);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    env.storage()
        .persistent()
        .set(&PARTICIPANT_COUNT, &(position + 1));
    env.storage()
        .persistent()
        .extend_ttl(&PARTICIPANT_COUNT, TTL_THRESHOLD, TTL_EXTEND_TO);
}
