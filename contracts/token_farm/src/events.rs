#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::pool::{AccrualClock, RewardSource};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the farm is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub reward_rate: i128,
    pub withdrawal_fee_bps: u32,
    pub clock: AccrualClock,
    pub reward_source: RewardSource,
    pub timestamp: u64,
}

/// Fired when a participant deposits stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub participant: Address,
    pub amount: i128,
    pub new_balance: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a participant withdraws their whole balance.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub participant: Address,
    pub payout: i128,
    pub fee: i128,
    pub fee_recipient: Address,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a participant claims accrued rewards.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsClaimedEvent {
    pub participant: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired after a batch settlement over every participant.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsDistributedEvent {
    pub participants: u32,
    pub settled: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawalFeeUpdatedEvent {
    pub old_bps: u32,
    pub new_bps: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardRateSetEvent {
    pub new_rate: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreasurySetEvent {
    pub treasury: Option<Address>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub old_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn publish_initialized(
    env: &Env,
    owner: Address,
    stake_token: Address,
    reward_token: Address,
    reward_rate: i128,
    withdrawal_fee_bps: u32,
    clock: AccrualClock,
    reward_source: RewardSource,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            stake_token,
            reward_token,
            reward_rate,
            withdrawal_fee_bps,
            clock,
            reward_source,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(
    env: &Env,
    participant: Address,
    amount: i128,
    new_balance: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), participant.clone()),
        DepositedEvent {
            participant,
            amount,
            new_balance,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(
    env: &Env,
    participant: Address,
    payout: i128,
    fee: i128,
    fee_recipient: Address,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), participant.clone()),
        WithdrawnEvent {
            participant,
            payout,
            fee,
            fee_recipient,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_claimed(env: &Env, participant: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLMD"), participant.clone()),
        RewardsClaimedEvent {
            participant,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_distributed(env: &Env, participants: u32, settled: i128) {
    env.events().publish(
        (symbol_short!("DISTRIB"),),
        RewardsDistributedEvent {
            participants,
            settled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawal_fee_updated(env: &Env, old_bps: u32, new_bps: u32) {
    env.events().publish(
        (symbol_short!("FEE_SET"),),
        WithdrawalFeeUpdatedEvent {
            old_bps,
            new_bps,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_rate_set(env: &Env, new_rate: i128) {
    env.events().publish(
        (symbol_short!("RWD_RATE"),),
        RewardRateSetEvent {
            new_rate,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_treasury_set(env: &Env, treasury: Option<Address>) {
    env.events().publish(
        (symbol_short!("TRSY_SET"),),
        TreasurySetEvent {
            treasury,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, old_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWNER_SET"), new_owner.clone()),
        OwnershipTransferredEvent {
            old_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}
