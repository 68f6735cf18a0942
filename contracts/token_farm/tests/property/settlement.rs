//! Property-based tests for reward settlement.
//!
//! Invariants tested:
//! - Settling twice with no elapsed time changes nothing
//! - A sole participant receives the full emission for the interval, less
//!   at most one unit of rounding
//! - Shares of a fully settled pool never exceed the emission
//! - Deposits and withdrawals never let the pool pay out more than it emitted

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::Env;
use token_farm::rewards::{earned, index_delta, PRECISION};

use crate::support::setup;

proptest! {
    /// The floored proportional delta never exceeds the pool-wide emission.
    #[test]
    fn prop_delta_bounded_by_emission(
        elapsed in 0u64..=1_000_000u64,
        rate in 0i128..=1_000_000_000_000_000_000i128,
        balance in 0i128..=1_000_000_000_000_000_000_000i128,
        extra in 0i128..=1_000_000_000_000_000_000_000i128,
    ) {
        let env = Env::default();
        let total = balance + extra;
        let index = index_delta(&env, elapsed, rate, total).unwrap();
        let delta = earned(&env, balance, index, 0).unwrap();
        prop_assert!(delta >= 0);
        prop_assert!(delta <= i128::from(elapsed) * rate);
        if total == 0 {
            prop_assert_eq!(delta, 0);
        }
    }
}

#[derive(Arbitrary, Clone, Debug)]
enum ChurnAction {
    Deposit {
        #[proptest(strategy = "0usize..3")]
        who: usize,
        #[proptest(strategy = "1i128..=10_000i128")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0usize..3")]
        who: usize,
    },
    Claim {
        #[proptest(strategy = "0usize..3")]
        who: usize,
    },
    Distribute,
    Advance {
        #[proptest(strategy = "1u32..20u32")]
        ledgers: u32,
    },
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_zero_time_settlement_is_idempotent(
        amounts in proptest::collection::vec(1i128..=100_000i128, 1..4),
        ledgers in 0u32..200u32,
        rate in 0i128..=10_000i128,
    ) {
        let farm = setup(rate, 0);
        let users: Vec<_> = amounts
            .iter()
            .map(|amount| {
                let user = farm.participant(*amount);
                farm.client.deposit(&user, amount);
                user
            })
            .collect();

        farm.advance(ledgers);
        farm.client.distribute_rewards_all();
        let first: Vec<_> = users.iter().map(|u| farm.client.get_staker_info(u)).collect();

        farm.client.distribute_rewards_all();
        let second: Vec<_> = users.iter().map(|u| farm.client.get_staker_info(u)).collect();

        prop_assert_eq!(first.clone(), second);

        // Floor rounding can only leave dust behind, never over-emit.
        let settled: i128 = first.iter().map(|r| r.accrued_rewards).sum();
        prop_assert!(settled <= i128::from(ledgers) * rate);
    }

    /// Balances below the index precision lose at most one unit to flooring.
    #[test]
    fn prop_sole_participant_receives_full_emission(
        amount in 1i128..=1_000_000_000i128,
        ledgers in 0u32..500u32,
        rate in 0i128..=1_000_000i128,
    ) {
        let farm = setup(rate, 0);
        let user = farm.participant(amount);
        farm.client.deposit(&user, &amount);

        farm.advance(ledgers);
        farm.client.distribute_rewards_all();

        let emitted = i128::from(ledgers) * rate;
        let accrued = farm.client.get_staker_info(&user).accrued_rewards;
        prop_assert!(accrued <= emitted);
        prop_assert!(accrued + 1 >= emitted);
        if (emitted * PRECISION) % amount == 0 {
            prop_assert_eq!(accrued, emitted);
        }

        prop_assert_eq!(farm.client.claim_rewards(&user), accrued);
        prop_assert_eq!(farm.reward_balance(&user), accrued);
    }

    #[test]
    fn prop_emission_bounded_under_churn(
        actions in proptest::collection::vec(any::<ChurnAction>(), 1..40),
        rate in 1i128..=1_000i128,
    ) {
        let farm = setup(rate, 0);
        let users: Vec<_> = (0..3).map(|_| farm.participant(1_000_000)).collect();

        let mut elapsed: i128 = 0;
        let mut claimed: i128 = 0;
        for action in actions {
            match action {
                ChurnAction::Deposit { who, amount } => {
                    farm.client.deposit(&users[who], &amount);
                }
                ChurnAction::Withdraw { who } => {
                    let _ = farm.client.try_withdraw(&users[who]);
                }
                ChurnAction::Claim { who } => {
                    claimed += farm.client.claim_rewards(&users[who]);
                }
                ChurnAction::Distribute => {
                    farm.client.distribute_rewards_all();
                }
                ChurnAction::Advance { ledgers } => {
                    farm.advance(ledgers);
                    elapsed += i128::from(ledgers);
                }
            }

            let owed: i128 = users
                .iter()
                .map(|u| farm.client.get_pending_rewards(u))
                .sum();
            prop_assert!(claimed + owed <= elapsed * rate);
        }

        farm.client.distribute_rewards_all();
        let settled: i128 = users
            .iter()
            .map(|u| farm.client.get_staker_info(u).accrued_rewards)
            .sum();
        prop_assert!(claimed + settled <= elapsed * rate);

        let minted: i128 = users.iter().map(|u| farm.reward_balance(u)).sum();
        prop_assert_eq!(minted, claimed);
    }
}
