//! Property-based tests for owner-only operations.
//!
//! Invariants tested:
//! - `update_withdrawal_fee` fails with `Unauthorized` for every non-owner and every rate
//! - `transfer_ownership` fails with `Unauthorized` for every non-owner
//! - Failed privileged calls leave the pool untouched

use proptest::prelude::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::Address;
use token_farm::ContractError;

use crate::support::setup;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_non_owner_cannot_update_fee(bps in any::<u32>()) {
        let farm = setup(10, 50);
        let intruder = Address::generate(&farm.env);

        match farm.client.try_update_withdrawal_fee(&intruder, &bps) {
            Err(Ok(e)) => prop_assert_eq!(e, ContractError::Unauthorized),
            _ => prop_assert!(false, "Expected Unauthorized error"),
        }
        prop_assert_eq!(farm.client.get_withdrawal_fee(), 50);
    }

    #[test]
    fn prop_non_owner_cannot_transfer_ownership(target_is_intruder in any::<bool>()) {
        let farm = setup(10, 50);
        let intruder = Address::generate(&farm.env);
        let target = if target_is_intruder {
            intruder.clone()
        } else {
            Address::generate(&farm.env)
        };

        match farm.client.try_transfer_ownership(&intruder, &target) {
            Err(Ok(e)) => prop_assert_eq!(e, ContractError::Unauthorized),
            _ => prop_assert!(false, "Expected Unauthorized error"),
        }
        prop_assert_eq!(farm.client.get_owner(), farm.owner);
    }

    #[test]
    fn prop_owner_fee_update_respects_range(bps in any::<u32>()) {
        let farm = setup(10, 50);

        let result = farm.client.try_update_withdrawal_fee(&farm.owner, &bps);
        if bps <= 10_000 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(farm.client.get_withdrawal_fee(), bps);
        } else {
            match result {
                Err(Ok(e)) => prop_assert_eq!(e, ContractError::InvalidFee),
                _ => prop_assert!(false, "Expected InvalidFee error"),
            }
            prop_assert_eq!(farm.client.get_withdrawal_fee(), 50);
        }
    }
}
