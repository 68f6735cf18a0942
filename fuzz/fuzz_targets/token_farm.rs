#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use token_farm::{
    pool::{AccrualClock, FarmConfig, RewardSource},
    TokenFarm, TokenFarmClient,
};

const FUNDING: i128 = 1_000_000_000_000;
// Stay well inside the default testutils entry TTL.
const MAX_ADVANCE: u32 = 2_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { amount: u64 },
    Withdraw,
    ClaimRewards,
    DistributeAll,
    UpdateFee { bps: u32 },
    SetRewardRate { rate: u32 },
    Advance { ledgers: u8 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(TokenFarm, ());
    let client = TokenFarmClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(
        &owner,
        &FarmConfig {
            stake_token: stake_token.clone(),
            reward_token: reward_token.clone(),
            reward_rate: 100,
            withdrawal_fee_bps: 50,
            clock: AccrualClock::LedgerSequence,
            reward_source: RewardSource::Mint,
        },
    );
    StellarAssetClient::new(&env, &reward_token).set_admin(&contract_id);

    let stake = TokenClient::new(&env, &stake_token);
    let mut users = vec![owner.clone()];
    for _ in 0..4 {
        users.push(Address::generate(&env));
    }
    for user in &users {
        StellarAssetClient::new(&env, &stake_token).mint(user, &FUNDING);
        stake.approve(user, &contract_id, &FUNDING, &(env.ledger().sequence() + 10_000));
    }

    let mut advanced = 0u32;

    // Every failure must surface as a contract error and leave balances conserved.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Deposit { amount } => {
                let _ = client.try_deposit(caller, &(amount as i128));
            }
            FuzzAction::Withdraw => {
                let _ = client.try_withdraw(caller);
            }
            FuzzAction::ClaimRewards => {
                let _ = client.try_claim_rewards(caller);
            }
            FuzzAction::DistributeAll => {
                let _ = client.try_distribute_rewards_all();
            }
            FuzzAction::UpdateFee { bps } => {
                let _ = client.try_update_withdrawal_fee(caller, &bps);
            }
            FuzzAction::SetRewardRate { rate } => {
                let _ = client.try_set_reward_rate(caller, &(rate as i128));
            }
            FuzzAction::Advance { ledgers } => {
                let step = u32::from(ledgers).min(MAX_ADVANCE - advanced);
                advanced += step;
                env.ledger().with_mut(|li| li.sequence_number += step);
            }
        }

        let total = client.get_total_staked();
        let sum: i128 = users
            .iter()
            .map(|u| client.get_staker_info(u).balance)
            .sum();
        assert_eq!(sum, total);
        assert_eq!(stake.balance(&contract_id), total);

        let held: i128 = users.iter().map(|u| stake.balance(u)).sum();
        assert_eq!(held + total, FUNDING * users.len() as i128);
    }
});
