//! Token ledger capability used by the farm.
//!
//! The two assets live in external SEP-41 token contracts. Every movement is
//! checked against the ledger first so a refusal surfaces as a typed
//! [`ContractError`] before anything is transferred.

use soroban_sdk::{token, Address, Env};

use crate::ContractError;

pub struct TokenLedger<'a> {
    env: &'a Env,
    farm: Address,
}

impl<'a> TokenLedger<'a> {
    pub fn new(env: &'a Env) -> Self {
        TokenLedger {
            env,
            farm: env.current_contract_address(),
        }
    }

    /// Pull `amount` of `asset` from `owner` into the farm's custody, spending
    /// the allowance `owner` granted the farm.
    pub fn transfer_from(
        &self,
        asset: &Address,
        owner: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let client = token::Client::new(self.env, asset);
        if client.allowance(owner, &self.farm) < amount {
            return Err(ContractError::InsufficientAllowance);
        }
        if client.balance(owner) < amount {
            return Err(ContractError::InsufficientBalance);
        }
        client.transfer_from(&self.farm, owner, &self.farm, &amount);
        Ok(())
    }

    /// Send `amount` of `asset` out of the farm's custody. Zero is a no-op.
    pub fn transfer(&self, asset: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
        if amount == 0 {
            return Ok(());
        }
        let client = token::Client::new(self.env, asset);
        if client.balance(&self.farm) < amount {
            return Err(ContractError::InsufficientBalance);
        }
        client.transfer(&self.farm, to, &amount);
        Ok(())
    }

    /// Mint new `asset` supply to `to`. The farm must administer `asset`.
    pub fn mint(&self, asset: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
        if amount == 0 {
            return Ok(());
        }
        let admin_client = token::StellarAssetClient::new(self.env, asset);
        if admin_client.admin() != self.farm {
            return Err(ContractError::Unauthorized);
        }
        admin_client.mint(to, &amount);
        Ok(())
    }
}
