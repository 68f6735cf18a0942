use soroban_sdk::contracttype;

use crate::ContractError;

/// 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// How a withdrawn balance is divided between the staker and the fee recipient.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeSplit {
    pub payout: i128,
    pub fee: i128,
}

pub fn validate_bps(bps: u32) -> Result<(), ContractError> {
    if bps > BPS_DENOMINATOR {
        return Err(ContractError::InvalidFee);
    }
    Ok(())
}

/// `fee = floor(amount * bps / 10_000)`, `payout = amount - fee`.
///
/// A rate of 10_000 is legal and sends the whole amount to the fee recipient.
pub fn split(amount: i128, bps: u32) -> Result<FeeSplit, ContractError> {
    if amount < 0 {
        return Err(ContractError::InvalidAmount);
    }
    validate_bps(bps)?;

    let fee = amount
        .checked_mul(i128::from(bps))
        .ok_or(ContractError::ArithmeticOverflow)?
        / i128::from(BPS_DENOMINATOR);

    Ok(FeeSplit {
        payout: amount - fee,
        fee,
    })
}
