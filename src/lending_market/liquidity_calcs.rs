use serde::Serialize;

use crate::{
    state::{Address, MarketLedger, PositionStore, Price},
    token_interface::{ClaimTokenSource, PriceSource},
    utils::{
        consts::{LIQUIDATION_BONUS_BPS, USD_DECIMALS},
        coretypes::{mul_bps, ten_pow, CheckedAssign},
    },
    LendingError,
};

/// Cross-market USD position of one account.
///
/// At most one of the two fields is nonzero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountLiquidity {
    pub excess_usd: u64,
    pub shortfall_usd: u64,
}

/// `10^(decimals + exp - USD_DECIMALS)`, signed: low-exponent quotes scale
/// the other way.
fn usd_scale(price: &Price, decimals: u8) -> Result<(u128, bool), LendingError> {
    let exp = decimals as u32 + price.exp as u32;
    let (magnitude, scales_down) = if exp >= USD_DECIMALS as u32 {
        (exp - USD_DECIMALS as u32, true)
    } else {
        (USD_DECIMALS as u32 - exp, false)
    };
    let magnitude = u8::try_from(magnitude).map_err(|_| LendingError::ConversionFailure)?;
    Ok((ten_pow(magnitude)?, scales_down))
}

/// USD value (6 decimals) of `amount` base units priced at `price`.
pub fn usd_value(amount: u64, price: &Price, decimals: u8) -> Result<u64, LendingError> {
    let (scale, scales_down) = usd_scale(price, decimals)?;
    let quoted = (amount as u128)
        .checked_mul(price.value as u128)
        .ok_or(LendingError::MathOverflow)?;
    let value = if scales_down {
        quoted / scale
    } else {
        quoted.checked_mul(scale).ok_or(LendingError::MathOverflow)?
    };
    u64::try_from(value).map_err(|_| LendingError::MathOverflow)
}

/// Base units of an asset worth `usd` (6 decimals) at `price`.
pub fn amount_from_usd(usd: u64, price: &Price, decimals: u8) -> Result<u64, LendingError> {
    if price.value == 0 {
        return Err(LendingError::PriceNotValid);
    }
    let (scale, scales_down) = usd_scale(price, decimals)?;
    let amount = if scales_down {
        (usd as u128)
            .checked_mul(scale)
            .ok_or(LendingError::MathOverflow)?
            / (price.value as u128)
    } else {
        (usd as u128)
            / (price.value as u128)
                .checked_mul(scale)
                .ok_or(LendingError::MathOverflow)?
    };
    u64::try_from(amount).map_err(|_| LendingError::MathOverflow)
}

/// Discounted collateral value vs. realized debt value across every listed
/// market, in listing order.
///
/// This is a full scan on purpose; nothing is cached between calls because a
/// transition may accrue interest between two invocations. Prices are only
/// fetched for markets the account actually touches.
pub fn account_liquidity(
    markets: &MarketLedger,
    positions: &PositionStore,
    user: &Address,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
) -> Result<AccountLiquidity, LendingError> {
    let mut collateral_value: u64 = 0;
    let mut debt_value: u64 = 0;

    for asset in markets.listed_assets() {
        let market = markets.market(asset)?;

        if positions.is_collateral(user, asset) {
            let claim_balance = claims.claim_balance_of(&market.claim_token, user);
            if claim_balance > 0 {
                let value = usd_value(
                    claim_balance,
                    &prices.price_usd(asset)?,
                    prices.decimals(asset)?,
                )?;
                collateral_value
                    .checked_add_assign(mul_bps(value, market.collateral_factor_bps))?;
            }
        }

        let borrowed = positions.realized_borrow_balance(user, asset, market.borrow_index)?;
        if borrowed > 0 {
            debt_value.checked_add_assign(usd_value(
                borrowed,
                &prices.price_usd(asset)?,
                prices.decimals(asset)?,
            )?)?;
        }
    }

    Ok(if collateral_value >= debt_value {
        AccountLiquidity {
            excess_usd: collateral_value - debt_value,
            shortfall_usd: 0,
        }
    } else {
        AccountLiquidity {
            excess_usd: 0,
            shortfall_usd: debt_value - collateral_value,
        }
    })
}

/// A borrow of `new_debt` base units must be fully covered by current excess.
pub fn try_borrow(
    markets: &MarketLedger,
    positions: &PositionStore,
    user: &Address,
    asset: &Address,
    new_debt: u64,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
) -> Result<(), LendingError> {
    let liquidity = account_liquidity(markets, positions, user, prices, claims)?;
    let new_debt_value = usd_value(
        new_debt,
        &prices.price_usd(asset)?,
        prices.decimals(asset)?,
    )?;
    if liquidity.shortfall_usd > 0 || liquidity.excess_usd < new_debt_value {
        return Err(LendingError::InsufficientCollateral);
    }
    Ok(())
}

/// Withdrawing flagged collateral must leave the full undiscounted value of
/// the withdrawal covered by excess.
pub fn try_withdraw(
    markets: &MarketLedger,
    positions: &PositionStore,
    user: &Address,
    asset: &Address,
    amount: u64,
    prices: &impl PriceSource,
    claims: &impl ClaimTokenSource,
) -> Result<(), LendingError> {
    let liquidity = account_liquidity(markets, positions, user, prices, claims)?;
    let withdrawn_value = usd_value(amount, &prices.price_usd(asset)?, prices.decimals(asset)?)?;
    if liquidity.shortfall_usd > 0 || liquidity.excess_usd < withdrawn_value {
        return Err(LendingError::InsufficientCollateral);
    }
    Ok(())
}

/// Claim tokens seized for repaying `repay_amount` of debt, bonus included.
///
/// Both conversions floor, so the seized USD value never exceeds
/// `repay value * (1 + bonus)`.
pub fn seize_claim_amount(
    repay_amount: u64,
    repay_price: &Price,
    repay_decimals: u8,
    collateral_price: &Price,
    collateral_decimals: u8,
) -> Result<u64, LendingError> {
    let repay_value = usd_value(repay_amount, repay_price, repay_decimals)?;
    let mut seize_value = repay_value;
    seize_value.checked_add_assign(mul_bps(repay_value, LIQUIDATION_BONUS_BPS))?;
    amount_from_usd(seize_value, collateral_price, collateral_decimals)
}
