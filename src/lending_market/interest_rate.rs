use decimal_wad::{
    common::{TryAdd, TryDiv, TryMul, TrySub},
    decimal::Decimal,
    rate::Rate,
};
use tracing::debug;

use crate::{
    state::{InterestParams, Market},
    utils::{
        consts::{BPS_FACTOR, SECONDS_PER_YEAR},
        coretypes::{mul_bps, CheckedAssign},
    },
    LendingError,
};

/// `total_borrows / total_supply`, zero for an empty market.
///
/// Can exceed 1.0 once reserves have been withdrawn against outstanding debt.
pub fn utilization(market: &Market) -> Result<Decimal, LendingError> {
    if market.total_supply == 0 {
        return Ok(Decimal::zero());
    }
    Ok(Decimal::from(market.total_borrows).try_div(market.total_supply)?)
}

/// Per-second borrow rate from the kinked utilization curve.
///
/// Linear in utilization up to the optimal point, then the jump multiplier
/// takes over. The annual rate is divided by seconds-per-year last, so all
/// multiplications happen before the one truncating division.
pub fn borrow_rate(market: &Market, params: &InterestParams) -> Result<Decimal, LendingError> {
    let base = Decimal::from(Rate::from_bps(params.base_rate_bps));

    let annual = if market.total_supply == 0 {
        base
    } else {
        let util = utilization(market)?;
        let optimal = Decimal::from(Rate::from_bps(params.optimal_utilization_bps));
        if util <= optimal {
            base.try_add(util.try_mul(Rate::from_bps(params.multiplier_bps))?)?
        } else {
            let kink = optimal.try_mul(Rate::from_bps(params.multiplier_bps))?;
            let excess = util
                .try_sub(optimal)?
                .try_mul(Rate::from_bps(params.jump_multiplier_bps))?;
            base.try_add(kink)?.try_add(excess)?
        }
    };

    Ok(annual.try_div(SECONDS_PER_YEAR)?)
}

/// Per-second rate paid to suppliers:
/// `borrow_rate * utilization * (1 - reserve_factor)`.
pub fn supply_rate(market: &Market, params: &InterestParams) -> Result<Decimal, LendingError> {
    let rate = borrow_rate(market, params)?;
    let util = utilization(market)?;
    // an out-of-range reserve factor leaves suppliers with nothing
    let share_bps = (BPS_FACTOR as u16).saturating_sub(params.reserve_factor_bps);
    Ok(rate.try_mul(util)?.try_mul(Rate::from_bps(share_bps))?)
}

/// Realize the interest owed since `last_update` into the market aggregates.
///
/// Idempotent within a timestamp: zero elapsed seconds changes nothing.
/// Every transition must call this on each market it touches before reading
/// any balance that depends on the index.
pub fn accrue_interest(
    market: &mut Market,
    params: &InterestParams,
    now: u64,
) -> Result<(), LendingError> {
    let elapsed = now.saturating_sub(market.last_update);
    if elapsed == 0 {
        return Ok(());
    }

    let rate = borrow_rate(market, params)?;
    let factor = rate.try_mul(elapsed)?;
    let interest = Decimal::from(market.total_borrows)
        .try_mul(factor)?
        .try_floor_u64()?;
    let reserve_delta = mul_bps(interest, params.reserve_factor_bps);

    market.reserve_amount.checked_add_assign(reserve_delta)?;
    market.total_borrows.checked_add_assign(interest)?;
    market.borrow_index = market
        .borrow_index
        .try_mul(Decimal::one().try_add(factor)?)?;
    market.last_update = now;

    debug!(
        elapsed,
        interest,
        total_borrows = market.total_borrows,
        "accrued interest"
    );

    Ok(())
}
