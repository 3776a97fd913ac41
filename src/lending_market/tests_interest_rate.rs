#![allow(clippy::inconsistent_digit_grouping)]
#[cfg(test)]
mod tests {
    use decimal_wad::{common::WAD, decimal::Decimal};
    use quickcheck_macros::quickcheck;

    use crate::{
        lending_market::{
            interest_rate::{accrue_interest, borrow_rate, supply_rate, utilization},
            tests_utils::utils::default_params,
        },
        state::{Address, InterestParams, Market},
        utils::consts::{BPS_FACTOR, SECONDS_PER_YEAR},
    };

    fn market_with(total_supply: u64, total_borrows: u64) -> Market {
        let mut market = Market::new(Address::new_unique(), 7_500, 0);
        market.total_supply = total_supply;
        market.total_borrows = total_borrows;
        market
    }

    /// WAD-scaled integer reading of a Decimal below ~18.4.
    fn wad(value: Decimal) -> u64 {
        use decimal_wad::common::TryMul;
        value.try_mul(WAD).unwrap().try_floor_u64().unwrap()
    }

    /// Plain-u128 mirror of the rate curve, floored at every division the
    /// same way the Decimal pipeline floors.
    fn expected_borrow_rate_wad(supply: u64, borrows: u64, params: &InterestParams) -> u64 {
        let wad = WAD as u128;
        let bps = |x: u16| (x as u128) * wad / (BPS_FACTOR as u128);
        let base = bps(params.base_rate_bps);
        let annual = if supply == 0 {
            base
        } else {
            let util = (borrows as u128) * wad / (supply as u128);
            let optimal = bps(params.optimal_utilization_bps);
            if util <= optimal {
                base + util * bps(params.multiplier_bps) / wad
            } else {
                base + optimal * bps(params.multiplier_bps) / wad
                    + (util - optimal) * bps(params.jump_multiplier_bps) / wad
            }
        };
        (annual / (SECONDS_PER_YEAR as u128)) as u64
    }

    #[test]
    fn test_empty_market_rate_is_base_rate() {
        let params = default_params();
        let market = market_with(0, 0);

        let rate = borrow_rate(&market, &params).unwrap();

        // base 2% annual, divided down to per-second
        let expected = (200u128 * (WAD as u128) / 10_000) / (SECONDS_PER_YEAR as u128);
        assert_eq!(wad(rate) as u128, expected);
        assert_eq!(utilization(&market).unwrap(), Decimal::zero());
    }

    #[test]
    fn test_rate_linear_below_kink() {
        let params = default_params();
        // utilization 50%
        let market = market_with(10_000_000, 5_000_000);

        let rate = borrow_rate(&market, &params).unwrap();

        assert_eq!(wad(rate), expected_borrow_rate_wad(10_000_000, 5_000_000, &params));
    }

    #[test]
    fn test_rate_continuous_at_kink() {
        let params = default_params();
        // utilization exactly at the 80% kink
        let market = market_with(10_000_000, 8_000_000);

        let rate = borrow_rate(&market, &params).unwrap();

        // the jump branch with zero excess must agree with the linear branch
        let wad_ = WAD as u128;
        let base = 200u128 * wad_ / 10_000;
        let kink = (8_000u128 * wad_ / 10_000) * (1_000u128 * wad_ / 10_000) / wad_;
        let expected = ((base + kink) / (SECONDS_PER_YEAR as u128)) as u64;
        assert_eq!(wad(rate), expected);
        assert_eq!(wad(rate), expected_borrow_rate_wad(10_000_000, 8_000_000, &params));
    }

    #[test]
    fn test_rate_jumps_above_kink() {
        let params = default_params();
        let at_kink = borrow_rate(&market_with(10_000_000, 8_000_000), &params).unwrap();
        let above = borrow_rate(&market_with(10_000_000, 9_000_000), &params).unwrap();

        assert!(above > at_kink);
        assert_eq!(
            wad(above),
            expected_borrow_rate_wad(10_000_000, 9_000_000, &params)
        );
    }

    #[test]
    fn test_supply_rate_formula() {
        let params = default_params();
        let market = market_with(10_000_000, 5_000_000);

        let rate = supply_rate(&market, &params).unwrap();

        // borrow_rate * utilization * (1 - reserve_factor), floored stepwise
        let wad_ = WAD as u128;
        let borrow = expected_borrow_rate_wad(10_000_000, 5_000_000, &params) as u128;
        let util = 5_000_000u128 * wad_ / 10_000_000;
        let share = 9_000u128 * wad_ / 10_000;
        let expected = ((borrow * util / wad_) * share / wad_) as u64;
        assert_eq!(wad(rate), expected);
    }

    #[test]
    fn test_supply_rate_with_out_of_range_reserve_factor() {
        // fields are pub, so a hand-built config can bypass the update check
        let mut params = default_params();
        params.reserve_factor_bps = 12_000;
        let market = market_with(10_000_000, 5_000_000);

        let rate = supply_rate(&market, &params).unwrap();
        assert_eq!(rate, Decimal::zero());
    }

    #[test]
    fn test_accrual_zero_elapsed_is_noop() {
        let params = default_params();
        let mut market = market_with(10_000_000, 5_000_000);
        market.last_update = 500;

        accrue_interest(&mut market, &params, 500).unwrap();

        assert_eq!(market.total_borrows, 5_000_000);
        assert_eq!(market.reserve_amount, 0);
        assert_eq!(market.borrow_index, Decimal::one());
    }

    #[test]
    fn test_accrual_is_idempotent_within_timestamp() {
        let params = default_params();
        let mut market = market_with(10_000_000_000, 5_000_000_000);

        accrue_interest(&mut market, &params, 1_000_000).unwrap();
        let borrows = market.total_borrows;
        let reserves = market.reserve_amount;
        let index = market.borrow_index;

        accrue_interest(&mut market, &params, 1_000_000).unwrap();

        assert_eq!(market.total_borrows, borrows);
        assert_eq!(market.reserve_amount, reserves);
        assert_eq!(market.borrow_index, index);
        assert_eq!(market.last_update, 1_000_000);
    }

    #[test]
    fn test_accrual_splits_interest_with_reserve() {
        let params = default_params();
        let mut market = market_with(10_000_000_000, 5_000_000_000);

        accrue_interest(&mut market, &params, SECONDS_PER_YEAR).unwrap();

        let wad_ = WAD as u128;
        let rate = expected_borrow_rate_wad(10_000_000_000, 5_000_000_000, &params) as u128;
        let factor = rate * (SECONDS_PER_YEAR as u128);
        let interest = (5_000_000_000u128 * factor / wad_) as u64;
        let reserve_delta = interest * 1_000 / 10_000;

        // ~7% annual at 50% utilization; sanity floor so the numbers are real
        assert!(interest > 300_000_000);
        assert_eq!(market.total_borrows, 5_000_000_000 + interest);
        assert_eq!(market.reserve_amount, reserve_delta);
        assert!(market.borrow_index > Decimal::one());
        assert_eq!(market.last_update, SECONDS_PER_YEAR);
    }

    #[test]
    fn test_param_update_applies_from_next_accrual() {
        let mut params = default_params();
        let mut market = market_with(10_000_000_000, 5_000_000_000);

        accrue_interest(&mut market, &params, 1_000).unwrap();
        let borrows_after_first = market.total_borrows;

        // double the base rate; only the second accrual window sees it
        params.base_rate_bps = 400;
        accrue_interest(&mut market, &params, 2_000).unwrap();

        let second_window = market.total_borrows - borrows_after_first;
        let first_window = borrows_after_first - 5_000_000_000;
        assert!(second_window > first_window);
    }

    #[quickcheck]
    fn prop_borrow_index_never_decreases(elapses: Vec<u16>) -> bool {
        let params = default_params();
        let mut market = market_with(10_000_000_000, 9_000_000_000);
        let mut now = 0u64;
        let mut previous = market.borrow_index;

        for elapsed in elapses {
            now += elapsed as u64;
            accrue_interest(&mut market, &params, now).unwrap();
            if market.borrow_index < previous {
                return false;
            }
            previous = market.borrow_index;
        }
        true
    }

    #[quickcheck]
    fn prop_borrow_rate_at_least_base(supply: u64, borrows: u64) -> bool {
        let params = default_params();
        // allow utilization past 100%, but keep it below the point where the
        // WAD reading of the rate would no longer fit a u64
        let supply = supply % 1_000_000_000_000;
        let borrows = borrows % supply.max(1).saturating_mul(1_000);
        let market = market_with(supply, borrows);

        let rate = borrow_rate(&market, &params).unwrap();
        let base_floor = expected_borrow_rate_wad(0, 0, &params);
        wad(rate) >= base_floor
    }

    #[test]
    fn test_borrow_rate_handles_extreme_utilization() {
        let params = default_params();
        // one base unit of supply against a large debt
        let market = market_with(1, 232_694_610);
        assert!(borrow_rate(&market, &params).is_ok());
    }
}
