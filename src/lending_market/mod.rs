pub mod interest_rate;
pub mod liquidity_calcs;
pub mod market_operations;
#[cfg(test)]
pub mod tests_interest_rate;
pub mod types;
