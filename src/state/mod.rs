use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

mod market;
mod user_position;

pub use market::{Market, MarketLedger};
pub use user_position::{PositionStore, UserPosition};

/// Opaque 32-byte identifier for users, assets and claim tokens.
///
/// The ledger never interprets the bytes; it only uses them as lookup keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub fn zero() -> Self {
        Address([0; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Process-unique address, for tests and embedders that mint their own ids.
    pub fn new_unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Integer + exponent USD quote for one whole unit of an asset.
///
/// decimal price would be
/// as integer: 6462236900000, exponent: 8
/// as float:   64622.36900000
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub value: u64,
    pub exp: u8,
}

/// Interest curve and reserve parameters, owner-mutable.
///
/// All rates are annual, in bps. A change takes effect at the next accrual;
/// already-accrued interest is never recomputed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestParams {
    pub base_rate_bps: u16,
    pub multiplier_bps: u16,
    pub jump_multiplier_bps: u16,
    pub optimal_utilization_bps: u16,
    pub reserve_factor_bps: u16,
}

#[derive(Debug, Default, Clone)]
pub struct GlobalConfig {
    pub interest_params: InterestParams,
    pub fee_collector: Address,
}
