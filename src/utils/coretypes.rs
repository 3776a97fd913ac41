use std::fmt;

use crate::{state::Price, LendingError};

use super::consts::BPS_FACTOR;

pub trait CheckedAssign {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), LendingError>;
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), LendingError>;
}

impl CheckedAssign for u64 {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), LendingError> {
        *self = self.checked_add(rhs).ok_or(LendingError::MathOverflow)?;
        Ok(())
    }
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), LendingError> {
        *self = self.checked_sub(rhs).ok_or(LendingError::MathOverflow)?;
        Ok(())
    }
}

impl CheckedAssign for u128 {
    fn checked_add_assign(&mut self, rhs: Self) -> Result<(), LendingError> {
        *self = self.checked_add(rhs).ok_or(LendingError::MathOverflow)?;
        Ok(())
    }
    fn checked_sub_assign(&mut self, rhs: Self) -> Result<(), LendingError> {
        *self = self.checked_sub(rhs).ok_or(LendingError::MathOverflow)?;
        Ok(())
    }
}

/// Floor of `amount * bps / 10_000`.
pub fn mul_bps(amount: u64, bps: u16) -> u64 {
    ((amount as u128) * (bps as u128) / (BPS_FACTOR as u128)) as u64
}

pub fn ten_pow(exponent: u8) -> Result<u128, LendingError> {
    10u128
        .checked_pow(exponent as u32)
        .ok_or(LendingError::ConversionFailure)
}

impl Price {
    pub fn from(value: u64, exp: u8) -> Self {
        Price { value, exp }
    }

    pub fn f64(&self) -> f64 {
        (self.value as f64) / 10_f64.powf(self.exp as f64)
    }

    #[cfg(test)]
    pub fn from_f64(price: f64, exp: u8) -> Price {
        let val = (price * 10_f64.powf(exp as f64)) as u64;
        Self::from(val, exp)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "px={}", self.f64())
    }
}
