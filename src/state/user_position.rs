use std::collections::HashMap;

use decimal_wad::{
    common::{TryDiv, TryMul},
    decimal::Decimal,
};

use crate::{utils::coretypes::CheckedAssign, LendingError};

use super::Address;

/// Per-(user, market) borrow snapshot.
///
/// `borrow_balance` is principal plus interest as of the moment
/// `borrow_index_snapshot` was taken. Interest since then is realized by
/// scaling with the market's current index. A record repaid to zero stays in
/// the table; only the balance goes to zero.
#[derive(Debug, Default, Clone)]
pub struct UserPosition {
    pub borrow_balance: u64,
    pub borrow_index_snapshot: Decimal,
}

impl UserPosition {
    /// Balance including interest compounded up to `borrow_index`.
    ///
    /// This is the only place per-user interest is realized; callers must
    /// not cache the result beyond the current transition.
    pub fn realized_balance(&self, borrow_index: Decimal) -> Result<u64, LendingError> {
        if self.borrow_balance == 0 || self.borrow_index_snapshot == Decimal::zero() {
            return Ok(0);
        }
        let realized = Decimal::from(self.borrow_balance)
            .try_mul(borrow_index)?
            .try_div(self.borrow_index_snapshot)?;
        Ok(realized.try_floor_u64()?)
    }

    /// Realize pending interest, add `added` and re-snapshot at `borrow_index`.
    pub fn apply_borrow(&mut self, borrow_index: Decimal, added: u64) -> Result<(), LendingError> {
        let mut balance = self.realized_balance(borrow_index)?;
        balance.checked_add_assign(added)?;
        self.borrow_balance = balance;
        self.borrow_index_snapshot = borrow_index;
        Ok(())
    }

    /// Realize pending interest, subtract `repaid` and re-snapshot.
    pub fn apply_repay(&mut self, borrow_index: Decimal, repaid: u64) -> Result<(), LendingError> {
        let balance = self.realized_balance(borrow_index)?;
        let remaining = balance
            .checked_sub(repaid)
            .ok_or(LendingError::RepayExceedsDebt)?;
        self.borrow_balance = remaining;
        self.borrow_index_snapshot = borrow_index;
        Ok(())
    }
}

/// Borrow and collateral-flag tables, keyed by (user, asset).
#[derive(Debug, Default, Clone)]
pub struct PositionStore {
    borrows: HashMap<(Address, Address), UserPosition>,
    collateral_flags: HashMap<(Address, Address), bool>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, user: &Address, asset: &Address) -> Option<&UserPosition> {
        self.borrows.get(&(*user, *asset))
    }

    /// Lazily creates the record on first borrow.
    pub fn position_mut(&mut self, user: &Address, asset: &Address) -> &mut UserPosition {
        self.borrows.entry((*user, *asset)).or_default()
    }

    pub fn realized_borrow_balance(
        &self,
        user: &Address,
        asset: &Address,
        borrow_index: Decimal,
    ) -> Result<u64, LendingError> {
        match self.position(user, asset) {
            Some(position) => position.realized_balance(borrow_index),
            None => Ok(0),
        }
    }

    pub fn is_collateral(&self, user: &Address, asset: &Address) -> bool {
        self.collateral_flags
            .get(&(*user, *asset))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_collateral(&mut self, user: &Address, asset: &Address, enabled: bool) {
        self.collateral_flags.insert((*user, *asset), enabled);
    }
}
