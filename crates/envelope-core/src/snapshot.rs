//! Save/restore of balance state around a speculative mutation.

use rust_decimal::Decimal;
use tracing::debug;

use envelope_domain::{BudgetTotals, CategoryBalance};

use crate::store::BalanceStore;

/// Owned copy of the state taken before an optimistic edit.
///
/// Each attempt owns its snapshot: it is dropped on commit and consumed by
/// [`BalanceStore::restore`] on rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticSnapshot {
    original_ready_to_assign: Decimal,
    original_category_balances: Vec<CategoryBalance>,
}

impl OptimisticSnapshot {
    pub fn ready_to_assign(&self) -> Decimal {
        self.original_ready_to_assign
    }

    pub fn balances(&self) -> &[CategoryBalance] {
        &self.original_category_balances
    }

    pub fn totals(&self) -> BudgetTotals {
        BudgetTotals::from_balances(
            self.original_ready_to_assign,
            &self.original_category_balances,
        )
    }
}

impl BalanceStore {
    /// Captures Ready to Assign and every balance row, optimistic flags included.
    pub fn save(&self) -> OptimisticSnapshot {
        let state = self.state();
        OptimisticSnapshot {
            original_ready_to_assign: state.ready_to_assign,
            original_category_balances: state.balances,
        }
    }

    /// Puts the state back exactly as it was when `snapshot` was taken.
    pub fn restore(&self, snapshot: OptimisticSnapshot) {
        let restored = snapshot.original_category_balances.len();
        self.mutate(|state| {
            state.ready_to_assign = snapshot.original_ready_to_assign;
            state.balances = snapshot.original_category_balances;
        });
        debug!("restored {} balance(s) from snapshot", restored);
    }
}
