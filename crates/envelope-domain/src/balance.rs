//! Domain types representing per-period category balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Displayable, DomainError};
use crate::period::BudgetMonth;

/// Uniqueness key for a category balance: one row per category per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub category_id: Uuid,
    pub year: i32,
    pub month: u32,
}

impl BalanceKey {
    pub fn new(category_id: Uuid, period: BudgetMonth) -> Self {
        Self {
            category_id,
            year: period.year(),
            month: period.month(),
        }
    }
}

/// Envelope balance for a single category within one budget month.
///
/// `available` is maintained incrementally (carry-over + assigned + activity) and is
/// never recomputed from the other two fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBalance {
    pub category_id: Uuid,
    pub budget_id: Uuid,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub assigned: Decimal,
    #[serde(default)]
    pub activity: Decimal,
    #[serde(default)]
    pub available: Decimal,
    #[serde(default)]
    pub is_optimistic: bool,
}

impl CategoryBalance {
    pub fn new(
        budget_id: Uuid,
        category_id: Uuid,
        period: BudgetMonth,
        assigned: Decimal,
        activity: Decimal,
        available: Decimal,
    ) -> Self {
        Self {
            category_id,
            budget_id,
            year: period.year(),
            month: period.month(),
            assigned,
            activity,
            available,
            is_optimistic: false,
        }
    }

    /// Creates an empty row for a category that has no record in `period` yet.
    pub fn zeroed(budget_id: Uuid, category_id: Uuid, period: BudgetMonth) -> Self {
        Self::new(
            budget_id,
            category_id,
            period,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        )
    }

    pub fn key(&self) -> BalanceKey {
        BalanceKey {
            category_id: self.category_id,
            year: self.year,
            month: self.month,
        }
    }

    /// Validated period of the row; decoded payloads may carry an out-of-range month.
    pub fn period(&self) -> Result<BudgetMonth, DomainError> {
        BudgetMonth::new(self.year, self.month)
    }

    pub fn is_in(&self, period: BudgetMonth) -> bool {
        self.year == period.year() && self.month == period.month()
    }

    pub fn mark_optimistic(&mut self) {
        self.is_optimistic = true;
    }

    /// Returns the row flagged as server-confirmed.
    pub fn confirmed(mut self) -> Self {
        self.is_optimistic = false;
        self
    }
}

impl Displayable for CategoryBalance {
    fn display_label(&self) -> String {
        format!(
            "{} {}-{:02} (assigned {}, available {})",
            self.category_id, self.year, self.month, self.assigned, self.available
        )
    }
}

/// Aggregated view of a budget's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetTotals {
    pub ready_to_assign: Decimal,
    pub total_assigned: Decimal,
    pub total_available: Decimal,
}

impl BudgetTotals {
    /// Sums saturate at the `Decimal` bounds instead of overflowing.
    pub fn from_balances<'a, I>(ready_to_assign: Decimal, balances: I) -> Self
    where
        I: IntoIterator<Item = &'a CategoryBalance>,
    {
        let (total_assigned, total_available) = balances
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(assigned, available), row| {
                (
                    assigned.saturating_add(row.assigned),
                    available.saturating_add(row.available),
                )
            });
        Self {
            ready_to_assign,
            total_assigned,
            total_available,
        }
    }

    /// Ready to Assign plus everything assigned; every mutation must leave this unchanged.
    pub fn funded_total(&self) -> Decimal {
        self.ready_to_assign.saturating_add(self.total_assigned)
    }
}
