//! In-memory balance state for the active budget.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use envelope_domain::{BalanceKey, BudgetMonth, BudgetTotals, CategoryBalance, Displayable};

/// Plain balance data: the Ready to Assign pool and every category row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceState {
    pub ready_to_assign: Decimal,
    pub balances: Vec<CategoryBalance>,
}

impl BalanceState {
    pub fn balance(&self, category_id: Uuid, period: BudgetMonth) -> Option<&CategoryBalance> {
        let key = BalanceKey::new(category_id, period);
        self.balances.iter().find(|row| row.key() == key)
    }

    pub fn balance_mut(
        &mut self,
        category_id: Uuid,
        period: BudgetMonth,
    ) -> Option<&mut CategoryBalance> {
        let key = BalanceKey::new(category_id, period);
        self.balances.iter_mut().find(|row| row.key() == key)
    }

    /// Returns the row for `category_id`, inserting a zeroed one when the period has none.
    pub fn balance_or_insert(
        &mut self,
        budget_id: Uuid,
        category_id: Uuid,
        period: BudgetMonth,
    ) -> &mut CategoryBalance {
        let key = BalanceKey::new(category_id, period);
        let index = match self.balances.iter().position(|row| row.key() == key) {
            Some(index) => index,
            None => {
                self.balances
                    .push(CategoryBalance::zeroed(budget_id, category_id, period));
                self.balances.len() - 1
            }
        };
        &mut self.balances[index]
    }

    /// Inserts or overwrites the row sharing `balance`'s key.
    pub fn upsert(&mut self, balance: CategoryBalance) {
        let key = balance.key();
        match self.balances.iter_mut().find(|row| row.key() == key) {
            Some(existing) => *existing = balance,
            None => self.balances.push(balance),
        }
    }

    pub fn totals(&self) -> BudgetTotals {
        BudgetTotals::from_balances(self.ready_to_assign, &self.balances)
    }

    pub fn optimistic_count(&self) -> usize {
        self.balances.iter().filter(|row| row.is_optimistic).count()
    }
}

/// Authoritative balances returned by the budgeting API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerBalances {
    #[serde(default)]
    pub balances: Vec<CategoryBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_assign: Option<Decimal>,
}

impl ServerBalances {
    pub fn new(balances: Vec<CategoryBalance>, ready_to_assign: Option<Decimal>) -> Self {
        Self {
            balances,
            ready_to_assign,
        }
    }
}

/// Shared handle over one budget's balance state.
///
/// Cloning the handle shares the state. Locks are only taken inside synchronous sections,
/// never across an `.await`.
#[derive(Debug, Clone)]
pub struct BalanceStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    budget_id: Uuid,
    period: BudgetMonth,
    state: RwLock<BalanceState>,
    budget_gate: Mutex<()>,
}

impl BalanceStore {
    pub fn new(budget_id: Uuid, period: BudgetMonth) -> Self {
        Self::with_state(budget_id, period, BalanceState::default())
    }

    pub fn with_state(budget_id: Uuid, period: BudgetMonth, state: BalanceState) -> Self {
        let mut deduped = BalanceState {
            ready_to_assign: state.ready_to_assign,
            balances: Vec::with_capacity(state.balances.len()),
        };
        for row in state.balances {
            deduped.upsert(row);
        }
        Self {
            inner: Arc::new(StoreInner {
                budget_id,
                period,
                state: RwLock::new(deduped),
                budget_gate: Mutex::new(()),
            }),
        }
    }

    pub fn budget_id(&self) -> Uuid {
        self.inner.budget_id
    }

    /// The period mutations apply to.
    pub fn period(&self) -> BudgetMonth {
        self.inner.period
    }

    /// Balance of `category_id` in the active period.
    pub fn get_balance(&self, category_id: Uuid) -> Option<CategoryBalance> {
        self.read().balance(category_id, self.inner.period).cloned()
    }

    pub fn balance_in(&self, category_id: Uuid, period: BudgetMonth) -> Option<CategoryBalance> {
        self.read().balance(category_id, period).cloned()
    }

    pub fn balances(&self) -> Vec<CategoryBalance> {
        self.read().balances.clone()
    }

    pub fn ready_to_assign(&self) -> Decimal {
        self.read().ready_to_assign
    }

    /// Copy of the full state, for comparisons.
    pub fn state(&self) -> BalanceState {
        self.read().clone()
    }

    pub fn totals(&self) -> BudgetTotals {
        self.read().totals()
    }

    /// Replaces every balance row. Duplicate keys collapse to the last row given.
    pub fn replace_all(&self, balances: Vec<CategoryBalance>) {
        let mut state = self.write_guard();
        state.balances.clear();
        for row in balances {
            state.upsert(row);
        }
    }

    pub fn set_ready_to_assign(&self, amount: Decimal) {
        self.write_guard().ready_to_assign = amount;
    }

    /// Loads an authoritative snapshot, discarding everything held locally.
    pub fn load(&self, response: ServerBalances) {
        let rows = self.own_rows(response.balances);
        let mut state = self.write_guard();
        state.balances.clear();
        for row in rows {
            state.upsert(row.confirmed());
        }
        if let Some(amount) = response.ready_to_assign {
            state.ready_to_assign = amount;
        }
        debug!(
            "loaded {} balance(s) for budget {}",
            state.balances.len(),
            self.inner.budget_id
        );
    }

    /// Applies server-confirmed values on top of the current state, clearing the
    /// optimistic flag on every row the server returned.
    pub fn confirm(&self, response: ServerBalances) {
        let rows = self.own_rows(response.balances);
        let mut state = self.write_guard();
        for row in rows {
            debug!("confirmed {}", row.display_label());
            state.upsert(row.confirmed());
        }
        if let Some(amount) = response.ready_to_assign {
            state.ready_to_assign = amount;
        }
    }

    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut BalanceState) -> R) -> R {
        f(&mut self.write_guard())
    }

    pub(crate) fn budget_gate(&self) -> &Mutex<()> {
        &self.inner.budget_gate
    }

    fn own_rows(&self, rows: Vec<CategoryBalance>) -> Vec<CategoryBalance> {
        let budget_id = self.inner.budget_id;
        rows.into_iter()
            .filter(|row| {
                let ours = row.budget_id == budget_id;
                if !ours {
                    warn!(
                        "ignoring balance for category {} from budget {} (store holds {})",
                        row.category_id, row.budget_id, budget_id
                    );
                }
                ours
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BalanceState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BalanceState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
