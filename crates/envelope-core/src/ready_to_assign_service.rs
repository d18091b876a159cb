//! Transfers between category envelopes and the Ready to Assign pool.

use rust_decimal::Decimal;
use uuid::Uuid;

use envelope_domain::BudgetMonth;

use crate::error::{CoreResult, PreconditionError};
use crate::gate::{UnitGate, UnitOptions};
use crate::mutation::{BalanceMutation, MutationKind, MutationRequest};
use crate::optimistic::with_optimistic_update;
use crate::remote::RemoteBalanceMutator;
use crate::store::{BalanceState, BalanceStore};

/// Returns assigned money from a category to Ready to Assign.
#[derive(Debug)]
pub struct MoveToReadyToAssignService {
    store: BalanceStore,
    gate: UnitGate,
}

impl MoveToReadyToAssignService {
    pub fn new(store: BalanceStore, options: UnitOptions) -> Self {
        Self {
            store,
            gate: UnitGate::new(MutationKind::MoveToReadyToAssign, options),
        }
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn move_to_ready_to_assign<R>(
        &self,
        source: Uuid,
        amount: Decimal,
        remote: &R,
    ) -> CoreResult<()>
    where
        R: RemoteBalanceMutator + ?Sized,
    {
        let _permit = self.gate.enter(&self.store).await?;
        let period = self.store.period();
        let request = MutationRequest::new(
            self.store.budget_id(),
            period,
            BalanceMutation::MoveToReadyToAssign { source, amount },
        );
        with_optimistic_update(
            &self.store,
            &request,
            |state| apply_move_to_ready_to_assign(state, period, source, amount),
            || remote.commit(&request, &self.store),
        )
        .await
    }
}

/// Assigns money from Ready to Assign into a category.
#[derive(Debug)]
pub struct PullFromReadyToAssignService {
    store: BalanceStore,
    gate: UnitGate,
}

impl PullFromReadyToAssignService {
    pub fn new(store: BalanceStore, options: UnitOptions) -> Self {
        Self {
            store,
            gate: UnitGate::new(MutationKind::PullFromReadyToAssign, options),
        }
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn pull_from_ready_to_assign<R>(
        &self,
        destination: Uuid,
        amount: Decimal,
        remote: &R,
    ) -> CoreResult<()>
    where
        R: RemoteBalanceMutator + ?Sized,
    {
        let _permit = self.gate.enter(&self.store).await?;
        let budget_id = self.store.budget_id();
        let period = self.store.period();
        let request = MutationRequest::new(
            budget_id,
            period,
            BalanceMutation::PullFromReadyToAssign {
                destination,
                amount,
            },
        );
        with_optimistic_update(
            &self.store,
            &request,
            |state| apply_pull_from_ready_to_assign(state, budget_id, period, destination, amount),
            || remote.commit(&request, &self.store),
        )
        .await
    }
}

pub(crate) fn apply_move_to_ready_to_assign(
    state: &mut BalanceState,
    period: BudgetMonth,
    source: Uuid,
    amount: Decimal,
) -> Result<(), PreconditionError> {
    if amount <= Decimal::ZERO {
        return Err(PreconditionError::NonPositiveAmount(amount));
    }
    let row = state
        .balance(source, period)
        .ok_or(PreconditionError::MissingBalance {
            category_id: source,
            period,
        })?;
    if row.available < amount {
        return Err(PreconditionError::InsufficientAvailable {
            category_id: source,
            available: row.available,
            requested: amount,
        });
    }
    let (assigned, available, ready_to_assign) = row
        .assigned
        .checked_sub(amount)
        .zip(row.available.checked_sub(amount))
        .zip(state.ready_to_assign.checked_add(amount))
        .map(|((assigned, available), ready)| (assigned, available, ready))
        .ok_or(PreconditionError::OutOfRange(amount))?;

    if let Some(row) = state.balance_mut(source, period) {
        row.assigned = assigned;
        row.available = available;
        row.mark_optimistic();
    }
    state.ready_to_assign = ready_to_assign;
    Ok(())
}

pub(crate) fn apply_pull_from_ready_to_assign(
    state: &mut BalanceState,
    budget_id: Uuid,
    period: BudgetMonth,
    destination: Uuid,
    amount: Decimal,
) -> Result<(), PreconditionError> {
    if amount <= Decimal::ZERO {
        return Err(PreconditionError::NonPositiveAmount(amount));
    }
    if state.ready_to_assign < amount {
        return Err(PreconditionError::InsufficientReadyToAssign {
            available: state.ready_to_assign,
            requested: amount,
        });
    }
    let (assigned, available) = state
        .balance(destination, period)
        .map_or((Decimal::ZERO, Decimal::ZERO), |row| (row.assigned, row.available));
    let (assigned, available, ready_to_assign) = assigned
        .checked_add(amount)
        .zip(available.checked_add(amount))
        .zip(state.ready_to_assign.checked_sub(amount))
        .map(|((assigned, available), ready)| (assigned, available, ready))
        .ok_or(PreconditionError::OutOfRange(amount))?;

    let row = state.balance_or_insert(budget_id, destination, period);
    row.assigned = assigned;
    row.available = available;
    row.mark_optimistic();
    state.ready_to_assign = ready_to_assign;
    Ok(())
}
