use rust_decimal::Decimal;
use uuid::Uuid;

use envelope_domain::BudgetMonth;

use crate::error::{CoreResult, PreconditionError};
use crate::gate::{UnitGate, UnitOptions};
use crate::mutation::{BalanceMutation, MutationKind, MutationRequest};
use crate::optimistic::with_optimistic_update;
use crate::remote::RemoteBalanceMutator;
use crate::store::{BalanceState, BalanceStore};

/// Sets a category's assigned amount for the active period.
///
/// The difference is drawn from (or returned to) Ready to Assign; negative deltas
/// de-allocate.
#[derive(Debug)]
pub struct AssignmentService {
    store: BalanceStore,
    gate: UnitGate,
}

impl AssignmentService {
    pub fn new(store: BalanceStore, options: UnitOptions) -> Self {
        Self {
            store,
            gate: UnitGate::new(MutationKind::UpdateAssigned, options),
        }
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn update_assigned<R>(
        &self,
        category_id: Uuid,
        new_assigned: Decimal,
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
            BalanceMutation::UpdateAssigned {
                category_id,
                assigned: new_assigned,
            },
        );
        with_optimistic_update(
            &self.store,
            &request,
            |state| apply_update_assigned(state, period, category_id, new_assigned),
            || remote.commit(&request, &self.store),
        )
        .await
    }
}

pub(crate) fn apply_update_assigned(
    state: &mut BalanceState,
    period: BudgetMonth,
    category_id: Uuid,
    new_assigned: Decimal,
) -> Result<(), PreconditionError> {
    let row = state
        .balance(category_id, period)
        .ok_or(PreconditionError::MissingBalance {
            category_id,
            period,
        })?;
    let out_of_range = || PreconditionError::OutOfRange(new_assigned);
    let delta = new_assigned
        .checked_sub(row.assigned)
        .ok_or_else(out_of_range)?;
    let available = row.available.checked_add(delta).ok_or_else(out_of_range)?;
    let ready_to_assign = state
        .ready_to_assign
        .checked_sub(delta)
        .ok_or_else(out_of_range)?;

    if let Some(row) = state.balance_mut(category_id, period) {
        row.assigned = new_assigned;
        row.available = available;
        row.mark_optimistic();
    }
    state.ready_to_assign = ready_to_assign;
    Ok(())
}
