use rust_decimal::Decimal;
use uuid::Uuid;

use envelope_domain::BudgetMonth;

use crate::error::{CoreResult, PreconditionError};
use crate::gate::{UnitGate, UnitOptions};
use crate::mutation::{BalanceMutation, MutationKind, MutationRequest};
use crate::optimistic::with_optimistic_update;
use crate::remote::RemoteBalanceMutator;
use crate::store::{BalanceState, BalanceStore};

/// Moves available money from one category to another. Ready to Assign is untouched.
#[derive(Debug)]
pub struct MoveMoneyService {
    store: BalanceStore,
    gate: UnitGate,
}

impl MoveMoneyService {
    pub fn new(store: BalanceStore, options: UnitOptions) -> Self {
        Self {
            store,
            gate: UnitGate::new(MutationKind::MoveBetweenCategories, options),
        }
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    pub fn options(&self) -> UnitOptions {
        self.gate.options()
    }

    /// Returns `true` while a move is awaiting the server.
    pub fn is_in_flight(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn move_money<R>(
        &self,
        source: Uuid,
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
            BalanceMutation::MoveBetweenCategories {
                source,
                destination,
                amount,
            },
        );
        with_optimistic_update(
            &self.store,
            &request,
            |state| apply_move(state, budget_id, period, source, destination, amount),
            || remote.commit(&request, &self.store),
        )
        .await
    }
}

pub(crate) fn apply_move(
    state: &mut BalanceState,
    budget_id: Uuid,
    period: BudgetMonth,
    source: Uuid,
    destination: Uuid,
    amount: Decimal,
) -> Result<(), PreconditionError> {
    if amount <= Decimal::ZERO {
        return Err(PreconditionError::NonPositiveAmount(amount));
    }
    if source == destination {
        return Err(PreconditionError::SameCategory(source));
    }
    let available = state
        .balance(source, period)
        .map(|row| row.available)
        .ok_or(PreconditionError::MissingBalance {
            category_id: source,
            period,
        })?;
    if available < amount {
        return Err(PreconditionError::InsufficientAvailable {
            category_id: source,
            available,
            requested: amount,
        });
    }

    let out_of_range = PreconditionError::OutOfRange(amount);
    let source_available = available
        .checked_sub(amount)
        .ok_or_else(|| out_of_range.clone())?;
    let destination_available = state
        .balance(destination, period)
        .map_or(Decimal::ZERO, |row| row.available)
        .checked_add(amount)
        .ok_or(out_of_range)?;

    if let Some(row) = state.balance_mut(source, period) {
        row.available = source_available;
        row.mark_optimistic();
    }
    let target = state.balance_or_insert(budget_id, destination, period);
    target.available = destination_available;
    target.mark_optimistic();
    Ok(())
}
