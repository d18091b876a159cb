//! Wires one budget's balance store to its four mutation units.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use envelope_config::{ConcurrencyMode, Config};
use envelope_core::{
    AssignmentService, BalanceStore, ConcurrencyPolicy, CoreResult, MoveMoneyService,
    MoveToReadyToAssignService, PullFromReadyToAssignService, RemoteBalanceMutator,
    ServerBalances, UnitOptions,
};
use envelope_domain::BudgetMonth;

use crate::errors::SessionError;

/// Balance state and mutation units for the budget currently open in the client.
///
/// All four units share the same store, so with `serialize_budget` enabled they also
/// share its budget gate.
#[derive(Debug)]
pub struct BudgetSession {
    store: BalanceStore,
    move_money: MoveMoneyService,
    to_ready_to_assign: MoveToReadyToAssignService,
    from_ready_to_assign: PullFromReadyToAssignService,
    assignment: AssignmentService,
}

impl BudgetSession {
    pub fn new(budget_id: Uuid, period: BudgetMonth, options: UnitOptions) -> Self {
        Self::with_store(BalanceStore::new(budget_id, period), options)
    }

    pub fn with_store(store: BalanceStore, options: UnitOptions) -> Self {
        debug!(
            "opening budget {} for {} ({:?})",
            store.budget_id(),
            store.period(),
            options
        );
        Self {
            move_money: MoveMoneyService::new(store.clone(), options),
            to_ready_to_assign: MoveToReadyToAssignService::new(store.clone(), options),
            from_ready_to_assign: PullFromReadyToAssignService::new(store.clone(), options),
            assignment: AssignmentService::new(store.clone(), options),
            store,
        }
    }

    pub fn from_config(budget_id: Uuid, period: BudgetMonth, config: &Config) -> Self {
        Self::new(budget_id, period, unit_options(config))
    }

    /// Opens the budget on the month containing `date`.
    pub fn for_date(budget_id: Uuid, date: NaiveDate, config: &Config) -> Self {
        Self::from_config(budget_id, BudgetMonth::from_date(date), config)
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    pub fn options(&self) -> UnitOptions {
        self.move_money.options()
    }

    /// Replaces local state with an authoritative fetch.
    pub fn load(&self, response: ServerBalances) {
        self.store.load(response);
    }

    /// Decodes a JSON balance payload from the API and loads it.
    pub fn load_json(&self, payload: &str) -> Result<(), SessionError> {
        let response: ServerBalances = serde_json::from_str(payload)?;
        self.load(response);
        Ok(())
    }

    /// `true` while any unit is waiting on the server.
    pub fn is_busy(&self) -> bool {
        self.move_money.is_in_flight()
            || self.to_ready_to_assign.is_in_flight()
            || self.from_ready_to_assign.is_in_flight()
            || self.assignment.is_in_flight()
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
        self.move_money
            .move_money(source, destination, amount, remote)
            .await
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
        self.to_ready_to_assign
            .move_to_ready_to_assign(source, amount, remote)
            .await
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
        self.from_ready_to_assign
            .pull_from_ready_to_assign(destination, amount, remote)
            .await
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
        self.assignment
            .update_assigned(category_id, new_assigned, remote)
            .await
    }
}

/// Maps persisted configuration onto mutation-unit options.
pub fn unit_options(config: &Config) -> UnitOptions {
    UnitOptions {
        concurrency: match config.concurrency {
            ConcurrencyMode::Reject => ConcurrencyPolicy::Reject,
            ConcurrencyMode::Queue => ConcurrencyPolicy::Queue,
        },
        serialize_budget: config.serialize_budget_mutations,
    }
}
