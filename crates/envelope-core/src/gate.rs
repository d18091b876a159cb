//! Serialization of mutations per unit and per budget.

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::mutation::MutationKind;
use crate::store::BalanceStore;

/// What a unit does when called while a previous call is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyPolicy {
    /// Fail the second call with [`CoreError::MutationInFlight`].
    #[default]
    Reject,
    /// Wait for the previous call to finish.
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitOptions {
    pub concurrency: ConcurrencyPolicy,
    /// Hold the store's budget gate for the whole mutation, so units sharing a store
    /// never interleave their optimistic edits.
    pub serialize_budget: bool,
}

impl Default for UnitOptions {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyPolicy::Reject,
            serialize_budget: true,
        }
    }
}

/// Held for the duration of one mutation attempt.
pub(crate) struct MutationPermit<'a> {
    _unit: MutexGuard<'a, ()>,
    _budget: Option<MutexGuard<'a, ()>>,
}

#[derive(Debug)]
pub(crate) struct UnitGate {
    kind: MutationKind,
    options: UnitOptions,
    in_flight: Mutex<()>,
}

impl UnitGate {
    pub(crate) fn new(kind: MutationKind, options: UnitOptions) -> Self {
        Self {
            kind,
            options,
            in_flight: Mutex::new(()),
        }
    }

    pub(crate) fn options(&self) -> UnitOptions {
        self.options
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Unit slot first, then the budget gate; every unit takes them in this order.
    pub(crate) async fn enter<'a>(
        &'a self,
        store: &'a BalanceStore,
    ) -> CoreResult<MutationPermit<'a>> {
        let unit = match self.options.concurrency {
            ConcurrencyPolicy::Reject => self.in_flight.try_lock().map_err(|_| {
                warn!("rejecting {}: previous request still in flight", self.kind);
                CoreError::MutationInFlight(self.kind)
            })?,
            ConcurrencyPolicy::Queue => self.in_flight.lock().await,
        };
        let budget = if self.options.serialize_budget {
            debug!("{} waiting for budget {}", self.kind, store.budget_id());
            Some(store.budget_gate().lock().await)
        } else {
            None
        };
        Ok(MutationPermit {
            _unit: unit,
            _budget: budget,
        })
    }
}
