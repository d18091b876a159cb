//! Save / apply / commit / rollback skeleton shared by every mutation unit.

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::error::{CoreError, CoreResult, PreconditionError, RemoteError};
use crate::mutation::{MutationKind, MutationRequest};
use crate::snapshot::OptimisticSnapshot;
use crate::store::{BalanceState, BalanceStore};

/// Owns the snapshot of one attempt until the server has answered.
///
/// Dropping it while still armed restores the snapshot, so a caller that abandons the
/// future mid-flight gets the pre-mutation state back.
struct PendingRollback<'a> {
    store: &'a BalanceStore,
    kind: MutationKind,
    snapshot: Option<OptimisticSnapshot>,
}

impl<'a> PendingRollback<'a> {
    fn new(store: &'a BalanceStore, kind: MutationKind, snapshot: OptimisticSnapshot) -> Self {
        Self {
            store,
            kind,
            snapshot: Some(snapshot),
        }
    }

    fn disarm(mut self) {
        self.snapshot = None;
    }

    fn restore(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.store.restore(snapshot);
        }
    }
}

impl Drop for PendingRollback<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            warn!(
                "{} abandoned before the server answered, rolling back",
                self.kind
            );
            self.store.restore(snapshot);
        }
    }
}

/// Runs one optimistic mutation against `store`.
///
/// `apply` must check its preconditions before editing anything: an `Err` from it is
/// returned as-is with the state untouched and `remote` never called. Once applied, the
/// funded total (Ready to Assign plus everything assigned) must be unchanged. When
/// `remote` fails, or the returned future is dropped before `remote` resolves, the state
/// is restored to the snapshot taken before `apply`.
pub async fn with_optimistic_update<A, R, F>(
    store: &BalanceStore,
    request: &MutationRequest,
    apply: A,
    remote: R,
) -> CoreResult<()>
where
    A: FnOnce(&mut BalanceState) -> Result<(), PreconditionError>,
    R: FnOnce() -> F,
    F: Future<Output = Result<(), RemoteError>>,
{
    let kind = request.kind();
    let snapshot = store.save();
    let before = snapshot.totals();
    let pending = PendingRollback::new(store, kind, snapshot);

    let after = store.mutate(|state| {
        apply(state)?;
        Ok::<_, PreconditionError>(state.totals())
    });
    let after = match after {
        Ok(totals) => totals,
        Err(err) => {
            warn!("{} rejected locally: {}", kind, err);
            pending.disarm();
            return Err(err.into());
        }
    };

    if after.funded_total() != before.funded_total() {
        error!(
            "{} changed funded total from {} to {}; rolling back",
            kind,
            before.funded_total(),
            after.funded_total()
        );
        pending.restore();
        return Err(CoreError::InvariantViolation {
            kind,
            expected: before.funded_total(),
            actual: after.funded_total(),
        });
    }
    debug!(
        "{} applied optimistically (ready to assign {} -> {})",
        kind, before.ready_to_assign, after.ready_to_assign
    );

    match remote().await {
        Ok(()) => {
            pending.disarm();
            let unconfirmed = request
                .mutation
                .categories()
                .into_iter()
                .filter(|category_id| {
                    store
                        .get_balance(*category_id)
                        .is_some_and(|row| row.is_optimistic)
                })
                .count();
            if unconfirmed > 0 {
                warn!(
                    "{} committed but {} balance(s) were not confirmed by the server",
                    kind, unconfirmed
                );
            }
            info!("{} committed for budget {}", kind, request.budget_id);
            Ok(())
        }
        Err(source) => {
            warn!("{} failed remotely, rolling back: {}", kind, source);
            pending.restore();
            Err(CoreError::Remote { kind, source })
        }
    }
}
