//! Injection point for the authoritative budgeting API.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::mutation::MutationRequest;
use crate::store::BalanceStore;

/// Performs a mutation on the server and writes the confirmed balances back.
///
/// On success the implementation must have written the server's values into `store`
/// (usually through [`BalanceStore::confirm`]) before returning `Ok`. On failure it must
/// return `Err` without touching `store`; the caller restores the pre-mutation snapshot.
#[async_trait]
pub trait RemoteBalanceMutator: Send + Sync {
    async fn commit(
        &self,
        request: &MutationRequest,
        store: &BalanceStore,
    ) -> Result<(), RemoteError>;
}
