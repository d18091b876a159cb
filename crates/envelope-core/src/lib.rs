//! envelope-core
//!
//! Optimistic balance mutations for envelope budgets.
//! Depends on envelope-domain. No transport, no persistence: the remote side is injected.

pub mod assignment_service;
pub mod error;
pub mod gate;
pub mod move_money_service;
pub mod mutation;
pub mod optimistic;
pub mod ready_to_assign_service;
pub mod remote;
pub mod snapshot;
pub mod store;

pub use assignment_service::*;
pub use error::{CoreError, CoreResult, PreconditionError, RemoteError};
pub use gate::{ConcurrencyPolicy, UnitOptions};
pub use move_money_service::*;
pub use mutation::*;
pub use optimistic::with_optimistic_update;
pub use ready_to_assign_service::*;
pub use remote::RemoteBalanceMutator;
pub use snapshot::OptimisticSnapshot;
pub use store::*;
