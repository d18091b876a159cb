use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use envelope_domain::BudgetMonth;

use crate::mutation::MutationKind;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("{}: {}", .kind.failure_message(), .source)]
    Remote {
        kind: MutationKind,
        #[source]
        source: RemoteError,
    },
    #[error("Another {0} request is already in flight")]
    MutationInFlight(MutationKind),
    #[error("{kind} would change funded total from {expected} to {actual}")]
    InvariantViolation {
        kind: MutationKind,
        expected: Decimal,
        actual: Decimal,
    },
}

impl CoreError {
    /// Returns the transport error when the failure came from the remote side.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            CoreError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, CoreError::Precondition(_))
    }
}

/// Local validation failures, raised before any state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("No balance for category {category_id} in {period}")]
    MissingBalance { category_id: Uuid, period: BudgetMonth },
    #[error("Insufficient funds in category {category_id}: {available} available, {requested} requested")]
    InsufficientAvailable {
        category_id: Uuid,
        available: Decimal,
        requested: Decimal,
    },
    #[error("Insufficient Ready to Assign: {available} available, {requested} requested")]
    InsufficientReadyToAssign {
        available: Decimal,
        requested: Decimal,
    },
    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("Cannot move money from category {0} to itself")]
    SameCategory(Uuid),
    #[error("Amount {0} would push a balance out of range")]
    OutOfRange(Decimal),
}

/// Failures reported by the remote budgeting API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not decode server response: {0}")]
    Decode(String),
}
