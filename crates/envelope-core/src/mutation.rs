//! Descriptions of the balance mutations sent to the remote API.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use envelope_domain::BudgetMonth;

/// The four optimistic operations supported against a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    MoveBetweenCategories,
    MoveToReadyToAssign,
    PullFromReadyToAssign,
    UpdateAssigned,
}

impl MutationKind {
    /// Message surfaced to callers when the remote side rejects the mutation.
    pub fn failure_message(self) -> &'static str {
        match self {
            MutationKind::MoveBetweenCategories => "Failed to move money",
            MutationKind::MoveToReadyToAssign => "Failed to move money to Ready to Assign",
            MutationKind::PullFromReadyToAssign => "Failed to assign money from Ready to Assign",
            MutationKind::UpdateAssigned => "Failed to update category budget",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MutationKind::MoveBetweenCategories => "move money",
            MutationKind::MoveToReadyToAssign => "move to Ready to Assign",
            MutationKind::PullFromReadyToAssign => "pull from Ready to Assign",
            MutationKind::UpdateAssigned => "update assigned",
        };
        f.write_str(label)
    }
}

/// Domain parameters of a single mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BalanceMutation {
    MoveBetweenCategories {
        source: Uuid,
        destination: Uuid,
        amount: Decimal,
    },
    MoveToReadyToAssign {
        source: Uuid,
        amount: Decimal,
    },
    PullFromReadyToAssign {
        destination: Uuid,
        amount: Decimal,
    },
    UpdateAssigned {
        category_id: Uuid,
        assigned: Decimal,
    },
}

impl BalanceMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            BalanceMutation::MoveBetweenCategories { .. } => MutationKind::MoveBetweenCategories,
            BalanceMutation::MoveToReadyToAssign { .. } => MutationKind::MoveToReadyToAssign,
            BalanceMutation::PullFromReadyToAssign { .. } => MutationKind::PullFromReadyToAssign,
            BalanceMutation::UpdateAssigned { .. } => MutationKind::UpdateAssigned,
        }
    }

    /// Categories whose balances the mutation touches.
    pub fn categories(&self) -> Vec<Uuid> {
        match *self {
            BalanceMutation::MoveBetweenCategories {
                source,
                destination,
                ..
            } => vec![source, destination],
            BalanceMutation::MoveToReadyToAssign { source, .. } => vec![source],
            BalanceMutation::PullFromReadyToAssign { destination, .. } => vec![destination],
            BalanceMutation::UpdateAssigned { category_id, .. } => vec![category_id],
        }
    }
}

/// Everything the remote collaborator needs to perform a mutation server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub budget_id: Uuid,
    pub period: BudgetMonth,
    pub mutation: BalanceMutation,
}

impl MutationRequest {
    pub fn new(budget_id: Uuid, period: BudgetMonth, mutation: BalanceMutation) -> Self {
        Self {
            budget_id,
            period,
            mutation,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }
}
