//! envelope-domain
//!
//! Pure balance models (CategoryBalance, BudgetMonth, totals).
//! No I/O, no async, no locking. Only data types and their arithmetic.

pub mod balance;
pub mod common;
pub mod period;

pub use balance::*;
pub use common::*;
pub use period::*;
