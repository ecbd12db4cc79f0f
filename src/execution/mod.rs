//! Decision execution and leverage accounting.

pub mod executor;

pub use executor::{DecisionExecutor, ExecutionPlan};
