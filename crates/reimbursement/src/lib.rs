//! Travel reimbursement estimation: a deterministic, policy-driven reproduction of a legacy
//! approval process, plus the configuration, telemetry, and regression tooling around it.

pub mod config;
pub mod corpus;
pub mod error;
pub mod estimation;
pub mod telemetry;

pub use estimation::{
    calculate_reimbursement, Policy, ReimbursementEngine, ReimbursementEstimate, TripError,
    TripRecord,
};
