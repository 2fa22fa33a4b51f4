//! Market-data refresh module
//!
//! Keeps the store in sync with the external provider: company profiles,
//! daily stock records and financial reports. A scheduler decides when a
//! pass is due; the reconciliation engine performs the merge with a single
//! commit per pass.

mod reconcile;
mod scheduler;

pub use reconcile::{ReconcileSummary, ReconciliationEngine};
pub use scheduler::{RefreshHandle, RefreshScheduler};
