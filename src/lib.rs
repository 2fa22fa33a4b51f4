//! stocksim - market-data synchronization and price simulation
//!
//! Two cooperating background engines over a shared store:
//!
//! - A refresh engine that keeps company profiles, daily stock records
//!   and financial reports in sync with an external market-data provider
//! - A simulation engine that recomputes quote prices from pending
//!   order-book pressure and broadcasts the updates to subscribers

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod domain;
pub mod provider;
pub mod refresh;
pub mod sim;
pub mod store;
pub mod telemetry;
