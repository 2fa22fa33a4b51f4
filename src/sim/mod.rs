//! Price simulation module
//!
//! Fixed-cadence engine that refreshes quote snapshots from the external
//! provider and recomputes simulated prices from order-book pressure.
//! The pressure model is a simulation heuristic, not price discovery: it
//! moves the last price by a bounded random step in the direction of the
//! net pending order volume.

mod board;
mod model;
mod scheduler;

pub use board::QuoteBoard;
pub use model::{BookPressure, FixedStep, PressureModel, PriceStrategy, StepSource, ThreadRngStep};
pub use scheduler::SimulationScheduler;
