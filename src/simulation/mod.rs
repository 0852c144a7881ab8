//! Simulation engine and control
//!
//! This module contains the simulated clock, the run context, the samplers,
//! the hospital simulation itself, cost statistics, and error handling.
//!
//! # Overview
//!
//! - **SimClock**: event queue ordered by simulated time, then scheduling order
//! - **SimContext**: all state of one run, passed explicitly to every process
//! - **FlowModel**: arrival, disposition and transfer samplers built from the configuration
//! - **HospitalSimulation**: seats the census, starts the generators and runs to the horizon
//! - **CostBreakdown**: wait, diversion and staffing costs of a run
//! - **SimulationError**: error handling for simulation operations
//!
//! # Usage Example
//!
//! ```rust
//! use hospital_flow_sim::simulation::*;
//! use hospital_flow_sim::types::*;
//!
//! let config = HospitalConfig::default();
//! let mut simulation = HospitalSimulation::with_seed(&config, 12, None, 7).unwrap();
//! let outcome = simulation.run().unwrap();
//!
//! assert_eq!(outcome.horizon_hours, 12);
//! assert!(outcome.total_cost >= 0.0);
//! ```

pub mod clock;
pub mod context;
pub mod distributions;
pub mod error;
pub mod hospital;
pub mod logging;
pub mod statistics;

// Re-export all public types for convenience
pub use clock::*;
pub use context::*;
pub use distributions::*;
pub use error::*;
pub use hospital::*;
pub use logging::*;
pub use statistics::*;
