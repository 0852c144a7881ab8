//! Patient flow through the facility
//!
//! This module contains the suspended patient processes and the recurring
//! generators that create patients, move them between departments, disrupt
//! departments and apply the staffing schedule.
//!
//! # Overview
//!
//! - **PatientProcess**: state machine of one ER visit or department transfer
//! - **Generators**: hourly arrivals, direct entries, the transfer manager,
//!   disruptions and staffing changes
//!
//! Everything runs on a single [`SimContext`](crate::simulation::SimContext);
//! the [`HospitalSimulation`](crate::simulation::HospitalSimulation) event loop
//! routes each wakeup to the matching handler here.

pub mod generators;
pub mod process;

// Re-export all public types for convenience
pub use process::*;
