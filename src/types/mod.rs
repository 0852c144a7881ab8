//! Core types and identifiers for the patient-flow simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation and the schedule optimizer.
//!
//! # Overview
//!
//! - **Identifiers**: Sequential identifiers for patients, processes and resource requests
//! - **Enums**: Departments, patient states, destinations, disruption and hold kinds
//! - **Configuration**: Facility tables, optimizer settings, CLI arguments and validation
//!
//! # Usage Example
//!
//! ```rust
//! use hospital_flow_sim::types::*;
//!
//! let mut ids = IdSequence::new();
//! let patient = ids.patient();
//! assert_eq!(patient.to_string(), "PAT_000000");
//!
//! let config = HospitalConfig {
//!     horizon_hours: 48,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.baseline_staff(DepartmentKind::StepDown), 24);
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
