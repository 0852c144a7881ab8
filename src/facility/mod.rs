//! Departments and their resource pools
//!
//! This module models the capacity side of the facility.
//!
//! # Overview
//!
//! - **ResourcePool**: a fixed number of slots, priority-ordered pending requests,
//!   and virtual holds that resize the effective capacity without evicting anyone
//! - **Department**: a bed pool and a staff pool granted jointly, the waiting queue,
//!   the active set, disruption counters, the admission gate and cost accumulators
//!
//! # Usage Example
//!
//! ```rust
//! use hospital_flow_sim::facility::*;
//! use hospital_flow_sim::types::*;
//!
//! let config = HospitalConfig::default();
//! let mut ids = IdSequence::new();
//! let er_config = &config.departments[&DepartmentKind::Emergency];
//!
//! let mut er = Department::new(
//!     DepartmentKind::Emergency,
//!     er_config,
//!     config.max_staff_slots,
//!     er_config.baseline_staff,
//!     None,
//!     &mut ids,
//! );
//! assert_eq!(er.available_beds(), 75);
//! assert_eq!(er.available_staff(), 18);
//!
//! er.set_staff_target(20, &mut ids);
//! assert_eq!(er.available_staff(), 20);
//! ```

pub mod department;
pub mod resource_pool;

// Re-export all public types for convenience
pub use department::{Department, DepartmentCosts, Grant};
pub use resource_pool::{RequestKey, ResourcePool};
