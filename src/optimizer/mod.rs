//! Staffing schedule optimization
//!
//! This module contains the staffing schedule genome and the genetic search
//! that tunes it against simulated cost.
//!
//! # Usage Example
//!
//! ```rust
//! use hospital_flow_sim::optimizer::*;
//! use hospital_flow_sim::types::*;
//!
//! let config = HospitalConfig::default();
//! let baseline = StaffingSchedule::baseline(&config);
//! assert_eq!(baseline.total_at(0, &config), config.regular_staff_total());
//! ```

pub mod genetic;
pub mod schedule;

// Re-export all public types for convenience
pub use genetic::*;
pub use schedule::*;
