//! Patient records and transfer signals
//!
//! - **Patient**: lifecycle state, wait accounting and the current stay's signal
//! - **TransferSignal**: one-shot cell that decides when and where an inpatient leaves

#[allow(clippy::module_inception)]
pub mod patient;
pub mod signal;

pub use patient::Patient;
pub use signal::TransferSignal;
