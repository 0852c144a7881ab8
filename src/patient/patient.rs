//! Patient entity
//!
//! This module contains the patient record tracked while a patient is inside the
//! facility.

use super::TransferSignal;
use crate::types::{DepartmentKind, PatientId, PatientStatus};
use serde::{Deserialize, Serialize};

/// A patient inside the facility
///
/// Times are simulated hours since the start of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier
    pub id: PatientId,
    /// When the patient entered the facility
    pub arrival_time: f64,
    /// Current lifecycle state
    pub status: PatientStatus,
    /// When the current wait started
    pub wait_start: f64,
    /// Hours spent waiting across all departments
    pub total_wait: f64,
    /// Department whose queue or active set currently holds the patient
    pub department: Option<DepartmentKind>,
    signal: TransferSignal,
}

impl Patient {
    /// Create a patient arriving at `now`
    pub fn new(id: PatientId, now: f64) -> Self {
        Self {
            id,
            arrival_time: now,
            status: PatientStatus::Arrived,
            wait_start: now,
            total_wait: 0.0,
            department: None,
            signal: TransferSignal::new(),
        }
    }

    /// Transfer signal of the current stay
    pub fn signal(&self) -> &TransferSignal {
        &self.signal
    }

    /// Mutable transfer signal of the current stay
    pub fn signal_mut(&mut self) -> &mut TransferSignal {
        &mut self.signal
    }

    /// Start a new stay with a fresh, unresolved signal
    pub fn begin_stay(&mut self) {
        self.signal = TransferSignal::new();
    }

    /// Whether the transfer manager may still pick this patient
    pub fn awaiting_transfer(&self) -> bool {
        self.status == PatientStatus::InTreatment && !self.signal.is_resolved()
    }
}
