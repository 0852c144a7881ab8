//! One-shot transfer signal
//!
//! An admitted inpatient stays until the transfer manager decides where it goes
//! next. The decision is delivered through a [`TransferSignal`]: it resolves at
//! most once, and resolving it hands back the processes that were parked on it
//! so the caller can schedule them.

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{Destination, ProcessId};
use serde::{Deserialize, Serialize};

/// Single-resolution cell carrying the next destination of a patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferSignal {
    resolution: Option<Destination>,
    #[serde(skip)]
    waiters: Vec<ProcessId>,
}

impl TransferSignal {
    /// Create an unresolved signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a destination has been delivered
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Delivered destination, if any
    pub fn resolution(&self) -> Option<Destination> {
        self.resolution
    }

    /// Park `process` on the signal
    ///
    /// Returns the destination right away if the signal already resolved; the
    /// process is then not registered.
    pub fn wait(&mut self, process: ProcessId) -> Option<Destination> {
        if self.resolution.is_none() && !self.waiters.contains(&process) {
            self.waiters.push(process);
        }
        self.resolution
    }

    /// Processes currently parked on the signal
    pub fn waiters(&self) -> &[ProcessId] {
        &self.waiters
    }

    /// Deliver `destination` and take the parked processes
    pub fn resolve(&mut self, destination: Destination) -> SimulationResult<Vec<ProcessId>> {
        if let Some(existing) = self.resolution {
            return Err(SimulationError::signal_error(format!(
                "signal already resolved to {}, cannot resolve to {}",
                existing, destination
            )));
        }
        self.resolution = Some(destination);
        Ok(std::mem::take(&mut self.waiters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DepartmentKind;

    #[test]
    fn test_resolve_wakes_waiters_once() {
        let mut signal = TransferSignal::new();
        assert_eq!(signal.wait(ProcessId(3)), None);
        assert_eq!(signal.wait(ProcessId(3)), None);
        assert_eq!(signal.waiters(), &[ProcessId(3)]);

        let woken = signal.resolve(Destination::Home).unwrap();
        assert_eq!(woken, vec![ProcessId(3)]);
        assert!(signal.waiters().is_empty());
        assert_eq!(signal.resolution(), Some(Destination::Home));
    }

    #[test]
    fn test_second_resolution_is_rejected() {
        let mut signal = TransferSignal::new();
        signal.resolve(Destination::Department(DepartmentKind::StepDown)).unwrap();

        let err = signal.resolve(Destination::Home).unwrap_err();
        assert!(matches!(err, SimulationError::SignalError(_)));
        // First value sticks
        assert_eq!(
            signal.resolution(),
            Some(Destination::Department(DepartmentKind::StepDown))
        );
    }

    #[test]
    fn test_wait_after_resolution_returns_destination() {
        let mut signal = TransferSignal::new();
        signal.resolve(Destination::Home).unwrap();
        assert_eq!(signal.wait(ProcessId(1)), Some(Destination::Home));
        assert!(signal.waiters().is_empty());
    }
}
