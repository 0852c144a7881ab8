//! Identifier types for the patient-flow simulator
//!
//! This module contains the sequential identifier types for patients, simulated
//! processes, and resource requests, plus the allocator that hands them out.
//! Identifiers are plain counters so that two runs with the same seed produce
//! the same identifiers in the same order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unique identifier for a patient within one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PAT_{:06}", self.0)
    }
}

impl Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("PAT_").unwrap_or(&s);
        digits.parse::<u64>().map(PatientId).map_err(serde::de::Error::custom)
    }
}

/// Identifier for a suspended patient process (ER visit or transfer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PROC_{}", self.0)
    }
}

/// Identifier for a resource request
///
/// Request identifiers are allocated from one counter per run, so comparing two
/// of them tells which request was made first. Resource pools use this as the
/// tie-breaker between requests of equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REQ_{}", self.0)
    }
}

/// Allocator for all identifiers used by one simulation run
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next_patient: u64,
    next_process: u64,
    next_request: u64,
}

impl IdSequence {
    /// Create a fresh sequence starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next patient identifier
    pub fn patient(&mut self) -> PatientId {
        let id = PatientId(self.next_patient);
        self.next_patient += 1;
        id
    }

    /// Allocate the next process identifier
    pub fn process(&mut self) -> ProcessId {
        let id = ProcessId(self.next_process);
        self.next_process += 1;
        id
    }

    /// Allocate the next request identifier
    pub fn request(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    /// Number of patients created so far
    pub fn patients_created(&self) -> u64 {
        self.next_patient
    }
}
