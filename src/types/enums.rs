//! Enumeration types for the patient-flow simulator
//!
//! This module contains the enumerations shared across the simulation: departments,
//! patient lifecycle states, transfer destinations, disruption kinds and resource hold
//! kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Departments of the facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DepartmentKind {
    /// Emergency room, the entry point for external arrivals
    #[serde(rename = "ER")]
    Emergency,
    /// Surgical department
    Surgery,
    /// Critical care (intensive care) unit
    CriticalCare,
    /// Step-down unit between critical care and discharge
    StepDown,
}

impl DepartmentKind {
    /// All departments in their canonical order
    pub const ALL: [DepartmentKind; 4] = [
        DepartmentKind::Emergency,
        DepartmentKind::Surgery,
        DepartmentKind::CriticalCare,
        DepartmentKind::StepDown,
    ];

    /// Position of this department in [`DepartmentKind::ALL`]
    pub fn index(self) -> usize {
        match self {
            DepartmentKind::Emergency => 0,
            DepartmentKind::Surgery => 1,
            DepartmentKind::CriticalCare => 2,
            DepartmentKind::StepDown => 3,
        }
    }

    /// Short name used in tables and configuration files
    pub fn name(self) -> &'static str {
        match self {
            DepartmentKind::Emergency => "ER",
            DepartmentKind::Surgery => "Surgery",
            DepartmentKind::CriticalCare => "CriticalCare",
            DepartmentKind::StepDown => "StepDown",
        }
    }

    /// Disruption applied when this department is struck by a random event
    pub fn disruption_kind(self) -> DisruptionKind {
        match self {
            DepartmentKind::Surgery | DepartmentKind::CriticalCare => DisruptionKind::RoomClose,
            DepartmentKind::Emergency | DepartmentKind::StepDown => DisruptionKind::StaffLeave,
        }
    }
}

impl fmt::Display for DepartmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DepartmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "er" | "emergency" => Ok(DepartmentKind::Emergency),
            "surgery" | "surg" => Ok(DepartmentKind::Surgery),
            "criticalcare" | "critical care" | "cc" | "icu" => Ok(DepartmentKind::CriticalCare),
            "stepdown" | "step down" | "sd" => Ok(DepartmentKind::StepDown),
            _ => Err(format!("Unknown department: {}", s)),
        }
    }
}

/// Lifecycle state of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    /// Created by an arrival event, not yet queued anywhere
    Arrived,
    /// Queued for a bed and a staff member
    Waiting,
    /// Holding a bed and a staff member
    InTreatment,
    /// Turned away on arrival (terminal)
    Diverted,
    /// Sent home (terminal)
    Discharged,
}

impl PatientStatus {
    /// Whether the patient has left the facility for good
    pub fn is_terminal(self) -> bool {
        matches!(self, PatientStatus::Diverted | PatientStatus::Discharged)
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientStatus::Arrived => write!(f, "Arrived"),
            PatientStatus::Waiting => write!(f, "Waiting"),
            PatientStatus::InTreatment => write!(f, "In Treatment"),
            PatientStatus::Diverted => write!(f, "Diverted"),
            PatientStatus::Discharged => write!(f, "Discharged"),
        }
    }
}

/// Where a patient goes next: another department, or home
///
/// Serialized as the department name or `"Home"`, which lets it key JSON maps
/// such as the ER disposition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Destination {
    /// Transfer into a department
    Department(DepartmentKind),
    /// Leave the facility
    Home,
}

impl Destination {
    /// The target department, if this is not a discharge
    pub fn department(self) -> Option<DepartmentKind> {
        match self {
            Destination::Department(kind) => Some(kind),
            Destination::Home => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Department(kind) => write!(f, "{}", kind),
            Destination::Home => write!(f, "Home"),
        }
    }
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("home") {
            return Ok(Destination::Home);
        }
        s.parse::<DepartmentKind>().map(Destination::Department)
    }
}

impl TryFrom<String> for Destination {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.to_string()
    }
}

/// Random disruption applied to a department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisruptionKind {
    /// A staff member leaves; one staff slot is held for the duration
    StaffLeave,
    /// A room closes; one bed slot is held for the duration
    RoomClose,
}

impl fmt::Display for DisruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisruptionKind::StaffLeave => write!(f, "staff_leave"),
            DisruptionKind::RoomClose => write!(f, "room_close"),
        }
    }
}

/// Kind of occupant holding (or waiting for) a resource-pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldKind {
    /// A patient
    Occupant,
    /// Virtual hold shrinking capacity to the scheduled staff level
    ScheduleHold,
    /// Virtual hold taken by a disruption for a bounded duration
    DisruptionHold,
}

impl HoldKind {
    /// Pool priority; lower values are served first
    pub fn priority(self) -> i32 {
        match self {
            HoldKind::DisruptionHold => -20,
            HoldKind::ScheduleHold => -10,
            HoldKind::Occupant => 0,
        }
    }

    /// Whether this hold stands in for capacity rather than a patient
    pub fn is_virtual(self) -> bool {
        !matches!(self, HoldKind::Occupant)
    }
}
