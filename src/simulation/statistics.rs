//! Statistics collection and reporting
//!
//! This module contains the cost ledger of a run (per-department wait and
//! diversion costs plus temporary staffing) and counters describing patient flow.

use crate::facility::DepartmentCosts;
use crate::types::DepartmentKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Temporary staffing cost accounting
///
/// Temps cover any staff beyond the regular workforce. Every temp is billed the
/// hourly rate for each hour needed; each newly added temp is also billed the
/// setup rate once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffingLedger {
    /// One-off setup charges
    pub setup_cost: f64,
    /// Hourly charges
    pub hourly_cost: f64,
    /// Temps on duty during the last recorded hour
    pub last_temps: u32,
    /// Largest temp count seen
    pub peak_temps: u32,
    /// Temp-hours billed
    pub temp_hours: u64,
}

impl StaffingLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Bill one hour with `temps` temporary staff; returns the amount charged
    pub fn record_hour(&mut self, temps: u32, hourly_rate: f64, setup_rate: f64) -> f64 {
        let new_hires = temps.saturating_sub(self.last_temps);
        let setup = f64::from(new_hires) * setup_rate;
        let hourly = f64::from(temps) * hourly_rate;

        self.setup_cost += setup;
        self.hourly_cost += hourly;
        self.last_temps = temps;
        self.peak_temps = self.peak_temps.max(temps);
        self.temp_hours += u64::from(temps);
        setup + hourly
    }

    /// Total staffing cost
    pub fn total(&self) -> f64 {
        self.setup_cost + self.hourly_cost
    }
}

/// Final cost ledger of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Wait and diversion costs per department
    pub departments: BTreeMap<DepartmentKind, DepartmentCosts>,
    /// Temporary staffing costs
    pub staffing: StaffingLedger,
}

impl CostBreakdown {
    /// Wait cost summed over departments
    pub fn wait_total(&self) -> f64 {
        self.departments.values().map(|c| c.wait).sum()
    }

    /// Diversion cost summed over departments
    pub fn diversion_total(&self) -> f64 {
        self.departments.values().map(|c| c.diversion).sum()
    }

    /// Staffing cost
    pub fn staffing_total(&self) -> f64 {
        self.staffing.total()
    }

    /// Wait plus diversion plus staffing
    pub fn total(&self) -> f64 {
        self.wait_total() + self.diversion_total() + self.staffing_total()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Total ${:.2} | Wait ${:.2} | Diversion ${:.2} | Staffing ${:.2} (setup ${:.2}, hourly ${:.2})",
            self.total(),
            self.wait_total(),
            self.diversion_total(),
            self.staffing_total(),
            self.staffing.setup_cost,
            self.staffing.hourly_cost
        )
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for (kind, costs) in &self.departments {
            writeln!(
                f,
                "  {:<12} wait ${:>12.2}  diversion ${:>10.2}",
                kind.name(),
                costs.wait,
                costs.diversion
            )?;
        }
        Ok(())
    }
}

/// Patient-flow counters of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStatistics {
    /// Patients present when the run started
    pub residents: usize,
    /// ER arrivals, diverted ones included
    pub arrivals: usize,
    /// ER arrivals brought by ambulance
    pub ambulance_arrivals: usize,
    /// Ambulances turned away
    pub diversions: usize,
    /// Direct admissions bypassing the ER
    pub direct_entries: usize,
    /// Bed and staff grants to patients
    pub admissions: usize,
    /// Flat penalties charged for arriving at a congested department
    pub congestion_penalties: usize,
    /// Transfers between departments, ER dispositions included
    pub transfers: usize,
    /// Patients sent home
    pub discharged_home: usize,
    /// Disruptions applied
    pub disruptions: usize,
}

impl FlowStatistics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Diverted share of ambulance arrivals, in percent
    pub fn diversion_percentage(&self) -> f64 {
        if self.ambulance_arrivals == 0 {
            0.0
        } else {
            self.diversions as f64 / self.ambulance_arrivals as f64 * 100.0
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Flow: {} arrivals ({} ambulance, {} diverted, {:.1}%) | {} direct entries | {} admissions | {} transfers | {} home | {} congestion penalties | {} disruptions",
            self.arrivals,
            self.ambulance_arrivals,
            self.diversions,
            self.diversion_percentage(),
            self.direct_entries,
            self.admissions,
            self.transfers,
            self.discharged_home,
            self.congestion_penalties,
            self.disruptions
        )
    }
}
