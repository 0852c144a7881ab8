//! Shared state of one simulation run
//!
//! [`SimContext`] owns the clock, the random number generator, the departments,
//! the patients and the suspended processes of a run. Every generator and
//! process receives it explicitly; nothing is global, so independent runs can
//! execute on different threads.

use super::clock::{SimClock, Wakeup};
use super::distributions::FlowModel;
use super::statistics::{CostBreakdown, FlowStatistics, StaffingLedger};
use super::{SimulationError, SimulationResult};
use crate::facility::{Department, Grant};
use crate::flow::PatientProcess;
use crate::optimizer::StaffingSchedule;
use crate::patient::Patient;
use crate::types::{
    DepartmentKind, Destination, HospitalConfig, IdSequence, PatientId, ProcessId,
};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// State of one simulation run
#[derive(Debug)]
pub struct SimContext {
    /// Event queue and current time
    pub clock: SimClock,
    /// Random source for every draw of the run
    pub rng: StdRng,
    /// Identifier allocator
    pub ids: IdSequence,
    /// Facility configuration
    pub config: Arc<HospitalConfig>,
    /// Prebuilt samplers
    pub model: Arc<FlowModel>,
    /// Staffing schedule, baseline staffing when absent
    pub schedule: Option<Arc<StaffingSchedule>>,
    /// Departments indexed by [`DepartmentKind::index`]
    pub departments: Vec<Department>,
    /// Patients currently inside the facility
    pub patients: HashMap<PatientId, Patient>,
    /// Suspended patient processes
    pub processes: HashMap<ProcessId, PatientProcess>,
    /// Temporary staffing costs
    pub staffing: StaffingLedger,
    /// Flow counters
    pub stats: FlowStatistics,
    /// Simulated hours in this run
    pub horizon_hours: u32,
}

impl SimContext {
    /// Create the departments with the hour-0 staffing and an empty event queue
    pub fn new(
        config: Arc<HospitalConfig>,
        model: Arc<FlowModel>,
        schedule: Option<Arc<StaffingSchedule>>,
        rng: StdRng,
        horizon_hours: u32,
    ) -> SimulationResult<Self> {
        let mut ids = IdSequence::new();
        let mut departments = Vec::with_capacity(DepartmentKind::ALL.len());
        for kind in DepartmentKind::ALL {
            let dept_config = config.departments.get(&kind).ok_or_else(|| {
                SimulationError::configuration_error(format!("missing department {}", kind))
            })?;
            let staff = staff_target(&config, schedule.as_deref(), 0, kind);
            departments.push(Department::new(
                kind,
                dept_config,
                config.max_staff_slots,
                staff,
                config.admission_gate(kind),
                &mut ids,
            ));
        }

        Ok(Self {
            clock: SimClock::new(),
            rng,
            ids,
            config,
            model,
            schedule,
            departments,
            patients: HashMap::new(),
            processes: HashMap::new(),
            staffing: StaffingLedger::new(),
            stats: FlowStatistics::new(),
            horizon_hours,
        })
    }

    /// Current simulated time in hours
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Department of the given kind
    pub fn department(&self, kind: DepartmentKind) -> &Department {
        &self.departments[kind.index()]
    }

    /// Mutable department of the given kind
    pub fn department_mut(&mut self, kind: DepartmentKind) -> &mut Department {
        &mut self.departments[kind.index()]
    }

    /// Scheduled staff for a department at `hour`, baseline when unscheduled
    pub fn staff_target(&self, hour: u32, kind: DepartmentKind) -> u32 {
        staff_target(&self.config, self.schedule.as_deref(), hour, kind)
    }

    /// Register a new process and run its first step at the current instant
    pub fn spawn(&mut self, process: PatientProcess) -> ProcessId {
        let id = self.ids.process();
        self.processes.insert(id, process);
        self.clock.schedule_in(0.0, Wakeup::Resume(id));
        id
    }

    /// Grant what a department can serve and schedule the follow-ups
    pub fn dispatch(&mut self, kind: DepartmentKind) {
        let hour_of_day = self.clock.hour_of_day();
        let grants = self.departments[kind.index()].dispatch(hour_of_day);
        for grant in grants {
            match grant {
                Grant::Admission { process, .. } => {
                    self.clock.schedule_in(0.0, Wakeup::Resume(process));
                }
                Grant::Disruption { hold, duration_hours, .. } => {
                    self.clock
                        .schedule_in(duration_hours, Wakeup::DisruptionExpiry { department: kind, hold });
                }
            }
        }
    }

    /// Dispatch every department
    pub fn dispatch_all(&mut self) {
        for kind in DepartmentKind::ALL {
            self.dispatch(kind);
        }
    }

    /// Resolve a patient's transfer signal and wake the processes waiting on it
    pub fn resolve_transfer(
        &mut self,
        patient: PatientId,
        destination: Destination,
    ) -> SimulationResult<()> {
        let record = self.patients.get_mut(&patient).ok_or_else(|| {
            SimulationError::signal_error(format!("{} is not in the facility", patient))
        })?;
        let waiters = record.signal_mut().resolve(destination)?;
        trace!(%patient, %destination, waiters = waiters.len(), "Transfer signal resolved");
        for process in waiters {
            self.clock.schedule_in(0.0, Wakeup::Resume(process));
        }
        Ok(())
    }

    /// Cost ledger as it stands now
    pub fn cost_breakdown(&self) -> CostBreakdown {
        CostBreakdown {
            departments: self.departments.iter().map(|d| (d.kind(), d.costs())).collect(),
            staffing: self.staffing.clone(),
        }
    }

    /// Total cost so far
    pub fn total_cost(&self) -> f64 {
        self.staffing.total() + self.departments.iter().map(|d| d.costs().total()).sum::<f64>()
    }
}

fn staff_target(
    config: &HospitalConfig,
    schedule: Option<&StaffingSchedule>,
    hour: u32,
    kind: DepartmentKind,
) -> u32 {
    let baseline = config.baseline_staff(kind);
    schedule.map_or(baseline, |s| s.target_or(hour, kind, baseline))
}
