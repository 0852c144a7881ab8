//! Patient process state machines
//!
//! Each patient in the facility is driven by one [`PatientProcess`] at a time.
//! A process records where it is suspended (waiting for a bed and a staff
//! member, in treatment, or parked on its transfer signal) and is advanced by
//! [`resume`] whenever its wakeup fires.

use crate::simulation::clock::Wakeup;
use crate::simulation::context::SimContext;
use crate::types::{DepartmentKind, Destination, PatientId, PatientStatus, ProcessId, RequestId};
use tracing::{trace, warn};

/// Suspension point of an ER visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErVisitStage {
    /// Not yet queued
    Entering,
    /// Queued for a bed and a staff member
    AwaitingCare {
        /// Admission request
        request: RequestId,
    },
    /// Being treated; resumes when treatment ends
    InTreatment {
        /// Granted admission request
        request: RequestId,
    },
}

/// Suspension point of a transfer into a department
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    /// Not yet queued at the destination
    Entering,
    /// Queued for a bed and a staff member
    AwaitingBed {
        /// Admission request
        request: RequestId,
    },
    /// Admitted and parked on the transfer signal
    Admitted {
        /// Granted admission request
        request: RequestId,
    },
}

/// A suspended patient routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientProcess {
    /// Walk-in or ambulance patient treated in the ER
    ErVisit {
        /// Patient driven by this process
        patient: PatientId,
        /// Current suspension point
        stage: ErVisitStage,
    },
    /// Patient moving into an inpatient department
    Transfer {
        /// Patient driven by this process
        patient: PatientId,
        /// Department being entered
        destination: DepartmentKind,
        /// Present at the start of the run: no congestion penalty, no gate
        resident: bool,
        /// Current suspension point
        stage: TransferStage,
    },
}

impl PatientProcess {
    /// A new ER visit
    pub fn er_visit(patient: PatientId) -> Self {
        PatientProcess::ErVisit { patient, stage: ErVisitStage::Entering }
    }

    /// A new transfer into `destination`
    pub fn transfer(patient: PatientId, destination: DepartmentKind) -> Self {
        PatientProcess::Transfer { patient, destination, resident: false, stage: TransferStage::Entering }
    }

    /// A patient already in `destination` when the run starts
    pub fn resident(patient: PatientId, destination: DepartmentKind) -> Self {
        PatientProcess::Transfer { patient, destination, resident: true, stage: TransferStage::Entering }
    }

    /// Patient driven by this process
    pub fn patient(&self) -> PatientId {
        match self {
            PatientProcess::ErVisit { patient, .. } | PatientProcess::Transfer { patient, .. } => *patient,
        }
    }

    /// Department the process is queued in or occupying
    pub fn department(&self) -> DepartmentKind {
        match self {
            PatientProcess::ErVisit { .. } => DepartmentKind::Emergency,
            PatientProcess::Transfer { destination, .. } => *destination,
        }
    }
}

/// Advance a suspended process by one step
///
/// The process is taken out of the context and put back with its next stage,
/// unless it finished.
pub fn resume(ctx: &mut SimContext, id: ProcessId) {
    let Some(process) = ctx.processes.remove(&id) else {
        warn!(process = %id, "Resume for unknown process");
        return;
    };
    if !ctx.patients.contains_key(&process.patient()) {
        warn!(process = %id, patient = %process.patient(), "Process patient left the facility");
        return;
    }

    let next = match process {
        PatientProcess::ErVisit { patient, stage } => {
            advance_er_visit(ctx, id, patient, stage).map(|stage| PatientProcess::ErVisit { patient, stage })
        }
        PatientProcess::Transfer { patient, destination, resident, stage } => {
            advance_transfer(ctx, id, patient, destination, resident, stage)
                .map(|stage| PatientProcess::Transfer { patient, destination, resident, stage })
        }
    };

    if let Some(next) = next {
        ctx.processes.insert(id, next);
    }
}

fn advance_er_visit(
    ctx: &mut SimContext,
    id: ProcessId,
    patient: PatientId,
    stage: ErVisitStage,
) -> Option<ErVisitStage> {
    let er = DepartmentKind::Emergency;
    match stage {
        ErVisitStage::Entering => {
            let request = enter_queue(ctx, id, patient, er, true)?;
            Some(ErVisitStage::AwaitingCare { request })
        }
        ErVisitStage::AwaitingCare { request } => {
            admit(ctx, patient, er)?;
            let service = ctx.config.service_time_hours;
            ctx.clock.schedule_in(service, Wakeup::Resume(id));
            Some(ErVisitStage::InTreatment { request })
        }
        ErVisitStage::InTreatment { request } => {
            let destination = ctx.model.disposition.sample(&mut ctx.rng);
            leave_department(ctx, patient, er, request, destination);
            None
        }
    }
}

fn advance_transfer(
    ctx: &mut SimContext,
    id: ProcessId,
    patient: PatientId,
    destination: DepartmentKind,
    resident: bool,
    stage: TransferStage,
) -> Option<TransferStage> {
    match stage {
        TransferStage::Entering => {
            if !resident && ctx.departments[destination.index()].is_congested() {
                let penalty = ctx.departments[destination.index()].charge_congestion_penalty();
                ctx.stats.congestion_penalties += 1;
                trace!(%patient, department = %destination, penalty, "Congestion penalty");
            }
            let request = enter_queue(ctx, id, patient, destination, !resident)?;
            Some(TransferStage::AwaitingBed { request })
        }
        TransferStage::AwaitingBed { request } => {
            admit(ctx, patient, destination)?;
            let record = ctx.patients.get_mut(&patient)?;
            record.begin_stay();
            // A fresh signal cannot be resolved yet, so this only parks the process
            record.signal_mut().wait(id);
            Some(TransferStage::Admitted { request })
        }
        TransferStage::Admitted { request } => {
            let record = ctx.patients.get_mut(&patient)?;
            let resolution = record.signal().resolution();
            match resolution {
                Some(next) => {
                    leave_department(ctx, patient, destination, request, next);
                    None
                }
                None => {
                    record.signal_mut().wait(id);
                    Some(TransferStage::Admitted { request })
                }
            }
        }
    }
}

/// Queue the patient and request a bed and a staff member
fn enter_queue(
    ctx: &mut SimContext,
    id: ProcessId,
    patient: PatientId,
    kind: DepartmentKind,
    gated: bool,
) -> Option<RequestId> {
    let now = ctx.clock.now();
    let record = ctx.patients.get_mut(&patient)?;
    let department = &mut ctx.departments[kind.index()];
    department.log_entry(record, now);
    let request = department.request_admission(id, patient, gated, &mut ctx.ids);
    ctx.dispatch(kind);
    Some(request)
}

fn admit(ctx: &mut SimContext, patient: PatientId, kind: DepartmentKind) -> Option<()> {
    let now = ctx.clock.now();
    let record = ctx.patients.get_mut(&patient)?;
    ctx.departments[kind.index()].admit(record, now);
    ctx.stats.admissions += 1;
    Some(())
}

/// Discharge from `kind`, free the slots and route the patient onwards
fn leave_department(
    ctx: &mut SimContext,
    patient: PatientId,
    kind: DepartmentKind,
    request: RequestId,
    destination: Destination,
) {
    let department = &mut ctx.departments[kind.index()];
    department.discharge(patient);
    department.release_occupant(request);
    ctx.dispatch(kind);

    match destination {
        Destination::Home => {
            if let Some(mut record) = ctx.patients.remove(&patient) {
                record.status = PatientStatus::Discharged;
                record.department = None;
                trace!(%patient, total_wait = record.total_wait, "Discharged home");
            }
            ctx.stats.discharged_home += 1;
        }
        Destination::Department(next) => {
            ctx.stats.transfers += 1;
            trace!(%patient, from = %kind, to = %next, "Transfer");
            ctx.spawn(PatientProcess::transfer(patient, next));
        }
    }
}
