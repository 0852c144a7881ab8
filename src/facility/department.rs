//! Department state: bed and staff pools, queues, disruptions and costs
//!
//! A department owns two [`ResourcePool`]s. Patients need one slot in each, and
//! both are granted together or not at all. Requests are served strictly in
//! `(priority, request id)` order across both pools: once a request cannot be
//! served, every later request needing the same pool waits behind it.

use super::resource_pool::{RequestKey, ResourcePool};
use crate::patient::Patient;
use crate::types::{
    AdmissionGate, DepartmentConfig, DepartmentKind, DisruptionKind, HoldKind, IdSequence,
    PatientId, PatientStatus, ProcessId, RequestId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, trace};

/// Cost accumulators of one department
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentCosts {
    /// Wait cost, including flat congestion penalties
    pub wait: f64,
    /// Ambulance diversion cost
    pub diversion: f64,
}

impl DepartmentCosts {
    /// Sum of all accumulators
    pub fn total(&self) -> f64 {
        self.wait + self.diversion
    }
}

/// A pending request that was granted by [`Department::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grant {
    /// A patient received a bed and a staff member
    Admission {
        /// Process to resume
        process: ProcessId,
        /// Patient admitted
        patient: PatientId,
        /// Request holding both slots
        request: RequestId,
    },
    /// A disruption took its slot and now runs for a bounded time
    Disruption {
        /// Kind of disruption
        kind: DisruptionKind,
        /// Virtual hold to release when the disruption expires
        hold: RequestId,
        /// Hours until expiry, counted from the grant
        duration_hours: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingAdmission {
    process: ProcessId,
    patient: PatientId,
    gated: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingDisruption {
    kind: DisruptionKind,
    duration_hours: f64,
}

/// One department of the facility
#[derive(Debug, Clone)]
pub struct Department {
    kind: DepartmentKind,
    bed_capacity: usize,
    staff_target: u32,
    beds: ResourcePool,
    staff: ResourcePool,
    waiting: VecDeque<PatientId>,
    active: Vec<PatientId>,
    closed_rooms: usize,
    staff_reduction: usize,
    admissions: HashMap<RequestId, PendingAdmission>,
    disruptions: HashMap<RequestId, PendingDisruption>,
    running_disruptions: HashMap<RequestId, DisruptionKind>,
    gate: Option<AdmissionGate>,
    wait_rate: f64,
    diversion_rate: f64,
    costs: DepartmentCosts,
}

impl Department {
    /// Create a department with `staff_target` staff on duty
    ///
    /// The staff pool has `max_staff_slots` slots; the unused ones are taken by
    /// schedule holds right away.
    pub fn new(
        kind: DepartmentKind,
        config: &DepartmentConfig,
        max_staff_slots: usize,
        staff_target: u32,
        gate: Option<AdmissionGate>,
        ids: &mut IdSequence,
    ) -> Self {
        let mut department = Self {
            kind,
            bed_capacity: config.bed_capacity,
            staff_target,
            beds: ResourcePool::new(format!("{}.beds", kind), config.bed_capacity),
            staff: ResourcePool::new(format!("{}.staff", kind), max_staff_slots),
            waiting: VecDeque::new(),
            active: Vec::new(),
            closed_rooms: 0,
            staff_reduction: 0,
            admissions: HashMap::new(),
            disruptions: HashMap::new(),
            running_disruptions: HashMap::new(),
            gate,
            wait_rate: config.wait_cost,
            diversion_rate: config.diversion_cost,
            costs: DepartmentCosts::default(),
        };
        department.staff.set_effective_capacity(staff_target as usize, ids);
        // Nothing else is queued yet, so this only seats the schedule holds
        department.dispatch(0);
        department
    }

    /// Department kind
    pub fn kind(&self) -> DepartmentKind {
        self.kind
    }

    /// Fixed bed capacity
    pub fn bed_capacity(&self) -> usize {
        self.bed_capacity
    }

    /// Current scheduled staff level
    pub fn staff_target(&self) -> u32 {
        self.staff_target
    }

    /// Rooms closed by running disruptions
    pub fn closed_rooms(&self) -> usize {
        self.closed_rooms
    }

    /// Staff on leave because of running disruptions
    pub fn staff_reduction(&self) -> usize {
        self.staff_reduction
    }

    /// Beds held by patients
    pub fn beds_in_use(&self) -> usize {
        self.beds.granted_of(HoldKind::Occupant)
    }

    /// Staff members attending patients
    pub fn staff_in_use(&self) -> usize {
        self.staff.granted_of(HoldKind::Occupant)
    }

    /// Free beds: capacity minus closed rooms minus beds in use
    pub fn available_beds(&self) -> usize {
        self.beds.available()
    }

    /// Free staff: target minus reduction minus staff in use
    pub fn available_staff(&self) -> usize {
        self.staff.available()
    }

    /// Schedule holds still waiting for a staff member to free up
    ///
    /// Non-zero only right after the staff target dropped below the number of
    /// staff currently attending patients.
    pub fn pending_staff_holds(&self) -> usize {
        self.staff.pending_of(HoldKind::ScheduleHold)
    }

    /// Patients queued for admission, in arrival order
    pub fn waiting_patients(&self) -> impl Iterator<Item = PatientId> + '_ {
        self.waiting.iter().copied()
    }

    /// Number of queued patients
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Admitted patients in admission order
    pub fn active_patients(&self) -> &[PatientId] {
        &self.active
    }

    /// Accumulated costs
    pub fn costs(&self) -> DepartmentCosts {
        self.costs
    }

    /// Whether admissions are refused at `hour_of_day`
    pub fn is_gate_closed(&self, hour_of_day: u32) -> bool {
        self.gate.map_or(false, |gate| gate.is_closed(hour_of_day))
    }

    /// Whether a bed or a staff member is exhausted right now
    pub fn is_congested(&self) -> bool {
        self.available_beds() == 0 || self.available_staff() == 0
    }

    /// Queue a patient and start its wait clock
    pub fn log_entry(&mut self, patient: &mut Patient, now: f64) {
        self.waiting.push_back(patient.id);
        patient.status = PatientStatus::Waiting;
        patient.wait_start = now;
        patient.department = Some(self.kind);
    }

    /// Request a bed and a staff member for a queued patient
    ///
    /// Gated requests are held back while the admission gate is closed.
    pub fn request_admission(
        &mut self,
        process: ProcessId,
        patient: PatientId,
        gated: bool,
        ids: &mut IdSequence,
    ) -> RequestId {
        let id = ids.request();
        self.beds.enqueue(id, HoldKind::Occupant);
        self.staff.enqueue(id, HoldKind::Occupant);
        self.admissions.insert(id, PendingAdmission { process, patient, gated });
        id
    }

    /// Move a queued patient into the active set and charge its wait
    ///
    /// Returns the wait cost charged.
    pub fn admit(&mut self, patient: &mut Patient, now: f64) -> f64 {
        if let Some(position) = self.waiting.iter().position(|&id| id == patient.id) {
            self.waiting.remove(position);
        }
        self.active.push(patient.id);
        patient.status = PatientStatus::InTreatment;
        patient.department = Some(self.kind);

        let waited = (now - patient.wait_start).max(0.0);
        patient.total_wait += waited;
        let cost = waited * self.wait_rate;
        self.costs.wait += cost;
        trace!(department = %self.kind, patient = %patient.id, waited, cost, "Admitted");
        cost
    }

    /// Remove a patient from the active set
    pub fn discharge(&mut self, patient: PatientId) -> bool {
        match self.active.iter().position(|&id| id == patient) {
            Some(position) => {
                self.active.remove(position);
                true
            }
            None => false,
        }
    }

    /// Free the bed and staff slots of a granted admission
    pub fn release_occupant(&mut self, request: RequestId) {
        self.beds.release(request);
        self.staff.release(request);
    }

    /// Charge one ambulance diversion
    pub fn charge_diversion(&mut self) -> f64 {
        self.costs.diversion += self.diversion_rate;
        self.diversion_rate
    }

    /// Charge the flat penalty for arriving while congested
    pub fn charge_congestion_penalty(&mut self) -> f64 {
        self.costs.wait += self.wait_rate;
        self.wait_rate
    }

    /// Queue a disruption hold; it starts counting once granted
    ///
    /// `room_close` holds a bed slot, `staff_leave` a staff slot. Both outrank
    /// schedule holds and patients.
    pub fn apply_disruption(
        &mut self,
        kind: DisruptionKind,
        duration_hours: f64,
        ids: &mut IdSequence,
    ) -> RequestId {
        let id = ids.request();
        match kind {
            DisruptionKind::RoomClose => self.beds.enqueue(id, HoldKind::DisruptionHold),
            DisruptionKind::StaffLeave => self.staff.enqueue(id, HoldKind::DisruptionHold),
        };
        self.disruptions.insert(id, PendingDisruption { kind, duration_hours });
        debug!(department = %self.kind, %kind, duration_hours, "Disruption queued");
        id
    }

    /// End a running disruption and free its slot
    pub fn expire_disruption(&mut self, hold: RequestId) -> bool {
        let Some(kind) = self.running_disruptions.remove(&hold) else {
            return false;
        };
        match kind {
            DisruptionKind::RoomClose => {
                self.beds.release(hold);
                self.closed_rooms = self.closed_rooms.saturating_sub(1);
            }
            DisruptionKind::StaffLeave => {
                self.staff.release(hold);
                self.staff_reduction = self.staff_reduction.saturating_sub(1);
            }
        }
        debug!(department = %self.kind, %kind, "Disruption expired");
        true
    }

    /// Change the scheduled staff level
    pub fn set_staff_target(&mut self, level: u32, ids: &mut IdSequence) {
        if level != self.staff_target {
            debug!(department = %self.kind, from = self.staff_target, to = level, "Staff target changed");
        }
        self.staff_target = level;
        self.staff.set_effective_capacity(level as usize, ids);
    }

    /// Grant every pending request that can be served right now
    ///
    /// Requests are visited in `(priority, id)` order over both pools. A request
    /// that cannot be served blocks the pools it needs for the rest of the pass.
    pub fn dispatch(&mut self, hour_of_day: u32) -> Vec<Grant> {
        let gate_closed = self.is_gate_closed(hour_of_day);
        let mut queue: BTreeMap<RequestKey, HoldKind> = self.beds.pending().collect();
        queue.extend(self.staff.pending());

        let mut beds_blocked = false;
        let mut staff_blocked = false;
        let mut grants = Vec::new();

        for (key, kind) in queue {
            match kind {
                HoldKind::Occupant => {
                    let Some(admission) = self.admissions.get(&key.id).copied() else {
                        continue;
                    };
                    if admission.gated && gate_closed {
                        continue;
                    }
                    if beds_blocked
                        || staff_blocked
                        || !self.beds.has_free_slot()
                        || !self.staff.has_free_slot()
                    {
                        beds_blocked = true;
                        staff_blocked = true;
                        continue;
                    }
                    self.beds.grant(key);
                    self.staff.grant(key);
                    self.admissions.remove(&key.id);
                    grants.push(Grant::Admission {
                        process: admission.process,
                        patient: admission.patient,
                        request: key.id,
                    });
                }
                HoldKind::ScheduleHold => {
                    if staff_blocked || !self.staff.grant(key) {
                        staff_blocked = true;
                    }
                }
                HoldKind::DisruptionHold => {
                    let Some(disruption) = self.disruptions.get(&key.id).copied() else {
                        continue;
                    };
                    let granted = match disruption.kind {
                        DisruptionKind::RoomClose => {
                            let granted = !beds_blocked && self.beds.grant(key);
                            beds_blocked |= !granted;
                            if granted {
                                self.closed_rooms += 1;
                            }
                            granted
                        }
                        DisruptionKind::StaffLeave => {
                            let granted = !staff_blocked && self.staff.grant(key);
                            staff_blocked |= !granted;
                            if granted {
                                self.staff_reduction += 1;
                            }
                            granted
                        }
                    };
                    if granted {
                        self.disruptions.remove(&key.id);
                        self.running_disruptions.insert(key.id, disruption.kind);
                        grants.push(Grant::Disruption {
                            kind: disruption.kind,
                            hold: key.id,
                            duration_hours: disruption.duration_hours,
                        });
                    }
                }
            }
        }

        self.debug_check_invariants();
        grants
    }

    fn debug_check_invariants(&self) {
        debug_assert_eq!(self.closed_rooms, self.beds.granted_of(HoldKind::DisruptionHold));
        debug_assert_eq!(self.staff_reduction, self.staff.granted_of(HoldKind::DisruptionHold));
        debug_assert!(
            self.beds_in_use() + self.closed_rooms <= self.bed_capacity,
            "{}: {} beds in use with {} closed rooms exceeds capacity {}",
            self.kind,
            self.beds_in_use(),
            self.closed_rooms,
            self.bed_capacity
        );
        debug_assert!(self.staff.currently_granted() <= self.staff.capacity());
    }
}
