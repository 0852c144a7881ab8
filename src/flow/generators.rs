//! Hourly process generators
//!
//! Generators are recurring wakeups on the simulation clock. Each handler does
//! its work for the current instant and schedules its own next occurrence:
//!
//! - ER arrivals and direct entries, once per hour
//! - the inter-department transfer manager, once per hour starting at t = 1
//! - random disruptions, every 2 to 4 hours
//! - staffing changes, once per hour
//!
//! Hourly generators stop rescheduling themselves at the horizon.

use super::process::PatientProcess;
use crate::patient::Patient;
use crate::simulation::clock::Wakeup;
use crate::simulation::context::SimContext;
use crate::simulation::SimulationResult;
use crate::types::{
    DepartmentKind, Destination, DisruptionKind, PatientId, PatientStatus, RequestId, HOURS_PER_DAY,
};
use rand::Rng;
use tracing::{debug, trace};

/// Admit each department's initial census at t = 0
///
/// ER residents start their treatment; inpatient residents wait for the
/// transfer manager like any other admitted patient.
pub fn seat_residents(ctx: &mut SimContext) {
    for kind in DepartmentKind::ALL {
        let census = ctx.config.departments.get(&kind).map_or(0, |d| d.initial_patients);
        for _ in 0..census {
            let id = ctx.ids.patient();
            ctx.patients.insert(id, Patient::new(id, ctx.clock.now()));
            let process = match kind {
                DepartmentKind::Emergency => PatientProcess::er_visit(id),
                _ => PatientProcess::resident(id, kind),
            };
            ctx.spawn(process);
            ctx.stats.residents += 1;
        }
    }
    debug!(residents = ctx.stats.residents, "Initial census seated");
}

/// Schedule the first occurrence of every generator
pub fn schedule_generators(ctx: &mut SimContext) {
    ctx.clock.schedule_at(0.0, Wakeup::HourlyArrivals { hour: 0 });
    ctx.clock.schedule_at(0.0, Wakeup::DirectEntries { hour: 0 });
    ctx.clock.schedule_at(1.0, Wakeup::TransferRound);
    if ctx.config.disruptions.enabled {
        let delay = next_disruption_delay(ctx);
        ctx.clock.schedule_at(delay, Wakeup::Disruption);
    }
    ctx.clock.schedule_at(0.0, Wakeup::StaffingChange { hour: 0 });
}

/// Draw this hour's ER arrivals and spread them over the hour
pub fn hourly_arrivals(ctx: &mut SimContext, hour: u32) {
    let count = ctx.model.arrivals.sample_count(hour, &mut ctx.rng);
    for _ in 0..count {
        let offset: f64 = ctx.rng.gen();
        ctx.clock.schedule_in(offset, Wakeup::PatientArrival);
    }
    trace!(hour, count, "ER arrivals drawn");
    reschedule_hourly(ctx, hour, |hour| Wakeup::HourlyArrivals { hour });
}

/// One patient reaches the ER
///
/// Ambulances are diverted when the ER has no free bed at this instant; staff
/// availability does not matter for the decision.
pub fn patient_arrival(ctx: &mut SimContext) {
    let id = ctx.ids.patient();
    let mut patient = Patient::new(id, ctx.clock.now());
    ctx.stats.arrivals += 1;

    let ambulance = ctx.rng.gen::<f64>() < ctx.config.ambulance_rate;
    if ambulance {
        ctx.stats.ambulance_arrivals += 1;
    }

    let er = ctx.department_mut(DepartmentKind::Emergency);
    if ambulance && er.available_beds() == 0 {
        let cost = er.charge_diversion();
        patient.status = PatientStatus::Diverted;
        ctx.stats.diversions += 1;
        debug!(patient = %id, status = ?patient.status, cost, "Ambulance diverted");
        return;
    }

    ctx.patients.insert(id, patient);
    ctx.spawn(PatientProcess::er_visit(id));
}

/// Draw this hour's direct admissions for every department that has a table
pub fn direct_entries(ctx: &mut SimContext, hour: u32) {
    let model = ctx.model.clone();
    for (kind, table) in &model.direct_entry {
        let count = table.sample(&mut ctx.rng);
        for _ in 0..count {
            let id = ctx.ids.patient();
            ctx.patients.insert(id, Patient::new(id, ctx.clock.now()));
            ctx.spawn(PatientProcess::transfer(id, *kind));
            ctx.stats.direct_entries += 1;
        }
        if count > 0 {
            trace!(hour, department = %kind, count, "Direct entries");
        }
    }
    reschedule_hourly(ctx, hour, |hour| Wakeup::DirectEntries { hour });
}

/// Decide this hour's inter-department moves and StepDown discharges
///
/// Patients are picked in admission order among those still waiting for a
/// decision.
pub fn transfer_round(ctx: &mut SimContext) -> SimulationResult<()> {
    let model = ctx.model.clone();
    for pathway in &model.transfers {
        let count = pathway.moves.sample(&mut ctx.rng);
        let picked = awaiting_transfer(ctx, pathway.from, count);
        trace!(from = %pathway.from, to = %pathway.to, drawn = count, moved = picked.len(), "Transfers decided");
        for patient in picked {
            ctx.resolve_transfer(patient, Destination::Department(pathway.to))?;
        }
    }

    let count = model.step_down_departures.sample(&mut ctx.rng);
    let picked = awaiting_transfer(ctx, DepartmentKind::StepDown, count);
    trace!(drawn = count, discharged = picked.len(), "StepDown departures decided");
    for patient in picked {
        ctx.resolve_transfer(patient, Destination::Home)?;
    }

    ctx.clock.schedule_in(1.0, Wakeup::TransferRound);
    Ok(())
}

/// Strike a random department and schedule the next disruption
pub fn disruption_strike(ctx: &mut SimContext) {
    let kind = DepartmentKind::ALL[ctx.rng.gen_range(0..DepartmentKind::ALL.len())];
    let disruption = kind.disruption_kind();

    let mut duration_hours = 1.0;
    if disruption == DisruptionKind::StaffLeave
        && ctx.rng.gen_bool(ctx.config.disruptions.extended_leave_probability)
    {
        let day = f64::from(HOURS_PER_DAY);
        duration_hours = (day - ctx.clock.now() % day).floor().max(1.0);
    }

    let department = &mut ctx.departments[kind.index()];
    department.apply_disruption(disruption, duration_hours, &mut ctx.ids);
    ctx.stats.disruptions += 1;
    ctx.dispatch(kind);

    let delay = next_disruption_delay(ctx);
    ctx.clock.schedule_in(delay, Wakeup::Disruption);
}

/// End a disruption and let waiting requests take the freed slot
pub fn disruption_expiry(ctx: &mut SimContext, kind: DepartmentKind, hold: RequestId) {
    if ctx.department_mut(kind).expire_disruption(hold) {
        ctx.dispatch(kind);
    }
}

/// Apply this hour's staffing targets and bill temporary staff
pub fn staffing_change(ctx: &mut SimContext, hour: u32) {
    let mut total: u32 = 0;
    for kind in DepartmentKind::ALL {
        let level = ctx.staff_target(hour, kind);
        total += level;
        ctx.departments[kind.index()].set_staff_target(level, &mut ctx.ids);
    }

    let temps = total.saturating_sub(ctx.config.regular_staff_total());
    let charged = ctx.staffing.record_hour(
        temps,
        ctx.config.temp_staff_hourly_rate,
        ctx.config.temp_staff_setup_rate,
    );
    if temps > 0 {
        trace!(hour, total, temps, charged, "Temporary staff billed");
    }

    ctx.dispatch_all();
    reschedule_hourly(ctx, hour, |hour| Wakeup::StaffingChange { hour });
}

fn awaiting_transfer(ctx: &SimContext, kind: DepartmentKind, count: usize) -> Vec<PatientId> {
    ctx.department(kind)
        .active_patients()
        .iter()
        .copied()
        .filter(|id| ctx.patients.get(id).map_or(false, Patient::awaiting_transfer))
        .take(count)
        .collect()
}

fn next_disruption_delay(ctx: &mut SimContext) -> f64 {
    let settings = &ctx.config.disruptions;
    let (min, max) = (settings.min_interval_hours, settings.max_interval_hours.max(settings.min_interval_hours));
    f64::from(ctx.rng.gen_range(min..=max))
}

fn reschedule_hourly(ctx: &mut SimContext, hour: u32, wakeup: impl FnOnce(u32) -> Wakeup) {
    let next = hour + 1;
    if next < ctx.horizon_hours {
        ctx.clock.schedule_at(f64::from(next), wakeup(next));
    }
}
