//! Tests for the recurring generators: disruptions and the transfer manager
//!
//! Both run on a "quiet" facility where every random flow is switched off, so
//! only the generator under test changes department state.

use hospital_flow_sim::simulation::HospitalSimulation;
use hospital_flow_sim::types::{
    ArrivalRate, DepartmentKind, Destination, HospitalConfig, PatientId, PatientStatus,
};
use std::collections::BTreeMap;

fn quiet_config() -> HospitalConfig {
    let mut config = HospitalConfig::default();
    for rate in config.arrival_rates.iter_mut() {
        *rate = ArrivalRate::new(0.0, 0.0);
    }
    for department in config.departments.values_mut() {
        department.initial_patients = 0;
    }
    config.er_disposition = BTreeMap::from([(Destination::Home, 1.0)]);
    for pathway in config.transfer_pathways.iter_mut() {
        pathway.pmf = BTreeMap::from([(0, 1.0)]);
    }
    for table in config.direct_entry.values_mut() {
        *table = BTreeMap::from([(0, 1.0)]);
    }
    config.step_down_departures = BTreeMap::from([(0, 1.0)]);
    config.disruptions.enabled = false;
    config
}

fn with_disruptions(extended_leave_probability: f64) -> HospitalConfig {
    let mut config = quiet_config();
    config.disruptions.enabled = true;
    config.disruptions.extended_leave_probability = extended_leave_probability;
    config
}

/// Remainder of the current day, floored at one hour
fn rest_of_day(granted_at: f64) -> f64 {
    (24.0 - granted_at % 24.0).floor().max(1.0)
}

/// Step a run to its horizon and check every disruption against `leave_hours`
///
/// Rooms always close for one hour; staff leave lasts `leave_hours(granted_at)`.
/// Returns the number of expiries observed.
fn track_disruptions(
    config: &HospitalConfig,
    horizon: u32,
    seed: u64,
    leave_hours: impl Fn(f64) -> f64,
) -> usize {
    let mut simulation = HospitalSimulation::with_seed(config, horizon, None, seed).unwrap();
    let mut closed = [0usize; 4];
    let mut on_leave = [0usize; 4];
    let mut due: Vec<Vec<f64>> = vec![Vec::new(); 4];
    let mut strikes: Vec<f64> = Vec::new();
    let mut expiries = 0;

    while simulation.step().unwrap() {
        let now = simulation.now();
        if simulation.statistics().disruptions > strikes.len() {
            strikes.push(now);
        }

        for kind in DepartmentKind::ALL {
            let i = kind.index();
            let dept = simulation.department(kind);

            match kind {
                DepartmentKind::Surgery | DepartmentKind::CriticalCare => {
                    assert_eq!(dept.staff_reduction(), 0, "{} lost staff to a disruption", kind)
                }
                DepartmentKind::Emergency | DepartmentKind::StepDown => {
                    assert_eq!(dept.closed_rooms(), 0, "{} closed a room", kind)
                }
            }

            let (before, after, hours) = if dept.closed_rooms() != closed[i] {
                (closed[i], dept.closed_rooms(), 1.0)
            } else {
                (on_leave[i], dept.staff_reduction(), leave_hours(now))
            };
            for _ in before..after {
                due[i].push(now + hours);
            }
            for _ in after..before {
                let position = due[i]
                    .iter()
                    .position(|&at| (at - now).abs() < 1e-9)
                    .unwrap_or_else(|| panic!("{} disruption ended early at t={}: due {:?}", kind, now, due[i]));
                due[i].swap_remove(position);
                expiries += 1;
            }

            closed[i] = dept.closed_rooms();
            on_leave[i] = dept.staff_reduction();
        }
    }

    // Whatever is still running ends at or after the horizon
    for (i, pending) in due.iter().enumerate() {
        assert!(
            pending.iter().all(|&at| at >= f64::from(horizon)),
            "{} has overdue disruptions {:?}",
            DepartmentKind::ALL[i],
            pending
        );
    }

    // First strike after 2-4 hours, then one every 2-4 hours
    let mut last = 0.0;
    for at in &strikes {
        let gap = at - last;
        assert!([2.0, 3.0, 4.0].contains(&gap), "disruption gap of {} hours at t={}", gap, at);
        last = *at;
    }
    assert!(!strikes.is_empty());

    expiries
}

/// With extension forced, every staff leave lasts until the end of its day
#[test]
fn test_extended_leave_runs_to_end_of_day() {
    let config = with_disruptions(1.0);
    let mut expiries = 0;
    for seed in 0..8 {
        expiries += track_disruptions(&config, 72, seed, rest_of_day);
    }
    assert!(expiries > 0);
}

/// Without extension, every disruption lasts exactly one hour
#[test]
fn test_short_leave_lasts_one_hour() {
    let config = with_disruptions(0.0);
    let mut expiries = 0;
    for seed in 0..8 {
        expiries += track_disruptions(&config, 72, seed, |_| 1.0);
    }
    assert!(expiries > 0);
}

/// A leave granted at midnight takes the whole day
#[test]
fn test_rest_of_day_durations() {
    assert_eq!(rest_of_day(0.0), 24.0);
    assert_eq!(rest_of_day(24.0), 24.0);
    assert_eq!(rest_of_day(10.0), 14.0);
    assert_eq!(rest_of_day(47.0), 1.0);
}

/// Disabled disruptions never strike
#[test]
fn test_disabled_disruptions_never_strike() {
    let config = quiet_config();
    let mut simulation = HospitalSimulation::with_seed(&config, 48, None, 4).unwrap();
    let outcome = simulation.run().unwrap();
    assert_eq!(outcome.statistics.disruptions, 0);
}

/// Facility with Surgery and StepDown residents and one move per pathway per round
fn transfer_config() -> HospitalConfig {
    let mut config = quiet_config();
    if let Some(surgery) = config.departments.get_mut(&DepartmentKind::Surgery) {
        surgery.initial_patients = 4;
    }
    if let Some(step_down) = config.departments.get_mut(&DepartmentKind::StepDown) {
        step_down.initial_patients = 3;
    }
    for pathway in config.transfer_pathways.iter_mut() {
        if pathway.from == DepartmentKind::Surgery && pathway.to == DepartmentKind::CriticalCare {
            pathway.pmf = BTreeMap::from([(1, 1.0)]);
        }
    }
    config.step_down_departures = BTreeMap::from([(1, 1.0)]);
    config
}

fn is_queued_anywhere(simulation: &HospitalSimulation, patient: PatientId) -> bool {
    DepartmentKind::ALL
        .iter()
        .any(|&kind| simulation.department(kind).waiting_patients().any(|id| id == patient))
}

/// The first round moves the earliest-admitted patient and nobody else
#[test]
fn test_transfer_round_moves_first_admitted_patient() {
    let config = transfer_config();
    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 17).unwrap();

    simulation.run_until(0.5).unwrap();
    let surgery_before = simulation.department(DepartmentKind::Surgery).active_patients().to_vec();
    assert_eq!(surgery_before.len(), 4);
    assert!(simulation.department(DepartmentKind::CriticalCare).active_patients().is_empty());

    simulation.run_until(1.5).unwrap();
    let moved = surgery_before[0];

    assert_eq!(simulation.department(DepartmentKind::Surgery).active_patients(), &surgery_before[1..]);
    assert_eq!(simulation.department(DepartmentKind::CriticalCare).active_patients(), &[moved]);
    assert!(!is_queued_anywhere(&simulation, moved));
    assert_eq!(simulation.statistics().transfers, 1);

    let record = &simulation.context().patients[&moved];
    assert_eq!(record.department, Some(DepartmentKind::CriticalCare));
    assert_eq!(record.status, PatientStatus::InTreatment);
    // A new stay starts with an unresolved signal
    assert!(record.awaiting_transfer());
}

/// StepDown departures discharge the earliest-admitted patient and stop tracking it
#[test]
fn test_step_down_departure_discharges_home() {
    let config = transfer_config();
    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 17).unwrap();

    simulation.run_until(0.5).unwrap();
    let step_down_before = simulation.department(DepartmentKind::StepDown).active_patients().to_vec();
    assert_eq!(step_down_before.len(), 3);
    let tracked_before = simulation.context().patients.len();

    simulation.run_until(1.5).unwrap();
    let discharged = step_down_before[0];

    assert_eq!(simulation.department(DepartmentKind::StepDown).active_patients(), &step_down_before[1..]);
    assert!(!simulation.context().patients.contains_key(&discharged));
    assert!(!is_queued_anywhere(&simulation, discharged));
    assert_eq!(simulation.context().patients.len(), tracked_before - 1);
    assert_eq!(simulation.statistics().discharged_home, 1);
}

/// Each round picks only patients still waiting for a decision
#[test]
fn test_transfer_rounds_drain_in_admission_order() {
    let config = transfer_config();
    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 5).unwrap();

    simulation.run_until(0.5).unwrap();
    let surgery_before = simulation.department(DepartmentKind::Surgery).active_patients().to_vec();

    // Rounds at t = 1, 2, 3 and 4 empty the department one patient at a time
    simulation.run_until(4.5).unwrap();

    assert!(simulation.department(DepartmentKind::Surgery).active_patients().is_empty());
    assert_eq!(simulation.department(DepartmentKind::CriticalCare).active_patients(), &surgery_before[..]);
    assert_eq!(simulation.statistics().transfers, 4);
    assert_eq!(simulation.statistics().discharged_home, 3);
    assert!(simulation.department(DepartmentKind::StepDown).active_patients().is_empty());
}
