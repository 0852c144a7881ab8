//! Tests for the cost ledger of complete simulation runs
//!
//! These tests use a "quiet" facility (no arrivals, no transfers, no
//! disruptions, empty departments) so every cost can be predicted exactly.

use hospital_flow_sim::optimizer::StaffingSchedule;
use hospital_flow_sim::simulation::HospitalSimulation;
use hospital_flow_sim::types::{ArrivalRate, DepartmentKind, Destination, HospitalConfig};
use std::collections::BTreeMap;

/// Facility with every random flow forced to zero
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

/// A quiet baseline day costs nothing
#[test]
fn test_quiet_baseline_costs_nothing() {
    let config = quiet_config();
    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 1).unwrap();
    let outcome = simulation.run().unwrap();

    assert_eq!(outcome.total_cost, 0.0);
    assert_eq!(outcome.breakdown.wait_total(), 0.0);
    assert_eq!(outcome.breakdown.diversion_total(), 0.0);
    assert_eq!(outcome.statistics.arrivals, 0);
    assert_eq!(outcome.statistics.admissions, 0);
}

/// Ten extra staff every hour: 10 x 40 x 24 plus one setup charge of 10 x 40
#[test]
fn test_ten_extra_staff_for_a_day() {
    let config = quiet_config();
    let schedule = StaffingSchedule::from_fn(|_, kind| {
        config.baseline_staff(kind) + if kind == DepartmentKind::Emergency { 10 } else { 0 }
    });

    let mut simulation = HospitalSimulation::with_seed(&config, 24, Some(schedule), 1).unwrap();
    let outcome = simulation.run().unwrap();

    assert_eq!(outcome.total_cost, 10.0 * 40.0 * 24.0 + 10.0 * 40.0);
    assert_eq!(outcome.breakdown.staffing.setup_cost, 400.0);
    assert_eq!(outcome.breakdown.staffing.hourly_cost, 9600.0);
    assert_eq!(outcome.breakdown.staffing.peak_temps, 10);
    assert_eq!(outcome.breakdown.wait_total(), 0.0);
    assert_eq!(outcome.breakdown.diversion_total(), 0.0);
}

/// Extra staff spread over departments count against the combined regular workforce
#[test]
fn test_temps_use_combined_regular_staff() {
    let config = quiet_config();
    // +3 in Surgery, -3 in StepDown: no temps needed
    let schedule = StaffingSchedule::from_fn(|_, kind| match kind {
        DepartmentKind::Surgery => config.baseline_staff(kind) + 3,
        DepartmentKind::StepDown => config.baseline_staff(kind) - 3,
        _ => config.baseline_staff(kind),
    });

    let mut simulation = HospitalSimulation::with_seed(&config, 24, Some(schedule), 3).unwrap();
    assert_eq!(simulation.run().unwrap().total_cost, 0.0);
}

/// Setup is charged again whenever the temp count climbs back up
#[test]
fn test_setup_charged_on_each_increase() {
    let config = quiet_config();
    // Two temps during even hours, none during odd hours
    let schedule = StaffingSchedule::from_fn(|hour, kind| {
        let extra = if kind == DepartmentKind::Emergency && hour % 2 == 0 { 2 } else { 0 };
        config.baseline_staff(kind) + extra
    });

    let mut simulation = HospitalSimulation::with_seed(&config, 24, Some(schedule), 3).unwrap();
    let outcome = simulation.run().unwrap();

    // 12 even hours, each with 2 new temps billed setup plus one hour
    assert_eq!(outcome.breakdown.staffing.setup_cost, 12.0 * 2.0 * 40.0);
    assert_eq!(outcome.breakdown.staffing.hourly_cost, 12.0 * 2.0 * 40.0);
    assert_eq!(outcome.breakdown.staffing.temp_hours, 24);
}

/// Every direct entry into a full department pays the flat congestion penalty
#[test]
fn test_congestion_penalty_is_flat() {
    let mut config = quiet_config();
    config.direct_entry.insert(DepartmentKind::Surgery, BTreeMap::from([(2, 1.0)]));
    if let Some(surgery) = config.departments.get_mut(&DepartmentKind::Surgery) {
        surgery.bed_capacity = 1;
    }

    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 9).unwrap();
    let outcome = simulation.run().unwrap();

    // The first patient takes the only bed and never leaves; the other 47 find
    // the department full and queue without ever being admitted
    assert_eq!(outcome.statistics.direct_entries, 48);
    assert_eq!(outcome.statistics.admissions, 1);
    assert_eq!(outcome.statistics.congestion_penalties, 47);
    assert_eq!(outcome.breakdown.wait_total(), 47.0 * 3750.0);
    assert_eq!(simulation.department(DepartmentKind::Surgery).waiting_count(), 47);
}

/// Ambulances are diverted only while the ER has no free bed
#[test]
fn test_diversions_need_a_full_er() {
    let mut config = quiet_config();
    for rate in config.arrival_rates.iter_mut() {
        *rate = ArrivalRate::new(4.0, 0.0);
    }
    config.ambulance_rate = 1.0;
    if let Some(er) = config.departments.get_mut(&DepartmentKind::Emergency) {
        er.bed_capacity = 1;
    }

    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 21).unwrap();
    let outcome = simulation.run().unwrap();

    assert_eq!(outcome.statistics.arrivals, 96);
    assert_eq!(outcome.statistics.ambulance_arrivals, 96);
    assert!(outcome.statistics.diversions > 0);
    assert!(outcome.statistics.diversions < 96);
    assert_eq!(
        outcome.breakdown.diversion_total(),
        outcome.statistics.diversions as f64 * 5000.0
    );
    // Diverted patients never join the queue
    let waiting = simulation.department(DepartmentKind::Emergency).waiting_count();
    assert_eq!(outcome.statistics.admissions + outcome.statistics.diversions + waiting, 96);
}

/// Walk-in patients are never diverted, however full the ER is
#[test]
fn test_walk_ins_are_never_diverted() {
    let mut config = quiet_config();
    for rate in config.arrival_rates.iter_mut() {
        *rate = ArrivalRate::new(4.0, 0.0);
    }
    config.ambulance_rate = 0.0;
    if let Some(er) = config.departments.get_mut(&DepartmentKind::Emergency) {
        er.bed_capacity = 1;
    }

    let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 21).unwrap();
    let outcome = simulation.run().unwrap();

    assert_eq!(outcome.statistics.diversions, 0);
    assert_eq!(outcome.breakdown.diversion_total(), 0.0);
    assert!(outcome.breakdown.wait_total() > 0.0);
}
