//! Tests for the staffing schedule genetic operators

use hospital_flow_sim::optimizer::StaffingSchedule;
use hospital_flow_sim::types::{DepartmentKind, HospitalConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Every child cell is copied from one of the two parents
#[test]
fn test_crossover_cells_come_from_a_parent() {
    let config = HospitalConfig::default();
    let low = StaffingSchedule::from_fn(|_, kind| config.baseline_staff(kind));
    let high = StaffingSchedule::from_fn(|_, kind| config.baseline_staff(kind) + 3);

    let mut from_low = 0;
    let mut from_high = 0;
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let child = low.crossover(&high, &mut rng);
        assert_eq!(child.cell_count(), 24 * 4);

        for (hour, kind, level) in child.cells() {
            let a = low.target(hour, kind).unwrap();
            let b = high.target(hour, kind).unwrap();
            assert!(level == a || level == b, "cell {} {} = {} came from neither parent", hour, kind, level);
            if level == a {
                from_low += 1;
            } else {
                from_high += 1;
            }
        }
    }

    // Uniform crossover mixes both parents
    assert!(from_low > 0);
    assert!(from_high > 0);
}

/// Crossover of identical parents reproduces them
#[test]
fn test_crossover_of_twins() {
    let config = HospitalConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let parent = StaffingSchedule::perturbed(&config, -2, 4, &mut rng);

    let child = parent.crossover(&parent.clone(), &mut rng);
    assert_eq!(child, parent);
    assert_eq!(child.fingerprint(), parent.fingerprint());
}

/// A certain mutation moves exactly one cell by one step
#[test]
fn test_mutation_moves_one_cell_by_one() {
    let config = HospitalConfig::default();
    let original = StaffingSchedule::from_fn(|_, kind| config.baseline_staff(kind) + 2);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut mutated = original.clone();
        let (hour, kind) = mutated.mutate(1.0, &mut rng).unwrap();

        let changed: Vec<(u32, DepartmentKind, u32)> = mutated
            .cells()
            .filter(|&(h, k, level)| original.target(h, k) != Some(level))
            .collect();
        assert_eq!(changed.len(), 1);

        let (h, k, level) = changed[0];
        assert_eq!((h, k), (hour, kind));
        let before = original.target(h, k).unwrap();
        assert_eq!(level.abs_diff(before), 1);
    }
}

/// Mutation never takes a cell below one staff member
#[test]
fn test_mutation_keeps_levels_positive() {
    let config = HospitalConfig::default();
    let mut schedule = StaffingSchedule::from_fn(|_, _| 1);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..500 {
        schedule.mutate(1.0, &mut rng);
    }

    assert!(schedule.cells().all(|(_, _, level)| level >= 1));
    assert!(schedule.validate(&config).is_ok());
}

/// A zero mutation rate never changes the genome
#[test]
fn test_zero_mutation_rate() {
    let config = HospitalConfig::default();
    let original = StaffingSchedule::baseline(&config);
    let mut schedule = original.clone();
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        assert!(schedule.mutate(0.0, &mut rng).is_none());
    }
    assert_eq!(schedule, original);
}

/// Perturbed schedules stay within the requested offsets of baseline
#[test]
fn test_perturbed_offsets() {
    let config = HospitalConfig::default();
    let mut rng = StdRng::seed_from_u64(10);
    let schedule = StaffingSchedule::perturbed(&config, -2, 4, &mut rng);

    assert_eq!(schedule.cell_count(), 24 * 4);
    for (_, kind, level) in schedule.cells() {
        let offset = i64::from(level) - i64::from(config.baseline_staff(kind));
        assert!((-2..=4).contains(&offset), "{} offset {} out of range", kind, offset);
    }
}

/// Temps are counted against the combined regular staff
#[test]
fn test_staffing_rows_count_temps() {
    let config = HospitalConfig::default();
    let schedule = StaffingSchedule::from_fn(|hour, kind| {
        if hour == 5 && kind == DepartmentKind::Surgery {
            config.baseline_staff(kind) + 7
        } else {
            config.baseline_staff(kind)
        }
    });

    let rows = schedule.staffing_rows(&config);
    assert_eq!(rows.len(), 24);
    assert_eq!(rows[5].temps, 7);
    assert_eq!(rows[5].total, config.regular_staff_total() + 7);
    assert!(rows.iter().filter(|row| row.hour != 5).all(|row| row.temps == 0));
}
