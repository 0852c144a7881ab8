//! Hourly staffing schedule, the optimizer's genome
//!
//! A [`StaffingSchedule`] maps hour of day (0-23) to a target staff count per
//! department. Simulations read it hour by hour; cells it does not cover fall
//! back to baseline staffing. The optimizer recombines and mutates schedules
//! between generations.

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{DepartmentKind, HospitalConfig, HOURS_PER_DAY};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

/// Smallest staff level a schedule may assign
pub const MIN_STAFF: u32 = 1;

/// Target staff per department for each hour of the day
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffingSchedule {
    hours: BTreeMap<u32, BTreeMap<DepartmentKind, u32>>,
}

/// One row of the staffing table printed for a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingRow {
    /// Hour of the day
    pub hour: u32,
    /// Target per department
    pub targets: BTreeMap<DepartmentKind, u32>,
    /// Sum of all targets
    pub total: u32,
    /// Staff needed beyond the regular workforce
    pub temps: u32,
}

impl StaffingSchedule {
    /// Create an empty schedule (every cell falls back to baseline)
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline staffing for every hour of the day
    pub fn baseline(config: &HospitalConfig) -> Self {
        Self::from_fn(|_, kind| config.baseline_staff(kind))
    }

    /// Build a full 24-hour schedule from a cell function
    pub fn from_fn(mut level: impl FnMut(u32, DepartmentKind) -> u32) -> Self {
        let mut schedule = Self::new();
        for hour in 0..HOURS_PER_DAY {
            for kind in DepartmentKind::ALL {
                schedule.set(hour, kind, level(hour, kind));
            }
        }
        schedule
    }

    /// Random schedule around `config`'s baseline
    ///
    /// Each cell is the baseline plus an offset drawn uniformly from
    /// `min_offset..=max_offset`, clamped to [`MIN_STAFF`].
    pub fn perturbed<R: Rng + ?Sized>(
        config: &HospitalConfig,
        min_offset: i32,
        max_offset: i32,
        rng: &mut R,
    ) -> Self {
        Self::from_fn(|_, kind| {
            let offset = rng.gen_range(min_offset..=max_offset);
            clamp_level(i64::from(config.baseline_staff(kind)) + i64::from(offset))
        })
    }

    /// Target for a department at `hour` (taken modulo 24)
    pub fn target(&self, hour: u32, kind: DepartmentKind) -> Option<u32> {
        self.hours.get(&(hour % HOURS_PER_DAY)).and_then(|targets| targets.get(&kind)).copied()
    }

    /// Target for a department at `hour`, or `fallback` if the cell is missing
    pub fn target_or(&self, hour: u32, kind: DepartmentKind, fallback: u32) -> u32 {
        self.target(hour, kind).unwrap_or(fallback)
    }

    /// Set a cell, clamping the level to [`MIN_STAFF`]
    pub fn set(&mut self, hour: u32, kind: DepartmentKind, level: u32) {
        self.hours.entry(hour % HOURS_PER_DAY).or_default().insert(kind, level.max(MIN_STAFF));
    }

    /// All cells as `(hour, department, level)` in hour then department order
    pub fn cells(&self) -> impl Iterator<Item = (u32, DepartmentKind, u32)> + '_ {
        self.hours
            .iter()
            .flat_map(|(&hour, targets)| targets.iter().map(move |(&kind, &level)| (hour, kind, level)))
    }

    /// Number of cells present
    pub fn cell_count(&self) -> usize {
        self.hours.values().map(BTreeMap::len).sum()
    }

    /// Sum of all targets at `hour`, falling back to baseline for missing cells
    pub fn total_at(&self, hour: u32, config: &HospitalConfig) -> u32 {
        DepartmentKind::ALL
            .iter()
            .map(|&kind| self.target_or(hour, kind, config.baseline_staff(kind)))
            .sum()
    }

    /// Structural hash of the genome
    ///
    /// Cells are stored in sorted order, so two schedules with the same cells
    /// hash the same regardless of how they were built.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Reject hours outside the day and levels outside `MIN_STAFF..=max_staff_slots`
    ///
    /// A department's staff pool has only `config.max_staff_slots` slots.
    pub fn validate(&self, config: &HospitalConfig) -> SimulationResult<()> {
        for (hour, kind, level) in self.cells() {
            if hour >= HOURS_PER_DAY {
                return Err(SimulationError::schedule_error(format!(
                    "hour {} is outside 0..{}",
                    hour, HOURS_PER_DAY
                )));
            }
            if level < MIN_STAFF {
                return Err(SimulationError::schedule_error(format!(
                    "{} at hour {} has staff level {}",
                    kind, hour, level
                )));
            }
            if level as usize > config.max_staff_slots {
                return Err(SimulationError::schedule_error(format!(
                    "{} at hour {} has staff level {} above the {} staff slots",
                    kind, hour, level, config.max_staff_slots
                )));
            }
        }
        Ok(())
    }

    /// Uniform crossover
    ///
    /// Every cell of the child is copied from one parent, chosen with equal
    /// probability. A cell present in only one parent is copied from it.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> Self {
        let mut child = Self::new();
        let hours: BTreeSet<u32> = self.hours.keys().chain(other.hours.keys()).copied().collect();
        for hour in hours {
            for kind in DepartmentKind::ALL {
                let picked = match (self.target(hour, kind), other.target(hour, kind)) {
                    (Some(a), Some(b)) => Some(if rng.gen_bool(0.5) { a } else { b }),
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                };
                if let Some(level) = picked {
                    child.hours.entry(hour).or_default().insert(kind, level);
                }
            }
        }
        child
    }

    /// Point mutation
    ///
    /// With probability `rate`, one random cell moves by one step up or down,
    /// clamped to [`MIN_STAFF`]. Returns the cell that was picked.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) -> Option<(u32, DepartmentKind)> {
        if self.cell_count() == 0 || !rng.gen_bool(rate.clamp(0.0, 1.0)) {
            return None;
        }
        let index = rng.gen_range(0..self.cell_count());
        let (hour, kind, level) = self.cells().nth(index)?;
        let step: i64 = if rng.gen_bool(0.5) { 1 } else { -1 };
        self.set(hour, kind, clamp_level(i64::from(level) + step));
        Some((hour, kind))
    }

    /// Per-hour staffing table with temps counted against the regular workforce
    pub fn staffing_rows(&self, config: &HospitalConfig) -> Vec<StaffingRow> {
        let regular_staff = config.regular_staff_total();
        (0..HOURS_PER_DAY)
            .map(|hour| {
                let targets: BTreeMap<DepartmentKind, u32> = DepartmentKind::ALL
                    .iter()
                    .map(|&kind| (kind, self.target_or(hour, kind, config.baseline_staff(kind))))
                    .collect();
                let total: u32 = targets.values().sum();
                StaffingRow { hour, targets, total, temps: total.saturating_sub(regular_staff) }
            })
            .collect()
    }
}

fn clamp_level(level: i64) -> u32 {
    level.clamp(i64::from(MIN_STAFF), i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_baseline_schedule() {
        let config = HospitalConfig::default();
        let schedule = StaffingSchedule::baseline(&config);
        assert_eq!(schedule.cell_count(), 96);
        assert_eq!(schedule.target(5, DepartmentKind::Surgery), Some(6));
        assert_eq!(schedule.target(29, DepartmentKind::Surgery), Some(6));
        assert_eq!(schedule.total_at(0, &config), 61);
        assert!(schedule.validate(&config).is_ok());
    }

    #[test]
    fn test_missing_cells_fall_back() {
        let config = HospitalConfig::default();
        let mut schedule = StaffingSchedule::new();
        schedule.set(3, DepartmentKind::Emergency, 25);
        assert_eq!(schedule.target(3, DepartmentKind::StepDown), None);
        assert_eq!(schedule.target_or(3, DepartmentKind::StepDown, 24), 24);
        assert_eq!(schedule.total_at(3, &config), 61 - 18 + 25);
    }

    #[test]
    fn test_set_clamps_to_minimum() {
        let mut schedule = StaffingSchedule::new();
        schedule.set(0, DepartmentKind::Surgery, 0);
        assert_eq!(schedule.target(0, DepartmentKind::Surgery), Some(MIN_STAFF));
    }

    #[test]
    fn test_perturbed_stays_in_range() {
        let config = HospitalConfig::default();
        let mut rng = StdRng::seed_from_u64(8);
        let schedule = StaffingSchedule::perturbed(&config, -2, 4, &mut rng);
        for (_, kind, level) in schedule.cells() {
            let base = config.baseline_staff(kind);
            assert!(level >= base - 2 && level <= base + 4);
        }
    }

    #[test]
    fn test_fingerprint_ignores_construction_order() {
        let mut a = StaffingSchedule::new();
        a.set(1, DepartmentKind::Surgery, 4);
        a.set(0, DepartmentKind::Emergency, 9);

        let mut b = StaffingSchedule::new();
        b.set(0, DepartmentKind::Emergency, 9);
        b.set(1, DepartmentKind::Surgery, 4);

        assert_eq!(a.fingerprint(), b.fingerprint());
        b.set(1, DepartmentKind::Surgery, 5);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_staffing_rows_count_temps() {
        let config = HospitalConfig::default();
        let schedule = StaffingSchedule::from_fn(|hour, kind| {
            config.baseline_staff(kind) + if hour < 2 { 1 } else { 0 }
        });
        let rows = schedule.staffing_rows(&config);
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].total, 65);
        assert_eq!(rows[0].temps, 4);
        assert_eq!(rows[5].temps, 0);
    }

    #[test]
    fn test_validate_rejects_bad_cells() {
        let config = HospitalConfig::default();
        let json = r#"{"hours":{"30":{"ER":5}}}"#;
        let schedule: StaffingSchedule = serde_json::from_str(json).unwrap();
        assert!(matches!(schedule.validate(&config), Err(SimulationError::ScheduleError(_))));

        let json = r#"{"hours":{"3":{"Surgery":0}}}"#;
        let schedule: StaffingSchedule = serde_json::from_str(json).unwrap();
        assert!(schedule.validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_levels_above_staff_slots() {
        let config = HospitalConfig { max_staff_slots: 30, ..Default::default() };
        let mut schedule = StaffingSchedule::baseline(&config);

        schedule.set(7, DepartmentKind::StepDown, 30);
        assert!(schedule.validate(&config).is_ok());

        schedule.set(7, DepartmentKind::StepDown, 31);
        assert!(matches!(schedule.validate(&config), Err(SimulationError::ScheduleError(_))));
    }
}
