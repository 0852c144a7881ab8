//! Simulated clock and event queue
//!
//! Time is measured in hours since the start of the run. Everything that happens
//! is a [`Wakeup`] scheduled at an instant; wakeups at the same instant fire in
//! the order they were scheduled.

use crate::types::{DepartmentKind, ProcessId, RequestId, HOURS_PER_DAY};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Something due to happen at a simulated instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Draw this hour's ER arrivals
    HourlyArrivals {
        /// Hour index since the start of the run
        hour: u32,
    },
    /// One ER arrival reaches the door
    PatientArrival,
    /// Draw this hour's direct admissions
    DirectEntries {
        /// Hour index since the start of the run
        hour: u32,
    },
    /// Hourly transfer and discharge decisions
    TransferRound,
    /// A random disruption strikes
    Disruption,
    /// Apply this hour's staffing targets
    StaffingChange {
        /// Hour index since the start of the run
        hour: u32,
    },
    /// Resume a suspended patient process
    Resume(ProcessId),
    /// A running disruption ends
    DisruptionExpiry {
        /// Department affected
        department: DepartmentKind,
        /// Virtual hold to release
        hold: RequestId,
    },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: f64,
    seq: u64,
    wakeup: Wakeup,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.total_cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// Event queue ordered by time, then scheduling order
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
    seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl SimClock {
    /// Create a clock at t = 0 with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in hours
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Whole hours elapsed
    pub fn hour(&self) -> u32 {
        self.now.max(0.0).floor() as u32
    }

    /// Hour of the current day (0-23)
    pub fn hour_of_day(&self) -> u32 {
        self.hour() % HOURS_PER_DAY
    }

    /// Number of wakeups not yet fired
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Time of the next wakeup
    pub fn peek_time(&self) -> Option<f64> {
        self.queue.peek().map(|Reverse(scheduled)| scheduled.at)
    }

    /// Schedule `wakeup` at absolute time `at` (never earlier than now)
    pub fn schedule_at(&mut self, at: f64, wakeup: Wakeup) {
        let at = if at < self.now { self.now } else { at };
        self.queue.push(Reverse(Scheduled { at, seq: self.seq, wakeup }));
        self.seq += 1;
    }

    /// Schedule `wakeup` after `delay` hours
    pub fn schedule_in(&mut self, delay: f64, wakeup: Wakeup) {
        self.schedule_at(self.now + delay.max(0.0), wakeup);
    }

    /// Pop the next wakeup strictly before `horizon` and advance the clock to it
    pub fn next_before(&mut self, horizon: f64) -> Option<Wakeup> {
        match self.queue.peek() {
            Some(Reverse(scheduled)) if scheduled.at < horizon => {}
            _ => return None,
        }
        let Reverse(scheduled) = self.queue.pop()?;
        self.now = scheduled.at;
        Some(scheduled.wakeup)
    }

    /// Move the clock forward to `time` without firing anything
    pub fn advance_to(&mut self, time: f64) {
        if time > self.now {
            self.now = time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wakeups_fire_in_time_order() {
        let mut clock = SimClock::new();
        clock.schedule_at(2.0, Wakeup::TransferRound);
        clock.schedule_at(0.5, Wakeup::PatientArrival);
        clock.schedule_at(1.0, Wakeup::Disruption);

        assert_eq!(clock.next_before(10.0), Some(Wakeup::PatientArrival));
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.next_before(10.0), Some(Wakeup::Disruption));
        assert_eq!(clock.next_before(10.0), Some(Wakeup::TransferRound));
        assert_eq!(clock.next_before(10.0), None);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut clock = SimClock::new();
        clock.schedule_at(1.0, Wakeup::Resume(ProcessId(2)));
        clock.schedule_at(1.0, Wakeup::Resume(ProcessId(1)));
        clock.schedule_at(1.0, Wakeup::StaffingChange { hour: 1 });

        assert_eq!(clock.next_before(5.0), Some(Wakeup::Resume(ProcessId(2))));
        assert_eq!(clock.next_before(5.0), Some(Wakeup::Resume(ProcessId(1))));
        assert_eq!(clock.next_before(5.0), Some(Wakeup::StaffingChange { hour: 1 }));
    }

    #[test]
    fn test_horizon_is_exclusive() {
        let mut clock = SimClock::new();
        clock.schedule_at(24.0, Wakeup::HourlyArrivals { hour: 24 });
        assert_eq!(clock.next_before(24.0), None);
        assert_eq!(clock.pending(), 1);
        assert_eq!(clock.peek_time(), Some(24.0));
    }

    #[test]
    fn test_hour_of_day_wraps() {
        let mut clock = SimClock::new();
        clock.schedule_at(25.5, Wakeup::TransferRound);
        clock.next_before(48.0);
        assert_eq!(clock.hour(), 25);
        assert_eq!(clock.hour_of_day(), 1);

        // Past instants are clamped to now
        clock.schedule_in(-3.0, Wakeup::Disruption);
        assert_eq!(clock.peek_time(), Some(25.5));
    }
}
