//! Sampling helpers for the flow tables
//!
//! [`Pmf`] samples discrete outcomes from a probability table, [`ArrivalSampler`]
//! draws hourly arrival counts from per-hour Normal distributions, and
//! [`FlowModel`] bundles every sampler a run needs. A `FlowModel` is built once
//! from the configuration and shared read-only by all runs.

use super::{SimulationError, SimulationResult};
use crate::types::{DepartmentKind, Destination, HospitalConfig, HOURS_PER_DAY};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fmt::Debug;
use tracing::warn;

/// Tolerance on the weight sum before a table is reported as malformed
pub const PMF_TOLERANCE: f64 = 0.01;

/// Discrete probability mass function
#[derive(Debug, Clone)]
pub struct Pmf<T> {
    outcomes: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T: Copy + Debug> Pmf<T> {
    /// Build a table from `(outcome, weight)` pairs
    ///
    /// Weights are normalized to sum to one. A sum further than
    /// [`PMF_TOLERANCE`] from one is reported as a warning. Negative weights, an
    /// empty table or a zero total are errors.
    pub fn new(label: &str, entries: impl IntoIterator<Item = (T, f64)>) -> SimulationResult<Self> {
        let (outcomes, weights): (Vec<T>, Vec<f64>) = entries.into_iter().unzip();
        if outcomes.is_empty() {
            return Err(SimulationError::distribution_error(format!("{} has no outcomes", label)));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SimulationError::distribution_error(format!(
                "{} has invalid weight {}",
                label, bad
            )));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SimulationError::distribution_error(format!(
                "{} weights sum to zero",
                label
            )));
        }
        if (total - 1.0).abs() > PMF_TOLERANCE {
            warn!(table = label, total, "Probability table does not sum to 1, normalizing");
        }

        let mut running = 0.0;
        let cumulative = weights
            .iter()
            .map(|w| {
                running += w / total;
                running
            })
            .collect();

        Ok(Self { outcomes, cumulative })
    }

    /// Draw one outcome
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        let draw: f64 = rng.gen();
        let index = self
            .cumulative
            .iter()
            .position(|&threshold| draw < threshold)
            .unwrap_or(self.outcomes.len() - 1);
        self.outcomes[index]
    }

    /// Outcomes in table order
    pub fn outcomes(&self) -> &[T] {
        &self.outcomes
    }

    /// Normalized probability of the outcome at `index`
    pub fn probability(&self, index: usize) -> f64 {
        match index {
            0 => self.cumulative.first().copied().unwrap_or(0.0),
            i if i < self.cumulative.len() => self.cumulative[i] - self.cumulative[i - 1],
            _ => 0.0,
        }
    }
}

/// Per-hour Normal arrival-count sampler
#[derive(Debug, Clone)]
pub struct ArrivalSampler {
    hourly: Vec<Normal<f64>>,
}

impl ArrivalSampler {
    /// Build the sampler from the configured arrival table
    pub fn from_config(config: &HospitalConfig) -> SimulationResult<Self> {
        let hourly = (0..HOURS_PER_DAY)
            .map(|hour| {
                let rate = config.arrival_rate(hour);
                Normal::new(rate.mean, rate.std_dev).map_err(|e| {
                    SimulationError::distribution_error(format!(
                        "arrival rate for hour {}: {}",
                        hour, e
                    ))
                })
            })
            .collect::<SimulationResult<Vec<_>>>()?;
        Ok(Self { hourly })
    }

    /// Arrivals during `hour`: a Normal draw rounded to the nearest integer, floored at zero
    pub fn sample_count<R: Rng + ?Sized>(&self, hour: u32, rng: &mut R) -> u32 {
        let index = (hour % HOURS_PER_DAY) as usize;
        let draw = self.hourly[index % self.hourly.len()].sample(rng);
        draw.round().max(0.0) as u32
    }
}

/// Transfer table between two departments
#[derive(Debug, Clone)]
pub struct TransferSampler {
    /// Source department
    pub from: DepartmentKind,
    /// Destination department
    pub to: DepartmentKind,
    /// Hourly move count distribution
    pub moves: Pmf<usize>,
}

/// All samplers used by one run
#[derive(Debug, Clone)]
pub struct FlowModel {
    /// ER arrivals per hour
    pub arrivals: ArrivalSampler,
    /// Where ER patients go after treatment
    pub disposition: Pmf<Destination>,
    /// Inter-department transfers, in configured order
    pub transfers: Vec<TransferSampler>,
    /// Direct admissions per department
    pub direct_entry: Vec<(DepartmentKind, Pmf<usize>)>,
    /// StepDown discharges home per hour
    pub step_down_departures: Pmf<usize>,
}

impl FlowModel {
    /// Build every sampler from the configuration
    pub fn from_config(config: &HospitalConfig) -> SimulationResult<Self> {
        let arrivals = ArrivalSampler::from_config(config)?;
        let disposition =
            Pmf::new("er_disposition", config.er_disposition.iter().map(|(d, p)| (*d, *p)))?;

        let transfers = config
            .transfer_pathways
            .iter()
            .map(|pathway| {
                let label = format!("transfer {}->{}", pathway.from, pathway.to);
                Ok(TransferSampler {
                    from: pathway.from,
                    to: pathway.to,
                    moves: Pmf::new(&label, pathway.pmf.iter().map(|(n, p)| (*n, *p)))?,
                })
            })
            .collect::<SimulationResult<Vec<_>>>()?;

        let direct_entry = config
            .direct_entry
            .iter()
            .map(|(kind, table)| {
                let label = format!("direct_entry {}", kind);
                Ok((*kind, Pmf::new(&label, table.iter().map(|(n, p)| (*n, *p)))?))
            })
            .collect::<SimulationResult<Vec<_>>>()?;

        let step_down_departures = Pmf::new(
            "step_down_departures",
            config.step_down_departures.iter().map(|(n, p)| (*n, *p)),
        )?;

        Ok(Self { arrivals, disposition, transfers, direct_entry, step_down_departures })
    }
}
