//! Hospital simulation run
//!
//! This module contains [`HospitalSimulation`], which seats the initial census,
//! starts every generator and drives the event loop up to the horizon.

use super::clock::Wakeup;
use super::context::SimContext;
use super::distributions::FlowModel;
use super::statistics::{CostBreakdown, FlowStatistics};
use super::SimulationResult;
use crate::facility::Department;
use crate::flow::{generators, process};
use crate::optimizer::StaffingSchedule;
use crate::types::{DepartmentKind, HospitalConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Wait plus diversion plus staffing cost
    pub total_cost: f64,
    /// Cost per department and staffing ledger
    pub breakdown: CostBreakdown,
    /// Flow counters
    pub statistics: FlowStatistics,
    /// Simulated hours
    pub horizon_hours: u32,
}

/// One simulation run over a fixed horizon
#[derive(Debug)]
pub struct HospitalSimulation {
    ctx: SimContext,
    horizon: f64,
}

impl HospitalSimulation {
    /// Create a run from a configuration and an optional staffing schedule
    ///
    /// The run is seeded from `config.seed` when set, otherwise from entropy.
    #[instrument(skip(config, schedule), fields(scheduled = schedule.is_some()))]
    pub fn new(
        config: &HospitalConfig,
        horizon_hours: u32,
        schedule: Option<StaffingSchedule>,
    ) -> SimulationResult<Self> {
        let rng: StdRng = if let Some(seed) = config.seed {
            debug!("Using deterministic seed: {}", seed);
            SeedableRng::seed_from_u64(seed)
        } else {
            debug!("Using entropy-based random seed");
            SeedableRng::from_entropy()
        };
        Self::build(config, horizon_hours, schedule, rng)
    }

    /// Create a run with an explicit seed, ignoring `config.seed`
    pub fn with_seed(
        config: &HospitalConfig,
        horizon_hours: u32,
        schedule: Option<StaffingSchedule>,
        seed: u64,
    ) -> SimulationResult<Self> {
        Self::build(config, horizon_hours, schedule, StdRng::seed_from_u64(seed))
    }

    fn build(
        config: &HospitalConfig,
        horizon_hours: u32,
        schedule: Option<StaffingSchedule>,
        rng: StdRng,
    ) -> SimulationResult<Self> {
        config.validate()?;
        let model = FlowModel::from_config(config)?;
        Self::with_model(Arc::new(config.clone()), Arc::new(model), horizon_hours, schedule.map(Arc::new), rng)
    }

    /// Create a run sharing a prebuilt configuration and flow model
    ///
    /// This is the entry point for repeated runs; the configuration is assumed
    /// to be validated already.
    pub fn with_model(
        config: Arc<HospitalConfig>,
        model: Arc<FlowModel>,
        horizon_hours: u32,
        schedule: Option<Arc<StaffingSchedule>>,
        rng: StdRng,
    ) -> SimulationResult<Self> {
        if let Some(schedule) = &schedule {
            schedule.validate(&config)?;
        }
        let mut ctx = SimContext::new(config, model, schedule, rng, horizon_hours)?;
        generators::seat_residents(&mut ctx);
        generators::schedule_generators(&mut ctx);
        Ok(Self { ctx, horizon: f64::from(horizon_hours) })
    }

    /// Fire the next wakeup before the horizon
    ///
    /// Returns `false` once nothing is left to do.
    pub fn step(&mut self) -> SimulationResult<bool> {
        let Some(wakeup) = self.ctx.clock.next_before(self.horizon) else {
            return Ok(false);
        };
        let ctx = &mut self.ctx;
        match wakeup {
            Wakeup::HourlyArrivals { hour } => generators::hourly_arrivals(ctx, hour),
            Wakeup::PatientArrival => generators::patient_arrival(ctx),
            Wakeup::DirectEntries { hour } => generators::direct_entries(ctx, hour),
            Wakeup::TransferRound => generators::transfer_round(ctx)?,
            Wakeup::Disruption => generators::disruption_strike(ctx),
            Wakeup::StaffingChange { hour } => generators::staffing_change(ctx, hour),
            Wakeup::Resume(id) => process::resume(ctx, id),
            Wakeup::DisruptionExpiry { department, hold } => {
                generators::disruption_expiry(ctx, department, hold)
            }
        }
        Ok(true)
    }

    /// Fire every wakeup strictly before `time` (capped at the horizon)
    pub fn run_until(&mut self, time: f64) -> SimulationResult<()> {
        let limit = time.min(self.horizon);
        while self.ctx.clock.peek_time().map_or(false, |at| at < limit) {
            self.step()?;
        }
        self.ctx.clock.advance_to(limit);
        Ok(())
    }

    /// Run to the horizon and report the costs
    #[instrument(skip(self), fields(horizon = self.horizon))]
    pub fn run(&mut self) -> SimulationResult<SimulationOutcome> {
        let mut events = 0usize;
        while self.step()? {
            events += 1;
        }
        self.ctx.clock.advance_to(self.horizon);

        let outcome = self.outcome();
        debug!(events, total_cost = outcome.total_cost, "Simulation finished");
        Ok(outcome)
    }

    /// Costs and counters as they stand now
    pub fn outcome(&self) -> SimulationOutcome {
        SimulationOutcome {
            total_cost: self.total_cost(),
            breakdown: self.cost_breakdown(),
            statistics: self.ctx.stats.clone(),
            horizon_hours: self.ctx.horizon_hours,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.ctx.now()
    }

    /// Total cost accumulated so far
    pub fn total_cost(&self) -> f64 {
        self.ctx.total_cost()
    }

    /// Cost ledger accumulated so far
    pub fn cost_breakdown(&self) -> CostBreakdown {
        self.ctx.cost_breakdown()
    }

    /// Flow counters
    pub fn statistics(&self) -> &FlowStatistics {
        &self.ctx.stats
    }

    /// Department state
    pub fn department(&self, kind: DepartmentKind) -> &Department {
        self.ctx.department(kind)
    }

    /// Full run state, for inspection
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }
}

/// Run one simulation and log its summary
///
/// Convenience wrapper used by the command line driver.
pub fn simulate(
    config: &HospitalConfig,
    schedule: Option<StaffingSchedule>,
) -> SimulationResult<SimulationOutcome> {
    let mut simulation = HospitalSimulation::new(config, config.horizon_hours, schedule)?;
    let outcome = simulation.run()?;
    info!("{}", outcome.breakdown.summary());
    info!("{}", outcome.statistics.summary());
    Ok(outcome)
}
