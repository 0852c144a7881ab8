//! Genetic search over staffing schedules
//!
//! [`ScheduleOptimizer`] treats a simulation run as a noisy fitness function.
//! Each generation is scored with a few runs per schedule, the best half
//! survives, and the next generation is bred by uniform crossover and point
//! mutation. The best unique schedules seen across all generations are kept
//! as contenders and re-scored with many more runs at the end; the lowest
//! validated cost wins.
//!
//! Every fitness sample gets its own seed drawn from the optimizer's
//! generator before any run starts, so the runs can execute in parallel and a
//! seeded optimization still reproduces exactly.

use super::schedule::StaffingSchedule;
use crate::simulation::{FlowModel, HospitalSimulation, SimulationError, SimulationResult};
use crate::types::{HospitalConfig, OptimizerSettings};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A unique schedule retained for final validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contender {
    /// Candidate schedule
    pub schedule: StaffingSchedule,
    /// Structural hash of the schedule
    pub fingerprint: u64,
    /// Fitness when the schedule was first seen
    pub search_cost: f64,
}

/// Bounded list of the cheapest structurally unique schedules
#[derive(Debug, Clone)]
pub struct ContenderPool {
    limit: usize,
    contenders: Vec<Contender>,
}

impl ContenderPool {
    /// Create an empty pool keeping at most `limit` contenders
    pub fn new(limit: usize) -> Self {
        Self { limit, contenders: Vec::with_capacity(limit + 1) }
    }

    /// Offer a scored schedule
    ///
    /// A schedule already in the pool keeps its first score. Returns whether the
    /// schedule is in the pool afterwards.
    pub fn offer(&mut self, schedule: &StaffingSchedule, cost: f64) -> bool {
        let fingerprint = schedule.fingerprint();
        if self.contains(schedule, fingerprint) {
            return true;
        }
        self.contenders.push(Contender { schedule: schedule.clone(), fingerprint, search_cost: cost });
        self.contenders.sort_by(|a, b| a.search_cost.total_cmp(&b.search_cost));
        self.contenders.truncate(self.limit);
        self.contains(schedule, fingerprint)
    }

    fn contains(&self, schedule: &StaffingSchedule, fingerprint: u64) -> bool {
        self.contenders.iter().any(|c| c.fingerprint == fingerprint && c.schedule == *schedule)
    }

    /// Cheapest contender
    pub fn best(&self) -> Option<&Contender> {
        self.contenders.first()
    }

    /// Contenders from cheapest to most expensive
    pub fn iter(&self) -> impl Iterator<Item = &Contender> {
        self.contenders.iter()
    }

    /// Number of contenders held
    pub fn len(&self) -> usize {
        self.contenders.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.contenders.is_empty()
    }

    /// Take the contenders out, cheapest first
    pub fn into_vec(self) -> Vec<Contender> {
        self.contenders
    }
}

/// Scores recorded for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation index, from zero
    pub generation: usize,
    /// Cheapest schedule of this generation
    pub best_cost: f64,
    /// Cheapest contender seen so far
    pub best_seen: f64,
    /// Baseline schedule scored under the same sample count, if tracked
    pub baseline_cost: Option<f64>,
}

/// A contender after the high-precision re-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedContender {
    /// Position in the contender pool before validation
    pub rank: usize,
    /// Structural hash of the schedule
    pub fingerprint: u64,
    /// Cost seen during the search
    pub search_cost: f64,
    /// Cost under the validation sample count
    pub validated_cost: f64,
    /// The schedule
    pub schedule: StaffingSchedule,
}

/// Outcome of an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Schedule with the lowest validated cost
    pub best_schedule: StaffingSchedule,
    /// Its validated cost
    pub best_cost: f64,
    /// Baseline schedule under the validation sample count
    pub baseline_cost: f64,
    /// Every contender, cheapest validated cost first
    pub contenders: Vec<ValidatedContender>,
    /// Per-generation scores
    pub generations: Vec<GenerationSummary>,
    /// Settings the search ran with
    pub settings: OptimizerSettings,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
}

impl OptimizationReport {
    /// Cost saved against the baseline (negative if the baseline is cheaper)
    pub fn savings(&self) -> f64 {
        self.baseline_cost - self.best_cost
    }

    /// Savings as a percentage of the baseline cost
    pub fn savings_percent(&self) -> f64 {
        if self.baseline_cost > 0.0 {
            self.savings() / self.baseline_cost * 100.0
        } else {
            0.0
        }
    }

    /// Wall-clock duration of the search
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Write the report as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SimulationResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Optimized ${:.2} vs baseline ${:.2} | savings ${:.2} ({:.1}%) | {} generations, {} contenders, {:.1}s",
            self.best_cost,
            self.baseline_cost,
            self.savings(),
            self.savings_percent(),
            self.generations.len(),
            self.contenders.len(),
            self.elapsed().num_milliseconds() as f64 / 1000.0
        )
    }
}

/// Genetic algorithm searching for a cheap staffing schedule
#[derive(Debug)]
pub struct ScheduleOptimizer {
    config: Arc<HospitalConfig>,
    model: Arc<FlowModel>,
    settings: OptimizerSettings,
    baseline: StaffingSchedule,
    rng: StdRng,
}

impl ScheduleOptimizer {
    /// Create an optimizer using `config.optimizer` as settings
    pub fn new(config: &HospitalConfig) -> SimulationResult<Self> {
        Self::with_settings(config, config.optimizer.clone())
    }

    /// Create an optimizer with explicit settings
    pub fn with_settings(config: &HospitalConfig, settings: OptimizerSettings) -> SimulationResult<Self> {
        config.validate()?;
        settings.validate()?;

        let rng: StdRng = if let Some(seed) = settings.seed {
            info!("Using deterministic seed: {}", seed);
            SeedableRng::seed_from_u64(seed)
        } else {
            debug!("Using entropy-based random seed");
            SeedableRng::from_entropy()
        };

        Ok(Self {
            model: Arc::new(FlowModel::from_config(config)?),
            baseline: StaffingSchedule::baseline(config),
            config: Arc::new(config.clone()),
            settings,
            rng,
        })
    }

    /// Settings in use
    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Baseline schedule, seeded into the first generation
    pub fn baseline(&self) -> &StaffingSchedule {
        &self.baseline
    }

    /// Average total cost of `schedule` over `samples` runs
    pub fn evaluate(&mut self, schedule: &StaffingSchedule, samples: usize) -> SimulationResult<f64> {
        let costs = self.evaluate_many(std::slice::from_ref(schedule), samples)?;
        costs
            .first()
            .copied()
            .ok_or_else(|| SimulationError::optimizer_error("evaluation produced no cost"))
    }

    /// Average total cost of each schedule over `samples` runs, in input order
    #[instrument(skip(self, schedules), fields(schedules = schedules.len()))]
    pub fn evaluate_many(
        &mut self,
        schedules: &[StaffingSchedule],
        samples: usize,
    ) -> SimulationResult<Vec<f64>> {
        if samples == 0 {
            return Err(SimulationError::optimizer_error("at least one sample is required"));
        }

        let mut jobs = Vec::with_capacity(schedules.len() * samples);
        for schedule in schedules {
            let schedule = Arc::new(schedule.clone());
            for _ in 0..samples {
                jobs.push((Arc::clone(&schedule), self.rng.gen::<u64>()));
            }
        }

        let config = &self.config;
        let model = &self.model;
        let horizon = self.settings.horizon_hours;
        let costs = jobs
            .par_iter()
            .map(|(schedule, seed)| -> SimulationResult<f64> {
                let rng = StdRng::seed_from_u64(*seed);
                let mut simulation = HospitalSimulation::with_model(
                    Arc::clone(config),
                    Arc::clone(model),
                    horizon,
                    Some(Arc::clone(schedule)),
                    rng,
                )?;
                Ok(simulation.run()?.total_cost)
            })
            .collect::<SimulationResult<Vec<f64>>>()?;

        Ok(costs.chunks(samples).map(|chunk| chunk.iter().sum::<f64>() / chunk.len() as f64).collect())
    }

    /// Run the search and validate the contenders
    #[instrument(skip(self), fields(population = self.settings.population_size, generations = self.settings.generations))]
    pub fn run(&mut self) -> SimulationResult<OptimizationReport> {
        let started_at = Utc::now();
        let settings = self.settings.clone();
        let baseline = self.baseline.clone();

        let mut population: Vec<StaffingSchedule> = (0..settings.population_size)
            .map(|_| {
                StaffingSchedule::perturbed(
                    &self.config,
                    settings.min_perturbation,
                    settings.max_perturbation,
                    &mut self.rng,
                )
            })
            .collect();
        if let Some(first) = population.first_mut() {
            *first = baseline.clone();
        }

        let survivor_count = (settings.population_size / 2).max(1);
        let elite_count = settings.elitism.min(survivor_count);
        let mut pool = ContenderPool::new(settings.contender_limit);
        let mut generations = Vec::with_capacity(settings.generations);

        info!(
            "Starting optimization: {} schedules x {} generations, {} samples each",
            settings.population_size, settings.generations, settings.search_samples
        );

        for generation in 0..settings.generations {
            let costs = self.evaluate_many(&population, settings.search_samples)?;
            let baseline_cost = if settings.track_baseline {
                Some(self.evaluate(&baseline, settings.search_samples)?)
            } else {
                None
            };

            let mut scored: Vec<(f64, StaffingSchedule)> = costs.into_iter().zip(population).collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));

            let previous_best = pool.best().map(|c| c.search_cost);
            for (cost, schedule) in &scored {
                pool.offer(schedule, *cost);
            }

            let best_cost = scored.first().map_or(f64::INFINITY, |(cost, _)| *cost);
            let best_seen = pool.best().map_or(best_cost, |c| c.search_cost);
            let improved = previous_best.map_or(true, |previous| best_seen < previous);
            info!(
                generation,
                best_cost,
                best_seen,
                baseline_cost = baseline_cost.unwrap_or(f64::NAN),
                improved,
                "Generation scored"
            );
            generations.push(GenerationSummary { generation, best_cost, best_seen, baseline_cost });

            scored.truncate(survivor_count);
            let survivors: Vec<StaffingSchedule> = scored.into_iter().map(|(_, schedule)| schedule).collect();
            population = self.next_generation(&survivors, elite_count);
        }

        self.validate(pool, &baseline, generations, started_at)
    }

    fn next_generation(&mut self, survivors: &[StaffingSchedule], elite_count: usize) -> Vec<StaffingSchedule> {
        let mut next: Vec<StaffingSchedule> = survivors.iter().take(elite_count).cloned().collect();
        if survivors.is_empty() {
            return next;
        }
        while next.len() < self.settings.population_size {
            let first = &survivors[self.rng.gen_range(0..survivors.len())];
            let second = &survivors[self.rng.gen_range(0..survivors.len())];
            let mut child = first.crossover(second, &mut self.rng);
            if let Some((hour, kind)) = child.mutate(self.settings.mutation_rate, &mut self.rng) {
                debug!(hour, department = %kind, "Mutated child schedule");
            }
            next.push(child);
        }
        next
    }

    fn validate(
        &mut self,
        pool: ContenderPool,
        baseline: &StaffingSchedule,
        generations: Vec<GenerationSummary>,
        started_at: DateTime<Utc>,
    ) -> SimulationResult<OptimizationReport> {
        let samples = self.settings.validation_samples;
        let contenders = pool.into_vec();
        if contenders.is_empty() {
            return Err(SimulationError::optimizer_error("no contenders to validate"));
        }
        info!("Validating {} unique schedules over {} runs each", contenders.len(), samples);

        let schedules: Vec<StaffingSchedule> = contenders.iter().map(|c| c.schedule.clone()).collect();
        let validated_costs = self.evaluate_many(&schedules, samples)?;
        let baseline_cost = self.evaluate(baseline, samples)?;

        let mut validated: Vec<ValidatedContender> = contenders
            .into_iter()
            .zip(validated_costs)
            .enumerate()
            .map(|(rank, (contender, validated_cost))| {
                info!(
                    rank,
                    search_cost = contender.search_cost,
                    validated_cost,
                    "Contender validated"
                );
                ValidatedContender {
                    rank,
                    fingerprint: contender.fingerprint,
                    search_cost: contender.search_cost,
                    validated_cost,
                    schedule: contender.schedule,
                }
            })
            .collect();
        validated.sort_by(|a, b| a.validated_cost.total_cmp(&b.validated_cost));

        let best = validated
            .first()
            .ok_or_else(|| SimulationError::optimizer_error("no contenders to validate"))?;
        info!(best_cost = best.validated_cost, baseline_cost, "Validation complete");

        Ok(OptimizationReport {
            best_schedule: best.schedule.clone(),
            best_cost: best.validated_cost,
            baseline_cost,
            contenders: validated,
            generations,
            settings: self.settings.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
