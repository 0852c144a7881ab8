// Hospital Flow Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/hospital-flow-sim
// ```
//
// Or with custom settings:
//
// ```console
// $ ./target/release/hospital-flow-sim --generations 20 --seed 7 --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use hospital_flow_sim::optimizer::{OptimizationReport, ScheduleOptimizer, StaffingSchedule};
use hospital_flow_sim::simulation::{simulate, LoggingConfig, SimulationOutcome};
use hospital_flow_sim::types::{CliArgs, DepartmentKind, HospitalConfig};
use std::process;
use std::time::Instant;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        let default_config = HospitalConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        // Default: warnings only, optimization runs thousands of simulations
        LoggingConfig::new().init()
    };

    let _logging_guard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Hospital Flow Simulator");

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("Hospital Flow Simulator completed successfully");
}

/// Baseline run, optimization, then a validation run of the winning schedule
fn run(args: CliArgs) -> Result<()> {
    let baseline_only = args.baseline_only;
    let schedule_output = args.schedule_output.clone();

    let config = HospitalConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    print_startup_banner(&config);

    eprintln!("Running baseline simulation (regular staffing)...");
    let baseline = simulate(&config, None).context("Baseline simulation failed")?;
    println!("Baseline Total Cost: ${:.2}", baseline.total_cost);
    print_outcome(&baseline);

    if baseline_only {
        return Ok(());
    }

    eprintln!("\nRunning optimization (genetic algorithm)...");
    let started = Instant::now();
    let mut optimizer = ScheduleOptimizer::new(&config).context("Failed to create optimizer")?;
    let report = optimizer.run().context("Optimization failed")?;
    print_report(&report, baseline.total_cost, started.elapsed().as_secs_f64());

    eprintln!("\nValidating best schedule...");
    let validation = simulate(&config, Some(report.best_schedule.clone()))
        .context("Validation simulation failed")?;
    println!("Validation Run Cost: ${:.2}", validation.total_cost);

    print_staffing_table(&report.best_schedule, &config);

    if let Some(path) = schedule_output {
        report
            .save_to_file(&path)
            .with_context(|| format!("Failed to write optimization report to {}", path))?;
        info!("Optimization report written to: {}", path);
        eprintln!("Optimization report written to: {}", path);
    }

    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &HospitalConfig) {
    eprintln!("Hospital Flow Simulator");
    eprintln!("=======================");
    eprintln!("Horizon: {} hours", config.horizon_hours);
    eprintln!("Regular staff: {}", config.regular_staff_total());
    eprintln!(
        "Optimizer: population {}, {} generations, mutation {:.2}, elitism {}",
        config.optimizer.population_size,
        config.optimizer.generations,
        config.optimizer.mutation_rate,
        config.optimizer.elitism
    );
    eprintln!(
        "Samples: {} per search evaluation, {} per validation",
        config.optimizer.search_samples, config.optimizer.validation_samples
    );
    if let Some(seed) = config.seed {
        eprintln!("Random Seed: {}", seed);
    }
    eprintln!();
}

/// Print the cost breakdown and flow counters of one run
fn print_outcome(outcome: &SimulationOutcome) {
    eprint!("{}", outcome.breakdown);
    eprintln!("{}", outcome.statistics.summary());
}

/// Print search results against the single baseline run
fn print_report(report: &OptimizationReport, baseline_run_cost: f64, seconds: f64) {
    println!("\nOptimization Complete in {:.1} seconds", seconds);
    for contender in &report.contenders {
        eprintln!(
            "  Contender {}: search ${:.2} -> validated ${:.2}",
            contender.rank + 1,
            contender.search_cost,
            contender.validated_cost
        );
    }
    eprintln!("Baseline validated cost: ${:.2}", report.baseline_cost);

    let savings = baseline_run_cost - report.best_cost;
    let percent = if baseline_run_cost > 0.0 { savings / baseline_run_cost * 100.0 } else { 0.0 };
    println!("Optimized Total Cost: ${:.2}", report.best_cost);
    println!("Savings: ${:.2} ({:.1}%)", savings, percent);
}

/// Print the per-hour staffing table of a schedule
fn print_staffing_table(schedule: &StaffingSchedule, config: &HospitalConfig) {
    println!("\n=== Optimized Staffing Schedule ===");
    println!(
        "{:<5} | {:<5} {:<5} {:<5} {:<5} | {:<5} | {:<5}",
        "Hour", "ER", "Surg", "CC", "SD", "Total", "Temps"
    );
    println!("{}", "-".repeat(50));

    for row in schedule.staffing_rows(config) {
        let level = |kind: DepartmentKind| row.targets.get(&kind).copied().unwrap_or(0);
        println!(
            "{:<5} | {:<5} {:<5} {:<5} {:<5} | {:<5} | {:<5}",
            row.hour,
            level(DepartmentKind::Emergency),
            level(DepartmentKind::Surgery),
            level(DepartmentKind::CriticalCare),
            level(DepartmentKind::StepDown),
            row.total,
            row.temps
        );
    }
}
