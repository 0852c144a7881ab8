//! Hospital Flow Simulator
//!
//! A discrete-event simulation of patient flow through a multi-department
//! hospital, and a genetic optimizer that searches for the hourly staffing
//! schedule with the lowest simulated operating cost.
//!
//! # Overview
//!
//! Patients arrive at the ER, by ambulance or on foot, and enter inpatient
//! departments directly or by transfer. Every department has a fixed number of
//! beds and an hourly staff level; a patient needs one of each before
//! treatment starts. Waiting, ambulance diversions and temporary staff all
//! cost money, and the optimizer trades them off against each other.
//!
//! ## Key Features
//!
//! - **Resizable Resource Pools**: staff capacity changes every hour without evicting admitted patients
//! - **Cooperative Patient Processes**: explicit state machines driven by one event queue
//! - **Stochastic Flow**: Normal arrival counts, disposition and transfer tables
//! - **Random Disruptions**: room closures and staff leave
//! - **Genetic Search**: uniform crossover, point mutation, elitism and contender validation
//! - **Reproducible Runs**: seeded runs reproduce bit-for-bit, even with parallel fitness evaluation
//!
//! ## Quick Start
//!
//! ```rust
//! use hospital_flow_sim::*;
//!
//! let config = HospitalConfig::default();
//! let mut simulation = HospitalSimulation::with_seed(&config, 24, None, 42)?;
//! let outcome = simulation.run()?;
//!
//! println!("Baseline cost: ${:.2}", outcome.total_cost);
//! # Ok::<(), SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Core types, identifiers, and configuration
//! - [`facility`]: Resource pools and departments
//! - [`patient`]: Patient records and transfer signals
//! - [`flow`]: Patient processes and hourly generators
//! - [`simulation`]: Clock, run context, samplers, and cost accounting
//! - [`optimizer`]: Staffing schedules and the genetic search
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Facility   │    │   Patient   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Resource    │◄───┤ Transfer    │
//! │ Enums       │    │ Pools       │    │ Signal      │
//! │ Config      │    │ Departments │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Optimizer  │    │ Simulation  │    │    Flow     │
//! │             │    │             │    │             │
//! │ Schedule    ├───►│ Clock       │◄───┤ Processes   │
//! │ Genetic     │    │ Context     │    │ Generators  │
//! │ Search      │    │ Statistics  │    │             │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod facility;
pub mod flow;
pub mod optimizer;
pub mod patient;
pub mod simulation;

pub mod types;

// Core types and identifiers
pub use types::{
    AdmissionGate,
    ArrivalRate,
    CliArgs,
    ConfigError,
    ConfigValidationError,
    DepartmentConfig,
    // Enums
    DepartmentKind,
    Destination,
    DisruptionConfig,
    DisruptionKind,
    HoldKind,
    // Configuration
    HospitalConfig,
    IdSequence,
    OptimizerSettings,
    // Identifiers
    PatientId,
    PatientStatus,
    ProcessId,
    RequestId,
    TransferPathway,
};

// Facility types and functionality
pub use facility::{Department, DepartmentCosts, Grant, ResourcePool};

// Patient types
pub use patient::{Patient, TransferSignal};

// Flow types
pub use flow::PatientProcess;

// Simulation types and functionality
pub use simulation::{
    CostBreakdown, FlowModel, FlowStatistics, HospitalSimulation, LoggingConfig, SimClock,
    SimContext, SimulationError, SimulationOutcome, SimulationResult, StaffingLedger,
};

// Optimizer types and functionality
pub use optimizer::{
    ContenderPool, GenerationSummary, OptimizationReport, ScheduleOptimizer, StaffingRow,
    StaffingSchedule, ValidatedContender,
};
