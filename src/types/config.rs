//! Configuration structures for the patient-flow simulator
//!
//! This module contains the facility configuration tables (arrival rates, capacities,
//! flow probabilities, cost rates), the optimizer settings, command line arguments,
//! and the loading/validation logic that ties them together.

use super::{DepartmentKind, Destination};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Hours in one simulated day
pub const HOURS_PER_DAY: u32 = 24;

/// Normal-distribution parameters for the arrival count of one hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRate {
    /// Mean arrivals per hour
    pub mean: f64,
    /// Standard deviation of arrivals per hour
    pub std_dev: f64,
}

impl ArrivalRate {
    /// Create an arrival rate
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Static parameters of one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentConfig {
    /// Number of beds (rooms)
    pub bed_capacity: usize,
    /// Regular staff on duty when no schedule says otherwise
    pub baseline_staff: u32,
    /// Patients already admitted when the simulation starts
    pub initial_patients: usize,
    /// Wait cost per patient-hour, also the flat congestion penalty
    pub wait_cost: f64,
    /// Cost per diverted ambulance
    pub diversion_cost: f64,
}

/// Hourly move-count distribution between two departments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPathway {
    /// Department patients leave
    pub from: DepartmentKind,
    /// Department patients are moved to
    pub to: DepartmentKind,
    /// Move count -> probability
    pub pmf: BTreeMap<usize, f64>,
}

/// Random disruption settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionConfig {
    /// Whether the disruption generator runs at all
    pub enabled: bool,
    /// Shortest gap between two disruptions, in whole hours
    pub min_interval_hours: u32,
    /// Longest gap between two disruptions, in whole hours
    pub max_interval_hours: u32,
    /// Chance that a staff leave lasts until the end of the current day
    pub extended_leave_probability: f64,
}

impl Default for DisruptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_hours: 2,
            max_interval_hours: 4,
            extended_leave_probability: 0.5,
        }
    }
}

/// Hours of the day during which a department refuses new admissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionGate {
    /// Department the gate applies to
    pub department: DepartmentKind,
    /// First closed hour of the day (inclusive)
    pub closes_at: u32,
    /// First open hour of the day (the gate is closed before it)
    pub opens_at: u32,
}

impl AdmissionGate {
    /// Whether admissions are refused during `hour_of_day`
    pub fn is_closed(&self, hour_of_day: u32) -> bool {
        if self.closes_at > self.opens_at {
            // Window wraps around midnight, e.g. 23 -> 6
            hour_of_day >= self.closes_at || hour_of_day < self.opens_at
        } else {
            hour_of_day >= self.closes_at && hour_of_day < self.opens_at
        }
    }
}

/// Genetic optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Schedules per generation
    pub population_size: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Chance that a child schedule receives a point mutation
    pub mutation_rate: f64,
    /// Best survivors copied unchanged into the next generation
    pub elitism: usize,
    /// Simulation runs averaged per fitness evaluation during search
    pub search_samples: usize,
    /// Simulation runs averaged per contender during final validation
    pub validation_samples: usize,
    /// Unique contenders retained for validation
    pub contender_limit: usize,
    /// Smallest staff offset from baseline in the initial population
    pub min_perturbation: i32,
    /// Largest staff offset from baseline in the initial population
    pub max_perturbation: i32,
    /// Simulated hours per fitness run
    pub horizon_hours: u32,
    /// Random seed for reproducible optimization
    pub seed: Option<u64>,
    /// Score the baseline schedule every generation for reporting
    pub track_baseline: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            population_size: 5,
            generations: 100,
            mutation_rate: 0.1,
            elitism: 2,
            search_samples: 5,
            validation_samples: 100,
            contender_limit: 5,
            min_perturbation: -2,
            max_perturbation: 4,
            horizon_hours: HOURS_PER_DAY,
            seed: None,
            track_baseline: true,
        }
    }
}

impl OptimizerSettings {
    /// Validate the optimizer settings
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.population_size == 0 {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "population_size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.generations == 0 {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "generations".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.elitism > self.population_size {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "elitism".to_string(),
                reason: format!("{} exceeds population size {}", self.elitism, self.population_size),
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigValidationError::InvalidProbability {
                field: "mutation_rate".to_string(),
                value: self.mutation_rate,
            });
        }
        if self.search_samples == 0 || self.validation_samples == 0 {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "samples".to_string(),
                reason: "search and validation sample counts must be greater than 0".to_string(),
            });
        }
        if self.contender_limit == 0 {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "contender_limit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.min_perturbation > self.max_perturbation {
            return Err(ConfigValidationError::InvalidOptimizerSetting {
                field: "perturbation".to_string(),
                reason: format!(
                    "min ({}) must be <= max ({})",
                    self.min_perturbation, self.max_perturbation
                ),
            });
        }
        if self.horizon_hours == 0 {
            return Err(ConfigValidationError::InvalidHorizon(self.horizon_hours));
        }
        Ok(())
    }
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hospital-flow-sim",
    version = "0.1.0",
    about = "Hospital patient-flow simulator and staffing schedule optimizer",
    long_about = "Simulates patient flow through ER, Surgery, CriticalCare and StepDown with hour-by-hour staffing, then searches for a 24-hour staffing schedule that minimizes wait, diversion and temporary staffing cost.

EXAMPLES:
    # Baseline, optimization and validation with default settings
    hospital-flow-sim

    # Reproducible run with a smaller search
    hospital-flow-sim --seed 7 --generations 20 --population-size 8

    # Only simulate the baseline staffing
    hospital-flow-sim --baseline-only

    # Generate configuration template
    hospital-flow-sim --print-config > facility.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Simulated hours per run
    #[arg(long, help = "Simulated hours per run")]
    pub hours: Option<u32>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Schedules per generation
    #[arg(long, help = "Schedules per generation")]
    pub population_size: Option<usize>,

    /// Number of generations
    #[arg(long, help = "Number of generations")]
    pub generations: Option<usize>,

    /// Per-child mutation probability (0.0-1.0)
    #[arg(long, help = "Per-child mutation probability (0.0-1.0)")]
    pub mutation_rate: Option<f64>,

    /// Elite schedules carried over unchanged
    #[arg(long, help = "Elite schedules carried over unchanged")]
    pub elitism: Option<usize>,

    /// Simulation runs per fitness evaluation during search
    #[arg(long, help = "Simulation runs per fitness evaluation during search")]
    pub search_samples: Option<usize>,

    /// Simulation runs per contender during validation
    #[arg(long, help = "Simulation runs per contender during validation")]
    pub validation_samples: Option<usize>,

    /// Only run the baseline simulation
    #[arg(long, help = "Only run the baseline simulation")]
    pub baseline_only: bool,

    /// Write the optimization report as JSON to this path
    #[arg(long, help = "Write the optimization report as JSON to this path")]
    pub schedule_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Arrival-rate parameters, one entry per hour of the day
    pub arrival_rates: Option<Vec<ArrivalRate>>,
    /// Department parameters
    pub departments: Option<BTreeMap<DepartmentKind, DepartmentConfig>>,
    /// Staff pool slots per department
    pub max_staff_slots: Option<usize>,
    /// Fraction of ER arrivals that come by ambulance
    pub ambulance_rate: Option<f64>,
    /// ER treatment time in hours
    pub service_time_hours: Option<f64>,
    /// ER disposition probabilities
    pub er_disposition: Option<BTreeMap<Destination, f64>>,
    /// Inter-department transfer distributions
    pub transfer_pathways: Option<Vec<TransferPathway>>,
    /// Direct-entry distributions per department
    pub direct_entry: Option<BTreeMap<DepartmentKind, BTreeMap<usize, f64>>>,
    /// StepDown-to-home departure distribution
    pub step_down_departures: Option<BTreeMap<usize, f64>>,
    /// Disruption settings
    pub disruptions: Option<DisruptionConfig>,
    /// Admission gates
    pub admission_gates: Option<Vec<AdmissionGate>>,
    /// Hourly rate per temporary staff member
    pub temp_staff_hourly_rate: Option<f64>,
    /// One-off setup charge per newly hired temporary staff member
    pub temp_staff_setup_rate: Option<f64>,
    /// Simulated hours per run
    pub horizon_hours: Option<u32>,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Optimizer settings
    pub optimizer: Option<OptimizerSettings>,
}

/// Complete configuration of the simulated facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalConfig {
    /// Arrival-rate parameters, one entry per hour of the day
    pub arrival_rates: Vec<ArrivalRate>,
    /// Department parameters
    pub departments: BTreeMap<DepartmentKind, DepartmentConfig>,
    /// Staff pool slots per department; the scheduled level is carved out of these
    pub max_staff_slots: usize,
    /// Fraction of ER arrivals that come by ambulance
    pub ambulance_rate: f64,
    /// ER treatment time in hours
    pub service_time_hours: f64,
    /// ER disposition probabilities
    pub er_disposition: BTreeMap<Destination, f64>,
    /// Inter-department transfer distributions, applied in order every hour
    pub transfer_pathways: Vec<TransferPathway>,
    /// Direct-entry distributions per department
    pub direct_entry: BTreeMap<DepartmentKind, BTreeMap<usize, f64>>,
    /// StepDown-to-home departure distribution
    pub step_down_departures: BTreeMap<usize, f64>,
    /// Disruption settings
    pub disruptions: DisruptionConfig,
    /// Admission gates
    pub admission_gates: Vec<AdmissionGate>,
    /// Hourly rate per temporary staff member
    pub temp_staff_hourly_rate: f64,
    /// One-off setup charge per newly hired temporary staff member
    pub temp_staff_setup_rate: f64,
    /// Simulated hours per run
    pub horizon_hours: u32,
    /// Random seed for reproducible results
    pub seed: Option<u64>,
    /// Optimizer settings
    pub optimizer: OptimizerSettings,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for the facility configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Arrival table does not cover every hour of the day
    #[error("Arrival table must have {expected} hourly entries, got {actual}")]
    InvalidArrivalTable {
        /// Required number of entries
        expected: usize,
        /// Number of entries found
        actual: usize,
    },

    /// Arrival parameters are negative or not finite
    #[error("Invalid arrival rate for hour {hour}: mean {mean}, std dev {std_dev}")]
    InvalidArrivalRate {
        /// Hour of the day
        hour: usize,
        /// Configured mean
        mean: f64,
        /// Configured standard deviation
        std_dev: f64,
    },

    /// A department has no configuration entry
    #[error("Missing configuration for department {0}")]
    MissingDepartment(DepartmentKind),

    /// Bed capacity is zero
    #[error("Bed capacity of {0} must be greater than 0")]
    InvalidCapacity(DepartmentKind),

    /// Baseline staff does not fit into the staff pool
    #[error("Baseline staff {staff} of {department} exceeds {slots} staff slots")]
    StaffExceedsSlots {
        /// Department concerned
        department: DepartmentKind,
        /// Configured baseline staff
        staff: u32,
        /// Available pool slots
        slots: usize,
    },

    /// Probability value is out of range
    #[error("Invalid probability for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidProbability {
        /// Name of the field with invalid probability
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Cost or duration is negative or not finite
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Disruption interval range is invalid
    #[error("Invalid disruption interval: min ({0}) must be >= 1 and <= max ({1})")]
    InvalidDisruptionInterval(u32, u32),

    /// Horizon is zero
    #[error("Horizon must be greater than 0 hours, got {0}")]
    InvalidHorizon(u32),

    /// Optimizer setting is invalid
    #[error("Invalid optimizer setting {field}: {reason}")]
    InvalidOptimizerSetting {
        /// Name of the setting
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

fn pmf<const N: usize>(entries: [(usize, f64); N]) -> BTreeMap<usize, f64> {
    entries.into_iter().collect()
}

fn department(
    bed_capacity: usize,
    baseline_staff: u32,
    initial_patients: usize,
    wait_cost: f64,
    diversion_cost: f64,
) -> DepartmentConfig {
    DepartmentConfig { bed_capacity, baseline_staff, initial_patients, wait_cost, diversion_cost }
}

impl Default for HospitalConfig {
    fn default() -> Self {
        let arrival_rates = vec![
            ArrivalRate::new(2.84, 1.53),
            ArrivalRate::new(2.46, 1.34),
            ArrivalRate::new(2.26, 1.30),
            ArrivalRate::new(2.09, 1.15),
            ArrivalRate::new(1.97, 1.08),
            ArrivalRate::new(2.01, 1.11),
            ArrivalRate::new(2.32, 1.28),
            ArrivalRate::new(2.87, 1.53),
            ArrivalRate::new(4.14, 2.06),
            ArrivalRate::new(5.13, 2.33),
            ArrivalRate::new(5.49, 2.44),
            ArrivalRate::new(5.73, 2.56),
            ArrivalRate::new(5.85, 2.54),
            ArrivalRate::new(5.65, 2.46),
            ArrivalRate::new(5.63, 2.50),
            ArrivalRate::new(5.69, 2.38),
            ArrivalRate::new(5.85, 2.47),
            ArrivalRate::new(6.04, 2.57),
            ArrivalRate::new(5.83, 2.46),
            ArrivalRate::new(5.65, 2.40),
            ArrivalRate::new(5.46, 2.42),
            ArrivalRate::new(5.07, 2.31),
            ArrivalRate::new(4.38, 2.17),
            ArrivalRate::new(3.53, 1.84),
        ];

        let departments = BTreeMap::from([
            (DepartmentKind::Emergency, department(75, 18, 16, 150.0, 5000.0)),
            (DepartmentKind::Surgery, department(9, 6, 4, 3750.0, 0.0)),
            (DepartmentKind::CriticalCare, department(18, 13, 12, 3750.0, 0.0)),
            (DepartmentKind::StepDown, department(40, 24, 22, 3750.0, 0.0)),
        ]);

        let er_disposition = BTreeMap::from([
            (Destination::Department(DepartmentKind::Surgery), 0.05),
            (Destination::Department(DepartmentKind::CriticalCare), 0.10),
            (Destination::Department(DepartmentKind::StepDown), 0.20),
            (Destination::Home, 0.65),
        ]);

        let transfer_pathways = vec![
            TransferPathway {
                from: DepartmentKind::Surgery,
                to: DepartmentKind::CriticalCare,
                pmf: pmf([(0, 0.5417), (1, 0.3750), (2, 0.0417), (3, 0.0416)]),
            },
            TransferPathway {
                from: DepartmentKind::Surgery,
                to: DepartmentKind::StepDown,
                pmf: pmf([(0, 0.4583), (1, 0.2083), (2, 0.2083), (3, 0.1250)]),
            },
            TransferPathway {
                from: DepartmentKind::CriticalCare,
                to: DepartmentKind::StepDown,
                pmf: pmf([(0, 0.6250), (1, 0.2500), (2, 0.1250), (3, 0.0)]),
            },
        ];

        let direct_entry = BTreeMap::from([
            (DepartmentKind::Surgery, pmf([(0, 0.792), (1, 0.125), (2, 0.042), (3, 0.041)])),
            (DepartmentKind::CriticalCare, pmf([(0, 0.833), (1, 0.167), (2, 0.0), (3, 0.0)])),
            (DepartmentKind::StepDown, pmf([(0, 0.667), (1, 0.292), (2, 0.042), (3, 0.0)])),
        ]);

        let step_down_departures =
            pmf([(0, 0.1667), (1, 0.1667), (2, 0.2500), (3, 0.2500), (4, 0.0833), (5, 0.0833)]);

        Self {
            arrival_rates,
            departments,
            max_staff_slots: 200,
            ambulance_rate: 0.18,
            service_time_hours: 1.0,
            er_disposition,
            transfer_pathways,
            direct_entry,
            step_down_departures,
            disruptions: DisruptionConfig::default(),
            admission_gates: vec![AdmissionGate {
                department: DepartmentKind::StepDown,
                closes_at: 23,
                opens_at: 6,
            }],
            temp_staff_hourly_rate: 40.0,
            temp_staff_setup_rate: 40.0,
            horizon_hours: HOURS_PER_DAY,
            seed: None,
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl HospitalConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over file values
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file, merging with defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            arrival_rates: config_file.arrival_rates.unwrap_or(defaults.arrival_rates),
            departments: config_file.departments.unwrap_or(defaults.departments),
            max_staff_slots: config_file.max_staff_slots.unwrap_or(defaults.max_staff_slots),
            ambulance_rate: config_file.ambulance_rate.unwrap_or(defaults.ambulance_rate),
            service_time_hours: config_file
                .service_time_hours
                .unwrap_or(defaults.service_time_hours),
            er_disposition: config_file.er_disposition.unwrap_or(defaults.er_disposition),
            transfer_pathways: config_file
                .transfer_pathways
                .unwrap_or(defaults.transfer_pathways),
            direct_entry: config_file.direct_entry.unwrap_or(defaults.direct_entry),
            step_down_departures: config_file
                .step_down_departures
                .unwrap_or(defaults.step_down_departures),
            disruptions: config_file.disruptions.unwrap_or(defaults.disruptions),
            admission_gates: config_file.admission_gates.unwrap_or(defaults.admission_gates),
            temp_staff_hourly_rate: config_file
                .temp_staff_hourly_rate
                .unwrap_or(defaults.temp_staff_hourly_rate),
            temp_staff_setup_rate: config_file
                .temp_staff_setup_rate
                .unwrap_or(defaults.temp_staff_setup_rate),
            horizon_hours: config_file.horizon_hours.unwrap_or(defaults.horizon_hours),
            seed: config_file.seed.or(defaults.seed),
            optimizer: config_file.optimizer.unwrap_or(defaults.optimizer),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.hours {
            config.horizon_hours = value;
            config.optimizer.horizon_hours = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
            config.optimizer.seed = Some(value);
        }
        if let Some(value) = args.population_size {
            config.optimizer.population_size = value;
        }
        if let Some(value) = args.generations {
            config.optimizer.generations = value;
        }
        if let Some(value) = args.mutation_rate {
            config.optimizer.mutation_rate = value;
        }
        if let Some(value) = args.elitism {
            config.optimizer.elitism = value;
        }
        if let Some(value) = args.search_samples {
            config.optimizer.search_samples = value;
        }
        if let Some(value) = args.validation_samples {
            config.optimizer.validation_samples = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    ///
    /// Probability tables whose weights do not sum to one are not rejected here;
    /// they are normalized (with a warning) when the flow model is built.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.arrival_rates.len() != HOURS_PER_DAY as usize {
            return Err(ConfigValidationError::InvalidArrivalTable {
                expected: HOURS_PER_DAY as usize,
                actual: self.arrival_rates.len(),
            });
        }
        for (hour, rate) in self.arrival_rates.iter().enumerate() {
            if !rate.mean.is_finite() || !rate.std_dev.is_finite() || rate.std_dev < 0.0 {
                return Err(ConfigValidationError::InvalidArrivalRate {
                    hour,
                    mean: rate.mean,
                    std_dev: rate.std_dev,
                });
            }
        }

        for kind in DepartmentKind::ALL {
            let dept = self
                .departments
                .get(&kind)
                .ok_or(ConfigValidationError::MissingDepartment(kind))?;
            if dept.bed_capacity == 0 {
                return Err(ConfigValidationError::InvalidCapacity(kind));
            }
            if dept.baseline_staff as usize > self.max_staff_slots {
                return Err(ConfigValidationError::StaffExceedsSlots {
                    department: kind,
                    staff: dept.baseline_staff,
                    slots: self.max_staff_slots,
                });
            }
            self.validate_amount(&format!("{}.wait_cost", kind), dept.wait_cost)?;
            self.validate_amount(&format!("{}.diversion_cost", kind), dept.diversion_cost)?;
        }

        self.validate_probability("ambulance_rate", self.ambulance_rate)?;
        self.validate_probability(
            "disruptions.extended_leave_probability",
            self.disruptions.extended_leave_probability,
        )?;
        self.validate_amount("service_time_hours", self.service_time_hours)?;
        self.validate_amount("temp_staff_hourly_rate", self.temp_staff_hourly_rate)?;
        self.validate_amount("temp_staff_setup_rate", self.temp_staff_setup_rate)?;

        if self.disruptions.min_interval_hours == 0
            || self.disruptions.min_interval_hours > self.disruptions.max_interval_hours
        {
            return Err(ConfigValidationError::InvalidDisruptionInterval(
                self.disruptions.min_interval_hours,
                self.disruptions.max_interval_hours,
            ));
        }

        if self.horizon_hours == 0 {
            return Err(ConfigValidationError::InvalidHorizon(self.horizon_hours));
        }

        self.optimizer.validate()
    }

    /// Helper method to validate probability values
    fn validate_probability(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigValidationError::InvalidProbability {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn validate_amount(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigValidationError::InvalidValue { field: field.to_string(), value });
        }
        Ok(())
    }

    /// Arrival parameters for an hour (hour-of-day is taken modulo 24)
    pub fn arrival_rate(&self, hour: u32) -> ArrivalRate {
        let index = (hour % HOURS_PER_DAY) as usize;
        self.arrival_rates.get(index).copied().unwrap_or(ArrivalRate::new(2.0, 1.0))
    }

    /// Baseline (regular) staff of a department, zero if unconfigured
    pub fn baseline_staff(&self, kind: DepartmentKind) -> u32 {
        self.departments.get(&kind).map_or(0, |d| d.baseline_staff)
    }

    /// Sum of regular staff across all departments
    pub fn regular_staff_total(&self) -> u32 {
        DepartmentKind::ALL.iter().map(|&kind| self.baseline_staff(kind)).sum()
    }

    /// Admission gate configured for a department, if any
    pub fn admission_gate(&self, kind: DepartmentKind) -> Option<AdmissionGate> {
        self.admission_gates.iter().copied().find(|gate| gate.department == kind)
    }
}
