//! Simulation configuration with documented constants
//!
//! Every run-wide constant lives in [`SimulationConfig`], which is passed
//! explicitly into the population and threaded down to groups and agent
//! factories. The defaults reproduce the reference model: three groups of ten
//! males and ten females evolving for one hundred generations.

use std::path::Path;
use std::sync::Arc;

use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Days in a year, used to turn seasonality into a latency window
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Per-day conception probabilities around ovulation, ending on the ovulation day
pub const DEFAULT_CONCEPTION_PEAK: [f64; 6] = [
    0.05784435, 0.16082819, 0.19820558, 0.25408223, 0.24362408, 0.10373275,
];

/// Configuration for a simulation run
///
/// Loaded from TOML; any missing key falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === RUN SHAPE ===
    /// Number of discrete generations to evolve
    pub number_generations: u32,

    /// Number of migration-linked groups
    pub number_groups: usize,

    /// Females per group
    pub number_females: usize,

    /// Males per group
    ///
    /// Offspring are sliced from the parent list at offsets `0..number_females`
    /// (daughters) and `number_males..` (sons). When the two counts differ the
    /// next generation holds `offspring_per_female * number_females - number_males`
    /// males.
    pub number_males: usize,

    // === REPRODUCTIVE PHYSIOLOGY ===
    /// Breeding seasonality in [0, 1]
    ///
    /// 0.0 lets females start cycling anywhere within a year; 1.0 makes every
    /// female start on the same day.
    pub seasonality: f64,

    /// Length of the ovarian cycle in days
    pub cycle_length: usize,

    /// Cycle day of ovulation; the conception peak ends on this day
    pub ovulation_day: usize,

    /// Conception probabilities for the fertile days preceding ovulation
    pub conception_peak: Vec<f64>,

    /// Mean of the normal draw for days until conception is certain
    pub mean_days_to_conception: f64,

    /// Standard deviation of the days-to-conception draw
    pub sd_days_to_conception: f64,

    /// Range male quality is drawn from, `[low, high)`
    pub quality_range: [f64; 2],

    // === GENETICS ===
    /// Gene value carried by founders
    pub initial_gene: f64,

    /// Per-agent probability of a mutation each generation
    pub mutation_rate: f64,

    /// Half-width of the uniform mutation offset
    pub mutation_step: f64,

    /// Genes below this value are clamped back up to it
    pub gene_floor: f64,

    /// Candidate males a female samples before choosing a father
    pub candidate_fathers: usize,

    /// Parent pairs recorded per female when choosing the next generation
    pub offspring_per_female: usize,

    // === MIGRATION ===
    /// Per-agent probability of a migration event each generation
    pub migration_rate: f64,

    // === EXECUTION ===
    /// Minimum group count before running group seasons on the rayon pool
    pub parallel_threshold: usize,

    /// Seed for the population RNG; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            number_generations: 100,
            number_groups: 3,
            number_females: 10,
            number_males: 10,

            seasonality: 0.0,
            cycle_length: 28,
            ovulation_day: 16,
            conception_peak: DEFAULT_CONCEPTION_PEAK.to_vec(),
            mean_days_to_conception: 50.0,
            sd_days_to_conception: 0.0,
            quality_range: [1.0, 2.0],

            initial_gene: 1.0,
            mutation_rate: 0.01,
            mutation_step: 0.05,
            gene_floor: 1.0,
            candidate_fathers: 3,
            offspring_per_female: 2,

            migration_rate: 0.01,

            parallel_threshold: 8,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.number_groups == 0 {
            return Err(invalid("number_groups must be at least 1"));
        }
        if self.number_females == 0 || self.number_males == 0 {
            return Err(invalid("each group needs at least one female and one male"));
        }
        if self.offspring_per_female == 0 || self.candidate_fathers == 0 {
            return Err(invalid(
                "offspring_per_female and candidate_fathers must be at least 1",
            ));
        }

        // Sons are taken from parent offset number_males onward
        if self.number_males >= self.offspring_per_female * self.number_females {
            return Err(invalid(format!(
                "number_males ({}) must be below offspring_per_female * number_females ({})",
                self.number_males,
                self.offspring_per_female * self.number_females
            )));
        }

        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("migration_rate", self.migration_rate),
            ("seasonality", self.seasonality),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!("{name} ({rate}) must lie in [0, 1]")));
            }
        }

        if self.migration_rate > 0.0 && self.number_groups < 2 {
            return Err(invalid(format!(
                "migration_rate is {} but only {} group(s) exist",
                self.migration_rate, self.number_groups
            )));
        }

        if self.cycle_length == 0 {
            return Err(invalid("cycle_length must be positive"));
        }
        if self.conception_peak.len() > self.ovulation_day {
            return Err(invalid(format!(
                "conception_peak has {} days but ovulation_day is {}",
                self.conception_peak.len(),
                self.ovulation_day
            )));
        }
        if self.ovulation_day > self.cycle_length {
            return Err(invalid(format!(
                "ovulation_day ({}) exceeds cycle_length ({})",
                self.ovulation_day, self.cycle_length
            )));
        }
        if self
            .conception_peak
            .iter()
            .any(|p| !(0.0..=1.0).contains(p))
        {
            return Err(invalid("conception probabilities must lie in [0, 1]"));
        }

        if !self.sd_days_to_conception.is_finite() || self.sd_days_to_conception < 0.0 {
            return Err(invalid("sd_days_to_conception must be finite and non-negative"));
        }
        if !self.mean_days_to_conception.is_finite() {
            return Err(invalid("mean_days_to_conception must be finite"));
        }

        let [low, high] = self.quality_range;
        if !(low > 0.0 && low < high && high.is_finite()) {
            return Err(invalid(format!(
                "quality_range [{low}, {high}) must be positive and increasing"
            )));
        }

        if !(self.gene_floor.is_finite() && self.initial_gene >= self.gene_floor) {
            return Err(invalid(format!(
                "initial_gene ({}) must not start below gene_floor ({})",
                self.initial_gene, self.gene_floor
            )));
        }
        if !(self.mutation_step.is_finite() && self.mutation_step >= 0.0) {
            return Err(invalid("mutation_step must be finite and non-negative"));
        }

        Ok(())
    }

    /// Longest latency to cycling a female can be assigned
    pub fn max_non_cycling_days(&self) -> i64 {
        (DAYS_PER_YEAR - DAYS_PER_YEAR * self.seasonality).round_ties_even() as i64
    }

    /// Cycle-day to conception-probability table
    ///
    /// Zero before the fertile window, the peak values up to ovulation, zero
    /// for the rest of the cycle.
    pub fn conception_table(&self) -> Vec<f64> {
        let pre = self.ovulation_day.saturating_sub(self.conception_peak.len());
        let mut table = vec![0.0; pre];
        table.extend_from_slice(&self.conception_peak);
        table.resize(self.cycle_length, 0.0);
        table
    }

    /// Number of sons each group receives after offspring generation
    pub fn male_offspring_count(&self) -> usize {
        (self.offspring_per_female * self.number_females).saturating_sub(self.number_males)
    }

    /// Constants shared read-only by every group during a run
    pub fn season_constants(&self) -> Result<SeasonConstants> {
        let days_to_conception =
            Normal::new(self.mean_days_to_conception, self.sd_days_to_conception)?;

        Ok(SeasonConstants {
            number_females: self.number_females,
            number_males: self.number_males,
            conception_table: self.conception_table().into(),
            max_non_cycling_days: self.max_non_cycling_days(),
            days_to_conception,
            quality_range: (self.quality_range[0], self.quality_range[1]),
            initial_gene: self.initial_gene,
            mutation_rate: self.mutation_rate,
            mutation_step: self.mutation_step,
            gene_floor: self.gene_floor,
            candidate_fathers: self.candidate_fathers,
            offspring_per_female: self.offspring_per_female,
        })
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfig(message.into())
}

/// Derived, read-only constants used by groups and agent factories
#[derive(Debug, Clone)]
pub struct SeasonConstants {
    pub number_females: usize,
    pub number_males: usize,
    pub conception_table: Arc<[f64]>,
    pub max_non_cycling_days: i64,
    pub days_to_conception: Normal<f64>,
    pub quality_range: (f64, f64),
    pub initial_gene: f64,
    pub mutation_rate: f64,
    pub mutation_step: f64,
    pub gene_floor: f64,
    pub candidate_fathers: usize,
    pub offspring_per_female: usize,
}

impl SeasonConstants {
    pub fn cycle_length(&self) -> usize {
        self.conception_table.len()
    }
}
