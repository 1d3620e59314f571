//! Simulation output and serialization

use std::time::Duration;

use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::group::GroupSnapshot;
use crate::population::history::HistoryLog;
use crate::population::Population;

/// Complete simulation output
#[derive(Clone, Debug, Serialize)]
pub struct SimulationOutput {
    pub seed: u64,
    pub config: SimulationConfig,
    pub groups: Vec<GroupSnapshot>,
    pub history: HistoryLog,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationStats {
    pub generations_simulated: u32,
    pub simulation_time_ms: u64,
    pub total_mutations: usize,
    pub female_migrations: usize,
    pub male_migrations: usize,
    /// Final male genes, one list per group
    pub final_genes: Vec<Vec<f64>>,
    pub mean_male_gene: Option<f64>,
}

impl SimulationOutput {
    pub fn new(population: Population, elapsed: Duration) -> Self {
        let migrations = population.history.total_migrations();

        let statistics = SimulationStats {
            generations_simulated: population.generation,
            simulation_time_ms: elapsed.as_millis() as u64,
            total_mutations: population.history.total_mutations(),
            female_migrations: migrations.females,
            male_migrations: migrations.males,
            final_genes: population.final_genes(),
            mean_male_gene: population.mean_male_gene(),
        };

        Self {
            seed: population.seed(),
            config: population.config().clone(),
            groups: population.snapshots(),
            history: population.history,
            statistics,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mean = self
            .statistics
            .mean_male_gene
            .map_or_else(|| "n/a".to_string(), |g| format!("{g:.4}"));

        format!(
            "Simulated {} generations of {} groups in {}ms (seed {})\n\
             {} mutations, {} female and {} male migrations\n\
             Mean male competitive-effort gene: {}",
            self.statistics.generations_simulated,
            self.groups.len(),
            self.statistics.simulation_time_ms,
            self.seed,
            self.statistics.total_mutations,
            self.statistics.female_migrations,
            self.statistics.male_migrations,
            mean,
        )
    }
}
