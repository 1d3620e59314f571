//! Population: all groups plus the generation loop
//!
//! Groups breed independently each generation, on the rayon pool when there
//! are enough of them. Each group owns an RNG seeded from the population RNG,
//! so a seeded run gives the same result serial or parallel. Migration always
//! runs serially afterwards.

pub mod history;
pub mod migration;
pub mod output;
pub mod simulation;

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::config::{SeasonConstants, SimulationConfig};
use crate::core::error::Result;
use crate::core::types::GroupId;
use crate::group::{Group, GroupSnapshot};

pub use history::{GenerationRecord, GroupRecord, HistoryLog, MigrationSummary};
pub use output::{SimulationOutput, SimulationStats};
pub use simulation::simulate;

pub struct Population {
    pub groups: Vec<Group>,
    pub history: HistoryLog,
    /// Generations completed so far
    pub generation: u32,
    config: SimulationConfig,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Population {
    /// Validate the config and create the founding groups
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        if config.number_males != config.number_females {
            tracing::warn!(
                number_males = config.number_males,
                number_females = config.number_females,
                sons = config.male_offspring_count(),
                "unequal sex counts: sons are sliced from parent offset number_males"
            );
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let constants = Arc::new(config.season_constants()?);

        // Every group's founders share the same latencies
        let latencies = initial_latencies(&constants, &mut rng);

        let groups = (0..config.number_groups)
            .map(|g| {
                let group_rng = ChaCha8Rng::seed_from_u64(rng.gen());
                Group::new(
                    GroupId(g as u32),
                    Arc::clone(&constants),
                    &latencies,
                    group_rng,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            groups,
            history: HistoryLog::new(),
            generation: 0,
            config,
            seed,
            rng,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed the population RNG was started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn agent_count(&self) -> usize {
        self.groups.iter().map(Group::agent_count).sum()
    }

    /// Run every configured generation, then re-rank every group for reporting
    pub fn evolve(&mut self) -> Result<()> {
        tracing::info!(
            generations = self.config.number_generations,
            groups = self.groups.len(),
            seed = self.seed,
            "evolution starting"
        );

        for _ in 0..self.config.number_generations {
            self.run_generation()?;
        }

        for group in &mut self.groups {
            group.set_ranks()?;
        }

        tracing::info!(
            generations = self.generation,
            mean_male_gene = ?self.mean_male_gene(),
            "evolution finished"
        );
        Ok(())
    }

    /// Breed every group once, then migrate
    pub fn run_generation(&mut self) -> Result<&GenerationRecord> {
        let parallel = self.groups.len() >= self.config.parallel_threshold;

        let groups = if parallel {
            self.groups
                .par_iter_mut()
                .map(breed_generation)
                .collect::<Result<Vec<_>>>()?
        } else {
            self.groups
                .iter_mut()
                .map(breed_generation)
                .collect::<Result<Vec<_>>>()?
        };

        let migration = self.migrate()?;

        let record = GenerationRecord {
            generation: self.generation,
            groups,
            migration,
        };
        tracing::debug!(
            generation = record.generation,
            mutations = record.mutations(),
            female_migrants = migration.females,
            male_migrants = migration.males,
            "generation complete"
        );

        self.generation += 1;
        self.history.push(record);
        Ok(&self.history.records[self.history.len() - 1])
    }

    /// Male genes per group
    pub fn final_genes(&self) -> Vec<Vec<f64>> {
        self.groups
            .iter()
            .map(|g| g.males.iter().map(|m| m.gene).collect())
            .collect()
    }

    /// Mean male gene over the whole population
    pub fn mean_male_gene(&self) -> Option<f64> {
        let genes: Vec<f64> = self.final_genes().into_iter().flatten().collect();
        (!genes.is_empty()).then(|| genes.iter().sum::<f64>() / genes.len() as f64)
    }

    pub fn snapshots(&self) -> Vec<GroupSnapshot> {
        self.groups.iter().map(Group::snapshot).collect()
    }
}

/// One group's season, parent choice, offspring, reset and mutation
fn breed_generation(group: &mut Group) -> Result<GroupRecord> {
    let season_days = group.go_one_mating_season()?;
    let rank_quality_correlation = group.rank_quality_correlations.last().copied().flatten();

    group.determine_next_gen_parents()?;
    group.generate_offspring()?;
    group.reset();
    let mutations = group.mutate();

    Ok(GroupRecord {
        group: group.id,
        season_days,
        rank_quality_correlation,
        mutations,
        mean_male_gene: group.mean_male_gene(),
        mean_female_gene: group.mean_female_gene(),
    })
}

/// Founding latencies, shifted so the earliest female starts on day one
fn initial_latencies(constants: &SeasonConstants, rng: &mut ChaCha8Rng) -> Vec<i64> {
    let mut latencies: Vec<i64> = (0..constants.number_females)
        .map(|_| rng.gen_range(0..=constants.max_non_cycling_days))
        .collect();

    if let Some(&min) = latencies.iter().min() {
        latencies.iter_mut().for_each(|l| *l -= min + 1);
    }
    latencies
}
