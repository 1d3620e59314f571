//! Groups: one breeding unit of males and females
//!
//! A group runs its mating season day by day, turns the accrued mating matrix
//! into parent pairs, replaces itself with their offspring and mutates the
//! newborns. Groups never touch each other during a generation; only the
//! population's migration pass moves agents between them.

mod matrix;
mod ranks;
mod reproduction;
mod season;

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::agents::{Female, Male};
use crate::core::config::SeasonConstants;
use crate::core::error::Result;
use crate::core::types::{Day, FemaleId, GroupId, MaleId};

pub use matrix::{MatingMatrix, MATING_EPSILON};
pub use reproduction::ParentPair;

pub struct Group {
    pub id: GroupId,
    pub males: Vec<Male>,
    pub females_not_yet_cycling: Vec<Female>,
    pub females_cycling: Vec<Female>,
    pub females_finished_cycling: Vec<Female>,
    pub mating_matrix: MatingMatrix,
    /// Parent pairs chosen at the end of the last season
    pub parents: Vec<ParentPair>,
    /// Rank-quality correlation recorded at every rank assignment
    pub rank_quality_correlations: Vec<Option<f64>>,
    /// Days elapsed in the current season
    pub season_day: Day,
    constants: Arc<SeasonConstants>,
    rng: ChaCha8Rng,
}

impl Group {
    /// Create a founding group with one female per latency entry
    ///
    /// Founders carry the configured initial gene. Males are ranked once
    /// before the first season.
    pub fn new(
        id: GroupId,
        constants: Arc<SeasonConstants>,
        latencies: &[i64],
        mut rng: ChaCha8Rng,
    ) -> Result<Self> {
        let gene = constants.initial_gene;

        let females_not_yet_cycling: Vec<Female> = latencies
            .iter()
            .enumerate()
            .map(|(f, &latency)| {
                Female::new(
                    FemaleId(f as u32),
                    id,
                    latency,
                    Arc::clone(&constants.conception_table),
                    &constants.days_to_conception,
                    gene,
                    &mut rng,
                )
            })
            .collect();

        let males: Vec<Male> = (0..constants.number_males)
            .map(|m| Male::new(MaleId(m as u32), id, gene, constants.quality_range, &mut rng))
            .collect();

        let mating_matrix = MatingMatrix::new(females_not_yet_cycling.len(), males.len());

        let mut group = Self {
            id,
            males,
            females_not_yet_cycling,
            females_cycling: Vec::new(),
            females_finished_cycling: Vec::new(),
            mating_matrix,
            parents: Vec::new(),
            rank_quality_correlations: Vec::new(),
            season_day: 0,
            constants,
            rng,
        };

        group.set_ranks()?;
        Ok(group)
    }

    pub fn constants(&self) -> &SeasonConstants {
        &self.constants
    }

    pub fn female_count(&self) -> usize {
        self.females_not_yet_cycling.len()
            + self.females_cycling.len()
            + self.females_finished_cycling.len()
    }

    pub fn male_count(&self) -> usize {
        self.males.len()
    }

    pub fn agent_count(&self) -> usize {
        self.female_count() + self.male_count()
    }

    /// Every female regardless of partition
    pub fn females(&self) -> impl Iterator<Item = &Female> {
        self.females_not_yet_cycling
            .iter()
            .chain(&self.females_cycling)
            .chain(&self.females_finished_cycling)
    }

    pub fn season_finished(&self) -> bool {
        self.females_not_yet_cycling.is_empty() && self.females_cycling.is_empty()
    }

    pub fn mean_male_gene(&self) -> Option<f64> {
        mean(self.males.iter().map(|m| m.gene))
    }

    pub fn mean_female_gene(&self) -> Option<f64> {
        mean(self.females().map(|f| f.gene))
    }

    /// Clear per-season state before the next generation's season
    pub fn reset(&mut self) {
        self.females_finished_cycling.clear();
        self.parents.clear();
        self.season_day = 0;
        self.mating_matrix = MatingMatrix::new(self.female_count(), self.males.len());
    }

    /// Read-only view for reporting layers
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            id: self.id,
            males: self.males.clone(),
            females_not_yet_cycling: self.females_not_yet_cycling.clone(),
            females_cycling: self.females_cycling.clone(),
            females_finished_cycling: self.females_finished_cycling.clone(),
            mating_matrix: self.mating_matrix.to_rows(),
            male_mating_success: self.mating_matrix.male_totals(),
            female_mating_success: self.mating_matrix.female_totals(),
            rank_quality_correlations: self.rank_quality_correlations.clone(),
        }
    }
}

/// Serializable copy of a group's agents and accrued mating matrix
#[derive(Clone, Debug, Serialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub males: Vec<Male>,
    pub females_not_yet_cycling: Vec<Female>,
    pub females_cycling: Vec<Female>,
    pub females_finished_cycling: Vec<Female>,
    pub mating_matrix: Vec<Vec<f64>>,
    pub male_mating_success: Vec<f64>,
    pub female_mating_success: Vec<f64>,
    pub rank_quality_correlations: Vec<Option<f64>>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}
