//! Parent selection, offspring generation and mutation

use std::sync::Arc;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::agents::{Female, Male};
use crate::core::error::{Result, SimError};
use crate::core::sampling::lottery_count;
use crate::core::types::{FemaleId, MaleId};
use crate::group::Group;

/// One mother-father pairing that will produce a single offspring
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParentPair {
    pub mother: FemaleId,
    pub father: MaleId,
    pub mother_gene: f64,
    pub father_gene: f64,
}

impl ParentPair {
    /// Offspring gene: one of the two parental genes, chosen uniformly
    pub fn inherited_gene<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.gen_bool(0.5) {
            self.mother_gene
        } else {
            self.father_gene
        }
    }
}

impl Group {
    /// Turn the finished season's mating matrix into parent pairs
    ///
    /// Rows are normalized into per-female probabilities over males. Each
    /// female, in id order and once per offspring slot, samples candidate
    /// males uniformly with replacement and picks a father among them
    /// weighted by her row.
    pub fn determine_next_gen_parents(&mut self) -> Result<()> {
        if !self.season_finished() {
            return Err(SimError::SeasonIncomplete {
                remaining: self.females_not_yet_cycling.len() + self.females_cycling.len(),
            });
        }
        if self.males.is_empty() {
            return Err(SimError::NoMales(self.id));
        }

        self.mating_matrix.normalize_rows()?;
        self.females_finished_cycling.sort_by_key(|f| f.id);
        self.parents.clear();

        let passes = self.constants.offspring_per_female;
        let candidate_count = self.constants.candidate_fathers;
        let male_count = self.males.len();

        for _ in 0..passes {
            for mother in &self.females_finished_cycling {
                let candidates: Vec<usize> = (0..candidate_count)
                    .map(|_| self.rng.gen_range(0..male_count))
                    .collect();

                let row = self.mating_matrix.row(mother.id.index());
                let weights: Vec<f64> = candidates
                    .iter()
                    .map(|&c| row.get(c).copied().unwrap_or(0.0))
                    .collect();

                let chosen = WeightedIndex::new(&weights)?.sample(&mut self.rng);
                let father = &self.males[candidates[chosen]];

                self.parents.push(ParentPair {
                    mother: mother.id,
                    father: father.id,
                    mother_gene: mother.gene,
                    father_gene: father.gene,
                });
            }
        }

        Ok(())
    }

    /// Replace males and waiting females with offspring of the chosen pairs
    ///
    /// Pairs are shuffled first so the sex of an offspring does not depend on
    /// the mother's id. Daughters come from pairs `0..number_females`, sons
    /// from pairs `number_males..`.
    pub fn generate_offspring(&mut self) -> Result<()> {
        let constants = Arc::clone(&self.constants);
        let number_females = constants.number_females;
        let number_males = constants.number_males;

        let needed = number_females.max(number_males + 1);
        if self.parents.len() < needed {
            return Err(SimError::InsufficientParents {
                group: self.id,
                needed,
                available: self.parents.len(),
            });
        }

        self.parents.shuffle(&mut self.rng);
        self.females_not_yet_cycling.clear();
        self.males.clear();

        for (i, pair) in self.parents.iter().take(number_females).enumerate() {
            let gene = pair.inherited_gene(&mut self.rng);
            self.females_not_yet_cycling.push(Female::new(
                FemaleId(i as u32),
                self.id,
                constants.max_non_cycling_days,
                Arc::clone(&constants.conception_table),
                &constants.days_to_conception,
                gene,
                &mut self.rng,
            ));
        }

        for (i, pair) in self.parents.iter().skip(number_males).enumerate() {
            let gene = pair.inherited_gene(&mut self.rng);
            self.males.push(Male::new(
                MaleId(i as u32),
                self.id,
                gene,
                constants.quality_range,
                &mut self.rng,
            ));
        }

        Ok(())
    }

    /// Perturb the genes of a lottery-drawn number of newborns
    ///
    /// One draw per configured male and female slot decides how many
    /// mutations happen; that many agents are then picked with replacement
    /// from the newborns actually present. Returns the number of mutations
    /// applied.
    pub fn mutate(&mut self) -> usize {
        let lottery_slots = self.constants.number_males + self.constants.number_females;
        let count = lottery_count(self.constants.mutation_rate, lottery_slots, &mut self.rng);

        let male_count = self.males.len();
        let slots = male_count + self.females_not_yet_cycling.len();
        if slots == 0 {
            return 0;
        }

        let step = self.constants.mutation_step;
        let floor = self.constants.gene_floor;

        for _ in 0..count {
            let pick = self.rng.gen_range(0..slots);
            let offset = self.rng.gen_range(-step..=step);

            let gene = if pick < male_count {
                &mut self.males[pick].gene
            } else {
                &mut self.females_not_yet_cycling[pick - male_count].gene
            };
            *gene = (*gene + offset).max(floor);
        }

        if count > 0 {
            tracing::trace!(group = %self.id, mutations = count, "mutated offspring");
        }
        count
    }
}
