//! The daily mating-season loop
//!
//! Partition moves are collected into side lists while a partition is being
//! walked and applied once the walk is over.

use rand::seq::SliceRandom;

use crate::agents::Female;
use crate::core::error::Result;
use crate::core::types::Day;
use crate::group::Group;

impl Group {
    /// Run a whole season: re-rank the males, then step days until every
    /// female has finished cycling. Returns the season length in days.
    pub fn go_one_mating_season(&mut self) -> Result<Day> {
        self.set_ranks()?;

        while !self.season_finished() {
            self.go_one_day()?;
        }

        tracing::debug!(
            group = %self.id,
            days = self.season_day,
            correlation = ?self.rank_quality_correlations.last().copied().flatten(),
            "mating season finished"
        );
        Ok(self.season_day)
    }

    /// Advance the season by one day
    pub fn go_one_day(&mut self) -> Result<()> {
        self.season_day += 1;

        self.start_cycling();
        let conceived = self.progress_cycling();
        self.end_cycling(&conceived);

        let conception_possible = self
            .females_cycling
            .iter()
            .any(|f| f.conception_probability().is_some_and(|p| p != 0.0));
        if conception_possible {
            self.make_mating_pairs()?;
        }
        Ok(())
    }

    /// Count down latencies and move females whose latency went negative
    /// into the cycling partition
    pub fn start_cycling(&mut self) {
        let ready: Vec<usize> = self
            .females_not_yet_cycling
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, f)| f.tick_latency().then_some(idx))
            .collect();

        for mut female in extract(&mut self.females_not_yet_cycling, &ready) {
            female.start_cycling();
            self.females_cycling.push(female);
        }
    }

    /// Count down conception for every cycling female and advance the cycle
    /// of those still going. Returns positions of females that conceived.
    pub fn progress_cycling(&mut self) -> Vec<usize> {
        let mut conceived = Vec::new();

        for (idx, female) in self.females_cycling.iter_mut().enumerate() {
            if female.tick_conception_countdown() {
                conceived.push(idx);
            } else {
                female.advance_cycle_day();
            }
        }

        conceived
    }

    /// Move the given cycling positions to the finished partition
    pub fn end_cycling(&mut self, conceived: &[usize]) {
        for mut female in extract(&mut self.females_cycling, conceived) {
            female.finish_cycling();
            self.females_finished_cycling.push(female);
        }
    }

    /// Pair shuffled cycling females with males by list position and accrue
    /// `conception probability * (quality - effort / 10)` for each pair
    ///
    /// Females beyond the number of males go unpaired for the day.
    pub fn make_mating_pairs(&mut self) -> Result<()> {
        let mut order: Vec<usize> = (0..self.females_cycling.len()).collect();
        order.shuffle(&mut self.rng);

        for (male_pos, (&female_idx, male)) in order.iter().zip(&self.males).enumerate() {
            let female = &self.females_cycling[female_idx];
            if let Some(probability) = female.conception_probability() {
                self.mating_matrix.accrue(
                    female.id.index(),
                    male_pos,
                    probability * male.mating_value(),
                )?;
            }
        }
        Ok(())
    }
}

/// Remove the females at `indices` (ascending) preserving the order of both
/// the moved and the remaining females
fn extract(source: &mut Vec<Female>, indices: &[usize]) -> Vec<Female> {
    if indices.is_empty() {
        return Vec::new();
    }

    let mut moved = Vec::with_capacity(indices.len());
    let mut kept = Vec::with_capacity(source.len().saturating_sub(indices.len()));
    for (idx, female) in std::mem::take(source).into_iter().enumerate() {
        if indices.binary_search(&idx).is_ok() {
            moved.push(female);
        } else {
            kept.push(female);
        }
    }
    *source = kept;
    moved
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rand_distr::Normal;

    use crate::agents::{CyclePhase, Female, Male};
    use crate::core::error::SimError;
    use crate::core::types::{FemaleId, GroupId, MaleId};
    use crate::group::test_support::*;
    use crate::group::{MatingMatrix, MATING_EPSILON};

    #[test]
    fn test_season_ends_with_everyone_finished() {
        let config = small_config();
        let mut group = group_with(&config, 31);

        let days = group.go_one_mating_season().unwrap();

        assert!(days > 0);
        assert!(group.females_not_yet_cycling.is_empty());
        assert!(group.females_cycling.is_empty());
        assert_eq!(group.females_finished_cycling.len(), config.number_females);
    }

    #[test]
    fn test_phases_only_move_forward() {
        let config = small_config();
        let mut group = group_with(&config, 32);
        group.set_ranks().unwrap();

        let mut last: HashMap<FemaleId, CyclePhase> =
            group.females().map(|f| (f.id, f.phase())).collect();

        while !group.season_finished() {
            group.go_one_day().unwrap();
            for female in group.females() {
                let previous = last[&female.id];
                assert!(female.phase() >= previous, "{} went backwards", female.id);
                last.insert(female.id, female.phase());
            }
            assert_eq!(group.female_count(), config.number_females);
        }
    }

    #[test]
    fn test_partitions_match_status() {
        let config = small_config();
        let mut group = group_with(&config, 33);

        for _ in 0..15 {
            group.go_one_day().unwrap();
            assert!(group
                .females_not_yet_cycling
                .iter()
                .all(|f| f.phase() == CyclePhase::NotYetCycling));
            assert!(group
                .females_cycling
                .iter()
                .all(|f| f.phase() == CyclePhase::Cycling));
            assert!(group
                .females_finished_cycling
                .iter()
                .all(|f| f.phase() == CyclePhase::FinishedCycling));
        }
    }

    #[test]
    fn test_matrix_stays_above_baseline() {
        let config = small_config();
        let mut group = group_with(&config, 34);
        group.go_one_mating_season().unwrap();

        assert!(group
            .mating_matrix
            .rows()
            .flatten()
            .all(|&c| c >= MATING_EPSILON));
        // The fertile window was crossed, so something accrued
        assert!(group.mating_matrix.female_totals().iter().any(|&t| t > 1e-3));
    }

    #[test]
    fn test_new_cyclers_start_on_day_zero_then_advance() {
        let config = small_config();
        let mut group = group_with(&config, 35);

        // Latency 0 goes negative on the first day
        group.go_one_day().unwrap();
        let first = group
            .females_cycling
            .iter()
            .find(|f| f.id == FemaleId(0))
            .expect("female 0 should be cycling");

        // She starts on day 0 and is advanced in the same step
        assert_eq!(first.cycle_day(), Some(1));
    }

    #[test]
    fn test_excess_cycling_females_go_unpaired() {
        let config = small_config();
        let mut group = group_with(&config, 36);

        let normal = Normal::new(10.0, 0.0).unwrap();
        let table: Arc<[f64]> = vec![1.0; 4].into();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        group.females_not_yet_cycling.clear();
        group.females_cycling = (0..3)
            .map(|f| {
                let mut female = Female::new(
                    FemaleId(f),
                    GroupId(0),
                    0,
                    Arc::clone(&table),
                    &normal,
                    1.0,
                    &mut rng,
                );
                female.start_cycling();
                female
            })
            .collect();
        group.males = vec![Male::with_quality(MaleId(0), GroupId(0), 1.0, 1.5)];
        group.mating_matrix = MatingMatrix::new(3, 1);

        group.make_mating_pairs().unwrap();

        let accrued: Vec<f64> = group.mating_matrix.female_totals();
        let paired = accrued.iter().filter(|&&t| t > 1.0).count();
        assert_eq!(paired, 1, "only one female can pair with one male");
        // 1.0 * (1.5 - 1.0 / 10)
        assert!(accrued.iter().any(|&t| (t - 1.4).abs() < 1e-9));
    }

    fn cycling_female(id: u32, table: &Arc<[f64]>, days_to_conception: f64) -> Female {
        let normal = Normal::new(days_to_conception, 0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(id));
        let mut female = Female::new(
            FemaleId(id),
            GroupId(0),
            0,
            Arc::clone(table),
            &normal,
            1.0,
            &mut rng,
        );
        female.start_cycling();
        female
    }

    #[test]
    fn test_daily_steps_reach_table_peak_on_fourth_evaluation() {
        let config = small_config();
        let mut group = group_with(&config, 37);

        let table: Arc<[f64]> = vec![0.0, 0.0, 0.0, 1.0, 0.0].into();
        group.females_not_yet_cycling.clear();
        group.females_cycling = vec![cycling_female(0, &table, 10.0)];

        let probability = |group: &crate::group::Group| {
            group.females_cycling[0].conception_probability().unwrap()
        };
        let mut seen = vec![probability(&group)];
        let mut totals = Vec::new();
        for _ in 0..3 {
            group.go_one_day().unwrap();
            seen.push(probability(&group));
            totals.push(group.mating_matrix.female_totals()[0]);
        }

        assert_eq!(seen, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(group.females_cycling[0].cycle_day(), Some(3));
        // No pairing happens while every cycling female has zero probability
        assert!(totals[0] < 1e-30 && totals[1] < 1e-30);
        assert!(totals[2] > 0.5);
    }

    #[test]
    fn test_female_outside_matrix_fails_the_day() {
        let config = small_config();
        let mut group = group_with(&config, 38);

        let table: Arc<[f64]> = vec![1.0; 4].into();
        group.females_not_yet_cycling.clear();
        group.females_cycling = vec![cycling_female(9, &table, 10.0)];

        assert!(matches!(
            group.make_mating_pairs(),
            Err(SimError::MatingCellOutOfRange { female: 9, .. })
        ));
        assert!(group.go_one_day().is_err());
    }
}
