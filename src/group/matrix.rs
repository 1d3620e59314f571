//! Female x male mating-success accumulator

use serde::Serialize;

use crate::core::error::{Result, SimError};
use crate::core::types::FemaleId;

/// Baseline value of every cell; keeps row sums strictly positive
pub const MATING_EPSILON: f64 = 1e-40;

/// Cumulative expected reproductive exposure of each female to each male
///
/// Rows are female ids, columns are male list positions (equal to rank once
/// the group has been ranked for the season).
#[derive(Debug, Clone, Serialize)]
pub struct MatingMatrix {
    females: usize,
    males: usize,
    cells: Vec<f64>,
}

impl MatingMatrix {
    pub fn new(females: usize, males: usize) -> Self {
        Self {
            females,
            males,
            cells: vec![MATING_EPSILON; females * males],
        }
    }

    pub fn females(&self) -> usize {
        self.females
    }

    pub fn males(&self) -> usize {
        self.males
    }

    pub fn get(&self, female: usize, male: usize) -> Option<f64> {
        if female < self.females && male < self.males {
            self.cells.get(female * self.males + male).copied()
        } else {
            None
        }
    }

    /// Add `amount` to a cell
    ///
    /// An index outside the matrix means a female id or male position fell
    /// out of step with the group and is reported rather than dropped.
    pub fn accrue(&mut self, female: usize, male: usize, amount: f64) -> Result<()> {
        if female >= self.females || male >= self.males {
            return Err(SimError::MatingCellOutOfRange {
                female,
                male,
                females: self.females,
                males: self.males,
            });
        }
        self.cells[female * self.males + male] += amount;
        Ok(())
    }

    pub fn row(&self, female: usize) -> &[f64] {
        let start = (female * self.males).min(self.cells.len());
        let end = (start + self.males).min(self.cells.len());
        &self.cells[start..end]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.males.max(1)).take(self.females)
    }

    /// Scale every row to sum to one
    ///
    /// A row whose sum is not finite and strictly positive means the
    /// season accrued nothing usable for that female.
    pub fn normalize_rows(&mut self) -> Result<()> {
        if self.males == 0 {
            return Ok(());
        }
        for (female, row) in self.cells.chunks_mut(self.males).enumerate() {
            let sum: f64 = row.iter().sum();
            if !(sum.is_finite() && sum > 0.0) {
                return Err(SimError::DegenerateMatingRow {
                    female: FemaleId(female as u32),
                    sum,
                });
            }
            row.iter_mut().for_each(|cell| *cell /= sum);
        }
        Ok(())
    }

    /// Fertile mating success per female (row sums)
    pub fn female_totals(&self) -> Vec<f64> {
        self.rows().map(|row| row.iter().sum()).collect()
    }

    /// Fertile mating success per male position (column sums)
    pub fn male_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.males];
        for row in self.rows() {
            for (total, cell) in totals.iter_mut().zip(row) {
                *total += cell;
            }
        }
        totals
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}
