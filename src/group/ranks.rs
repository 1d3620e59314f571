//! Dominance hierarchy assignment

use crate::core::error::{Result, SimError};
use crate::core::sampling::{pearson_correlation, weighted_permutation};
use crate::group::Group;

impl Group {
    /// Draw a new dominance hierarchy for this group's males
    ///
    /// Each male is weighted by `quality ^ effort` and a permutation is drawn
    /// without replacement, so costly males tend to be drawn first and take
    /// the lowest rank numbers. Males are then reordered by rank, making list
    /// position, rank and mating-matrix column the same number.
    pub fn set_ranks(&mut self) -> Result<()> {
        let weights: Vec<f64> = self.males.iter().map(|m| m.rank_weight()).collect();

        if let Some((male, &weight)) = self
            .males
            .iter()
            .zip(&weights)
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(SimError::InvalidRankWeight {
                male: male.id,
                weight,
            });
        }

        let order = weighted_permutation(&weights, &mut self.rng);
        for (rank, &idx) in order.iter().enumerate() {
            if let Some(male) = self.males.get_mut(idx) {
                male.rank = Some(rank);
            }
        }
        self.males.sort_by_key(|m| m.rank);

        let ranks: Vec<f64> = self
            .males
            .iter()
            .map(|m| m.rank.unwrap_or_default() as f64)
            .collect();
        let qualities: Vec<f64> = self.males.iter().map(|m| m.quality).collect();
        let correlation = pearson_correlation(&ranks, &qualities);
        self.rank_quality_correlations.push(correlation);

        tracing::trace!(group = %self.id, ?correlation, "ranked males");
        Ok(())
    }
}
