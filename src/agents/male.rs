//! Male agents
//!
//! A male expresses his gene once, at birth, as competitive effort. Quality is
//! an independent draw; together they fix his cost for life.

use rand::Rng;
use serde::Serialize;

use crate::core::types::{GroupId, MaleId};

/// Added to every rank weight so that no male has zero chance of a top rank
pub const RANK_WEIGHT_EPSILON: f64 = 1e-50;

/// Divisor applied to competitive effort when scoring a mating
pub const EFFORT_MATING_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, Serialize)]
pub struct Male {
    pub id: MaleId,
    pub group_id: GroupId,
    pub quality: f64,
    /// Gene value expressed at birth
    pub competitive_effort: f64,
    /// Heritable value; mutation touches this, never the expressed effort
    pub gene: f64,
    /// `quality ^ competitive_effort`
    pub cost: f64,
    /// Dominance position, 0 is most dominant. `None` until first ranked.
    pub rank: Option<usize>,
}

impl Male {
    /// Create a male with a fresh quality draw from `[low, high)`
    pub fn new<R: Rng + ?Sized>(
        id: MaleId,
        group_id: GroupId,
        gene: f64,
        quality_range: (f64, f64),
        rng: &mut R,
    ) -> Self {
        let quality = rng.gen_range(quality_range.0..quality_range.1);
        Self::with_quality(id, group_id, gene, quality)
    }

    /// Create a male with a known quality
    pub fn with_quality(id: MaleId, group_id: GroupId, gene: f64, quality: f64) -> Self {
        Self {
            id,
            group_id,
            quality,
            competitive_effort: gene,
            gene,
            cost: quality.powf(gene),
            rank: None,
        }
    }

    /// Score used to draw the dominance hierarchy
    pub fn rank_weight(&self) -> f64 {
        self.quality.powf(self.competitive_effort) + RANK_WEIGHT_EPSILON
    }

    /// Value a single fertile pairing with this male adds, before scaling by
    /// the female's conception probability
    pub fn mating_value(&self) -> f64 {
        self.quality - self.competitive_effort / EFFORT_MATING_PENALTY
    }
}
