//! Female agents and the ovarian cycling state machine
//!
//! Within a season a female moves strictly forward:
//! not yet cycling -> cycling -> finished cycling. Fields that only make sense
//! in one phase live inside that phase's variant.

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::core::types::{FemaleId, GroupId};

/// Where a female is in her season
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleStatus {
    /// Waiting to start cycling; starts once the countdown goes negative
    NotYetCycling { days_until_cycling: i64 },
    /// Reproductively active
    Cycling {
        cycle_day: usize,
        conception_probability: f64,
    },
    /// Conceived; terminal for the season
    FinishedCycling,
}

/// Data-free view of [`CycleStatus`], ordered by season progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CyclePhase {
    NotYetCycling,
    Cycling,
    FinishedCycling,
}

#[derive(Debug, Clone, Serialize)]
pub struct Female {
    pub id: FemaleId,
    pub group_id: GroupId,
    pub gene: f64,
    /// Days of cycling left before conception is certain
    pub days_until_conception: i64,
    pub status: CycleStatus,
    #[serde(skip)]
    conception_table: Arc<[f64]>,
}

impl Female {
    pub fn new<R: Rng + ?Sized>(
        id: FemaleId,
        group_id: GroupId,
        days_until_cycling: i64,
        conception_table: Arc<[f64]>,
        days_to_conception: &Normal<f64>,
        gene: f64,
        rng: &mut R,
    ) -> Self {
        let days_until_conception = days_to_conception.sample(rng).round().abs() as i64;

        Self {
            id,
            group_id,
            gene,
            days_until_conception,
            status: CycleStatus::NotYetCycling { days_until_cycling },
            conception_table,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        match self.status {
            CycleStatus::NotYetCycling { .. } => CyclePhase::NotYetCycling,
            CycleStatus::Cycling { .. } => CyclePhase::Cycling,
            CycleStatus::FinishedCycling => CyclePhase::FinishedCycling,
        }
    }

    pub fn days_until_cycling(&self) -> Option<i64> {
        match self.status {
            CycleStatus::NotYetCycling { days_until_cycling } => Some(days_until_cycling),
            _ => None,
        }
    }

    pub fn cycle_day(&self) -> Option<usize> {
        match self.status {
            CycleStatus::Cycling { cycle_day, .. } => Some(cycle_day),
            _ => None,
        }
    }

    pub fn conception_probability(&self) -> Option<f64> {
        match self.status {
            CycleStatus::Cycling {
                conception_probability,
                ..
            } => Some(conception_probability),
            _ => None,
        }
    }

    pub fn conception_table(&self) -> &[f64] {
        &self.conception_table
    }

    /// Count one day off the latency; true once she is due to start cycling
    pub fn tick_latency(&mut self) -> bool {
        match &mut self.status {
            CycleStatus::NotYetCycling { days_until_cycling } => {
                *days_until_cycling -= 1;
                *days_until_cycling < 0
            }
            _ => false,
        }
    }

    /// Enter cycling on day 0 of the reference table
    pub fn start_cycling(&mut self) {
        if let CycleStatus::NotYetCycling { .. } = self.status {
            self.status = CycleStatus::Cycling {
                cycle_day: 0,
                conception_probability: self.probability_on(0),
            };
        }
    }

    /// Count one day off the conception countdown; true once she has conceived
    pub fn tick_conception_countdown(&mut self) -> bool {
        if self.phase() != CyclePhase::Cycling {
            return false;
        }
        self.days_until_conception -= 1;
        self.days_until_conception < 0
    }

    /// Move to the next cycle day, wrapping at the end of the cycle
    pub fn advance_cycle_day(&mut self) {
        if let CycleStatus::Cycling { cycle_day, .. } = self.status {
            let cycle_length = self.conception_table.len();
            let next = if cycle_day + 1 < cycle_length {
                cycle_day + 1
            } else {
                0
            };
            self.status = CycleStatus::Cycling {
                cycle_day: next,
                conception_probability: self.probability_on(next),
            };
        }
    }

    pub fn finish_cycling(&mut self) {
        if self.phase() == CyclePhase::Cycling {
            self.status = CycleStatus::FinishedCycling;
        }
    }

    fn probability_on(&self, cycle_day: usize) -> f64 {
        self.conception_table.get(cycle_day).copied().unwrap_or(0.0)
    }
}
