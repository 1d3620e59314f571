//! One-call entry point for a full run

use std::time::Instant;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::population::output::SimulationOutput;
use crate::population::Population;

/// Build a population from `config`, evolve it and collect the output
pub fn simulate(config: SimulationConfig) -> Result<SimulationOutput> {
    let start = Instant::now();

    let mut population = Population::new(config)?;
    population.evolve()?;

    Ok(SimulationOutput::new(population, start.elapsed()))
}
