//! Mating Sim - evolution of male competitive effort under female choice

pub mod agents;
pub mod core;
pub mod group;
pub mod population;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, SimError};
pub use crate::population::{simulate, Population, SimulationOutput};
