pub mod config;
pub mod error;
pub mod sampling;
pub mod types;

pub use config::{SeasonConstants, SimulationConfig};
pub use error::{Result, SimError};
pub use types::{Day, FemaleId, GroupId, MaleId, Sex};
