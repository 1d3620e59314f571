//! Individual agents: males competing for rank and cycling females

pub mod female;
pub mod male;

pub use female::{CyclePhase, CycleStatus, Female};
pub use male::Male;
