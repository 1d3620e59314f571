use thiserror::Error;

use crate::core::types::{FemaleId, GroupId, MaleId, Sex};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rank weight for male {male} must be finite and positive, got {weight}")]
    InvalidRankWeight { male: MaleId, weight: f64 },

    #[error("Mating matrix cell ({female}, {male}) is outside a {females}x{males} matrix")]
    MatingCellOutOfRange {
        female: usize,
        male: usize,
        females: usize,
        males: usize,
    },

    #[error("Mating matrix row for female {female} sums to {sum}, cannot normalize")]
    DegenerateMatingRow { female: FemaleId, sum: f64 },

    #[error("Parent selection needs a finished season, {remaining} females still cycling or waiting")]
    SeasonIncomplete { remaining: usize },

    #[error("Group {group} needs {needed} parent pairs to replace itself, has {available}")]
    InsufficientParents {
        group: GroupId,
        needed: usize,
        available: usize,
    },

    #[error("Group {0} has no males to choose fathers from")]
    NoMales(GroupId),

    #[error("Migration needs at least two groups, found {0}")]
    InsufficientGroups(usize),

    #[error("Group {group} has no {sex} eligible to migrate")]
    EmptyMigrationPool { group: GroupId, sex: Sex },

    #[error("Weighted choice error: {0}")]
    WeightedChoice(#[from] rand::distributions::WeightedError),

    #[error("Distribution error: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
