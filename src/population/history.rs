//! Per-generation history log

use serde::{Deserialize, Serialize};

use crate::core::types::{Day, GroupId};

/// What one group did during one generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group: GroupId,
    pub season_days: Day,
    /// Correlation between rank and quality at the start of the season
    pub rank_quality_correlation: Option<f64>,
    pub mutations: usize,
    /// Mean gene of the newborn males, after mutation
    pub mean_male_gene: Option<f64>,
    pub mean_female_gene: Option<f64>,
}

/// Agents swapped between groups at the end of a generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub females: usize,
    pub males: usize,
}

impl MigrationSummary {
    pub fn total(&self) -> usize {
        self.females + self.males
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub groups: Vec<GroupRecord>,
    pub migration: MigrationSummary,
}

impl GenerationRecord {
    pub fn mutations(&self) -> usize {
        self.groups.iter().map(|g| g.mutations).sum()
    }
}

/// The complete generation history of a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryLog {
    pub records: Vec<GenerationRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    /// Mean male gene of one group across generations
    pub fn male_gene_trajectory(&self, group: GroupId) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.groups.iter().find(|g| g.group == group))
            .filter_map(|g| g.mean_male_gene)
            .collect()
    }

    pub fn total_mutations(&self) -> usize {
        self.records.iter().map(GenerationRecord::mutations).sum()
    }

    pub fn total_migrations(&self) -> MigrationSummary {
        self.records
            .iter()
            .fold(MigrationSummary::default(), |acc, r| MigrationSummary {
                females: acc.females + r.migration.females,
                males: acc.males + r.migration.males,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: u32, gene: f64, mutations: usize) -> GenerationRecord {
        GenerationRecord {
            generation,
            groups: vec![GroupRecord {
                group: GroupId(0),
                season_days: 60,
                rank_quality_correlation: None,
                mutations,
                mean_male_gene: Some(gene),
                mean_female_gene: Some(gene),
            }],
            migration: MigrationSummary {
                females: 1,
                males: generation as usize,
            },
        }
    }

    #[test]
    fn test_history_aggregates() {
        let mut log = HistoryLog::new();
        assert!(log.is_empty());

        log.push(record(0, 1.0, 2));
        log.push(record(1, 1.1, 3));

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().unwrap().generation, 1);
        assert_eq!(log.total_mutations(), 5);
        assert_eq!(
            log.total_migrations(),
            MigrationSummary {
                females: 2,
                males: 1
            }
        );
        assert_eq!(log.male_gene_trajectory(GroupId(0)), vec![1.0, 1.1]);
        assert!(log.male_gene_trajectory(GroupId(3)).is_empty());
    }
}
