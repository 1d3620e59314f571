//! Inter-group migration
//!
//! Each migration event swaps one agent between two distinct groups. Only
//! waiting (not yet cycling) females and males can move. The arriving agent
//! takes over the departed agent's id, so ids within a group stay unique.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SimError};
use crate::core::sampling::lottery_count;
use crate::core::types::{GroupId, Sex};
use crate::group::Group;
use crate::population::history::MigrationSummary;
use crate::population::Population;

impl Population {
    /// Run one migration pass across all groups
    ///
    /// The number of events is a lottery over every agent slot in the
    /// population, split uniformly at random between females and males.
    pub fn migrate(&mut self) -> Result<MigrationSummary> {
        let slots: usize = self.groups.iter().map(Group::agent_count).sum();
        let events = lottery_count(self.config.migration_rate, slots, &mut self.rng);
        if events == 0 {
            return Ok(MigrationSummary::default());
        }

        let group_count = self.groups.len();
        if group_count < 2 {
            return Err(SimError::InsufficientGroups(group_count));
        }

        let females = self.rng.gen_range(0..=events);
        let summary = MigrationSummary {
            females,
            males: events - females,
        };

        for event in 0..events {
            let leaving = self.rng.gen_range(0..group_count);
            let mut arriving = self.rng.gen_range(0..group_count - 1);
            if arriving >= leaving {
                arriving += 1;
            }

            let sex = if event < females { Sex::Female } else { Sex::Male };
            swap_agents(&mut self.groups, &mut self.rng, sex, leaving, arriving)?;
        }

        Ok(summary)
    }
}

/// Swap one random eligible agent of `sex` between two distinct groups
pub fn swap_agents(
    groups: &mut [Group],
    rng: &mut ChaCha8Rng,
    sex: Sex,
    leaving: usize,
    arriving: usize,
) -> Result<()> {
    let group_count = groups.len();
    let (from, to) =
        pair_mut(groups, leaving, arriving).ok_or(SimError::InsufficientGroups(group_count))?;

    match sex {
        Sex::Female => {
            let i = pick(&from.females_not_yet_cycling, from.id, sex, rng)?;
            let j = pick(&to.females_not_yet_cycling, to.id, sex, rng)?;

            let mut outgoing = from.females_not_yet_cycling.remove(i);
            let mut incoming = to.females_not_yet_cycling.remove(j);
            std::mem::swap(&mut outgoing.id, &mut incoming.id);
            outgoing.group_id = to.id;
            incoming.group_id = from.id;

            tracing::trace!(from = %from.id, to = %to.id, "female migrated");
            from.females_not_yet_cycling.push(incoming);
            to.females_not_yet_cycling.push(outgoing);
        }
        Sex::Male => {
            let i = pick(&from.males, from.id, sex, rng)?;
            let j = pick(&to.males, to.id, sex, rng)?;

            let mut outgoing = from.males.remove(i);
            let mut incoming = to.males.remove(j);
            std::mem::swap(&mut outgoing.id, &mut incoming.id);
            outgoing.group_id = to.id;
            incoming.group_id = from.id;

            tracing::trace!(from = %from.id, to = %to.id, "male migrated");
            from.males.push(incoming);
            to.males.push(outgoing);
        }
    }

    Ok(())
}

fn pick<T>(pool: &[T], group: GroupId, sex: Sex, rng: &mut ChaCha8Rng) -> Result<usize> {
    if pool.is_empty() {
        return Err(SimError::EmptyMigrationPool { group, sex });
    }
    Ok(rng.gen_range(0..pool.len()))
}

/// Mutable access to two distinct groups at once
fn pair_mut(groups: &mut [Group], a: usize, b: usize) -> Option<(&mut Group, &mut Group)> {
    if a == b || a >= groups.len() || b >= groups.len() {
        return None;
    }
    if a < b {
        let (left, right) = groups.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = groups.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{FemaleId, GroupId, MaleId};

    fn config(migration_rate: f64) -> SimulationConfig {
        SimulationConfig {
            number_groups: 3,
            number_females: 5,
            number_males: 5,
            migration_rate,
            seed: Some(77),
            ..SimulationConfig::default()
        }
    }

    fn group_membership(population: &Population) -> Vec<(GroupId, Vec<GroupId>)> {
        population
            .groups
            .iter()
            .map(|g| {
                let members = g
                    .males
                    .iter()
                    .map(|m| m.group_id)
                    .chain(g.females().map(|f| f.group_id))
                    .collect();
                (g.id, members)
            })
            .collect()
    }

    #[test]
    fn test_zero_rate_is_a_no_op() {
        let mut population = Population::new(config(0.0)).unwrap();
        let before = group_membership(&population);
        let male_ids: Vec<Vec<MaleId>> = population
            .groups
            .iter()
            .map(|g| g.males.iter().map(|m| m.id).collect())
            .collect();

        for _ in 0..20 {
            assert_eq!(population.migrate().unwrap(), MigrationSummary::default());
        }

        assert_eq!(group_membership(&population), before);
        let after: Vec<Vec<MaleId>> = population
            .groups
            .iter()
            .map(|g| g.males.iter().map(|m| m.id).collect())
            .collect();
        assert_eq!(after, male_ids);
    }

    #[test]
    fn test_migration_conserves_population() {
        let mut population = Population::new(config(0.3)).unwrap();
        let sizes: Vec<(usize, usize)> = population
            .groups
            .iter()
            .map(|g| (g.female_count(), g.male_count()))
            .collect();

        let mut moved = 0;
        for _ in 0..10 {
            moved += population.migrate().unwrap().total();
        }
        assert!(moved > 0);

        // Swaps keep every group's size, and so the total
        let after: Vec<(usize, usize)> = population
            .groups
            .iter()
            .map(|g| (g.female_count(), g.male_count()))
            .collect();
        assert_eq!(after, sizes);
        assert_eq!(population.agent_count(), 3 * (5 + 5));
    }

    #[test]
    fn test_migrants_carry_new_group_and_unique_ids() {
        let mut population = Population::new(config(0.5)).unwrap();
        for _ in 0..5 {
            population.migrate().unwrap();
        }

        for group in &population.groups {
            assert!(group.males.iter().all(|m| m.group_id == group.id));
            assert!(group.females().all(|f| f.group_id == group.id));

            let male_ids: HashSet<MaleId> = group.males.iter().map(|m| m.id).collect();
            let female_ids: HashSet<FemaleId> = group.females().map(|f| f.id).collect();
            assert_eq!(male_ids.len(), group.male_count());
            assert_eq!(female_ids.len(), group.female_count());
        }
    }

    #[test]
    fn test_swap_from_empty_pool_fails() {
        let mut population = Population::new(config(0.1)).unwrap();
        population.groups[1].females_not_yet_cycling.clear();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = swap_agents(&mut population.groups, &mut rng, Sex::Female, 0, 1);
        assert!(matches!(
            result,
            Err(SimError::EmptyMigrationPool {
                group: GroupId(1),
                sex: Sex::Female
            })
        ));
    }

    #[test]
    fn test_swap_exchanges_one_agent_each_way() {
        let mut population = Population::new(config(0.1)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let qualities_0: Vec<f64> = population.groups[0].males.iter().map(|m| m.quality).collect();

        swap_agents(&mut population.groups, &mut rng, Sex::Male, 0, 2).unwrap();

        let now_0: Vec<f64> = population.groups[0].males.iter().map(|m| m.quality).collect();
        let arrived = *now_0.last().unwrap();
        assert!(!qualities_0.contains(&arrived));
        assert!(population.groups[2]
            .males
            .iter()
            .any(|m| qualities_0.contains(&m.quality)));
        assert_eq!(population.groups[0].male_count(), 5);
        assert_eq!(population.groups[2].male_count(), 5);
    }

    #[test]
    fn test_pair_mut_rejects_same_group() {
        let mut population = Population::new(config(0.1)).unwrap();
        assert!(pair_mut(&mut population.groups, 1, 1).is_none());
        assert!(pair_mut(&mut population.groups, 0, 9).is_none());
        let (a, b) = pair_mut(&mut population.groups, 2, 0).unwrap();
        assert_eq!((a.id, b.id), (GroupId(2), GroupId(0)));
    }
}
