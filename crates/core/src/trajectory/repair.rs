//! Fixed-point repair of trajectories that miss their station.

use tracing::debug;

use super::builder::{ActionPlan, Trajectories, TrajectoryBuilder};

/// Trajectories after repair and how many actions were dropped to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    /// Surviving trajectories. Trains whose plan ran dry have no entry.
    pub trajectories: Trajectories,
    /// Total leading actions removed across all rounds.
    pub discarded: usize,
}

/// Drops leading actions until every trajectory ends on its station.
pub struct TrajectoryRepairer;

impl TrajectoryRepairer {
    /// Rebuild every train, drop the earliest action of each train whose last
    /// position is not its end cell, and repeat until a round changes nothing.
    ///
    /// Each round removes at least one action or stops, so the loop is bounded
    /// by the total number of actions in `plan`.
    pub fn repair(builder: &TrajectoryBuilder<'_>, plan: &mut ActionPlan) -> Repaired {
        let mut discarded = 0;
        let mut round = 0usize;
        loop {
            let trajectories = builder.build(plan);
            let mut changed = false;

            for train in &builder.environment().trains {
                let Some(last) = trajectories.get(&train.id).and_then(|records| records.last())
                else {
                    continue;
                };
                if (last.x, last.y) == (train.end.x, train.end.y) {
                    continue;
                }
                // Always the earliest action, not the one that caused the miss.
                if let Some(actions) = plan.get_mut(&train.id) {
                    if actions.pop_front().is_some() {
                        discarded += 1;
                        changed = true;
                    }
                }
            }

            if !changed {
                debug!(rounds = round, discarded, "Trajectory repair settled");
                return Repaired {
                    trajectories,
                    discarded,
                };
            }
            round += 1;
            debug!(round, discarded, "Repair round dropped leading actions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Coord, Environment, Heading, TrackGrid, TrainSpec},
        trajectory::action::{Action, ActionKind},
    };

    fn line_environment(ends: &[(i64, i64)]) -> Environment {
        let grid = TrackGrid::from_rows(Coord::new(0, 0), vec![vec![1025; 6]]).expect("row");
        let trains = ends
            .iter()
            .enumerate()
            .map(|(id, (start, end))| TrainSpec {
                id: id as u32,
                start: Coord::new(*start, 0),
                start_heading: Heading::East,
                earliest_departure: 0,
                end: Coord::new(*end, 0),
                latest_arrival: 10,
            })
            .collect();
        Environment { grid, trains }
    }

    fn forward(train: u32, steps: std::ops::RangeInclusive<i64>) -> Vec<Action> {
        steps
            .map(|t| Action::new(train, ActionKind::MoveForward, t))
            .collect()
    }

    #[test]
    fn matching_trajectories_are_untouched() {
        let environment = line_environment(&[(0, 3)]);
        let builder = TrajectoryBuilder::new(&environment);
        let mut plan = ActionPlan::new();
        plan.insert(0, forward(0, 1..=3).into());

        let repaired = TrajectoryRepairer::repair(&builder, &mut plan);
        assert_eq!(repaired.discarded, 0);
        assert_eq!(repaired.trajectories[&0].len(), 4);
        assert_eq!(plan[&0].len(), 3);
    }

    #[test]
    fn drops_leading_actions_until_the_end_matches() {
        // Five moves overshoot a station three cells away; two must go.
        let environment = line_environment(&[(0, 3)]);
        let builder = TrajectoryBuilder::new(&environment);
        let mut plan = ActionPlan::new();
        plan.insert(0, forward(0, 1..=5).into());

        let repaired = TrajectoryRepairer::repair(&builder, &mut plan);
        assert_eq!(repaired.discarded, 2);
        let records = &repaired.trajectories[&0];
        assert_eq!(records.first().map(|r| r.timestep), Some(2));
        assert_eq!(records.last().map(|r| (r.x, r.timestep)), Some((3, 5)));
    }

    #[test]
    fn exhausted_trains_lose_their_trajectory_only() {
        // Train 1 can never reach a station behind it.
        let environment = line_environment(&[(0, 2), (3, 1)]);
        let builder = TrajectoryBuilder::new(&environment);
        let mut plan = ActionPlan::new();
        plan.insert(0, forward(0, 1..=2).into());
        plan.insert(1, forward(1, 1..=2).into());

        let repaired = TrajectoryRepairer::repair(&builder, &mut plan);
        assert!(repaired.trajectories.contains_key(&0));
        assert!(!repaired.trajectories.contains_key(&1));
        assert_eq!(repaired.discarded, 2);
        assert!(plan[&1].is_empty());
    }
}
