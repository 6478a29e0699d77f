//! Replays action lists into raw trajectories.

use std::collections::{BTreeMap, VecDeque};

use crate::models::{Environment, TrainId, TrainSpec};

use super::{action::Action, models::PositionRecord, transition};

/// Pending actions per train, each list ordered by timestep.
pub type ActionPlan = BTreeMap<TrainId, VecDeque<Action>>;

/// Built trajectories keyed by train. Trains without actions have no entry.
pub type Trajectories = BTreeMap<TrainId, Vec<PositionRecord>>;

/// Stateless replay of actions against an environment.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryBuilder<'a> {
    environment: &'a Environment,
}

impl<'a> TrajectoryBuilder<'a> {
    /// Builder over `environment`.
    pub fn new(environment: &'a Environment) -> Self {
        Self { environment }
    }

    /// Environment being replayed against.
    pub fn environment(&self) -> &'a Environment {
        self.environment
    }

    /// Trajectory of `train` under `actions`, or `None` when there are none.
    ///
    /// The first record sits one timestep before the first action and holds
    /// the declared start; every action appends one record.
    pub fn build_train<'b>(
        &self,
        train: &TrainSpec,
        actions: impl IntoIterator<Item = &'b Action>,
    ) -> Option<Vec<PositionRecord>> {
        let mut actions = actions.into_iter().peekable();
        let first = actions.peek()?.timestep;

        let mut current = PositionRecord {
            train: train.id,
            x: train.start.x,
            y: train.start.y,
            heading: train.start_heading,
            timestep: first.saturating_sub(1),
        };
        let mut records = vec![current];
        for action in actions {
            let track = self.environment.grid.track_at(current.x, current.y);
            let (x, y, heading) =
                transition::step(current.x, current.y, current.heading, track, action.kind);
            current = PositionRecord {
                train: train.id,
                x,
                y,
                heading,
                timestep: action.timestep,
            };
            records.push(current);
        }
        Some(records)
    }

    /// Trajectories for every train with pending actions, in ascending id order.
    pub fn build(&self, plan: &ActionPlan) -> Trajectories {
        self.environment
            .trains
            .iter()
            .filter_map(|train| {
                let actions = plan.get(&train.id)?;
                let records = self.build_train(train, actions)?;
                Some((train.id, records))
            })
            .collect()
    }
}
