//! Fallback placement for trains left without a trajectory.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::models::{Environment, TrainId};

use super::{builder::Trajectories, models::PositionRecord};

/// Result of the spawn fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spawned {
    /// Trains given a single stationary record on their start cell.
    pub placed: Vec<TrainId>,
    /// Trains with no free slot inside their departure/arrival window.
    pub unplaced: Vec<TrainId>,
}

/// Finds conflict-free spawn timesteps.
pub struct SpawnScheduler;

impl SpawnScheduler {
    /// Give every train without a trajectory a single record on its start cell
    /// at the earliest timestep in `[max(earliest_departure - 1, 0), latest_arrival]`
    /// where no other train occupies that cell. Trains are handled in id order
    /// and each placement blocks its slot for the trains that follow.
    pub fn schedule(environment: &Environment, trajectories: &mut Trajectories) -> Spawned {
        let mut occupied: HashSet<(i64, i64, i64)> = trajectories
            .values()
            .flatten()
            .map(|record| (record.x, record.y, record.timestep))
            .collect();

        let mut outcome = Spawned::default();
        for train in &environment.trains {
            if trajectories.contains_key(&train.id) {
                continue;
            }

            let (x, y) = (train.start.x, train.start.y);
            let window = (train.earliest_departure - 1).max(0)..=train.latest_arrival;
            let slot = window
                .into_iter()
                .find(|timestep| !occupied.contains(&(x, y, *timestep)));

            match slot {
                Some(timestep) => {
                    info!(train = train.id, timestep, "Spawning train on its start cell");
                    occupied.insert((x, y, timestep));
                    trajectories.insert(
                        train.id,
                        vec![PositionRecord {
                            train: train.id,
                            x,
                            y,
                            heading: train.start_heading,
                            timestep,
                        }],
                    );
                    outcome.placed.push(train.id);
                }
                None => {
                    warn!(
                        train = train.id,
                        earliest = train.earliest_departure,
                        latest = train.latest_arrival,
                        "No free spawn slot within the train's window"
                    );
                    outcome.unplaced.push(train.id);
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coord, Heading, TrackGrid, TrainSpec};

    fn environment(trains: Vec<TrainSpec>) -> Environment {
        Environment {
            grid: TrackGrid::from_rows(Coord::new(0, 0), vec![vec![1025; 4]; 4]).expect("grid"),
            trains,
        }
    }

    fn spec(id: TrainId, start: Coord, earliest: i64, latest: i64) -> TrainSpec {
        TrainSpec {
            id,
            start,
            start_heading: Heading::East,
            earliest_departure: earliest,
            end: Coord::new(3, 3),
            latest_arrival: latest,
        }
    }

    #[test]
    fn shared_start_cell_gets_distinct_timesteps() {
        let environment = environment(vec![
            spec(0, Coord::new(2, 2), 1, 5),
            spec(1, Coord::new(2, 2), 1, 5),
        ]);
        let mut trajectories = Trajectories::new();

        let spawned = SpawnScheduler::schedule(&environment, &mut trajectories);
        assert_eq!(spawned.placed, vec![0, 1]);
        assert!(spawned.unplaced.is_empty());
        assert_eq!(trajectories[&0][0].timestep, 0);
        assert_eq!(trajectories[&1][0].timestep, 1);
        assert_eq!(trajectories[&1][0].heading, Heading::East);
    }

    #[test]
    fn existing_trajectories_block_slots() {
        let environment = environment(vec![
            spec(0, Coord::new(0, 0), 0, 9),
            spec(1, Coord::new(1, 1), 3, 4),
        ]);
        let mut trajectories = Trajectories::new();
        trajectories.insert(
            0,
            (1..=3)
                .map(|timestep| PositionRecord {
                    train: 0,
                    x: 1,
                    y: 1,
                    heading: Heading::East,
                    timestep,
                })
                .collect(),
        );

        let spawned = SpawnScheduler::schedule(&environment, &mut trajectories);
        assert_eq!(spawned.placed, vec![1]);
        assert_eq!(trajectories[&1][0].timestep, 4);
    }

    #[test]
    fn full_window_leaves_train_unplaced() {
        let environment = environment(vec![
            spec(0, Coord::new(0, 0), 0, 0),
            spec(1, Coord::new(0, 0), 0, 0),
        ]);
        let mut trajectories = Trajectories::new();

        let spawned = SpawnScheduler::schedule(&environment, &mut trajectories);
        assert_eq!(spawned.placed, vec![0]);
        assert_eq!(spawned.unplaced, vec![1]);
        assert!(!trajectories.contains_key(&1));
    }
}
