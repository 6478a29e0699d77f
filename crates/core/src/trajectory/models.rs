#![allow(missing_docs)]

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{Heading, TrainId};

/// Where a train is, and which way it faces, at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub train: TrainId,
    pub x: i64,
    pub y: i64,
    pub heading: Heading,
    pub timestep: i64,
}

/// Final trajectory table of one compile run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    /// Records ordered by train id, then timestep.
    pub records: Vec<PositionRecord>,
    /// Trains placed on their start cell by the spawn fallback.
    pub spawned: Vec<TrainId>,
    /// Trains for which no free spawn slot existed.
    pub unplaced: Vec<TrainId>,
    /// Leading actions dropped while repairing trajectories.
    pub discarded_actions: usize,
    /// Set when any train needed the spawn fallback.
    pub degraded: bool,
}

impl Simulation {
    /// Records belonging to `train`.
    pub fn trajectory(&self, train: TrainId) -> impl Iterator<Item = &PositionRecord> + '_ {
        self.records.iter().filter(move |record| record.train == train)
    }

    /// Last timestep present in the table.
    pub fn horizon(&self) -> Option<i64> {
        self.records.iter().map(|record| record.timestep).max()
    }

    /// Render as `train,x,y,heading,timestep` lines.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                record.train, record.x, record.y, record.heading, record.timestep
            );
        }
        out
    }
}
