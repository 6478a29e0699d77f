#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

use crate::models::{Coord, TrainId};

/// Fatal conditions raised while loading an environment.
///
/// The first one encountered aborts the load; no partial model is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("line {line}: malformed cell fact `{fact}`")]
    MalformedCell { line: usize, fact: String },

    #[error("line {line}: malformed train fact `{fact}`")]
    MalformedTrain { line: usize, fact: String },

    #[error("line {line}: malformed start fact `{fact}`")]
    MalformedStart { line: usize, fact: String },

    #[error("line {line}: malformed end fact `{fact}`")]
    MalformedEnd { line: usize, fact: String },

    #[error("line {line}: cell (y={y}, x={x}) has a negative coordinate")]
    NegativeCoordinate { line: usize, x: i64, y: i64 },

    #[error("line {line}: cell {at} holds dead-end track {track}")]
    DeadEndTrack { line: usize, at: Coord, track: u64 },

    #[error("line {line}: cell {at} is declared more than once")]
    DuplicateCell { line: usize, at: Coord },

    #[error("train {train}: invalid start direction `{direction}`")]
    InvalidDirection { train: TrainId, direction: String },

    #[error("train {train}: start cell {at} does not exist")]
    StartCellMissing { train: TrainId, at: Coord },

    #[error("train {train}: end cell {at} does not exist")]
    EndCellMissing { train: TrainId, at: Coord },

    #[error("train {train} is declared more than once")]
    DuplicateTrain { train: TrainId },

    #[error("train {train} has more than one start fact")]
    DuplicateStart { train: TrainId },

    #[error("train {train} has more than one end fact")]
    DuplicateEnd { train: TrainId },

    #[error("train {train} is missing its start or end fact")]
    MissingStartOrEnd { train: TrainId },

    #[error("train {train}: latest arrival {latest} precedes earliest departure {earliest}")]
    ArrivalBeforeDeparture {
        train: TrainId,
        earliest: i64,
        latest: i64,
    },

    #[error("grid is incomplete: no cell at {at}")]
    IncompleteGrid { at: Coord },

    #[error("environment declares no cells")]
    EmptyGrid,
}

/// Which end of a train a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The `start` fact.
    Start,
    /// The `end` fact.
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Recoverable conditions. The load continues and the model is adjusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentWarning {
    /// Track code outside the catalog; the cell was emptied.
    UnknownTrack { at: Coord, track: u64 },
    /// A start or end cell has no track under it.
    OffTrack {
        train: TrainId,
        endpoint: Endpoint,
        at: Coord,
    },
    /// A start or end fact without a matching `train` fact; it was dropped.
    Orphan { train: TrainId, endpoint: Endpoint },
    /// A statement that is not one of the recognised predicates; it was skipped.
    UnrecognizedFact { line: usize, fact: String },
}

impl fmt::Display for EnvironmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTrack { at, track } => {
                write!(f, "cell {at}: unknown track {track} replaced with empty")
            }
            Self::OffTrack {
                train,
                endpoint,
                at,
            } => write!(f, "train {train}: {endpoint} cell {at} has no track"),
            Self::Orphan { train, endpoint } => {
                write!(f, "{endpoint} fact for undeclared train {train} ignored")
            }
            Self::UnrecognizedFact { line, fact } => {
                write!(f, "line {line}: unrecognised fact `{fact}` skipped")
            }
        }
    }
}
