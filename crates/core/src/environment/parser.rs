//! Syntactic pass over the fact language.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{catalog, models::Coord, models::TrainId};

use super::error::{EnvironmentError, EnvironmentWarning};

/// `cell((Y,X),Track)`
static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cell\(\s*\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)\s*,\s*(\d+)\s*\)$")
        .expect("invalid cell regex")
});

/// `train(Id)`
static TRAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^train\(\s*(\d+)\s*\)$").expect("invalid train regex"));

/// `start(Id,(Y,X),EarliestDeparture,Direction)`
static START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^start\(\s*(\d+)\s*,\s*\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)\s*,\s*(\d+)\s*,\s*([A-Za-z_]\w*)\s*\)$",
    )
    .expect("invalid start regex")
});

/// `end(Id,(Y,X),LatestArrival)`
static END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^end\(\s*(\d+)\s*,\s*\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)\s*,\s*(\d+)\s*\)$")
        .expect("invalid end regex")
});

static PREDICATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z_]\w*)\s*\(").expect("invalid predicate regex"));

/// A `train`, `start` or `end` statement, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainFact {
    /// `train(Id)`
    Train {
        /// Declared id.
        id: TrainId,
    },
    /// `start(Id,(Y,X),EarliestDeparture,Direction)`
    Start {
        /// Referenced train.
        id: TrainId,
        /// Spawn cell.
        at: Coord,
        /// Earliest departure timestep.
        earliest_departure: i64,
        /// Direction tag as written; checked by the validator.
        direction: String,
    },
    /// `end(Id,(Y,X),LatestArrival)`
    End {
        /// Referenced train.
        id: TrainId,
        /// Station cell.
        at: Coord,
        /// Latest arrival timestep.
        latest_arrival: i64,
    },
}

/// Output of the syntactic pass.
#[derive(Debug, Clone, Default)]
pub struct ParsedFacts {
    /// Cells keyed by row, then column.
    pub cells: BTreeMap<i64, BTreeMap<i64, u16>>,
    /// Train-related statements in the order they were encountered.
    pub trains: Vec<TrainFact>,
    /// Recoverable issues seen so far.
    pub warnings: Vec<EnvironmentWarning>,
}

impl ParsedFacts {
    /// Track at `at`, if a cell fact declared it.
    pub fn cell(&self, at: Coord) -> Option<u16> {
        self.cells.get(&at.y).and_then(|row| row.get(&at.x)).copied()
    }
}

/// Incremental line-based parser for the fact language.
#[derive(Debug, Default)]
pub struct FactParser {
    facts: ParsedFacts,
    line: usize,
}

impl FactParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete document.
    pub fn parse(text: &str) -> Result<ParsedFacts, EnvironmentError> {
        let mut parser = Self::new();
        for line in text.lines() {
            parser.feed_line(line)?;
        }
        Ok(parser.finish())
    }

    /// Consume one line. `%` starts a comment running to the end of the line.
    pub fn feed_line(&mut self, raw: &str) -> Result<(), EnvironmentError> {
        self.line += 1;
        let content = raw.split('%').next().unwrap_or_default();
        for statement in content.split('.') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            self.statement(statement)?;
        }
        Ok(())
    }

    /// Return everything parsed so far.
    pub fn finish(self) -> ParsedFacts {
        self.facts
    }

    fn statement(&mut self, fact: &str) -> Result<(), EnvironmentError> {
        let line = self.line;
        let predicate = PREDICATE_RE
            .captures(fact)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());

        match predicate {
            Some("cell") => {
                let malformed = || EnvironmentError::MalformedCell {
                    line,
                    fact: fact.to_string(),
                };
                let caps = CELL_RE.captures(fact).ok_or_else(malformed)?;
                let y = number::<i64>(&caps[1]).ok_or_else(malformed)?;
                let x = number::<i64>(&caps[2]).ok_or_else(malformed)?;
                // Any digit run is a track code; past `u64` it is simply unknown.
                let track = number::<u64>(&caps[3]).unwrap_or(u64::MAX);
                self.cell(line, Coord::new(x, y), track)
            }
            Some("train") => {
                let malformed = || EnvironmentError::MalformedTrain {
                    line,
                    fact: fact.to_string(),
                };
                let caps = TRAIN_RE.captures(fact).ok_or_else(malformed)?;
                let id = number(&caps[1]).ok_or_else(malformed)?;
                self.facts.trains.push(TrainFact::Train { id });
                Ok(())
            }
            Some("start") => {
                let malformed = || EnvironmentError::MalformedStart {
                    line,
                    fact: fact.to_string(),
                };
                let caps = START_RE.captures(fact).ok_or_else(malformed)?;
                let id = number(&caps[1]).ok_or_else(malformed)?;
                let y = number(&caps[2]).ok_or_else(malformed)?;
                let x = number(&caps[3]).ok_or_else(malformed)?;
                let earliest_departure = number(&caps[4]).ok_or_else(malformed)?;
                self.facts.trains.push(TrainFact::Start {
                    id,
                    at: Coord::new(x, y),
                    earliest_departure,
                    direction: caps[5].to_string(),
                });
                Ok(())
            }
            Some("end") => {
                let malformed = || EnvironmentError::MalformedEnd {
                    line,
                    fact: fact.to_string(),
                };
                let caps = END_RE.captures(fact).ok_or_else(malformed)?;
                let id = number(&caps[1]).ok_or_else(malformed)?;
                let y = number(&caps[2]).ok_or_else(malformed)?;
                let x = number(&caps[3]).ok_or_else(malformed)?;
                let latest_arrival = number(&caps[4]).ok_or_else(malformed)?;
                self.facts.trains.push(TrainFact::End {
                    id,
                    at: Coord::new(x, y),
                    latest_arrival,
                });
                Ok(())
            }
            _ => {
                warn!(line, fact, "Skipping unrecognised fact");
                self.facts.warnings.push(EnvironmentWarning::UnrecognizedFact {
                    line,
                    fact: fact.to_string(),
                });
                Ok(())
            }
        }
    }

    fn cell(&mut self, line: usize, at: Coord, track: u64) -> Result<(), EnvironmentError> {
        if at.x < 0 || at.y < 0 {
            return Err(EnvironmentError::NegativeCoordinate {
                line,
                x: at.x,
                y: at.y,
            });
        }

        let code = match u16::try_from(track) {
            Ok(code) if catalog::is_dead_end(code) => {
                return Err(EnvironmentError::DeadEndTrack { line, at, track });
            }
            Ok(code) if code == catalog::EMPTY || catalog::is_legal(code) => code,
            _ => {
                warn!(%at, track, "Unknown track code replaced with empty cell");
                self.facts
                    .warnings
                    .push(EnvironmentWarning::UnknownTrack { at, track });
                catalog::EMPTY
            }
        };

        let row = self.facts.cells.entry(at.y).or_default();
        if row.insert(at.x, code).is_some() {
            return Err(EnvironmentError::DuplicateCell { line, at });
        }
        Ok(())
    }
}

fn number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}
