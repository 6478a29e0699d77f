//! Cross-checks parsed facts and assembles the immutable model.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::{
    catalog,
    models::{Coord, Environment, Heading, TrackGrid, TrainId, TrainSpec},
};

use super::{
    error::{Endpoint, EnvironmentError, EnvironmentWarning},
    parser::{ParsedFacts, TrainFact},
};

/// A successfully validated environment and the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Validated {
    /// The model.
    pub environment: Environment,
    /// Recoverable issues, in the order they were found.
    pub warnings: Vec<EnvironmentWarning>,
}

/// Validation stage run after [`FactParser`](super::FactParser).
pub struct EnvironmentValidator;

#[derive(Default)]
struct Pairing {
    start: Option<(Coord, i64, Heading)>,
    end: Option<(Coord, i64)>,
}

impl EnvironmentValidator {
    /// Validate `facts`, stopping at the first fatal condition.
    ///
    /// Checks run in a fixed order: start facts, end facts, train pairing,
    /// then grid completeness.
    pub fn validate(facts: ParsedFacts) -> Result<Validated, EnvironmentError> {
        let ParsedFacts {
            cells,
            trains: entries,
            mut warnings,
        } = facts;
        let track_at = |at: Coord| cells.get(&at.y).and_then(|row| row.get(&at.x)).copied();

        for entry in &entries {
            if let TrainFact::Start {
                id, at, direction, ..
            } = entry
            {
                if Heading::from_tag(direction).is_none() {
                    return Err(EnvironmentError::InvalidDirection {
                        train: *id,
                        direction: direction.clone(),
                    });
                }
                match track_at(*at) {
                    None => {
                        return Err(EnvironmentError::StartCellMissing {
                            train: *id,
                            at: *at,
                        })
                    }
                    Some(catalog::EMPTY) => {
                        off_track(&mut warnings, *id, Endpoint::Start, *at);
                    }
                    Some(_) => {}
                }
            }
        }

        for entry in &entries {
            if let TrainFact::End { id, at, .. } = entry {
                match track_at(*at) {
                    None => {
                        return Err(EnvironmentError::EndCellMissing {
                            train: *id,
                            at: *at,
                        })
                    }
                    Some(catalog::EMPTY) => {
                        off_track(&mut warnings, *id, Endpoint::End, *at);
                    }
                    Some(_) => {}
                }
            }
        }

        let trains = pair_trains(&entries, &mut warnings)?;
        let grid = assemble_grid(&cells)?;

        Ok(Validated {
            environment: Environment { grid, trains },
            warnings,
        })
    }
}

fn off_track(warnings: &mut Vec<EnvironmentWarning>, train: TrainId, endpoint: Endpoint, at: Coord) {
    warn!(train, %endpoint, %at, "Train endpoint is not on a track");
    warnings.push(EnvironmentWarning::OffTrack {
        train,
        endpoint,
        at,
    });
}

fn orphan(warnings: &mut Vec<EnvironmentWarning>, train: TrainId, endpoint: Endpoint) {
    warn!(train, %endpoint, "Dropping fact for undeclared train");
    warnings.push(EnvironmentWarning::Orphan { train, endpoint });
}

fn pair_trains(
    entries: &[TrainFact],
    warnings: &mut Vec<EnvironmentWarning>,
) -> Result<Vec<TrainSpec>, EnvironmentError> {
    let mut declared = BTreeSet::new();
    for entry in entries {
        if let TrainFact::Train { id } = entry {
            if !declared.insert(*id) {
                return Err(EnvironmentError::DuplicateTrain { train: *id });
            }
        }
    }

    let mut pairings: BTreeMap<TrainId, Pairing> =
        declared.iter().map(|id| (*id, Pairing::default())).collect();

    for entry in entries {
        match entry {
            TrainFact::Train { .. } => {}
            TrainFact::Start {
                id,
                at,
                earliest_departure,
                direction,
            } => {
                let Some(pairing) = pairings.get_mut(id) else {
                    orphan(warnings, *id, Endpoint::Start);
                    continue;
                };
                if pairing.start.is_some() {
                    return Err(EnvironmentError::DuplicateStart { train: *id });
                }
                let heading = Heading::from_tag(direction).ok_or_else(|| {
                    EnvironmentError::InvalidDirection {
                        train: *id,
                        direction: direction.clone(),
                    }
                })?;
                pairing.start = Some((*at, *earliest_departure, heading));
            }
            TrainFact::End {
                id,
                at,
                latest_arrival,
            } => {
                let Some(pairing) = pairings.get_mut(id) else {
                    orphan(warnings, *id, Endpoint::End);
                    continue;
                };
                if pairing.end.is_some() {
                    return Err(EnvironmentError::DuplicateEnd { train: *id });
                }
                pairing.end = Some((*at, *latest_arrival));
            }
        }
    }

    pairings
        .into_iter()
        .map(|(id, pairing)| {
            let (Some((start, earliest_departure, start_heading)), Some((end, latest_arrival))) =
                (pairing.start, pairing.end)
            else {
                return Err(EnvironmentError::MissingStartOrEnd { train: id });
            };
            if latest_arrival < earliest_departure {
                return Err(EnvironmentError::ArrivalBeforeDeparture {
                    train: id,
                    earliest: earliest_departure,
                    latest: latest_arrival,
                });
            }
            Ok(TrainSpec {
                id,
                start,
                start_heading,
                earliest_departure,
                end,
                latest_arrival,
            })
        })
        .collect()
}

fn assemble_grid(cells: &BTreeMap<i64, BTreeMap<i64, u16>>) -> Result<TrackGrid, EnvironmentError> {
    let Some(min_y) = cells.keys().next().copied() else {
        return Err(EnvironmentError::EmptyGrid);
    };
    let min_x = cells.values().filter_map(|row| row.keys().next()).min();
    let max_x = cells.values().filter_map(|row| row.keys().next_back()).max();
    let (Some(&min_x), Some(&max_x)) = (min_x, max_x) else {
        return Err(EnvironmentError::EmptyGrid);
    };

    // Gaps are found from the declared keys alone.
    let mut expected_y = Some(min_y);
    for (&y, row) in cells {
        if let Some(missing) = expected_y.filter(|expected| *expected != y) {
            return Err(EnvironmentError::IncompleteGrid {
                at: Coord::new(min_x, missing),
            });
        }
        let mut expected_x = Some(min_x);
        for &x in row.keys() {
            if let Some(missing) = expected_x.filter(|expected| *expected != x) {
                return Err(EnvironmentError::IncompleteGrid {
                    at: Coord::new(missing, y),
                });
            }
            expected_x = x.checked_add(1);
        }
        if let Some(missing) = expected_x.filter(|expected| *expected <= max_x) {
            return Err(EnvironmentError::IncompleteGrid {
                at: Coord::new(missing, y),
            });
        }
        expected_y = y.checked_add(1);
    }

    let rows = cells
        .values()
        .map(|row| row.values().copied().collect())
        .collect();
    TrackGrid::from_rows(Coord::new(min_x, min_y), rows).ok_or(EnvironmentError::EmptyGrid)
}
