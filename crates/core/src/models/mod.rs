//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a train as declared by `train(Id).`.
pub type TrainId = u32;

/// Cardinal direction a train is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Towards decreasing `y`.
    #[serde(rename = "n")]
    North,
    /// Towards increasing `x`.
    #[serde(rename = "e")]
    East,
    /// Towards increasing `y`.
    #[serde(rename = "s")]
    South,
    /// Towards decreasing `x`.
    #[serde(rename = "w")]
    West,
}

impl Heading {
    /// Parse the single-letter tag used in the fact language.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "n" => Some(Self::North),
            "e" => Some(Self::East),
            "s" => Some(Self::South),
            "w" => Some(Self::West),
            _ => None,
        }
    }

    /// Single-letter tag written to facts and trajectory tables.
    pub fn tag(self) -> char {
        match self {
            Self::North => 'n',
            Self::East => 'e',
            Self::South => 's',
            Self::West => 'w',
        }
    }

    /// Rotate by -90 degrees.
    pub fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Rotate by +90 degrees.
    pub fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Cell reached by advancing one step from `(x, y)`.
    ///
    /// Saturates at the edge of the `i64` plane.
    pub fn advance(self, x: i64, y: i64) -> (i64, i64) {
        match self {
            Self::North => (x, y.saturating_sub(1)),
            Self::East => (x.saturating_add(1), y),
            Self::South => (x, y.saturating_add(1)),
            Self::West => (x.saturating_sub(1), y),
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Coord {
    /// Build a coordinate from column and row.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={}, y={})", self.x, self.y)
    }
}

/// A validated train: paired `train`, `start` and `end` facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSpec {
    /// Unique train identifier.
    pub id: TrainId,
    /// Spawn cell.
    pub start: Coord,
    /// Heading at spawn.
    pub start_heading: Heading,
    /// First timestep the train may depart.
    pub earliest_departure: i64,
    /// Destination station cell.
    pub end: Coord,
    /// Last timestep the train may arrive.
    pub latest_arrival: i64,
}

/// Rectangular table of transition codes covering the parsed bounding box.
///
/// The box does not have to start at the origin; `origin` is its top-left
/// corner and every lookup is relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGrid {
    origin: Coord,
    width: usize,
    height: usize,
    cells: Vec<u16>,
}

impl TrackGrid {
    /// Build a grid from row-major tracks. Rows must share one length.
    pub fn from_rows(origin: Coord, rows: Vec<Vec<u16>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            origin,
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Top-left corner of the bounding box.
    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Track code at `(x, y)`, or `None` outside the grid.
    pub fn track_at(&self, x: i64, y: i64) -> Option<u16> {
        let col = usize::try_from(x.checked_sub(self.origin.x)?).ok()?;
        let row = usize::try_from(y.checked_sub(self.origin.y)?).ok()?;
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + col).copied()
    }

    /// Whether `(x, y)` lies inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.track_at(x, y).is_some()
    }

    /// Iterate rows top to bottom as `(y, [(x, track)])`.
    pub fn rows(&self) -> impl Iterator<Item = (i64, Vec<(i64, u16)>)> + '_ {
        self.cells
            .chunks(self.width.max(1))
            .take(self.height)
            .enumerate()
            .map(move |(row, tracks)| {
                let y = self.origin.y + row as i64;
                let cells = tracks
                    .iter()
                    .enumerate()
                    .map(|(col, track)| (self.origin.x + col as i64, *track))
                    .collect();
                (y, cells)
            })
    }
}

/// A validated environment: the track grid plus trains sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Track layout.
    pub grid: TrackGrid,
    /// Trains in ascending id order.
    pub trains: Vec<TrainSpec>,
}

impl Environment {
    /// Look up a train by id.
    pub fn train(&self, id: TrainId) -> Option<&TrainSpec> {
        self.trains
            .binary_search_by_key(&id, |train| train.id)
            .ok()
            .map(|index| &self.trains[index])
    }
}
