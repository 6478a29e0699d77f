#![warn(clippy::all, missing_docs)]

//! Core of the gridrail trajectory compiler.
//!
//! This crate parses and validates the rail environment fact language,
//! replays solver actions into per-timestep train positions, and persists
//! the resulting trajectory tables.

pub mod catalog;
pub mod config;
pub mod environment;
pub mod models;
pub mod report;
pub mod trajectory;

pub use config::AppConfig;
pub use environment::{EnvironmentError, EnvironmentLoader, EnvironmentWarning, Validated};
pub use models::{Coord, Environment, Heading, TrackGrid, TrainId, TrainSpec};
pub use report::{CompileReport, ReportStore};
pub use trajectory::{Action, ActionKind, PositionRecord, Simulation, TrajectoryCompiler};
