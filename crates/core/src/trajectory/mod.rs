//! Trajectory compilation from solver actions.

/// Actions and solver-output decoding.
pub mod action;
/// Action replay.
pub mod builder;
/// Full compile pipeline.
pub mod compiler;
mod models;
/// Endpoint repair loop.
pub mod repair;
/// Spawn fallback.
pub mod spawn;
/// Per-action heading rules.
pub mod transition;

pub use action::{decode_actions, Action, ActionError, ActionKind};
pub use builder::{ActionPlan, Trajectories, TrajectoryBuilder};
pub use compiler::TrajectoryCompiler;
pub use models::{PositionRecord, Simulation};
pub use repair::{Repaired, TrajectoryRepairer};
pub use spawn::{SpawnScheduler, Spawned};
