//! End-to-end compile: plan, build, repair, spawn.

use tracing::{info, warn};

use crate::models::Environment;

use super::{
    action::Action,
    builder::{ActionPlan, TrajectoryBuilder},
    models::Simulation,
    repair::TrajectoryRepairer,
    spawn::SpawnScheduler,
};

/// Turns a decoded action list into the final trajectory table.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryCompiler<'a> {
    builder: TrajectoryBuilder<'a>,
}

impl<'a> TrajectoryCompiler<'a> {
    /// Compiler over a validated environment.
    pub fn new(environment: &'a Environment) -> Self {
        Self {
            builder: TrajectoryBuilder::new(environment),
        }
    }

    /// Group `actions` per declared train, ordered by timestep.
    ///
    /// Actions naming an undeclared train are dropped.
    pub fn plan(&self, actions: &[Action]) -> ActionPlan {
        let environment = self.builder.environment();
        let mut plan: ActionPlan = environment
            .trains
            .iter()
            .map(|train| (train.id, Default::default()))
            .collect();

        for action in actions {
            match plan.get_mut(&action.train) {
                Some(queue) => queue.push_back(*action),
                None => warn!(
                    train = action.train,
                    timestep = action.timestep,
                    "Ignoring action for undeclared train"
                ),
            }
        }
        for queue in plan.values_mut() {
            queue.make_contiguous().sort_by_key(|action| action.timestep);
        }
        plan
    }

    /// Run the full pipeline. Never fails; anomalies surface as a degraded
    /// result.
    pub fn compile(&self, actions: &[Action]) -> Simulation {
        let environment = self.builder.environment();
        let mut plan = self.plan(actions);

        let repaired = TrajectoryRepairer::repair(&self.builder, &mut plan);
        let mut trajectories = repaired.trajectories;
        let spawned = SpawnScheduler::schedule(environment, &mut trajectories);

        let degraded = !spawned.placed.is_empty() || !spawned.unplaced.is_empty();
        let simulation = Simulation {
            records: trajectories.into_values().flatten().collect(),
            spawned: spawned.placed,
            unplaced: spawned.unplaced,
            discarded_actions: repaired.discarded,
            degraded,
        };

        info!(
            trains = environment.trains.len(),
            records = simulation.records.len(),
            horizon = ?simulation.horizon(),
            discarded = simulation.discarded_actions,
            spawned = simulation.spawned.len(),
            unplaced = simulation.unplaced.len(),
            degraded,
            "Trajectories compiled"
        );
        simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        environment::{EnvironmentError, EnvironmentLoader},
        models::Heading,
        trajectory::action::{decode_actions, ActionKind},
    };

    const LOOP: &str = "\
cell((0,0),16386). cell((0,1),1025). cell((0,2),17411). cell((0,3),1025). cell((0,4),5633). cell((0,5),1025). cell((0,6),4608).
cell((1,0),32800). cell((1,1),0). cell((1,2),32800). cell((1,3),0). cell((1,4),32800). cell((1,5),0). cell((1,6),32800).
cell((2,0),72). cell((2,1),1025). cell((2,2),2064). cell((2,3),0). cell((2,4),72). cell((2,5),1025). cell((2,6),2064).
";

    fn load(trains: &str) -> Result<Environment, EnvironmentError> {
        Ok(EnvironmentLoader::load_str(&format!("{LOOP}{trains}"))?.environment)
    }

    #[test]
    fn single_move_south_reaches_station() -> anyhow::Result<()> {
        let environment = load("train(0). start(0,(1,4),1,s). end(0,(2,4),5).")?;
        let actions = decode_actions("action(train(0),move_forward,1).")?;

        let simulation = TrajectoryCompiler::new(&environment).compile(&actions);
        let path: Vec<_> = simulation
            .trajectory(0)
            .map(|r| (r.x, r.y, r.heading, r.timestep))
            .collect();
        assert_eq!(
            path,
            vec![(4, 1, Heading::South, 0), (4, 2, Heading::South, 1)]
        );
        assert!(!simulation.degraded);
        assert_eq!(simulation.horizon(), Some(1));
        assert_eq!(simulation.to_table(), "0,4,1,s,0\n0,4,2,s,1\n");
        Ok(())
    }

    #[test]
    fn single_move_north_on_vertical_track() -> anyhow::Result<()> {
        let environment = load("train(0). start(0,(1,6),1,n). end(0,(0,6),5).")?;
        let actions = [Action::new(0, ActionKind::MoveForward, 1)];

        let simulation = TrajectoryCompiler::new(&environment).compile(&actions);
        let last = simulation.trajectory(0).last().copied();
        assert_eq!(last.map(|r| (r.x, r.y, r.heading)), Some((6, 0, Heading::North)));
        Ok(())
    }

    #[test]
    fn unplanned_trains_fall_back_to_spawning() -> anyhow::Result<()> {
        let environment = load(
            "train(0). start(0,(2,2),1,w). end(0,(2,0),9).\n\
             train(1). start(1,(2,2),1,w). end(1,(2,0),9).",
        )?;

        let simulation = TrajectoryCompiler::new(&environment).compile(&[]);
        assert!(simulation.degraded);
        assert_eq!(simulation.spawned, vec![0, 1]);
        let slots: Vec<_> = simulation
            .records
            .iter()
            .map(|r| (r.train, r.x, r.y, r.timestep))
            .collect();
        assert_eq!(slots, vec![(0, 2, 2, 0), (1, 2, 2, 1)]);
        Ok(())
    }

    #[test]
    fn unreachable_station_is_repaired_into_a_spawn() -> anyhow::Result<()> {
        let environment = load(
            "train(0). start(0,(2,5),1,w). end(0,(2,4),9).\n\
             train(1). start(1,(0,1),1,w). end(1,(2,6),9).",
        )?;
        let actions = decode_actions(
            "action(train(0),wait,1). action(train(0),move_forward,2). action(train(0),wait,3).\n\
             action(train(1),move_forward,1). action(train(1),move_forward,2).\n\
             action(train(7),move_forward,1).",
        )?;

        let compiler = TrajectoryCompiler::new(&environment);
        let simulation = compiler.compile(&actions);

        // Train 0 arrives; train 1 runs out of actions and is spawned instead.
        assert_eq!(
            simulation.trajectory(0).last().map(|r| (r.x, r.y)),
            Some((4, 2))
        );
        assert_eq!(simulation.spawned, vec![1]);
        assert_eq!(simulation.discarded_actions, 2);
        assert!(simulation.degraded);

        assert_eq!(compiler.compile(&actions), simulation);
        Ok(())
    }

    #[test]
    fn extreme_solver_timestep_compiles_without_panicking() -> anyhow::Result<()> {
        let environment = load("train(0). start(0,(1,4),1,s). end(0,(2,4),5).")?;
        let actions =
            decode_actions("action(train(0),move_forward,-9223372036854775808).")?;

        let simulation = TrajectoryCompiler::new(&environment).compile(&actions);
        let path: Vec<_> = simulation
            .trajectory(0)
            .map(|r| (r.x, r.y, r.timestep))
            .collect();
        assert_eq!(path, vec![(4, 1, i64::MIN), (4, 2, i64::MIN)]);
        assert_eq!(simulation.horizon(), Some(i64::MIN));
        Ok(())
    }

    #[test]
    fn plan_orders_actions_by_timestep() -> anyhow::Result<()> {
        let environment = load("train(0). start(0,(1,4),1,s). end(0,(2,4),5).")?;
        let actions = [
            Action::new(0, ActionKind::Wait, 4),
            Action::new(0, ActionKind::MoveForward, 2),
        ];
        let plan = TrajectoryCompiler::new(&environment).plan(&actions);
        let timesteps: Vec<_> = plan[&0].iter().map(|a| a.timestep).collect();
        assert_eq!(timesteps, vec![2, 4]);
        Ok(())
    }
}
