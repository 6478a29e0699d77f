use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::task::JoinSet;
use tracing::{info, warn};

use gridrail_core::{
    environment::{persist_facts, write_facts},
    trajectory::decode_actions,
    AppConfig, EnvironmentError, EnvironmentLoader, ReportStore, TrajectoryCompiler, Validated,
};

pub async fn check(config: &AppConfig, path: PathBuf) -> Result<()> {
    let loader = EnvironmentLoader::new(path, config.instance_extension.clone());
    let files = loader.discover()?;
    if files.is_empty() {
        bail!("no fact files found under {}", loader.root().display());
    }

    let mut tasks = JoinSet::new();
    for file in files {
        tasks.spawn_blocking(move || {
            let outcome = EnvironmentLoader::load_path(&file);
            (file, outcome)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("validation task panicked")?);
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let total = results.len();
    let mut failed = 0;
    for (file, outcome) in &results {
        match outcome {
            Ok(validated) => print_summary(file, validated),
            Err(err) => {
                failed += 1;
                println!("error {}: {}", file.display(), describe(err));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} environments failed validation");
    }
    info!(total, "All environments valid");
    Ok(())
}

pub async fn compile(
    config: &AppConfig,
    environment: PathBuf,
    actions: PathBuf,
    save: bool,
    json: bool,
) -> Result<()> {
    let validated = load(&environment).await?;
    let action_text = tokio::fs::read_to_string(&actions)
        .await
        .with_context(|| format!("failed to read {}", actions.display()))?;
    let actions = decode_actions(&action_text)
        .with_context(|| format!("failed to decode actions {}", actions.display()))?;

    let simulation = TrajectoryCompiler::new(&validated.environment).compile(&actions);
    if json {
        println!("{}", serde_json::to_string_pretty(&simulation)?);
    } else {
        print!("{}", simulation.to_table());
    }

    if simulation.degraded {
        warn!(
            spawned = ?simulation.spawned,
            unplaced = ?simulation.unplaced,
            "Simulation is incomplete"
        );
        for id in &simulation.unplaced {
            if let Some(train) = validated.environment.train(*id) {
                warn!(
                    train = train.id,
                    start = %train.start,
                    earliest = train.earliest_departure,
                    latest = train.latest_arrival,
                    "Start cell stayed occupied for the whole window"
                );
            }
        }
    }

    if save {
        let store = ReportStore::new(&config.report_root);
        let entry = store.save(&instance_name(&environment), &simulation)?;
        info!(path = %entry.path.display(), "Report saved");
    }
    Ok(())
}

pub async fn normalize(environment: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let validated = load(&environment).await?;
    match out {
        Some(path) => {
            persist_facts(&validated.environment, &path)?;
            info!(path = %path.display(), "Normalized environment written");
        }
        None => print!("{}", write_facts(&validated.environment)),
    }
    Ok(())
}

async fn load(path: &Path) -> Result<Validated> {
    let owned = path.to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || EnvironmentLoader::load_path(owned))
        .await
        .context("environment load task panicked")?;
    outcome.map_err(|err| {
        let hint = describe(&err);
        err.context(hint)
    })
}

fn print_summary(file: &Path, validated: &Validated) {
    let grid = &validated.environment.grid;
    println!(
        "ok    {} ({} trains, {}x{} cells)",
        file.display(),
        validated.environment.trains.len(),
        grid.width(),
        grid.height()
    );
    for warning in &validated.warnings {
        println!("      warning: {warning}");
    }
}

fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<EnvironmentError>() {
        Some(kind) => describe_kind(kind),
        None => format!("{err:#}"),
    }
}

fn describe_kind(err: &EnvironmentError) -> String {
    let hint = match err {
        EnvironmentError::MalformedCell { .. } => "expected cell((Y,X),Track).",
        EnvironmentError::MalformedTrain { .. } => "expected train(Id).",
        EnvironmentError::MalformedStart { .. } => {
            "expected start(Id,(Y,X),EarliestDeparture,Direction)."
        }
        EnvironmentError::MalformedEnd { .. } => "expected end(Id,(Y,X),LatestArrival).",
        EnvironmentError::NegativeCoordinate { .. } => "coordinates start at 0",
        EnvironmentError::DeadEndTrack { .. } => "dead ends are not allowed on the grid",
        EnvironmentError::InvalidDirection { .. } => "direction must be one of n, e, s, w",
        EnvironmentError::IncompleteGrid { .. } => {
            "every cell of the bounding box needs a cell fact"
        }
        EnvironmentError::MissingStartOrEnd { .. } => "each train needs one start and one end",
        _ => "",
    };
    if hint.is_empty() {
        err.to_string()
    } else {
        format!("{err} ({hint})")
    }
}

fn instance_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("environment")
        .to_string()
}
