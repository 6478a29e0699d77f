//! Renders a model back into the fact language.

use std::{fmt::Write as _, fs, path::Path};

use anyhow::{Context, Result};

use crate::models::Environment;

/// Render `environment` in canonical order: trains by ascending id, a blank
/// line, then cells row by row with a blank line after each row.
pub fn write_facts(environment: &Environment) -> String {
    let mut out = String::new();
    for train in &environment.trains {
        let _ = writeln!(out, "train({}).", train.id);
        let _ = writeln!(
            out,
            "start({},({},{}),{},{}).",
            train.id, train.start.y, train.start.x, train.earliest_departure, train.start_heading
        );
        let _ = writeln!(
            out,
            "end({},({},{}),{}).",
            train.id, train.end.y, train.end.x, train.latest_arrival
        );
    }
    out.push('\n');

    for (y, cells) in environment.grid.rows() {
        for (x, track) in cells {
            let _ = writeln!(out, "cell(({y},{x}),{track}).");
        }
        out.push('\n');
    }
    out
}

/// Write the rendered facts to `path`, creating parent directories if needed.
pub fn persist_facts(environment: &Environment, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, write_facts(environment))
        .with_context(|| format!("failed to write {}", path.display()))
}
