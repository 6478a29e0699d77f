//! Discrete per-timestep commands and their textual solver form.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TrainId;

/// One command issued to a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Stay in place.
    Wait,
    /// Advance along the track.
    MoveForward,
    /// Rotate left, then advance.
    TurnLeft,
    /// Rotate right, then advance.
    TurnRight,
}

impl ActionKind {
    /// Parse a solver tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "wait" => Some(Self::Wait),
            "move_forward" => Some(Self::MoveForward),
            "move_left" | "turn_left" => Some(Self::TurnLeft),
            "move_right" | "turn_right" => Some(Self::TurnRight),
            _ => None,
        }
    }

    /// Canonical solver tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::MoveForward => "move_forward",
            Self::TurnLeft => "move_left",
            Self::TurnRight => "move_right",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// An action scheduled for a train at a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Train receiving the command.
    pub train: TrainId,
    /// What to do.
    pub kind: ActionKind,
    /// When to do it.
    pub timestep: i64,
}

impl Action {
    /// Convenience constructor.
    pub fn new(train: TrainId, kind: ActionKind, timestep: i64) -> Self {
        Self {
            train,
            kind,
            timestep,
        }
    }
}

/// Failures while decoding solver output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// An `action(` atom that does not have the expected shape.
    #[error("line {line}: malformed action atom `{atom}`")]
    Malformed {
        /// 1-based line.
        line: usize,
        /// Offending text.
        atom: String,
    },
    /// A well-formed atom with an unknown kind tag.
    #[error("line {line}: unknown action `{tag}`")]
    UnknownKind {
        /// 1-based line.
        line: usize,
        /// Offending tag.
        tag: String,
    },
}

static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^action\(\s*train\(\s*(\d+)\s*\)\s*,\s*([A-Za-z_]\w*)\s*,\s*(-?\d+)\s*\)")
        .expect("invalid action regex")
});

/// Decode every `action(train(Id),Kind,Timestep)` atom in `text`.
///
/// Anything that is not an action atom (solver banners, other predicates)
/// is ignored. The result is sorted by train, then timestep.
pub fn decode_actions(text: &str) -> Result<Vec<Action>, ActionError> {
    let mut actions = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('%').next().unwrap_or_default();
        for (offset, _) in content.match_indices("action(") {
            let rest = &content[offset..];
            let malformed = || ActionError::Malformed {
                line,
                atom: rest
                    .split(|c: char| c.is_whitespace())
                    .next()
                    .unwrap_or(rest)
                    .to_string(),
            };
            let caps = ACTION_RE.captures(rest).ok_or_else(malformed)?;
            let train: TrainId = caps[1].parse().map_err(|_| malformed())?;
            let timestep: i64 = caps[3].parse().map_err(|_| malformed())?;
            let kind = ActionKind::from_tag(&caps[2]).ok_or_else(|| ActionError::UnknownKind {
                line,
                tag: caps[2].to_string(),
            })?;
            actions.push(Action::new(train, kind, timestep));
        }
    }
    actions.sort_by_key(|action| (action.train, action.timestep));
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_solver_answer() -> Result<(), ActionError> {
        let text = "Answer: 1\n\
                    action(train(1),wait,2) action(train(0),move_forward,3)\n\
                    action(train(0), move_left, 1). action(train(1),turn_right,1).\n\
                    SATISFIABLE\n";
        let actions = decode_actions(text)?;
        assert_eq!(
            actions,
            vec![
                Action::new(0, ActionKind::TurnLeft, 1),
                Action::new(0, ActionKind::MoveForward, 3),
                Action::new(1, ActionKind::TurnRight, 1),
                Action::new(1, ActionKind::Wait, 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_atoms() {
        assert_eq!(
            decode_actions("action(train(0),jump,1).").unwrap_err(),
            ActionError::UnknownKind {
                line: 1,
                tag: "jump".to_string()
            }
        );
        assert!(matches!(
            decode_actions("\naction(0,wait,1)."),
            Err(ActionError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn comments_are_ignored() -> Result<(), ActionError> {
        let actions = decode_actions("% action(train(0),jump,1)\naction(train(0),wait,4).")?;
        assert_eq!(actions, vec![Action::new(0, ActionKind::Wait, 4)]);
        Ok(())
    }
}
