//! Heading and position update for a single action.

use crate::{catalog, models::Heading};

use super::action::ActionKind;

/// Heading after moving forward over `track` while facing `heading`.
///
/// Only the heading-changing codes remap; unlisted pairs keep the heading.
fn forced_heading(track: u16, heading: Heading) -> Heading {
    use Heading::{East as E, North as N, South as S, West as W};

    if !catalog::changes_heading(track) {
        return heading;
    }
    match (track, heading) {
        (4608, N) => W,
        (4608, E) => S,
        (16386, N) => E,
        (16386, W) => S,
        (72, S) => E,
        (72, W) => N,
        (2064, E) => N,
        (2064, S) => W,
        (20994, E) | (20994, W) => S,
        (16458, N) | (16458, S) => E,
        (2136, E) | (2136, W) => N,
        (6672, N) | (6672, S) => W,
        (37408, E) => S,
        (17411, N) => E,
        (32872, W) => N,
        (3089, S) => W,
        (49186, W) => S,
        (1097, S) => E,
        (34864, E) => N,
        (5633, N) => W,
        _ => heading,
    }
}

/// Heading used for the next step.
///
/// `track` is the code under the train, or `None` when the train stands
/// outside the grid, which never changes the heading.
pub fn next_heading(heading: Heading, track: Option<u16>, action: ActionKind) -> Heading {
    match action {
        ActionKind::Wait => heading,
        ActionKind::TurnLeft => heading.turned_left(),
        ActionKind::TurnRight => heading.turned_right(),
        ActionKind::MoveForward => match track {
            Some(track) => forced_heading(track, heading),
            None => heading,
        },
    }
}

/// Resolve the heading, then advance one cell along it unless waiting.
pub fn step(
    x: i64,
    y: i64,
    heading: Heading,
    track: Option<u16>,
    action: ActionKind,
) -> (i64, i64, Heading) {
    let heading = next_heading(heading, track, action);
    if action == ActionKind::Wait {
        return (x, y, heading);
    }
    let (x, y) = heading.advance(x, y);
    (x, y, heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HEADING_CHANGING, LEGAL_TRACKS};

    const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    #[test]
    fn non_changing_tracks_keep_heading() {
        let others = LEGAL_TRACKS
            .iter()
            .map(|(code, _)| *code)
            .chain([0, 8192, 12345])
            .filter(|code| !HEADING_CHANGING.contains(code));
        for code in others {
            for heading in ALL {
                assert_eq!(
                    next_heading(heading, Some(code), ActionKind::MoveForward),
                    heading,
                    "track {code} changed heading {heading}"
                );
            }
        }
    }

    #[test]
    fn curves_remap_heading() {
        assert_eq!(
            next_heading(Heading::North, Some(4608), ActionKind::MoveForward),
            Heading::West
        );
        assert_eq!(
            next_heading(Heading::West, Some(72), ActionKind::MoveForward),
            Heading::North
        );
        assert_eq!(
            next_heading(Heading::South, Some(16458), ActionKind::MoveForward),
            Heading::East
        );
        // Unlisted pair on a changing code falls back to the current heading.
        assert_eq!(
            next_heading(Heading::South, Some(4608), ActionKind::MoveForward),
            Heading::South
        );
    }

    #[test]
    fn turns_ignore_the_track() {
        for track in [None, Some(0), Some(4608)] {
            assert_eq!(
                next_heading(Heading::North, track, ActionKind::TurnLeft),
                Heading::West
            );
            assert_eq!(
                next_heading(Heading::North, track, ActionKind::TurnRight),
                Heading::East
            );
        }
    }

    #[test]
    fn step_moves_along_resolved_heading() {
        assert_eq!(
            step(3, 3, Heading::North, Some(4608), ActionKind::MoveForward),
            (2, 3, Heading::West)
        );
        assert_eq!(
            step(3, 3, Heading::East, Some(1025), ActionKind::Wait),
            (3, 3, Heading::East)
        );
        assert_eq!(
            step(0, 0, Heading::North, None, ActionKind::MoveForward),
            (0, -1, Heading::North)
        );
        assert_eq!(
            step(1, 1, Heading::South, Some(32800), ActionKind::TurnRight),
            (0, 1, Heading::West)
        );
    }
}
