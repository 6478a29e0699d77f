//! Static classification of track transition codes.
//!
//! A code is a 16-bit mask: four nibbles for the incoming headings N, E, S, W
//! (high to low), each listing the outgoing headings N, E, S, W it allows.

/// Category of a legal non-empty transition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Straight line.
    Straight,
    /// 90 degree curve.
    Curve,
    /// Simple switch branching left or right.
    Switch,
    /// Diamond crossing.
    Crossing,
    /// Single slip switch.
    SingleSlip,
    /// Double slip switch.
    DoubleSlip,
    /// Symmetric (Y) switch.
    SymmetricSwitch,
}

/// Every legal non-empty code with its category.
pub const LEGAL_TRACKS: [(u16, TrackKind); 25] = [
    (32800, TrackKind::Straight),
    (1025, TrackKind::Straight),
    (4608, TrackKind::Curve),
    (16386, TrackKind::Curve),
    (72, TrackKind::Curve),
    (2064, TrackKind::Curve),
    (37408, TrackKind::Switch),
    (17411, TrackKind::Switch),
    (32872, TrackKind::Switch),
    (3089, TrackKind::Switch),
    (49186, TrackKind::Switch),
    (1097, TrackKind::Switch),
    (34864, TrackKind::Switch),
    (5633, TrackKind::Switch),
    (33825, TrackKind::Crossing),
    (38433, TrackKind::SingleSlip),
    (50211, TrackKind::SingleSlip),
    (33897, TrackKind::SingleSlip),
    (35889, TrackKind::SingleSlip),
    (38505, TrackKind::DoubleSlip),
    (52275, TrackKind::DoubleSlip),
    (20994, TrackKind::SymmetricSwitch),
    (16458, TrackKind::SymmetricSwitch),
    (2136, TrackKind::SymmetricSwitch),
    (6672, TrackKind::SymmetricSwitch),
];

/// Codes whose forward traversal can change the heading.
pub const HEADING_CHANGING: [u16; 16] = [
    4608, 16386, 72, 2064, 20994, 16458, 2136, 6672, 37408, 17411, 32872, 3089, 49186, 1097,
    34864, 5633,
];

/// Dead ends. Never legal on a grid.
pub const DEAD_ENDS: [u16; 4] = [8192, 4, 128, 256];

/// The empty cell.
pub const EMPTY: u16 = 0;

/// Category of `code`, or `None` for empty, dead-end and unknown codes.
pub fn kind_of(code: u16) -> Option<TrackKind> {
    LEGAL_TRACKS
        .iter()
        .find(|(legal, _)| *legal == code)
        .map(|(_, kind)| *kind)
}

/// Whether `code` is a legal non-empty track.
pub fn is_legal(code: u16) -> bool {
    kind_of(code).is_some()
}

/// Whether moving forward over `code` may alter the heading.
pub fn changes_heading(code: u16) -> bool {
    HEADING_CHANGING.contains(&code)
}

/// Whether `code` is one of the forbidden dead ends.
pub fn is_dead_end(code: u16) -> bool {
    DEAD_ENDS.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_changing_codes_are_legal() {
        for code in HEADING_CHANGING {
            assert!(is_legal(code), "{code} should be legal");
        }
    }

    #[test]
    fn dead_ends_and_empty_are_not_legal() {
        for code in DEAD_ENDS {
            assert!(is_dead_end(code));
            assert!(!is_legal(code));
        }
        assert!(!is_legal(EMPTY));
        assert!(!is_dead_end(EMPTY));
        assert_eq!(kind_of(1025), Some(TrackKind::Straight));
        assert_eq!(kind_of(33825), Some(TrackKind::Crossing));
        assert_eq!(kind_of(12345), None);
    }
}
