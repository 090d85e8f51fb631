use crate::piece::Color;
use crate::square::Square;

// Build script to calculate lookup tables at compile time
include!(concat!(env!("OUT_DIR"), "/lookup.rs"));

/// Sliding directions. Straight rays come first, then diagonals, in the
/// same order the build script lays the tables out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}
impl Direction {
    pub const STRAIGHT: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// The two diagonals pointing towards the opponent's side of the board
    pub fn forward_diagonals(color: Color) -> [Direction; 2] {
        match color {
            Color::White => [Direction::NorthEast, Direction::NorthWest],
            Color::Black => [Direction::SouthEast, Direction::SouthWest],
        }
    }
}

/// Read-only attack and ray tables, generated at compile time.
///
/// Every table is indexed by origin square; rays are ordered outward from
/// the origin and stop at the board edge.
pub struct Lookup;
impl Lookup {
    #[inline(always)]
    pub fn ray(origin: Square, direction: Direction) -> &'static [Square] {
        let d = direction as usize;
        &Self::RAYS[origin][d][..Self::RAY_LENGTHS[origin][d]]
    }

    #[inline(always)]
    pub fn knight_reach(origin: Square) -> &'static [Square] {
        &Self::KNIGHT_REACH[origin][..Self::KNIGHT_REACH_LENGTHS[origin]]
    }

    /// King steps, castling excluded
    #[inline(always)]
    pub fn king_reach(origin: Square) -> &'static [Square] {
        &Self::KING_REACH[origin][..Self::KING_REACH_LENGTHS[origin]]
    }

    /// Squares a pawn of the given color standing on `origin` attacks
    #[inline(always)]
    pub fn pawn_captures(origin: Square, color: Color) -> &'static [Square] {
        let c = color as usize;
        &Self::PAWN_CAPTURES[c][origin][..Self::PAWN_CAPTURE_LENGTHS[c][origin]]
    }

    /// Whether both squares share a rank, file or diagonal
    #[inline(always)]
    pub fn in_line(a: Square, b: Square) -> bool {
        Self::IN_LINE[a][b]
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Lookup};
    use crate::piece::Color;

    #[test]
    fn rays_stop_at_the_edge() {
        // a1 north: a2..a8
        assert_eq!(Lookup::ray(0, Direction::North), &[8, 16, 24, 32, 40, 48, 56]);
        assert!(Lookup::ray(0, Direction::West).is_empty());
        assert!(Lookup::ray(0, Direction::SouthWest).is_empty());
        // d4 north east: e5 f6 g7 h8
        assert_eq!(Lookup::ray(27, Direction::NorthEast), &[36, 45, 54, 63]);
        // h1 west is ordered outward
        assert_eq!(Lookup::ray(7, Direction::West), &[6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn jump_tables() {
        assert_eq!(Lookup::knight_reach(0).len(), 2);
        assert_eq!(Lookup::knight_reach(27).len(), 8);
        assert_eq!(Lookup::king_reach(0).len(), 3);
        assert_eq!(Lookup::king_reach(27).len(), 8);
        assert!(Lookup::knight_reach(0).contains(&17));
        assert!(Lookup::knight_reach(0).contains(&10));
    }

    #[test]
    fn pawn_captures_are_color_specific() {
        // e4 white pawn attacks d5 and f5
        let mut white = Lookup::pawn_captures(28, Color::White).to_vec();
        white.sort();
        assert_eq!(white, vec![35, 37]);
        let mut black = Lookup::pawn_captures(28, Color::Black).to_vec();
        black.sort();
        assert_eq!(black, vec![19, 21]);
        // Edge files only attack one way
        assert_eq!(Lookup::pawn_captures(8, Color::White), &[17]);
    }

    #[test]
    fn in_line_is_symmetric() {
        for a in 0..64 {
            assert!(!Lookup::in_line(a, a));
            for b in 0..64 {
                assert_eq!(Lookup::in_line(a, b), Lookup::in_line(b, a));
            }
        }
        assert!(Lookup::in_line(0, 63));
        assert!(Lookup::in_line(4, 60));
        assert!(!Lookup::in_line(4, 21));
    }
}
