/// Squares are indexed 0..64, a1 = 0, h1 = 7, a8 = 56, h8 = 63
pub type Square = usize;

pub const A1: Square = 0;
pub const D1: Square = 3;
pub const E1: Square = 4;
pub const F1: Square = 5;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const D8: Square = 59;
pub const E8: Square = 60;
pub const F8: Square = 61;
pub const H8: Square = 63;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}
pub fn from_coords(file: usize, rank: usize) -> Square {
    rank * 8 + file
}

/// Proximity to the four central squares, from 0 (corner) to 6 (center).
/// Symmetric along both axes.
/// ```
/// use kestrel::square::center_proximity;
/// assert_eq!(center_proximity(0), 0);
/// assert_eq!(center_proximity(27), 6);
/// assert_eq!(center_proximity(28), center_proximity(35));
/// ```
pub fn center_proximity(sq: Square) -> i32 {
    let axis = |x: usize| 3 - (2 * x as i32 - 7).abs() / 2;
    axis(file_of(sq)) + axis(rank_of(sq))
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use kestrel::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2someotherstuff"), Some(11));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars_iter = s.chars();
    let file = match chars_iter.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars_iter.next()?.to_digit(10) {
        Some(i) if (1..=8).contains(&i) => i as usize - 1,
        _ => return None,
    };
    Some(from_coords(file, rank))
}

/// Returns the string representation of a square
/// ```
/// use kestrel::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    let rank = ('1'..='8').nth(rank_of(sq))?;
    let file = ('a'..='h').nth(file_of(sq))?;
    let mut repr = file.to_string();
    repr.push(rank);
    Some(repr)
}

/// Checks whether a given square is in bounds (0..64) or not
/// ```
/// use kestrel::square::is_valid;
/// assert!(is_valid(12));
/// assert!(!is_valid(64));
/// ```
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}
