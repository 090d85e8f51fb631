use crate::piece::Color::{Black, White};
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    pub const PROMOTIONS: [PieceType; 4] = [Queen, Rook, Bishop, Knight];

    pub fn is_bishop_like(&self) -> bool {
        matches!(self, Bishop | Queen)
    }
    pub fn is_rook_like(&self) -> bool {
        matches!(self, Queen | Rook)
    }
    /// Knights, bishops, rooks and queens
    pub fn is_officer(&self) -> bool {
        !matches!(self, Pawn | King)
    }
    /// Rooks and queens
    pub fn is_major(&self) -> bool {
        matches!(self, Rook | Queen)
    }
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(Pawn),
            'n' => Some(Knight),
            'b' => Some(Bishop),
            'r' => Some(Rook),
            'q' => Some(Queen),
            'k' => Some(King),
            _ => None,
        }
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Pawn => "p",
                Knight => "n",
                Bishop => "b",
                Rook => "r",
                Queen => "q",
                King => "k",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}
impl Color {
    pub const BOTH: [Color; 2] = [Black, White];

    pub fn opposite(&self) -> Color {
        match self {
            White => Black,
            Black => White,
        }
    }
    /// +1 for white, -1 for black
    pub fn sign(&self) -> i32 {
        match self {
            White => 1,
            Black => -1,
        }
    }
    /// Square offset of a single pawn advance
    pub fn forward(&self) -> isize {
        match self {
            White => 8,
            Black => -8,
        }
    }
    pub fn back_rank(&self) -> usize {
        match self {
            White => 0,
            Black => 7,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Black { "b" } else { "w" })
    }
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_char(c)?;
        let color = if c.is_lowercase() { Black } else { White };
        Some(Piece { piece_type, color })
    }

    /// Index in 0..12, used to address per-piece tables
    pub fn index(&self) -> usize {
        self.color as usize * 6 + self.piece_type as usize
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.piece_type.to_string();
        write!(
            f,
            "{}",
            if self.color == White {
                s.to_uppercase()
            } else {
                s
            }
        )
    }
}
