use crate::piece::Color;
use crate::piece::Color::{Black, White};
use std::fmt::{Display, Formatter};

/// Four independent rights, one bit each:
/// white kingside, white queenside, black kingside, black queenside
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 0b1000;
    pub const WHITE_QUEENSIDE: u8 = 0b0100;
    pub const BLACK_KINGSIDE: u8 = 0b0010;
    pub const BLACK_QUEENSIDE: u8 = 0b0001;

    pub fn new() -> CastlingRights {
        CastlingRights(0b1111)
    }
    pub fn none() -> CastlingRights {
        CastlingRights(0)
    }

    /// Parses the castling field of a position record ("KQkq", "Kq", "-"...).
    /// Returns None on any unexpected character
    pub fn from_record(s: &str) -> Option<CastlingRights> {
        let mut res = CastlingRights(0);
        if s == "-" {
            return Some(res);
        }
        for c in s.chars() {
            res.0 |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(res)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn has(&self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Returns the castling rights of a given color as (kingside, queenside)
    pub fn get(&self, side: Color) -> (bool, bool) {
        match side {
            White => (self.has(Self::WHITE_KINGSIDE), self.has(Self::WHITE_QUEENSIDE)),
            Black => (self.has(Self::BLACK_KINGSIDE), self.has(Self::BLACK_QUEENSIDE)),
        }
    }

    /// Removes every right in `flags`
    pub fn revoke(&mut self, flags: u8) {
        self.0 &= !flags
    }

    /// Gives back every right in `flags`
    pub fn restore(&mut self, flags: u8) {
        self.0 |= flags
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}
