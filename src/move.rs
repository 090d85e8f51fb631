use crate::castling::CastlingRights;
use crate::evaluation::Score;
use crate::piece::{Piece, PieceType};
use crate::position::Position;
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Category of a move, mostly used to dispatch the second order effects
/// of make/unmake
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveKind {
    Quiet,
    DoublePush,
    Capture,
    EnPassant,
    KingSideCastle,
    QueenSideCastle,
    Promotion,
    PromotionCapture,
}
impl Display for MoveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MoveKind::Quiet => "quiet",
            MoveKind::DoublePush => "double-push",
            MoveKind::Capture => "capture",
            MoveKind::EnPassant => "en-passant",
            MoveKind::KingSideCastle => "kingside-castle",
            MoveKind::QueenSideCastle => "queenside-castle",
            MoveKind::Promotion => "promotion",
            MoveKind::PromotionCapture => "promotion-capture",
        };
        write!(f, "{}", s)
    }
}

/// A single ply, carrying everything needed to take it back.
///
/// Moves are built against the position they will be played on, and are
/// only meaningful for that position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Move {
    pub moving_piece: Piece,
    pub origin: Square,
    pub target: Square,
    pub kind: MoveKind,
    pub captured_piece: Option<Piece>,
    /// Differs from `target` only for en passant captures
    pub captured_square: Square,
    pub promotion: Option<PieceType>,
    pub previous_ep_target: Option<Square>,
    pub ep_created: Option<Square>,
    /// Castling rights this move takes away, as `CastlingRights` flags
    pub revoked_castling: u8,
    pub previous_halfmove_clock: u32,
    /// Only meaningful while sorting the moves of a single node
    pub ordering_score: Score,
}

/// Origin, target and promotion, enough to find a move again in a move list
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveKey {
    pub origin: u8,
    pub target: u8,
    pub promotion: Option<PieceType>,
}

impl Move {
    /// Builds a move of `moving_piece`, standing on `origin`, for the given
    /// position
    pub fn new(
        position: &Position,
        moving_piece: Piece,
        origin: Square,
        target: Square,
        kind: MoveKind,
        promotion: Option<PieceType>,
    ) -> Move {
        let captured_square = match kind {
            MoveKind::EnPassant => {
                (target as isize - moving_piece.color.forward()) as Square
            }
            _ => target,
        };
        let captured_piece = match kind {
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::PromotionCapture => {
                position.piece_on(captured_square)
            }
            _ => None,
        };
        let ep_created = match kind {
            MoveKind::DoublePush => Some((origin + target) / 2),
            _ => None,
        };
        let revoked_castling = position.castling_rights().bits()
            & (Self::castling_mask(origin) | Self::castling_mask(target));

        Move {
            moving_piece,
            origin,
            target,
            kind,
            captured_piece,
            captured_square,
            promotion,
            previous_ep_target: position.en_passant_target(),
            ep_created,
            revoked_castling,
            previous_halfmove_clock: position.halfmove_clock(),
            ordering_score: 0,
        }
    }

    /// Rights lost whenever a piece leaves or lands on the given square
    fn castling_mask(sq: Square) -> u8 {
        match sq {
            square::E1 => CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
            square::H1 => CastlingRights::WHITE_KINGSIDE,
            square::A1 => CastlingRights::WHITE_QUEENSIDE,
            square::E8 => CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE,
            square::H8 => CastlingRights::BLACK_KINGSIDE,
            square::A8 => CastlingRights::BLACK_QUEENSIDE,
            _ => 0,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Captures and promotions, the moves quiescence search looks at
    pub fn is_tactical(&self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::KingSideCastle | MoveKind::QueenSideCastle)
    }

    pub fn key(&self) -> MoveKey {
        MoveKey {
            origin: self.origin as u8,
            target: self.target as u8,
            promotion: self.promotion,
        }
    }

    pub fn matches(&self, key: MoveKey) -> bool {
        self.key() == key
    }

    /// Parses a move formatted in long algebraic notation.
    /// Since no information can be given on flags, it simply returns origin, target and potential
    /// piece type to promote to
    pub fn parse(mv: &str) -> Option<(Square, Square, Option<PieceType>)> {
        if !mv.is_ascii() || mv.len() < 4 {
            return None;
        }
        let origin = square::parse_square(&mv[0..2])?;
        let target = square::parse_square(&mv[2..4])?;
        let promotion_target = match &mv[4..] {
            "" => None,
            "b" => Some(PieceType::Bishop),
            "n" => Some(PieceType::Knight),
            "r" => Some(PieceType::Rook),
            "q" => Some(PieceType::Queen),
            _ => return None,
        };
        Some((origin, target, promotion_target))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.origin).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target).unwrap_or_else(|| String::from("**"));
        if let Some(p) = self.promotion {
            write!(f, "{}{}{}", o, t, p)
        } else {
            write!(f, "{}{}", o, t)
        }
    }
}

impl Display for MoveKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.origin as Square).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target as Square).unwrap_or_else(|| String::from("**"));
        match self.promotion {
            Some(p) => write!(f, "{}{}{}", o, t, p),
            None => write!(f, "{}{}", o, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Move, MoveKind};
    use crate::castling::CastlingRights;
    use crate::piece::{Color, Piece, PieceType};
    use crate::position::Position;

    #[test]
    fn parse_long_algebraic() {
        assert_eq!(Move::parse("e2e4"), Some((12, 28, None)));
        assert_eq!(Move::parse("a7a8q"), Some((48, 56, Some(PieceType::Queen))));
        assert_eq!(Move::parse("a7a8k"), None);
        assert_eq!(Move::parse("e2"), None);
        assert_eq!(Move::parse("z2e4"), None);
    }

    #[test]
    fn en_passant_metadata() {
        let position =
            Position::new("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let mv = Move::new(&position, Piece::new(PieceType::Pawn, Color::White), 36, 45, MoveKind::EnPassant, None);
        assert_eq!(mv.captured_square, 37);
        assert_eq!(mv.captured_piece, Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert_eq!(mv.previous_ep_target, Some(45));
        assert_eq!(mv.to_string(), "e5f6");
    }

    #[test]
    fn rook_moves_revoke_one_right() {
        let position = Position::new("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = Move::new(&position, Piece::new(PieceType::Rook, Color::White), 7, 15, MoveKind::Quiet, None);
        assert_eq!(mv.revoked_castling, CastlingRights::WHITE_KINGSIDE);
        let capture = Move::new(&position, Piece::new(PieceType::Rook, Color::White), 0, 56, MoveKind::Capture, None);
        assert_eq!(
            capture.revoked_castling,
            CastlingRights::WHITE_QUEENSIDE | CastlingRights::BLACK_QUEENSIDE
        );
        let king = Move::new(&position, Piece::new(PieceType::King, Color::White), 4, 12, MoveKind::Quiet, None);
        assert_eq!(
            king.revoked_castling,
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE
        );
    }

    #[test]
    fn double_push_creates_target() {
        let position = Position::startpos();
        let mv = Move::new(&position, Piece::new(PieceType::Pawn, Color::White), 12, 28, MoveKind::DoublePush, None);
        assert_eq!(mv.ep_created, Some(20));
        assert_eq!(mv.key().to_string(), "e2e4");
    }
}
