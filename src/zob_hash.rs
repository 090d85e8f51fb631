use crate::castling::CastlingRights;
use crate::piece::{Color, Piece};
use crate::square::{file_of, Square};

// Keys are initialized at compile time for reproducibility and
// to avoid init functions
include!(concat!(env!("OUT_DIR"), "/zobrist_keys.rs"));

pub type Hash = u64;

pub struct ZobristHasher {}
impl ZobristHasher {
    pub fn hash_for_piece_sq(piece: Piece, sq: Square) -> Hash {
        Self::ZOBRIST_KEYS[64 * piece.index() + sq]
    }

    pub fn side_to_move_hash(color: Color) -> Hash {
        if color == Color::Black {
            Self::ZOBRIST_KEYS[Self::BLACK_TO_MOVE_INDEX]
        } else {
            0u64
        }
    }

    /// Hash contribution of the rights in `flags` (any subset of the four)
    pub fn castling_flags_hash(flags: u8) -> Hash {
        let mut hash = 0u64;
        if flags & CastlingRights::WHITE_KINGSIDE != 0 {
            hash ^= Self::ZOBRIST_KEYS[Self::WKING_CASTLE_INDEX]
        }
        if flags & CastlingRights::WHITE_QUEENSIDE != 0 {
            hash ^= Self::ZOBRIST_KEYS[Self::WQUEEN_CASTLE_INDEX]
        }
        if flags & CastlingRights::BLACK_KINGSIDE != 0 {
            hash ^= Self::ZOBRIST_KEYS[Self::BKING_CASTLE_INDEX]
        }
        if flags & CastlingRights::BLACK_QUEENSIDE != 0 {
            hash ^= Self::ZOBRIST_KEYS[Self::BQUEEN_CASTLE_INDEX]
        }
        hash
    }

    pub fn castling_rights_hash(castling_rights: CastlingRights) -> Hash {
        Self::castling_flags_hash(castling_rights.bits())
    }

    pub fn en_passant_hash(ep_target: Option<Square>) -> Hash {
        if let Some(sq) = ep_target {
            Self::ZOBRIST_KEYS[Self::EP_TARGET_OFFSET + file_of(sq)]
        } else {
            0u64
        }
    }

    pub const BLACK_TO_MOVE_INDEX: usize = 768;
    pub const WKING_CASTLE_INDEX: usize = 769;
    pub const WQUEEN_CASTLE_INDEX: usize = 770;
    pub const BKING_CASTLE_INDEX: usize = 771;
    pub const BQUEEN_CASTLE_INDEX: usize = 772;
    pub const EP_TARGET_OFFSET: usize = 773;
}
