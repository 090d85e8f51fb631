use crate::castling::CastlingRights;
use crate::error::RecordError;
use crate::lookup::{Direction, Lookup};
use crate::piece::Color::{Black, White};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::{Move, MoveKind};
use crate::square::{self, from_coords, parse_square, rank_of, square_representation, Square};
use crate::transposition_table::TranspositionTable;
use crate::zob_hash::{Hash, ZobristHasher};
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Deref, DerefMut};

pub const START_RECORD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Mailbox board state.
///
/// `pieces` is the only source of truth for occupancy, the king squares and
/// the hash are kept in sync with it by `make_move`/`unmake_move`.
#[derive(Clone)]
pub struct Position {
    pieces: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    king_squares: [Square; 2],
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: Hash,

    transposition_table: TranspositionTable,
}

impl Position {
    /// Creates a new position given its record (FEN) representation
    pub fn new(record: &str) -> Result<Position, RecordError> {
        let mut p = Position {
            pieces: [None; 64],
            side_to_move: White,
            castling_rights: CastlingRights::none(),
            ep_target: None,
            king_squares: [0; 2],
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            transposition_table: TranspositionTable::new(),
        };
        p.parse_record(record)?;
        Ok(p)
    }

    pub fn startpos() -> Position {
        match Position::new(START_RECORD) {
            Ok(p) => p,
            Err(e) => unreachable!("the starting record is well formed: {}", e),
        }
    }

    /// Replaces this position by the one described by `record`.
    /// On failure the position is left untouched.
    pub fn set_record(&mut self, record: &str) -> Result<(), RecordError> {
        *self = Position::new(record)?;
        Ok(())
    }

    /// Plays a move built for this position
    pub fn make_move(&mut self, mv: &Move) {
        let us = self.side_to_move;

        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        self.ep_target = mv.ep_created;
        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);

        if mv.revoked_castling != 0 {
            self.hash ^= ZobristHasher::castling_flags_hash(mv.revoked_castling);
            self.castling_rights.revoke(mv.revoked_castling);
        }

        if mv.captured_piece.is_some() {
            self.remove_piece(mv.captured_square);
        }
        self.remove_piece(mv.origin);
        let landing = match mv.promotion {
            Some(p) => Piece::new(p, us),
            None => mv.moving_piece,
        };
        self.add_piece(landing, mv.target);

        match mv.kind {
            MoveKind::KingSideCastle => self.move_castling_rook(us, true, false),
            MoveKind::QueenSideCastle => self.move_castling_rook(us, false, false),
            _ => (),
        }
        if mv.moving_piece.piece_type == PieceType::King {
            self.king_squares[us as usize] = mv.target;
        }

        if mv.moving_piece.piece_type == PieceType::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Black {
            self.fullmove_number += 1;
        }
        self.hash ^= ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX];
        self.side_to_move = us.opposite();
    }

    /// Takes back a move previously played with `make_move`.
    /// Moves must be unmade in the reverse order they were made in.
    pub fn unmake_move(&mut self, mv: &Move) {
        self.hash ^= ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX];
        self.side_to_move = self.side_to_move.opposite();
        let us = self.side_to_move;
        if us == Black {
            self.fullmove_number -= 1;
        }
        self.halfmove_clock = mv.previous_halfmove_clock;

        match mv.kind {
            MoveKind::KingSideCastle => self.move_castling_rook(us, true, true),
            MoveKind::QueenSideCastle => self.move_castling_rook(us, false, true),
            _ => (),
        }
        self.remove_piece(mv.target);
        self.add_piece(mv.moving_piece, mv.origin);
        if let Some(captured) = mv.captured_piece {
            self.add_piece(captured, mv.captured_square);
        }
        if mv.moving_piece.piece_type == PieceType::King {
            self.king_squares[us as usize] = mv.origin;
        }

        if mv.revoked_castling != 0 {
            self.hash ^= ZobristHasher::castling_flags_hash(mv.revoked_castling);
            self.castling_rights.restore(mv.revoked_castling);
        }

        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        self.ep_target = mv.previous_ep_target;
        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
    }

    /// Plays a move for as long as the returned probe lives.
    /// The move is taken back when the probe is dropped, early returns included.
    pub fn probe(&mut self, mv: Move) -> MoveProbe<'_> {
        self.make_move(&mv);
        MoveProbe { position: self, mv }
    }

    fn move_castling_rook(&mut self, side: Color, kingside: bool, undo: bool) {
        let (corner, landing) = match (side, kingside) {
            (White, true) => (square::H1, square::F1),
            (White, false) => (square::A1, square::D1),
            (Black, true) => (square::H8, square::F8),
            (Black, false) => (square::A8, square::D8),
        };
        let (from, to) = if undo { (landing, corner) } else { (corner, landing) };
        if let Some(rook) = self.remove_piece(from) {
            self.add_piece(rook, to)
        }
    }

    /// Places a new piece on a given square
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.pieces[sq] = Some(piece);
        self.hash ^= ZobristHasher::hash_for_piece_sq(piece, sq);
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.pieces[sq].take();
        if let Some(p) = removed {
            self.hash ^= ZobristHasher::hash_for_piece_sq(p, sq);
        }
        removed
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.pieces[sq].map(|p| p.piece_type)
    }

    /// Iterates over occupied squares
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn side_to_move_castling_rights(&self) -> (bool, bool) {
        self.castling_rights.get(self.side_to_move)
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color as usize]
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.transposition_table
    }

    pub fn transposition_table_mut(&mut self) -> &mut TranspositionTable {
        &mut self.transposition_table
    }

    pub fn in_check(&self, side: Color) -> bool {
        self.is_square_attacked(self.king_square(side), side.opposite())
    }

    /// Whether a piece of color `by` could capture on `target`.
    ///
    /// Sweeps every ray from the target outward and looks at the first piece
    /// met, then looks at the jump tables.
    pub fn is_square_attacked(&self, target: Square, by: Color) -> bool {
        for direction in Direction::STRAIGHT {
            if let Some(p) = self.first_piece_along(target, direction) {
                if p.color == by && p.piece_type.is_rook_like() {
                    return true;
                }
            }
        }
        for direction in Direction::DIAGONAL {
            if let Some(p) = self.first_piece_along(target, direction) {
                if p.color == by && p.piece_type.is_bishop_like() {
                    return true;
                }
            }
        }
        let is = |sq: &Square, piece_type: PieceType| {
            self.pieces[*sq] == Some(Piece::new(piece_type, by))
        };
        Lookup::knight_reach(target).iter().any(|sq| is(sq, PieceType::Knight))
            || Lookup::king_reach(target).iter().any(|sq| is(sq, PieceType::King))
            || Lookup::pawn_captures(target, by.opposite())
                .iter()
                .any(|sq| is(sq, PieceType::Pawn))
    }

    fn first_piece_along(&self, origin: Square, direction: Direction) -> Option<Piece> {
        Lookup::ray(origin, direction)
            .iter()
            .find_map(|sq| self.pieces[*sq])
    }

    /// Self check used to catch generator and search bugs.
    /// Exactly one king per side, cached king squares and hash in sync.
    pub fn is_valid(&self) -> bool {
        for color in Color::BOTH {
            let king = Piece::new(PieceType::King, color);
            let kings = self.pieces.iter().filter(|p| **p == Some(king)).count();
            if kings != 1 || self.pieces[self.king_square(color)] != Some(king) {
                return false;
            }
        }
        self.hash == self.cold_hash()
    }

    /// Compares everything but the transposition table
    pub fn same_state(&self, other: &Position) -> bool {
        self.pieces == other.pieces
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.ep_target == other.ep_target
            && self.king_squares == other.king_squares
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.hash == other.hash
    }

    /*
    RECORD (FEN) OPERATIONS
     */
    fn parse_record(&mut self, record: &str) -> Result<(), RecordError> {
        let fields: Vec<&str> = record.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(RecordError::FieldCount(fields.len()));
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(RecordError::RankCount(ranks.len()));
        }
        let mut kings = [0usize; 2];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    let run = digit as usize;
                    if run < 1 || run > 8 - file {
                        return Err(RecordError::EmptyRun { rank: rank + 1, digit: c });
                    }
                    file += run;
                } else {
                    let piece = Piece::from_char(c).ok_or(RecordError::UnknownPiece(c))?;
                    if file >= 8 {
                        return Err(RecordError::FileCount { rank: rank + 1, files: file + 1 });
                    }
                    let sq = from_coords(file, rank);
                    self.pieces[sq] = Some(piece);
                    if piece.piece_type == PieceType::King {
                        kings[piece.color as usize] += 1;
                        self.king_squares[piece.color as usize] = sq;
                    }
                    file += 1;
                }
            }
            if file != 8 {
                return Err(RecordError::FileCount { rank: rank + 1, files: file });
            }
        }
        if kings != [1, 1] {
            return Err(RecordError::KingCount);
        }

        self.side_to_move = match fields[1] {
            "w" => White,
            "b" => Black,
            s => return Err(RecordError::SideToMove(s.to_owned())),
        };
        self.castling_rights = CastlingRights::from_record(fields[2])
            .ok_or_else(|| RecordError::Castling(fields[2].to_owned()))?;
        self.ep_target = match fields[3] {
            "-" => None,
            s => {
                let sq = parse_square(s)
                    .filter(|sq| s.len() == 2 && (rank_of(*sq) == 2 || rank_of(*sq) == 5))
                    .ok_or_else(|| RecordError::EnPassant(s.to_owned()))?;
                Some(sq)
            }
        };
        self.halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| RecordError::Counter(fields[4].to_owned()))?;
        self.fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| RecordError::Counter(fields[5].to_owned()))?;

        self.hash = self.cold_hash();
        Ok(())
    }

    pub fn record(&self) -> String {
        let mut record = String::new();
        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.pieces[from_coords(file, rank)] {
                    Some(p) => {
                        if empty_counter != 0 {
                            record.push_str(&empty_counter.to_string())
                        }
                        empty_counter = 0;
                        record.push_str(&p.to_string())
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                record.push_str(&empty_counter.to_string())
            }
            if rank != 0 {
                record.push('/')
            }
        }

        record.push_str(if self.side_to_move == White { " w " } else { " b " });
        record.push_str(&self.castling_rights.to_string());
        match self.ep_target.and_then(square_representation) {
            Some(sq) => record.push_str(&format!(" {} ", sq)),
            None => record.push_str(" - "),
        }
        record.push_str(&format!("{} {}", self.halfmove_clock, self.fullmove_number));
        record
    }

    /*
    HASHING
     */
    pub fn get_hash(&self) -> Hash {
        self.hash
    }

    fn cold_hash(&self) -> Hash {
        let mut hash = 0u64;
        for (sq, piece) in self.occupied() {
            hash ^= ZobristHasher::hash_for_piece_sq(piece, sq)
        }
        hash ^= ZobristHasher::side_to_move_hash(self.side_to_move);
        hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);
        hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        hash
    }
}

/// A position with one extra move played, see `Position::probe`
pub struct MoveProbe<'a> {
    position: &'a mut Position,
    mv: Move,
}
impl MoveProbe<'_> {
    pub fn played(&self) -> &Move {
        &self.mv
    }
}
impl Deref for MoveProbe<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}
impl DerefMut for MoveProbe<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}
impl Drop for MoveProbe<'_> {
    fn drop(&mut self) {
        self.position.unmake_move(&self.mv)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({} | {:#018x})", self.record(), self.hash)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ep = self
            .ep_target
            .and_then(square_representation)
            .unwrap_or_else(|| String::from("-"));
        let side_info = [
            String::new(),
            format!("  side to move: {}", self.side_to_move),
            format!("  castling rights: {}", self.castling_rights),
            format!("  en passant: {}", ep),
            format!("  move {} ({} reversible plies)", self.fullmove_number, self.halfmove_clock),
            format!("  hash: {:#0x}", self.hash),
            format!("  record: {}", self.record()),
            String::new(),
        ];
        for (i, rank) in (0..8).rev().enumerate() {
            let mut line = String::new();
            for file in 0..8 {
                match self.pieces[from_coords(file, rank)] {
                    None => line.push_str(". "),
                    Some(p) => line.push_str(&(p.to_string() + " ")),
                }
            }
            if rank == 0 {
                write!(f, "{}{}", line.trim_end(), side_info[i])?;
            } else {
                writeln!(f, "{}{}", line.trim_end(), side_info[i])?;
            }
        }
        Ok(())
    }
}
