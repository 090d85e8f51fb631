use crate::lookup::{Direction, Lookup};
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::r#move::Move;
use crate::square::{center_proximity, file_of, rank_of, Square};

pub type Score = i32;

pub const PIECE_VALUE: [Score; 6] = [100, 320, 330, 500, 900, 0];
/// Center proximity bonus per piece type, multiplied by `center_proximity`
pub const CENTER_WEIGHT: [Score; 6] = [3, 6, 4, 1, 2, 0];
pub const PAWN_ADVANCE: Score = 4;

pub const CASTLED_KING: Score = 30;
pub const SHELTER_PAWN_NEAR: Score = 15;
pub const SHELTER_PAWN_FAR: Score = 8;
pub const KING_CENTRALIZATION: Score = 10;

pub const ROOK_OPEN_FILE: Score = 25;
pub const ROOK_HALF_OPEN_FILE: Score = 10;
pub const BISHOP_MOBILITY: Score = 4;
pub const DOUBLED_PAWN: Score = 15;
pub const ISOLATED_PAWN_FILE: Score = 12;

pub const DRAW_SCORE: Score = 0;
/// Score of a side being mated right now, mates found deeper are worth
/// `MATE_SCORE - ply`
pub const MATE_SCORE: Score = 100_000;
/// Window sentinel. Far from `i32::MIN` so that negating it is always safe
pub const INFINITY: Score = 1_000_000;

/// Scores beyond this bound can only be mate scores
pub fn is_mate_score(score: Score) -> bool {
    score.abs() > MATE_SCORE - 1000
}

/// Per-square value of a non-king piece, material included
pub fn placement_value(piece: Piece, sq: Square) -> Score {
    let t = piece.piece_type as usize;
    let mut value = PIECE_VALUE[t] + CENTER_WEIGHT[t] * center_proximity(sq);
    if piece.piece_type == PieceType::Pawn {
        value += PAWN_ADVANCE * relative_rank(sq, piece.color) as Score;
    }
    value
}

fn relative_rank(sq: Square, color: Color) -> usize {
    match color {
        Color::White => rank_of(sq),
        Color::Black => 7 - rank_of(sq),
    }
}

/// Piece counts gathered in one pass, everything else the evaluation needs
/// is read off the board directly
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Census {
    officers: [u8; 2],
    majors: [u8; 2],
    pawns_per_file: [[u8; 8]; 2],
}
impl Census {
    fn of(position: &Position) -> Census {
        let mut census = Census::default();
        for (sq, piece) in position.occupied() {
            let c = piece.color as usize;
            if piece.piece_type.is_officer() {
                census.officers[c] += 1;
            }
            if piece.piece_type.is_major() {
                census.majors[c] += 1;
            }
            if piece.piece_type == PieceType::Pawn {
                census.pawns_per_file[c][file_of(sq)] += 1;
            }
        }
        census
    }

    fn pawns_on_file(&self, file: usize) -> u8 {
        self.pawns_per_file[0][file] + self.pawns_per_file[1][file]
    }
}

/// Static evaluation, positive values favor white
pub fn evaluate(position: &Position) -> Score {
    let census = Census::of(position);
    let mut score = 0;

    for (sq, piece) in position.occupied() {
        let sign = piece.color.sign();
        score += sign
            * match piece.piece_type {
                PieceType::King => 0,
                PieceType::Rook => placement_value(piece, sq) + rook_file_bonus(&census, piece.color, sq),
                PieceType::Bishop => {
                    placement_value(piece, sq) + bishop_mobility(position, &census, piece.color, sq)
                }
                _ => placement_value(piece, sq),
            };
    }
    for color in Color::BOTH {
        score += color.sign() * (king_safety(position, &census, color) - pawn_structure(&census, color));
    }
    score
}

/// Evaluation from the point of view of the side to move
pub fn relative_evaluation(position: &Position) -> Score {
    position.side_to_move().sign() * evaluate(position)
}

/// Centralization once the opponent is down to at most one officer, pawn
/// shelter of a corner castled king otherwise
fn king_safety(position: &Position, census: &Census, color: Color) -> Score {
    let king_square = position.king_square(color);
    if census.officers[color.opposite() as usize] <= 1 {
        return KING_CENTRALIZATION * center_proximity(king_square);
    }

    let king_file = file_of(king_square);
    if rank_of(king_square) != color.back_rank() || (3..=4).contains(&king_file) {
        return 0;
    }
    let own_pawn = Some(Piece::new(PieceType::Pawn, color));
    let mut shelter = CASTLED_KING;
    for file in king_file.saturating_sub(1)..=(king_file + 1).min(7) {
        let near = (king_square as isize + color.forward()) as Square - king_file + file;
        let far = (near as isize + color.forward()) as Square;
        if position.piece_on(near) == own_pawn {
            shelter += SHELTER_PAWN_NEAR
        } else if position.piece_on(far) == own_pawn {
            shelter += SHELTER_PAWN_FAR
        }
    }
    shelter
}

fn rook_file_bonus(census: &Census, color: Color, sq: Square) -> Score {
    let file = file_of(sq);
    if census.pawns_on_file(file) == 0 {
        ROOK_OPEN_FILE
    } else if census.pawns_per_file[color as usize][file] == 0 {
        ROOK_HALF_OPEN_FILE
    } else {
        0
    }
}

/// Squares seen along the diagonals, only pawns block the view. Backward
/// diagonals stop counting while the opponent keeps two major pieces.
fn bishop_mobility(position: &Position, census: &Census, color: Color, sq: Square) -> Score {
    let all = Direction::DIAGONAL;
    let forward = Direction::forward_diagonals(color);
    let directions: &[Direction] = if census.majors[color.opposite() as usize] >= 2 {
        &forward
    } else {
        &all
    };
    let mut seen = 0;
    for &direction in directions {
        seen += Lookup::ray(sq, direction)
            .iter()
            .take_while(|s| position.piece_type_on(**s) != Some(PieceType::Pawn))
            .count() as Score;
    }
    seen * BISHOP_MOBILITY
}

/// Doubled pawns and pawn islands made of a single file
fn pawn_structure(census: &Census, color: Color) -> Score {
    let files = &census.pawns_per_file[color as usize];
    let mut penalty = 0;
    for file in 0..8 {
        if files[file] == 0 {
            continue;
        }
        penalty += DOUBLED_PAWN * (files[file] as Score - 1);
        let left = file > 0 && files[file - 1] != 0;
        let right = file < 7 && files[file + 1] != 0;
        if !left && !right {
            penalty += ISOLATED_PAWN_FILE;
        }
    }
    penalty
}

/// What `score_delta` needs to know about the position a move is played from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalContext {
    /// Full evaluation of the position, white's point of view
    pub score: Score,
    officers: [u8; 2],
}
impl EvalContext {
    pub fn new(position: &Position) -> EvalContext {
        let census = Census::of(position);
        EvalContext {
            score: evaluate(position),
            officers: census.officers,
        }
    }
}

/// Change in `evaluate` caused by a move, when it can be derived from the
/// moved piece alone.
///
/// Only knight and queen moves qualify: neither piece takes part in pawn
/// structure, file, mobility or shelter terms. A capture qualifies when it
/// takes a knight from a side keeping at least two officers, so that no
/// king switches between shelter and centralization.
pub fn score_delta(mv: &Move, context: &EvalContext) -> Option<Score> {
    let piece = mv.moving_piece;
    if !matches!(piece.piece_type, PieceType::Knight | PieceType::Queen) || mv.is_promotion() || mv.is_castle() {
        return None;
    }
    let sign = piece.color.sign();
    let mut delta = placement_value(piece, mv.target) - placement_value(piece, mv.origin);
    match mv.captured_piece {
        None => (),
        Some(captured)
            if captured.piece_type == PieceType::Knight && context.officers[captured.color as usize] > 2 =>
        {
            delta += placement_value(captured, mv.captured_square)
        }
        Some(_) => return None,
    }
    Some(sign * delta)
}

#[cfg(test)]
mod tests {
    use super::{evaluate, relative_evaluation, score_delta, EvalContext};
    use crate::move_generator::{generate, GenType};
    use crate::position::{Position, START_RECORD};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn eval(record: &str) -> i32 {
        evaluate(&Position::new(record).unwrap())
    }

    #[test]
    fn starting_position_is_balanced() {
        assert_eq!(eval(START_RECORD), 0);
        let position = Position::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert_eq!(relative_evaluation(&position), 0);
    }

    #[test]
    fn missing_material_favors_the_opponent() {
        // No e2 pawn
        assert!(eval("rnbqkbnr/pppppppp/8/8/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1") < 0);
        // No e7 pawn
        assert!(eval("rnbqkbnr/pppp1ppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1") > 0);
        // No b8 knight
        assert!(eval("r1bqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1") > 0);
        // No a1 rook
        assert!(eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/1NBQKBNR w Kkq - 0 1") < 0);
    }

    #[test]
    fn sheltered_king_is_preferred() {
        // White castled short behind f2 g2 h2, black king still in the center
        let castled = eval("rnbqk2r/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4");
        assert!(castled > 0, "{}", castled);
        // Same, colors swapped
        let castled = eval("rnbq1rk1/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQ - 5 4");
        assert!(castled < 0, "{}", castled);
    }

    #[test]
    fn mirrored_positions_are_equal() {
        for record in [
            "r4rk1/ppp2ppp/2n2n2/3pp3/3PP3/2N2N2/PPP2PPP/R4RK1 w - - 0 1",
            "1k1r3r/ppp2pp1/2nb1n1p/3qp3/3QP3/2NB1N1P/PPP2PP1/1K1R3R w - - 0 1",
            "8/5k2/4p3/8/8/4P3/5K2/8 w - - 0 1",
        ] {
            assert_eq!(eval(record), 0, "{}", record);
        }
    }

    #[test]
    fn lone_pieces_centralize_the_king() {
        // Black has no officer left, the white king goes to the center
        let central = eval("7k/8/8/8/3K4/8/8/R7 w - - 0 1");
        let cornered = eval("7k/8/8/8/8/8/8/R6K w - - 0 1");
        assert!(central > cornered);
    }

    #[test]
    fn delta_agrees_with_full_evaluation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut checked = 0;
        for record in [
            START_RECORD,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        ] {
            for _ in 0..10 {
                let mut position = Position::new(record).unwrap();
                for _ in 0..40 {
                    let context = EvalContext::new(&position);
                    assert_eq!(context.score, evaluate(&position));
                    let moves = generate(&mut position, GenType::Legal);
                    if moves.is_empty() {
                        break;
                    }
                    for mv in &moves {
                        if let Some(delta) = score_delta(mv, &context) {
                            let child = position.probe(*mv);
                            assert_eq!(context.score + delta, evaluate(&child), "{} in {}", mv, record);
                            checked += 1;
                        }
                    }
                    let mv = *moves.get(rng.gen_range(0..moves.len())).unwrap();
                    position.make_move(&mv);
                }
            }
        }
        assert!(checked > 0);
    }
}
