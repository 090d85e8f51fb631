use crate::{
    lookup::{Direction, Lookup},
    movelist::MoveList,
    piece::{Color, Piece, PieceType},
    position::Position,
    r#move::{Move, MoveKind},
    square::{self, rank_of, Square},
};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub enum GenType {
    /// Every legal move
    Legal,
    /// Legal captures and promotions only, a subset of `Legal`
    Captures,
    /// Moves obeying piece movement rules, own king safety unchecked
    PseudoLegal,
}

/// Generates a subset of all moves for a given position.
///
/// Takes the position mutably because some candidates have to be played
/// to know whether they leave the king attacked. The position is always
/// handed back in the exact state it was received in.
pub fn generate(position: &mut Position, gen_type: GenType) -> MoveList {
    let mut move_list = pseudo_legal(position, gen_type == GenType::Captures);
    if gen_type != GenType::PseudoLegal {
        let in_check = position.in_check(position.side_to_move());
        move_list.retain(|mv| is_legal(position, mv, in_check));
    }
    move_list
}

fn pseudo_legal(position: &Position, tactical_only: bool) -> MoveList {
    let mut move_list = MoveList::default();
    let side = position.side_to_move();

    for (origin, piece) in position.occupied().filter(|(_, p)| p.color == side) {
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(position, piece, origin, tactical_only, &mut move_list),
            PieceType::Knight => jump_moves(
                position,
                piece,
                origin,
                Lookup::knight_reach(origin),
                tactical_only,
                &mut move_list,
            ),
            PieceType::Bishop => {
                slider_moves(position, piece, origin, &Direction::DIAGONAL, tactical_only, &mut move_list)
            }
            PieceType::Rook => {
                slider_moves(position, piece, origin, &Direction::STRAIGHT, tactical_only, &mut move_list)
            }
            PieceType::Queen => {
                slider_moves(position, piece, origin, &Direction::DIAGONAL, tactical_only, &mut move_list);
                slider_moves(position, piece, origin, &Direction::STRAIGHT, tactical_only, &mut move_list)
            }
            PieceType::King => {
                jump_moves(
                    position,
                    piece,
                    origin,
                    Lookup::king_reach(origin),
                    tactical_only,
                    &mut move_list,
                );
                if !tactical_only {
                    castling(position, side, &mut move_list)
                }
            }
        }
    }
    move_list
}

fn pawn_moves(
    position: &Position,
    pawn: Piece,
    origin: Square,
    tactical_only: bool,
    move_list: &mut MoveList,
) {
    let side = pawn.color;
    let (start_rank, promotion_rank) = match side {
        Color::White => (1, 7),
        Color::Black => (6, 0),
    };

    let single = origin as isize + side.forward();
    if (0..64).contains(&single) && position.piece_on(single as Square).is_none() {
        let single = single as Square;
        if rank_of(single) == promotion_rank {
            for p in PieceType::PROMOTIONS {
                move_list.push(Move::new(position, pawn, origin, single, MoveKind::Promotion, Some(p)))
            }
        } else if !tactical_only {
            move_list.push(Move::new(position, pawn, origin, single, MoveKind::Quiet, None));
            let double = (single as isize + side.forward()) as Square;
            if rank_of(origin) == start_rank && position.piece_on(double).is_none() {
                move_list.push(Move::new(position, pawn, origin, double, MoveKind::DoublePush, None))
            }
        }
    }

    for &target in Lookup::pawn_captures(origin, side) {
        match position.piece_on(target) {
            Some(victim) if victim.color != side => {
                if rank_of(target) == promotion_rank {
                    for p in PieceType::PROMOTIONS {
                        move_list.push(Move::new(
                            position,
                            pawn,
                            origin,
                            target,
                            MoveKind::PromotionCapture,
                            Some(p),
                        ))
                    }
                } else {
                    move_list.push(Move::new(position, pawn, origin, target, MoveKind::Capture, None))
                }
            }
            None if position.en_passant_target() == Some(target) => {
                let passed = (target as isize - side.forward()) as Square;
                if position.piece_on(passed) == Some(Piece::new(PieceType::Pawn, side.opposite())) {
                    move_list.push(Move::new(position, pawn, origin, target, MoveKind::EnPassant, None))
                }
            }
            _ => (),
        }
    }
}

fn jump_moves(
    position: &Position,
    piece: Piece,
    origin: Square,
    targets: &[Square],
    tactical_only: bool,
    move_list: &mut MoveList,
) {
    for &target in targets {
        match position.piece_on(target) {
            None if !tactical_only => {
                move_list.push(Move::new(position, piece, origin, target, MoveKind::Quiet, None))
            }
            Some(victim) if victim.color != piece.color => {
                move_list.push(Move::new(position, piece, origin, target, MoveKind::Capture, None))
            }
            _ => (),
        }
    }
}

/// Sweeps each ray until the first occupied square, which is only included
/// if it holds an enemy piece
fn slider_moves(
    position: &Position,
    piece: Piece,
    origin: Square,
    directions: &[Direction],
    tactical_only: bool,
    move_list: &mut MoveList,
) {
    for &direction in directions {
        for &target in Lookup::ray(origin, direction) {
            match position.piece_on(target) {
                None => {
                    if !tactical_only {
                        move_list.push(Move::new(position, piece, origin, target, MoveKind::Quiet, None))
                    }
                }
                Some(victim) => {
                    if victim.color != piece.color {
                        move_list.push(Move::new(position, piece, origin, target, MoveKind::Capture, None))
                    }
                    break;
                }
            }
        }
    }
}

/// Castling needs the right, the king and rook on their original squares,
/// empty squares in between and a king that neither starts on nor crosses an
/// attacked square. The landing square is left to the legality filter.
fn castling(position: &Position, side: Color, move_list: &mut MoveList) {
    let (kingside_right, queenside_right) = position.side_to_move_castling_rights();
    if !kingside_right && !queenside_right {
        return;
    }
    let (king_square, kingside_rook, queenside_rook) = match side {
        Color::White => (square::E1, square::H1, square::A1),
        Color::Black => (square::E8, square::H8, square::A8),
    };
    let king = Piece::new(PieceType::King, side);
    let rook = Piece::new(PieceType::Rook, side);
    let enemy = side.opposite();
    if position.piece_on(king_square) != Some(king) || position.is_square_attacked(king_square, enemy) {
        return;
    }
    let empty = |squares: &[Square]| squares.iter().all(|sq| position.piece_on(*sq).is_none());

    if kingside_right
        && position.piece_on(kingside_rook) == Some(rook)
        && empty(&[king_square + 1, king_square + 2])
        && !position.is_square_attacked(king_square + 1, enemy)
    {
        move_list.push(Move::new(
            position,
            king,
            king_square,
            king_square + 2,
            MoveKind::KingSideCastle,
            None,
        ))
    }
    if queenside_right
        && position.piece_on(queenside_rook) == Some(rook)
        && empty(&[king_square - 1, king_square - 2, king_square - 3])
        && !position.is_square_attacked(king_square - 1, enemy)
    {
        move_list.push(Move::new(
            position,
            king,
            king_square,
            king_square - 2,
            MoveKind::QueenSideCastle,
            None,
        ))
    }
}

/// Cheap sufficient condition for a move to keep its own king safe: the side
/// was not in check, the moved piece is not the king, was not on a line with
/// its king, and the move is not an en passant capture (which also vacates
/// the captured pawn's square).
pub fn obviously_safe(position: &Position, mv: &Move, in_check: bool) -> bool {
    !in_check
        && mv.moving_piece.piece_type != PieceType::King
        && mv.kind != MoveKind::EnPassant
        && !Lookup::in_line(mv.origin, position.king_square(mv.moving_piece.color))
}

/// Plays the move, looks at the mover's king and takes the move back
pub fn leaves_king_attacked(position: &mut Position, mv: &Move) -> bool {
    let probe = position.probe(*mv);
    probe.in_check(mv.moving_piece.color)
}

pub fn is_legal(position: &mut Position, mv: &Move, in_check: bool) -> bool {
    let legal = obviously_safe(position, mv, in_check) || !leaves_king_attacked(position, mv);
    debug_assert!(!legal || !leaves_king_attacked(position, mv));
    legal
}

/// Counts leaf nodes of the legal move tree
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(position, GenType::Legal);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in &moves {
        let mut child = position.probe(*mv);
        nodes += perft(&mut child, depth - 1);
    }
    nodes
}

#[cfg(test)]
mod perft_tests {
    use super::perft;
    use crate::position::Position;

    // Verification goes up to depth 3, which already covers every kind of
    // move in these positions while keeping the suite quick
    const TEST_POSITIONS: [(&str, [u64; 3]); 7] = [
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            [20, 400, 8902],
        ),
        (
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            [48, 2039, 97862],
        ),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", [14, 191, 2812]),
        (
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            [6, 264, 9467],
        ),
        (
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            [6, 264, 9467],
        ),
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [44, 1486, 62379],
        ),
        (
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            [46, 2079, 89890],
        ),
    ];

    #[test]
    fn perft_verification() {
        for (record, results) in TEST_POSITIONS {
            let mut position = Position::new(record).unwrap();
            for d in 1..=3 {
                assert_eq!(results[d - 1], perft(&mut position, d as u32), "{} depth {}", record, d)
            }
        }
    }

    #[test]
    fn perft_start_depth_4() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 4), 197281);
    }
}

#[cfg(test)]
mod tests {
    use super::{generate, leaves_king_attacked, obviously_safe, GenType};
    use crate::position::{Position, START_RECORD};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample_positions() -> Vec<Position> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut samples = vec![];
        for record in [
            START_RECORD,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            for _ in 0..10 {
                let mut position = Position::new(record).unwrap();
                for _ in 0..40 {
                    samples.push(position.clone());
                    let moves = generate(&mut position, GenType::Legal);
                    if moves.is_empty() {
                        break;
                    }
                    let mv = *moves.get(rng.gen_range(0..moves.len())).unwrap();
                    position.make_move(&mv);
                }
            }
        }
        samples
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let mut position = Position::startpos();
        assert_eq!(generate(&mut position, GenType::Legal).len(), 20);
        assert_eq!(generate(&mut position, GenType::PseudoLegal).len(), 20);
        assert!(generate(&mut position, GenType::Captures).is_empty());
    }

    #[test]
    fn fast_path_agrees_with_simulation() {
        for mut position in sample_positions() {
            let in_check = position.in_check(position.side_to_move());
            let before = position.clone();
            for mv in &generate(&mut position, GenType::PseudoLegal) {
                if obviously_safe(&position, mv, in_check) {
                    assert!(
                        !leaves_king_attacked(&mut position, mv),
                        "{} wrongly accepted in {}",
                        mv,
                        position.record()
                    );
                }
                assert!(position.same_state(&before));
            }
        }
    }

    #[test]
    fn legal_moves_are_filtered_pseudo_legal_moves() {
        for mut position in sample_positions() {
            let legal = generate(&mut position, GenType::Legal);
            let pseudo = generate(&mut position, GenType::PseudoLegal);
            let mut expected = vec![];
            for mv in &pseudo {
                if !leaves_king_attacked(&mut position, mv) {
                    expected.push(*mv);
                }
            }
            assert_eq!(legal.iter().copied().collect::<Vec<_>>(), expected);

            let captures = generate(&mut position, GenType::Captures);
            let tactical: Vec<_> = legal.iter().filter(|m| m.is_tactical()).copied().collect();
            assert_eq!(captures.iter().copied().collect::<Vec<_>>(), tactical);
        }
    }

    #[test]
    fn castling_through_check_is_refused() {
        // The f1 square is covered by the black rook
        let mut position = Position::new("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = generate(&mut position, GenType::Legal);
        assert!(moves.iter().all(|m| m.to_string() != "e1g1"));
        assert!(moves.iter().any(|m| m.to_string() == "e1c1"));

        // A king in check cannot castle at all
        let mut position = Position::new("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").unwrap();
        let moves = generate(&mut position, GenType::Legal);
        assert!(moves.iter().all(|m| !m.is_castle()));

        // b1 may be attacked for a queenside castle, only the king's path matters
        let mut position = Position::new("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let moves = generate(&mut position, GenType::Legal);
        assert!(moves.iter().any(|m| m.to_string() == "e1c1"));
    }

    #[test]
    fn en_passant_discovering_a_horizontal_check_is_illegal() {
        let mut position = Position::new("8/8/8/KPp4r/8/8/8/7k w - c6 0 1").unwrap();
        let moves = generate(&mut position, GenType::Legal);
        assert!(moves.iter().all(|m| m.to_string() != "b5c6"));
        assert!(generate(&mut position, GenType::PseudoLegal)
            .iter()
            .any(|m| m.to_string() == "b5c6"));
    }

    #[test]
    fn promotions_branch_four_ways() {
        let mut position = Position::new("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = generate(&mut position, GenType::Captures);
        // a7a8 and a7xb8, four pieces each
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.is_promotion()));
    }
}
