use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::evaluation::{
    evaluate, is_mate_score, relative_evaluation, score_delta, EvalContext, Score, DRAW_SCORE,
    INFINITY, MATE_SCORE, PIECE_VALUE,
};
use crate::move_generator::{generate, is_legal, GenType};
use crate::movelist::MoveList;
use crate::position::Position;
use crate::r#move::{Move, MoveKey};
use crate::square::center_proximity;
use crate::transposition_table::{Bound, TableEntry};

pub const MAX_DEPTH: u8 = 32;
pub const DEFAULT_DEPTH: u8 = 5;

/// How the tree gets explored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Alpha-beta with quiescence and the transposition table
    AlphaBeta,
    /// Plain negamax, every node of the tree is visited
    Minimax,
    /// Picks the move after which the opponent's best reply is worth the
    /// least
    MinimizeOpponent,
}

/// A struct to group together every search option.
/// Avoids passing around a growing list of arguments
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_depth: u8,
    pub max_time: Option<Duration>,
    pub quiescence: bool,
    pub mode: SearchMode,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth: DEFAULT_DEPTH,
            max_time: None,
            quiescence: true,
            mode: SearchMode::AlphaBeta,
        }
    }
}
impl SearchOptions {
    pub fn set_depth(&mut self, value: u8) -> &mut Self {
        self.max_depth = value.clamp(1, MAX_DEPTH);
        self
    }
    pub fn set_time(&mut self, value: Option<Duration>) -> &mut Self {
        self.max_time = value;
        self
    }
    pub fn set_time_from_clock(&mut self, clock: Duration, increment: Option<Duration>) -> &mut Self {
        self.max_time = Some(Self::get_movetime(clock, increment));
        self
    }
    pub fn set_quiescence(&mut self, value: bool) -> &mut Self {
        self.quiescence = value;
        self
    }
    pub fn set_mode(&mut self, value: SearchMode) -> &mut Self {
        self.mode = value;
        self
    }

    fn get_movetime(clock: Duration, increment: Option<Duration>) -> Duration {
        let mut movetime = clock / 50;
        if let Some(inc) = increment {
            movetime += inc / 2;
        }
        movetime.min(clock)
    }
}

/// Statistics gathered while searching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub nodes: u64,
    /// Iterations that ran to completion
    pub depth_completed: u8,
    /// Deepest ply visited, quiescence included
    pub max_depth: u8,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// From the point of view of the side to move at the root
    pub score: Score,
    pub principal_variation: Vec<Move>,
    pub time: Duration,
    pub info: EngineInfo,
}
impl Default for SearchResult {
    fn default() -> Self {
        SearchResult {
            best_move: None,
            score: -INFINITY,
            principal_variation: vec![],
            time: Duration::ZERO,
            info: EngineInfo::default(),
        }
    }
}
impl Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let score = if is_mate_score(self.score) {
            // Moves, not plies
            let plies = MATE_SCORE - self.score.abs();
            format!("mate {}", self.score.signum() * (plies + 1) / 2)
        } else {
            format!("cp {}", self.score)
        };
        write!(
            f,
            "depth {} seldepth {} nodes {} time {} score {} pv {}",
            self.info.depth_completed,
            self.info.max_depth,
            self.info.nodes,
            self.time.as_millis(),
            score,
            self.principal_variation
                .iter()
                .fold(String::new(), |acc, m| format!("{} {}", acc, m))
                .trim(),
        )
    }
}

/// Bookkeeping shared by every node of one search
struct SearchContext {
    nodes: u64,
    max_ply: u8,
    quiescence: bool,
    deadline: Option<Instant>,
    next_clock_check: u64,
    aborted: bool,
}
impl SearchContext {
    const CLOCK_CHECK_INTERVAL: u64 = 1024;

    fn new(quiescence: bool) -> SearchContext {
        SearchContext {
            nodes: 0,
            max_ply: 0,
            quiescence,
            deadline: None,
            next_clock_check: Self::CLOCK_CHECK_INTERVAL,
            aborted: false,
        }
    }

    fn visit(&mut self, ply: u8) {
        self.nodes += 1;
        self.max_ply = self.max_ply.max(ply);
    }

    /// The clock is only read every `CLOCK_CHECK_INTERVAL` nodes
    fn should_stop(&mut self) -> bool {
        if !self.aborted && self.nodes >= self.next_clock_check {
            self.next_clock_check = self.nodes + Self::CLOCK_CHECK_INTERVAL;
            if let Some(deadline) = self.deadline {
                self.aborted = Instant::now() >= deadline;
            }
        }
        self.aborted
    }
}

/// Iterative deepening driver.
///
/// Every iteration reuses the transposition table filled by the previous
/// ones, and the previous best move is searched first. An iteration cut short
/// by the time budget is thrown away, the first one always runs to the end.
pub fn search(position: &mut Position, options: &SearchOptions) -> SearchResult {
    let start = Instant::now();
    let mut result = SearchResult::default();
    let mut context = SearchContext::new(options.quiescence);

    let root_moves = generate(position, GenType::Legal);
    if root_moves.is_empty() {
        result.score = if position.in_check(position.side_to_move()) {
            -MATE_SCORE
        } else {
            DRAW_SCORE
        };
        return result;
    }

    let mut previous_best = None;
    for depth in 1..=options.max_depth.clamp(1, MAX_DEPTH) {
        context.deadline = match depth {
            1 => None,
            _ => options.max_time.map(|t| start + t),
        };
        let iteration = match options.mode {
            SearchMode::AlphaBeta => root_alpha_beta(position, &root_moves, depth, previous_best, &mut context),
            SearchMode::Minimax => root_minimax(position, &root_moves, depth, &mut context),
            SearchMode::MinimizeOpponent => root_minimize_opponent(position, &root_moves, depth, &mut context),
        };
        let (best_move, score) = match iteration {
            Some(it) => it,
            None => break,
        };

        previous_best = Some(best_move.key());
        result.best_move = Some(best_move);
        result.score = score;
        result.info = EngineInfo {
            nodes: context.nodes,
            depth_completed: depth,
            max_depth: context.max_ply,
        };
        result.time = start.elapsed();
        result.principal_variation = if options.mode == SearchMode::AlphaBeta {
            collect_pv(position, depth)
        } else {
            vec![best_move]
        };
        log::debug!("{}", result);

        if options.max_time.map_or(false, |t| start.elapsed() >= t) {
            break;
        }
    }
    result.info.nodes = context.nodes;
    result.info.max_depth = context.max_ply;
    result.time = start.elapsed();
    log::info!(
        "searched {} nodes in {}ms, best move {}",
        result.info.nodes,
        result.time.as_millis(),
        result.best_move.map_or(String::from("none"), |m| m.to_string())
    );
    result
}

fn root_alpha_beta(
    position: &mut Position,
    root_moves: &MoveList,
    depth: u8,
    previous_best: Option<MoveKey>,
    context: &mut SearchContext,
) -> Option<(Move, Score)> {
    let eval_context = EvalContext::new(position);
    let mut moves = root_moves.clone();
    score_moves(position, &mut moves, previous_best, &eval_context);

    let (mut alpha, beta) = (-INFINITY, INFINITY);
    let mut best = None;
    for mv in moves.best_first() {
        let score = {
            let mut child = position.probe(mv);
            -alpha_beta(&mut child, -beta, -alpha, depth - 1, 1, context)
        };
        if context.aborted {
            return None;
        }
        if score > alpha {
            alpha = score;
            best = Some(mv);
        }
    }

    let best = best?;
    let hash = position.get_hash();
    position.transposition_table_mut().set(
        hash,
        TableEntry {
            score: alpha,
            depth_searched: depth,
            bound: Bound::Exact,
            best_move: Some(best.key()),
        },
    );
    Some((best, alpha))
}

/// The core alpha beta function, fail-soft
fn alpha_beta(
    position: &mut Position,
    mut alpha: Score,
    mut beta: Score,
    depth: u8,
    ply: u8,
    context: &mut SearchContext,
) -> Score {
    if context.should_stop() {
        return 0;
    }
    if depth == 0 {
        return quiescence(position, alpha, beta, ply, context);
    }
    context.visit(ply);

    // Check what the eventual TT hit gives us
    let hash = position.get_hash();
    let mut hash_move = None;
    if let Some(entry) = position.transposition_table().get(hash) {
        hash_move = entry.hash_move();
        if entry.covers(depth) {
            let score = score_from_table(entry.score, ply);
            match entry.bound {
                Bound::Exact => return score,
                Bound::Lower => alpha = alpha.max(score),
                Bound::Upper => beta = beta.min(score),
            }
            if alpha >= beta {
                return score;
            }
        }
    }
    let window_floor = alpha;

    let in_check = position.in_check(position.side_to_move());
    let eval_context = EvalContext::new(position);
    let mut moves = generate(position, GenType::PseudoLegal);
    score_moves(position, &mut moves, hash_move, &eval_context);

    let mut best_score = -INFINITY;
    let mut best_move = None;
    for mv in moves.best_first() {
        if !is_legal(position, &mv, in_check) {
            continue;
        }
        let score = {
            let mut child = position.probe(mv);
            debug_assert!(score_delta(&mv, &eval_context).map_or(true, |d| eval_context.score + d == evaluate(&child)));
            -alpha_beta(&mut child, -beta, -alpha, depth - 1, ply + 1, context)
        };
        if context.aborted {
            return 0;
        }
        if score > best_score {
            best_score = score;
            best_move = Some(mv.key());
        }
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    if best_move.is_none() {
        return if in_check {
            -(MATE_SCORE - ply as Score)
        } else {
            DRAW_SCORE
        };
    }

    let bound = if best_score <= window_floor {
        Bound::Upper
    } else if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    position.transposition_table_mut().set(
        hash,
        TableEntry {
            score: score_to_table(best_score, ply),
            depth_searched: depth,
            bound,
            best_move,
        },
    );
    best_score
}

/// A special search that only looks at captures and promotions, in order to
/// only evaluate quiet positions.
/// The side to move may always stand pat, so the static evaluation is a
/// floor for the returned score.
fn quiescence(position: &mut Position, mut alpha: Score, beta: Score, ply: u8, context: &mut SearchContext) -> Score {
    context.visit(ply);
    let eval_context = EvalContext::new(position);
    let stand_pat = position.side_to_move().sign() * eval_context.score;
    if !context.quiescence {
        return stand_pat;
    }
    if stand_pat >= beta {
        return beta;
    }
    alpha = alpha.max(stand_pat);

    let mut captures = generate(position, GenType::Captures);
    score_moves(position, &mut captures, None, &eval_context);
    for mv in captures.best_first() {
        if context.should_stop() {
            return 0;
        }
        let score = {
            let mut child = position.probe(mv);
            -quiescence(&mut child, -beta, -alpha, ply.saturating_add(1), context)
        };
        if context.aborted {
            return 0;
        }
        if score >= beta {
            return beta;
        }
        alpha = alpha.max(score);
    }
    alpha
}

fn root_minimax(
    position: &mut Position,
    root_moves: &MoveList,
    depth: u8,
    context: &mut SearchContext,
) -> Option<(Move, Score)> {
    let mut best: Option<(Move, Score)> = None;
    for &mv in root_moves {
        let score = {
            let mut child = position.probe(mv);
            -minimax(&mut child, depth - 1, 1, context)
        };
        if context.aborted {
            return None;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((mv, score));
        }
    }
    best
}

/// Reference negamax: no pruning, no quiescence and no table
fn minimax(position: &mut Position, depth: u8, ply: u8, context: &mut SearchContext) -> Score {
    if context.should_stop() {
        return 0;
    }
    context.visit(ply);
    if depth == 0 {
        return relative_evaluation(position);
    }
    let moves = generate(position, GenType::Legal);
    if moves.is_empty() {
        return if position.in_check(position.side_to_move()) {
            -(MATE_SCORE - ply as Score)
        } else {
            DRAW_SCORE
        };
    }
    let mut best = -INFINITY;
    for &mv in &moves {
        let mut child = position.probe(mv);
        best = best.max(-minimax(&mut child, depth - 1, ply + 1, context));
        if context.aborted {
            return 0;
        }
    }
    best
}

/// Scores each root move by the best answer the opponent has to it, and
/// keeps the move whose best answer is the weakest
fn root_minimize_opponent(
    position: &mut Position,
    root_moves: &MoveList,
    depth: u8,
    context: &mut SearchContext,
) -> Option<(Move, Score)> {
    let mut best: Option<(Move, Score)> = None;
    for &mv in root_moves {
        let opponent_best = {
            let mut child = position.probe(mv);
            alpha_beta(&mut child, -INFINITY, INFINITY, depth - 1, 1, context)
        };
        if context.aborted {
            return None;
        }
        if best.map_or(true, |(_, s)| opponent_best < s) {
            best = Some((mv, opponent_best));
        }
    }
    best.map(|(mv, opponent_best)| (mv, -opponent_best))
}

const HASH_MOVE_BONUS: Score = i32::MAX / 2;
const HEURISTIC_WEIGHT: Score = 16384;
const EVAL_BOUND: Score = 8191;

/// Orders by transposition table move, then by heuristic, then by the static
/// evaluation of the resulting position.
/// All three keys are packed in `ordering_score`; the evaluation is clamped so
/// that it never outweighs a heuristic step.
fn score_moves(position: &mut Position, moves: &mut MoveList, hash_move: Option<MoveKey>, eval_context: &EvalContext) {
    let sign = position.side_to_move().sign();
    for mv in moves.iter_mut() {
        let resulting = match score_delta(mv, eval_context) {
            Some(delta) => eval_context.score + delta,
            None => evaluate(&position.probe(*mv)),
        };
        let mut ordering = heuristic(mv) * HEURISTIC_WEIGHT + (sign * resulting).clamp(-EVAL_BOUND, EVAL_BOUND);
        if hash_move.map_or(false, |key| mv.matches(key)) {
            ordering += HASH_MOVE_BONUS;
        }
        mv.ordering_score = ordering;
    }
}

/// Material won, in pawns, plus the gain in centrality of the moved piece
fn heuristic(mv: &Move) -> Score {
    let mut h = center_proximity(mv.target) - center_proximity(mv.origin);
    if let Some(captured) = mv.captured_piece {
        h += PIECE_VALUE[captured.piece_type as usize] / 100;
    }
    if let Some(promotion) = mv.promotion {
        h += PIECE_VALUE[promotion as usize] / 100 - 1;
    }
    h
}

/// Mate scores are stored relative to the node they were found from
fn score_to_table(score: Score, ply: u8) -> Score {
    if !is_mate_score(score) {
        score
    } else if score > 0 {
        score + ply as Score
    } else {
        score - ply as Score
    }
}

fn score_from_table(score: Score, ply: u8) -> Score {
    if !is_mate_score(score) {
        score
    } else if score > 0 {
        score - ply as Score
    } else {
        score + ply as Score
    }
}

/// Follows the table's best moves from the root
fn collect_pv(position: &mut Position, max_length: u8) -> Vec<Move> {
    let mut pv = Vec::with_capacity(max_length as usize);
    follow_pv(position, max_length, &mut pv);
    pv
}

fn follow_pv(position: &mut Position, remaining: u8, pv: &mut Vec<Move>) {
    if remaining == 0 {
        return;
    }
    let key = match position.transposition_table().pv_move(position.get_hash()) {
        Some(key) => key,
        None => return,
    };
    let mv = match generate(position, GenType::Legal).find(key) {
        Some(mv) => *mv,
        None => return,
    };
    pv.push(mv);
    let mut child = position.probe(mv);
    follow_pv(&mut child, remaining - 1, pv);
}

#[cfg(test)]
mod tests {
    use super::{quiescence, search, SearchContext, SearchMode, SearchOptions};
    use crate::evaluation::{is_mate_score, relative_evaluation, MATE_SCORE, INFINITY};
    use crate::position::Position;
    use std::time::Duration;

    const SAMPLES: [&str; 5] = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
    ];

    fn options(depth: u8, mode: SearchMode) -> SearchOptions {
        let mut options = SearchOptions::default();
        options.set_depth(depth).set_quiescence(false).set_mode(mode);
        options
    }

    fn context(quiescence: bool) -> SearchContext {
        SearchContext::new(quiescence)
    }

    #[test]
    fn alpha_beta_matches_minimax() {
        for record in SAMPLES {
            for depth in 1..=3 {
                let mut position = Position::new(record).unwrap();
                let pruned = search(&mut position, &options(depth, SearchMode::AlphaBeta));
                let mut position = Position::new(record).unwrap();
                let plain = search(&mut position, &options(depth, SearchMode::Minimax));
                let mut position = Position::new(record).unwrap();
                let minimize = search(&mut position, &options(depth, SearchMode::MinimizeOpponent));
                assert_eq!(pruned.score, plain.score, "{} at depth {}", record, depth);
                assert_eq!(minimize.score, plain.score, "{} at depth {}", record, depth);
                assert!(pruned.info.nodes <= plain.info.nodes);
            }
        }
    }

    #[test]
    fn finds_back_rank_mate() {
        let mut position = Position::new(SAMPLES[4]).unwrap();
        let result = search(&mut position, &SearchOptions::default());
        assert_eq!(result.best_move.unwrap().to_string(), "d1d8");
        assert_eq!(result.score, MATE_SCORE - 1);
        assert!(is_mate_score(result.score));
        assert!(result.to_string().contains("score mate 1"));
    }

    #[test]
    fn mated_side_has_no_move() {
        let mut position = Position::new("3R2k1/5ppp/8/8/8/8/5PPP/6K1 b - - 1 1").unwrap();
        let result = search(&mut position, &SearchOptions::default());
        assert!(result.best_move.is_none());
        assert_eq!(result.score, -MATE_SCORE);

        let mut stalemate = Position::new("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = search(&mut stalemate, &SearchOptions::default());
        assert!(result.best_move.is_none());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn quiescence_never_drops_below_stand_pat() {
        // The only capture loses the queen to a pawn
        let mut position = Position::new("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let stand_pat = relative_evaluation(&position);
        let mut ctx = context(true);
        let score = quiescence(&mut position, -INFINITY, INFINITY, 0, &mut ctx);
        assert_eq!(score, stand_pat);
        assert!(ctx.nodes > 1);
    }

    #[test]
    fn quiescence_stands_pat_above_beta() {
        let mut position = Position::new("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let stand_pat = relative_evaluation(&position);
        let mut ctx = context(true);
        let score = quiescence(&mut position, -INFINITY, stand_pat - 50, 0, &mut ctx);
        assert_eq!(score, stand_pat - 50);
        assert_eq!(ctx.nodes, 1);
    }

    #[test]
    fn quiescence_wins_hanging_material() {
        // The black queen is free
        let mut position = Position::new("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let stand_pat = relative_evaluation(&position);
        let mut ctx = context(true);
        let score = quiescence(&mut position, -INFINITY, INFINITY, 0, &mut ctx);
        assert!(score > stand_pat + 500);
        assert!(ctx.max_ply >= 1);
    }

    #[test]
    fn search_leaves_position_untouched() {
        for record in SAMPLES {
            let mut position = Position::new(record).unwrap();
            let before = position.clone();
            search(&mut position, &SearchOptions::default());
            assert!(position.same_state(&before));
            assert!(!position.transposition_table().is_empty());
        }
    }

    #[test]
    fn time_budget_keeps_completed_iterations() {
        let mut position = Position::new(SAMPLES[2]).unwrap();
        let mut options = SearchOptions::default();
        options.set_depth(32).set_time(Some(Duration::from_millis(50)));
        let result = search(&mut position, &options);
        assert!(result.best_move.is_some());
        assert!(result.info.depth_completed >= 1 && result.info.depth_completed < 32);
    }

    #[test]
    fn movetime_from_clock() {
        let mut options = SearchOptions::default();
        options.set_time_from_clock(Duration::from_secs(100), Some(Duration::from_secs(2)));
        assert_eq!(options.max_time, Some(Duration::from_secs(3)));
        options.set_depth(0);
        assert_eq!(options.max_depth, 1);
    }
}
