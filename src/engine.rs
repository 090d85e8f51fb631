use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::EngineError;
use crate::evaluation::{evaluate, Score};
use crate::move_generator::{generate, GenType};
use crate::movelist::MoveList;
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::r#move::{Move, MoveKind};
use crate::search::{search, SearchMode, SearchOptions, SearchResult, MAX_DEPTH};
use crate::square::Square;

/// State of the game in a given position
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteToMove,
    BlackToMove,
    WhiteWins,
    BlackWins,
    Draw,
}
impl GameOutcome {
    /// A side without legal moves is either mated or stalemated
    pub fn of(position: &mut Position) -> GameOutcome {
        let side = position.side_to_move();
        if !generate(position, GenType::Legal).is_empty() {
            return match side {
                Color::White => GameOutcome::WhiteToMove,
                Color::Black => GameOutcome::BlackToMove,
            };
        }
        match (position.in_check(side), side) {
            (false, _) => GameOutcome::Draw,
            (true, Color::White) => GameOutcome::BlackWins,
            (true, Color::Black) => GameOutcome::WhiteWins,
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::WhiteToMove | GameOutcome::BlackToMove)
    }
}
impl Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameOutcome::WhiteToMove => "white to move",
            GameOutcome::BlackToMove => "black to move",
            GameOutcome::WhiteWins => "white wins",
            GameOutcome::BlackWins => "black wins",
            GameOutcome::Draw => "draw",
        };
        write!(f, "{}", s)
    }
}

/// A move as handed out to callers, along with the static evaluation of the
/// position it leads to (white's point of view)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MoveInfo {
    pub origin: Square,
    pub target: Square,
    pub moving_piece: Piece,
    pub captured_piece: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub kind: MoveKind,
    pub evaluation: Score,
}
impl MoveInfo {
    pub fn new(position: &mut Position, mv: &Move) -> MoveInfo {
        MoveInfo {
            origin: mv.origin,
            target: mv.target,
            moving_piece: mv.moving_piece,
            captured_piece: mv.captured_piece,
            promotion: mv.promotion,
            kind: mv.kind,
            evaluation: evaluate(&position.probe(*mv)),
        }
    }
}

pub fn legal_moves(record: &str) -> Result<(MoveList, GameOutcome), EngineError> {
    let mut position = parse(record)?;
    let moves = generate(&mut position, GenType::Legal);
    let outcome = GameOutcome::of(&mut position);
    Ok((moves, outcome))
}

pub fn best_move_depth(record: &str, depth: i32) -> Result<SearchResult, EngineError> {
    let mut options = SearchOptions::default();
    options.set_depth(checked_depth(depth)?);
    run(record, &options)
}

pub fn best_move_time(record: &str, time: Duration) -> Result<SearchResult, EngineError> {
    let mut options = SearchOptions::default();
    options.set_depth(MAX_DEPTH).set_time(Some(time));
    run(record, &options)
}

pub fn best_move_minimax(record: &str, depth: i32) -> Result<SearchResult, EngineError> {
    let mut options = SearchOptions::default();
    options
        .set_depth(checked_depth(depth)?)
        .set_quiescence(false)
        .set_mode(SearchMode::Minimax);
    run(record, &options)
}

fn run(record: &str, options: &SearchOptions) -> Result<SearchResult, EngineError> {
    let mut position = parse(record)?;
    Ok(search(&mut position, options))
}

fn parse(record: &str) -> Result<Position, EngineError> {
    Position::new(record).map_err(|e| {
        log::warn!("rejected position record '{}': {}", record, e);
        EngineError::from(e)
    })
}

/// Requested depths are checked before any work is done
pub fn checked_depth(depth: i32) -> Result<u8, EngineError> {
    if depth <= 0 || depth > MAX_DEPTH as i32 {
        log::warn!("rejected search depth {}", depth);
        return Err(EngineError::InvalidDepth(depth));
    }
    Ok(depth as u8)
}

/// Runs at most one search at a time on a worker thread.
///
/// The worker owns a copy of the position it was given, transposition table
/// included, so the caller's position stays usable while it runs.
#[derive(Default)]
pub struct SearchSession {
    result: Arc<Mutex<Option<SearchResult>>>,
    worker: Option<JoinHandle<()>>,
}
impl SearchSession {
    pub fn new() -> SearchSession {
        Default::default()
    }

    /// Starts searching, unless the previous search is still running.
    /// `on_finish` runs on the worker thread once the search is over.
    pub fn start<F>(&mut self, position: &Position, options: &SearchOptions, on_finish: F) -> Result<(), EngineError>
    where
        F: FnOnce(&SearchResult) + Send + 'static,
    {
        if self.is_searching() {
            log::warn!("a search is already in flight, ignoring the new request");
            return Err(EngineError::SearchInProgress);
        }
        // A finished search nobody collected is dropped along with its result
        if self.wait().is_some() {
            log::debug!("discarding an uncollected search result");
        }
        let mut internal_position = position.clone();
        let internal_options = options.clone();
        let thread_result = Arc::clone(&self.result);
        self.worker = Some(thread::spawn(move || {
            let result = search(&mut internal_position, &internal_options);
            on_finish(&result);
            if let Ok(mut slot) = thread_result.lock() {
                *slot = Some(result);
            }
        }));
        Ok(())
    }

    pub fn is_searching(&self) -> bool {
        self.worker.as_ref().map_or(false, |worker| !worker.is_finished())
    }

    /// Returns a result if and only if the current search is finished
    pub fn probe(&mut self) -> Option<SearchResult> {
        let finished = match &self.worker {
            Some(worker) => worker.is_finished(),
            None => return None,
        };
        if finished {
            self.wait()
        } else {
            None
        }
    }

    /// Blocks until the current search is over. Returns `None` if there was
    /// no search to wait for, or if it died.
    pub fn wait(&mut self) -> Option<SearchResult> {
        let worker = self.worker.take()?;
        if worker.join().is_err() {
            log::error!("search worker panicked");
        }
        match self.result.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{best_move_depth, best_move_minimax, best_move_time, legal_moves, GameOutcome, MoveInfo, SearchSession};
    use crate::error::{EngineError, RecordError};
    use crate::position::{Position, START_RECORD};
    use crate::r#move::MoveKind;
    use crate::search::SearchOptions;
    use std::time::Duration;

    #[test]
    fn outcomes() {
        let (moves, outcome) = legal_moves(START_RECORD).unwrap();
        assert_eq!(moves.len(), 20);
        assert_eq!(outcome, GameOutcome::WhiteToMove);

        // Fool's mate
        let (moves, outcome) =
            legal_moves("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(moves.is_empty());
        assert_eq!(outcome, GameOutcome::BlackWins);
        assert!(outcome.is_over());

        let (_, outcome) = legal_moves("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(outcome, GameOutcome::Draw);
    }

    #[test]
    fn bad_requests_are_rejected() {
        assert!(matches!(best_move_depth(START_RECORD, 0), Err(EngineError::InvalidDepth(0))));
        assert!(matches!(best_move_minimax(START_RECORD, -3), Err(EngineError::InvalidDepth(-3))));
        assert!(matches!(
            best_move_depth("8/8/8/8 w - - 0 1", 3),
            Err(EngineError::InvalidRecord(RecordError::RankCount(4)))
        ));
        assert!(legal_moves("not a record").is_err());
    }

    #[test]
    fn entry_points_agree_on_scores() {
        let record = "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3";
        let mut options = SearchOptions::default();
        options.set_depth(2).set_quiescence(false);
        let mut position = Position::new(record).unwrap();
        let pruned = crate::search::search(&mut position, &options);
        let plain = best_move_minimax(record, 2).unwrap();
        assert_eq!(pruned.score, plain.score);
        assert_eq!(plain.info.depth_completed, 2);

        let timed = best_move_time(record, Duration::from_millis(30)).unwrap();
        assert!(timed.best_move.is_some());
        assert!(timed.info.depth_completed >= 1);
    }

    #[test]
    fn move_info_describes_captures() {
        let mut position = Position::new("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let result = best_move_depth(&position.record(), 2).unwrap();
        let best = result.best_move.unwrap();
        let info = MoveInfo::new(&mut position, &best);
        assert_eq!(best.to_string(), "d2d5");
        assert_eq!(info.kind, MoveKind::Capture);
        assert!(info.captured_piece.is_some());
        assert!(info.evaluation > 0);
    }

    #[test]
    fn one_search_at_a_time() {
        let position = Position::startpos();
        let mut options = SearchOptions::default();
        options.set_depth(3);

        let mut session = SearchSession::new();
        assert!(session.wait().is_none());
        options.set_depth(5);
        session.start(&position, &options, |_| ()).unwrap();
        assert!(matches!(session.start(&position, &options, |_| ()), Err(EngineError::SearchInProgress)));
        let result = session.wait().unwrap();
        assert_eq!(result.info.depth_completed, 5);
        assert!(!session.is_searching());

        options.set_depth(3);

        session.start(&position, &options, |_| ()).unwrap();
        let mut polled = None;
        while polled.is_none() {
            polled = session.probe();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(polled.unwrap().best_move.is_some());
    }

    #[test]
    fn finished_search_does_not_block_the_next_one() {
        let position = Position::startpos();
        let mut options = SearchOptions::default();
        options.set_depth(1);

        let mut session = SearchSession::new();
        session.start(&position, &options, |_| ()).unwrap();
        while session.is_searching() {
            std::thread::sleep(Duration::from_millis(5));
        }
        // Never collected, yet a new search may start
        session.start(&position, &options, |_| ()).unwrap();
        let result = session.wait().unwrap();
        assert_eq!(result.info.depth_completed, 1);
        assert!(session.wait().is_none());
    }
}
