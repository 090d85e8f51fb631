use std::time::Instant;

use crate::move_generator::perft;

pub mod castling;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod lookup;
pub mod move_generator;
pub mod movelist;
pub mod piece;
pub mod position;
pub mod search;
pub mod square;
pub mod transposition_table;
pub mod uci;
pub mod zob_hash;
pub mod r#move;

pub use engine::{GameOutcome, MoveInfo, SearchSession};
pub use error::{EngineError, RecordError};
pub use position::Position;
pub use search::{SearchMode, SearchOptions, SearchResult};

/// Runs perft on the given record (the starting position by default) and
/// prints a line per depth
pub fn run_perft(depth: u32, record: Option<String>) -> Result<(), RecordError> {
    println!("perft");
    let mut position = match record {
        None => Position::startpos(),
        Some(r) => Position::new(&r)?,
    };
    println!("{}\n", position);
    perft_table(&mut position, depth);
    Ok(())
}

pub fn perft_table(position: &mut Position, depth: u32) {
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = perft(position, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{run_perft, RecordError};

    #[test]
    fn perft_command_checks_its_record() {
        assert!(run_perft(1, None).is_ok());
        assert!(run_perft(2, Some(String::from("4k3/8/8/8/8/8/8/4K3 w - - 0 1"))).is_ok());
        assert_eq!(run_perft(1, Some(String::from("8/8 w - - 0 1"))), Err(RecordError::RankCount(2)));
    }
}
