use crate::{evaluation::Score, r#move::MoveKey, zob_hash::Hash};
use std::collections::HashMap;

/// How the stored score relates to the true value of the position
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Bound {
    /// Every move was searched inside the window
    Exact,
    /// A move failed high, the true score is at least this
    Lower,
    /// No move reached alpha, the true score is at most this
    Upper,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TableEntry {
    pub score: Score,
    pub depth_searched: u8,
    pub bound: Bound,
    pub best_move: Option<MoveKey>,
}
impl TableEntry {
    pub fn hash_move(&self) -> Option<MoveKey> {
        self.best_move
    }

    /// Whether this entry can stand in for a search of the given depth
    pub fn covers(&self, depth: u8) -> bool {
        self.depth_searched >= depth
    }
}

/// Search results keyed by position hash.
///
/// Entries are overwritten on re-insertion and there is no eviction: the
/// table lives as long as the position owning it. Two positions sharing a
/// 64 bits hash will share an entry.
#[derive(Clone, Default, Debug)]
pub struct TranspositionTable(HashMap<Hash, TableEntry>);
impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable(HashMap::new())
    }

    pub fn get(&self, hash: Hash) -> Option<TableEntry> {
        self.0.get(&hash).copied()
    }

    pub fn set(&mut self, hash: Hash, entry: TableEntry) {
        self.0.insert(hash, entry);
    }

    pub fn pv_move(&self, hash: Hash) -> Option<MoveKey> {
        self.get(hash).and_then(|e| e.hash_move())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
