use crate::r#move::{Move, MoveKey};
use arrayvec::ArrayVec;

// No position has more than 218 legal moves, pseudo-legal ones stay well
// below that bound too
pub const MAX_MOVELIST_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct MoveList(ArrayVec<Move, MAX_MOVELIST_CAPACITY>);
impl Default for MoveList {
    fn default() -> Self {
        MoveList(ArrayVec::new())
    }
}
impl MoveList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn push(&mut self, m: Move) {
        self.0.push(m)
    }
    pub fn get(&self, i: usize) -> Option<&Move> {
        self.0.get(i)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Move> {
        self.0.iter_mut()
    }
    pub fn retain<F: FnMut(&mut Move) -> bool>(&mut self, f: F) {
        self.0.retain(f)
    }
    pub fn find(&self, key: MoveKey) -> Option<&Move> {
        self.0.iter().find(|m| m.matches(key))
    }

    /// Consumes the list, yielding moves by decreasing `ordering_score`.
    /// Selection is lazy so that a cutoff does not pay for a full sort.
    pub fn best_first(self) -> BestFirstIter {
        BestFirstIter { moves: self.0 }
    }
}
impl std::fmt::Display for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let mut s = String::new();
        for m in self.0.iter() {
            s.push_str(&format!("{} ", m))
        }
        write!(f, "{}", s.trim())
    }
}
impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// A way to iterate through a movelist by ordering score, to potentially
// reduce search space
pub struct BestFirstIter {
    moves: ArrayVec<Move, MAX_MOVELIST_CAPACITY>,
}
impl Iterator for BestFirstIter {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        if self.moves.is_empty() {
            return None;
        }
        let (mut best_index, mut best_score) = (0, self.moves[0].ordering_score);
        for (i, m) in self.moves.iter().enumerate() {
            if m.ordering_score > best_score {
                best_score = m.ordering_score;
                best_index = i;
            }
        }
        self.moves.swap_pop(best_index)
    }
}

#[cfg(test)]
mod tests {
    use crate::move_generator::{generate, GenType};
    use crate::position::Position;

    #[test]
    fn best_first_follows_ordering_score() {
        let mut position = Position::startpos();
        let mut moves = generate(&mut position, GenType::Legal);
        for (i, m) in moves.iter_mut().enumerate() {
            m.ordering_score = (i as i32 * 7) % 11;
        }
        let scores: Vec<i32> = moves.best_first().map(|m| m.ordering_score).collect();
        assert_eq!(scores.len(), 20);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
