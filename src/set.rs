//! A set: a fixed number of ways, each a [`Line`], plus the queries the LRU
//! engine and L1 cache engine need over them.

use crate::line::Line;

/// A single set of `ways` lines. Ranks of its valid lines always form the
/// permutation `0..count_valid()`; see [`crate::lru`] for the operations
/// that maintain this invariant.
pub struct Set {
    lines: Vec<Line>,
}

impl Set {
    pub fn new(ways: u32, line_size: u32) -> Self {
        let lines = (0..ways).map(|_| Line::new(line_size)).collect();
        Self { lines }
    }

    pub fn ways(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, way: usize) -> &Line {
        &self.lines[way]
    }

    pub fn line_mut(&mut self, way: usize) -> &mut Line {
        &mut self.lines[way]
    }

    /// Linear scan for a valid line carrying `tag`.
    pub fn lookup(&self, tag: u32) -> Option<usize> {
        self.lines.iter().position(|line| line.is_valid() && line.tag() == tag)
    }

    pub fn count_valid(&self) -> usize {
        self.lines.iter().filter(|line| line.is_valid()).count()
    }

    /// Lowest-indexed way that is not currently valid.
    pub fn first_invalid(&self) -> Option<usize> {
        self.lines.iter().position(|line| !line.is_valid())
    }

    /// The valid way with the highest LRU rank (least recently used).
    /// Callers only invoke this when the set is full, so a valid line is
    /// guaranteed to exist.
    pub fn victim(&self) -> usize {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_valid())
            .max_by_key(|(_, line)| line.lru_rank())
            .map(|(way, _)| way)
            .expect("victim() called on a set with no valid lines")
    }

    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.invalidate();
            line.lru_rank = 0;
        }
    }

    /// Ranks of the valid lines of this set, for invariant checks in tests.
    #[cfg(test)]
    pub fn valid_ranks(&self) -> Vec<u32> {
        let mut ranks: Vec<u32> =
            self.lines.iter().filter(|l| l.is_valid()).map(|l| l.lru_rank()).collect();
        ranks.sort_unstable();
        ranks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_only_valid_matching_tag() {
        let mut set = Set::new(2, 8);
        set.line_mut(0).install(5, &[0; 8]);
        assert_eq!(set.lookup(5), Some(0));
        assert_eq!(set.lookup(9), None);
    }

    #[test]
    fn first_invalid_is_lowest_index() {
        let mut set = Set::new(4, 8);
        set.line_mut(1).install(1, &[0; 8]);
        assert_eq!(set.first_invalid(), Some(0));
    }

    #[test]
    fn victim_picks_highest_rank_among_valid() {
        let mut set = Set::new(3, 8);
        set.line_mut(0).install(1, &[0; 8]);
        set.line_mut(1).install(2, &[0; 8]);
        set.line_mut(0).lru_rank = 0;
        set.line_mut(1).lru_rank = 1;
        assert_eq!(set.victim(), 1);
    }

    #[test]
    fn clear_invalidates_every_way() {
        let mut set = Set::new(2, 8);
        set.line_mut(0).install(1, &[0; 8]);
        set.clear();
        assert_eq!(set.count_valid(), 0);
    }
}
