//! LRU rank maintenance: the three update modes that keep a set's valid-line
//! ranks a permutation of `0..count_valid()` (invariant P1 / I1).

use crate::set::Set;

/// Promotes `way` to rank 0, shifting every valid line that was more recent
/// than it down by one. Used on every read hit, write hit, and on a
/// full-set miss's victim (which is accessed before being overwritten, so
/// the newly installed line inherits rank 0).
pub fn access(set: &mut Set, way: usize) {
    let accessed_rank = set.line(way).lru_rank();
    for w in 0..set.ways() {
        if w == way || !set.line(w).is_valid() {
            continue;
        }
        if set.line(w).lru_rank() < accessed_rank {
            set.line_mut(w).lru_rank += 1;
        }
    }
    set.line_mut(way).lru_rank = 0;
}

/// Installs a brand-new line into a way that was not previously valid:
/// every already-valid line's rank is bumped up by one, and the new way
/// becomes rank 0. Used only when a set is not yet full.
pub fn new_line(set: &mut Set, way: usize) {
    for w in 0..set.ways() {
        if w != way && set.line(w).is_valid() {
            set.line_mut(w).lru_rank += 1;
        }
    }
    set.line_mut(way).lru_rank = 0;
}

/// Removes `way` from the rank ordering ahead of invalidating it: every
/// valid line that was less recent than `way` moves up by one. Used only
/// for external invalidation, never for a normal eviction-for-install
/// (which goes through [`access`] instead).
pub fn evict_line(set: &mut Set, way: usize) {
    let evicted_rank = set.line(way).lru_rank();
    for w in 0..set.ways() {
        if w == way || !set.line(w).is_valid() {
            continue;
        }
        if set.line(w).lru_rank() > evicted_rank {
            set.line_mut(w).lru_rank -= 1;
        }
    }
}
