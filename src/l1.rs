//! L1 cache engine: the read/write/invalidate/clear state machines over a
//! set-associative array of [`Set`]s, backed by an [`L2Stub`].

use crate::decode::Geometry;
use crate::l2::L2Stub;
use crate::lru;
use crate::set::Set;
use std::ops::{BitOr, BitOrAssign};

/// A set of result flags describing what happened during one L1 operation,
/// mirroring the source's bitmask `return_enum`. Independent named
/// constants rather than a packed variant enum, since several bits can be
/// set at once (e.g. a dirty eviction sets both `READ_MISS` and
/// `WRITE_L2`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultFlags(u16);

impl ResultFlags {
    pub const NONE: Self = Self(0);
    pub const READ_HIT: Self = Self(1 << 0);
    pub const READ_MISS: Self = Self(1 << 1);
    pub const WRITE_HIT: Self = Self(1 << 2);
    pub const WRITE_MISS: Self = Self(1 << 3);
    pub const WRITE_L2: Self = Self(1 << 4);
    pub const READ_L2: Self = Self(1 << 5);
    pub const READ_L2_OWN: Self = Self(1 << 6);
    pub const EVICT_L2_OK: Self = Self(1 << 7);
    pub const EVICT_L2_ERROR: Self = Self(1 << 8);

    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for ResultFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ResultFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One set-associative first-level cache. Sets are allocated eagerly at
/// construction rather than lazily on first touch.
pub struct L1Cache {
    geometry: Geometry,
    sets: Vec<Set>,
}

impl L1Cache {
    pub fn new(geometry: Geometry) -> Self {
        let sets = (0..geometry.set_count())
            .map(|_| Set::new(geometry.ways(), geometry.line_size()))
            .collect();
        Self { geometry, sets }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Finds a way to install a new line into `set`, updating LRU ranks
    /// correctly for either the not-full case (`NEW_LINE`) or the
    /// full-set case (`ACCESS` on the victim, with write-back if dirty).
    /// Returns the way index and any `WRITE_L2` flag from a write-back.
    fn allocate_way(set: &mut Set, addr: u32, l2: &L2Stub) -> (usize, ResultFlags) {
        if let Some(way) = set.first_invalid() {
            lru::new_line(set, way);
            (way, ResultFlags::NONE)
        } else {
            let victim = set.victim();
            lru::access(set, victim);
            let mut flags = ResultFlags::NONE;
            if set.line(victim).is_dirty() {
                l2.write_line(addr, set.line(victim).data());
                flags |= ResultFlags::WRITE_L2;
            }
            (victim, flags)
        }
    }

    /// Reads one byte at `addr`. Returns the result flags and the byte
    /// value (meaningful whenever no error occurred, which for reads is
    /// always — a read either hits or installs and then returns data).
    pub fn read(&mut self, addr: u32, l2: &L2Stub) -> (ResultFlags, u8) {
        let (tag, set_index, offset) = self.geometry.decode(addr);
        let set = &mut self.sets[set_index];

        if let Some(way) = set.lookup(tag) {
            lru::access(set, way);
            return (ResultFlags::READ_HIT, set.line(way).byte(offset));
        }

        let (way, mut flags) = Self::allocate_way(set, addr, l2);
        flags |= ResultFlags::READ_MISS | ResultFlags::READ_L2;
        let mut fetched = vec![0u8; self.geometry.line_size() as usize];
        l2.read_line(addr, &mut fetched);
        set.line_mut(way).install(tag, &fetched);
        (flags, set.line(way).byte(offset))
    }

    /// Writes one byte to `addr`. Write-allocate, write-back: a miss reads
    /// for ownership instead of a plain read, and the installed or hit
    /// line is marked dirty.
    pub fn write(&mut self, addr: u32, value: u8, l2: &L2Stub) -> ResultFlags {
        let (tag, set_index, offset) = self.geometry.decode(addr);
        let set = &mut self.sets[set_index];

        if let Some(way) = set.lookup(tag) {
            lru::access(set, way);
            set.line_mut(way).set_byte(offset, value);
            set.line_mut(way).dirty = true;
            return ResultFlags::WRITE_HIT;
        }

        let (way, mut flags) = Self::allocate_way(set, addr, l2);
        flags |= ResultFlags::WRITE_MISS | ResultFlags::READ_L2_OWN;
        let mut fetched = vec![0u8; self.geometry.line_size() as usize];
        l2.read_line(addr, &mut fetched);
        set.line_mut(way).install(tag, &fetched);
        set.line_mut(way).set_byte(offset, value);
        set.line_mut(way).dirty = true;
        flags
    }

    /// Handles an external invalidation of `addr`. A miss here (nothing
    /// resident with that tag) is a benign, continuable condition, not a
    /// failure.
    pub fn invalidate(&mut self, addr: u32) -> ResultFlags {
        let (tag, set_index, _offset) = self.geometry.decode(addr);
        let set = &mut self.sets[set_index];
        match set.lookup(tag) {
            Some(way) => {
                lru::evict_line(set, way);
                set.line_mut(way).invalidate();
                ResultFlags::EVICT_L2_OK
            }
            None => ResultFlags::EVICT_L2_ERROR,
        }
    }

    /// Resets every set to all-invalid; geometry is unchanged.
    pub fn clear(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l2::FILLER_BYTE;

    fn one_set_two_way() -> L1Cache {
        L1Cache::new(Geometry::new(64, 1, 2).unwrap())
    }

    #[test]
    fn s1_cold_read_is_miss_with_filler_byte() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        let l2 = L2Stub::new();
        let (flags, byte) = cache.read(0x0100_0000, &l2);
        assert!(flags.contains(ResultFlags::READ_MISS));
        assert!(flags.contains(ResultFlags::READ_L2));
        assert_eq!(byte, FILLER_BYTE);
    }

    #[test]
    fn s2_second_read_same_line_is_hit() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        let l2 = L2Stub::new();
        cache.read(0x0100_0000, &l2);
        let (flags, _) = cache.read(0x0100_0004, &l2);
        assert_eq!(flags, ResultFlags::READ_HIT);
    }

    #[test]
    fn s3_capacity_miss_evicts_lru_without_writeback_when_clean() {
        let mut cache = one_set_two_way();
        let l2 = L2Stub::new();
        cache.read(0x0000_0000, &l2);
        cache.read(0x0000_0100, &l2);
        let (flags, _) = cache.read(0x0000_0200, &l2);
        assert!(flags.contains(ResultFlags::READ_MISS));
        assert!(flags.contains(ResultFlags::READ_L2));
        assert!(!flags.contains(ResultFlags::WRITE_L2));
    }

    #[test]
    fn s4_dirty_victim_triggers_writeback() {
        let mut cache = one_set_two_way();
        let l2 = L2Stub::new();
        cache.write(0x0000_0000, 0xAB, &l2);
        cache.write(0x0000_0100, 0xCD, &l2);
        let (flags, _) = cache.read(0x0000_0200, &l2);
        assert!(flags.contains(ResultFlags::READ_MISS));
        assert!(flags.contains(ResultFlags::READ_L2));
        assert!(flags.contains(ResultFlags::WRITE_L2));
    }

    #[test]
    fn s5_invalidate_then_read_is_miss_again() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        let l2 = L2Stub::new();
        cache.read(0x0100_0000, &l2);
        let evict_flags = cache.invalidate(0x0100_0000);
        assert_eq!(evict_flags, ResultFlags::EVICT_L2_OK);
        let (flags, _) = cache.read(0x0100_0000, &l2);
        assert!(flags.contains(ResultFlags::READ_MISS));
    }

    #[test]
    fn invalidate_of_absent_tag_is_benign_error() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        assert_eq!(cache.invalidate(0x0100_0000), ResultFlags::EVICT_L2_ERROR);
    }

    #[test]
    fn l2_write_then_read_returns_written_byte() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        let l2 = L2Stub::new();
        cache.write(0x0100_0000, 0x42, &l2);
        let (flags, byte) = cache.read(0x0100_0000, &l2);
        assert_eq!(flags, ResultFlags::READ_HIT);
        assert_eq!(byte, 0x42);
    }

    #[test]
    fn clear_resets_all_sets_to_cold() {
        let mut cache = L1Cache::new(Geometry::new(64, 16384, 4).unwrap());
        let l2 = L2Stub::new();
        cache.read(0x0100_0000, &l2);
        cache.clear();
        let (flags, _) = cache.read(0x0100_0000, &l2);
        assert!(flags.contains(ResultFlags::READ_MISS));
    }

    #[test]
    fn p1_ranks_stay_a_permutation_after_mixed_traffic() {
        let mut cache = one_set_two_way();
        let l2 = L2Stub::new();
        let addrs = [0x0u32, 0x100, 0x200, 0x0, 0x300, 0x100];
        for &addr in &addrs {
            cache.read(addr, &l2);
        }
        let set = &cache.sets[0];
        assert_eq!(set.valid_ranks(), (0..set.count_valid() as u32).collect::<Vec<_>>());
    }
}
