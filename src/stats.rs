//! Statistics recorder: per-cache hit/miss counters, derived hit rate, and
//! an optional activity log of L2 interactions.

use crate::l1::ResultFlags;
use std::io::Write;

/// Selects how much detail a recorder writes to its log sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsMode {
    /// Counters only; `PRINT_CONTENT` dumps are still written.
    CountersOnly,
    /// Counters plus one line per L2 interaction (`update`'s `WRITE_L2`,
    /// `READ_L2`, `READ_L2_OWN` bits).
    WithL2Trace,
}

impl StatsMode {
    pub fn from_arg(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::CountersOnly),
            2 => Some(Self::WithL2Trace),
            _ => None,
        }
    }
}

/// Per-cache statistics. Counters reset on [`Recorder::clear`]; the dump
/// index never does, so log blocks remain distinguishable across clears.
pub struct Recorder {
    name: String,
    mode: StatsMode,
    read_hits: u64,
    read_misses: u64,
    write_hits: u64,
    write_misses: u64,
    dump_count: u64,
}

impl Recorder {
    pub fn new(name: impl Into<String>, mode: StatsMode) -> Self {
        Self {
            name: name.into(),
            mode,
            read_hits: 0,
            read_misses: 0,
            write_hits: 0,
            write_misses: 0,
            dump_count: 0,
        }
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.read_hits + self.read_misses + self.write_hits + self.write_misses;
        if total == 0 {
            return 1.0;
        }
        (self.read_hits + self.write_hits) as f64 / total as f64
    }

    /// Folds in the result of one L1 operation, emitting an L2-interaction
    /// line to `sink` when the mode asks for it.
    pub fn update(&mut self, flags: ResultFlags, addr: u32, sink: &mut impl Write) {
        if flags.contains(ResultFlags::READ_HIT) {
            self.read_hits += 1;
        }
        if flags.contains(ResultFlags::READ_MISS) {
            self.read_misses += 1;
        }
        if flags.contains(ResultFlags::WRITE_HIT) {
            self.write_hits += 1;
        }
        if flags.contains(ResultFlags::WRITE_MISS) {
            self.write_misses += 1;
        }

        if self.mode != StatsMode::WithL2Trace {
            return;
        }
        if flags.contains(ResultFlags::WRITE_L2) {
            let _ = writeln!(sink, "[MESSAGE] {} write to L2 {:x}", self.name, addr);
        }
        if flags.contains(ResultFlags::READ_L2) {
            let _ = writeln!(sink, "[MESSAGE] {} read from L2 {:x}", self.name, addr);
        }
        if flags.contains(ResultFlags::READ_L2_OWN) {
            let _ = writeln!(sink, "[MESSAGE] {} read for Ownership from L2 {:x}", self.name, addr);
        }
    }

    /// Writes one `PRINT_CONTENT` block and advances the dump index.
    pub fn dump(&mut self, sink: &mut impl Write) -> std::io::Result<()> {
        let reads = self.read_hits + self.read_misses;
        let writes = self.write_hits + self.write_misses;
        writeln!(sink, "------")?;
        writeln!(sink, "{}", self.name)?;
        writeln!(sink, "dump #{}", self.dump_count)?;
        writeln!(sink, "reads: {}  writes: {}", reads, writes)?;
        writeln!(sink, "read_hits: {}", self.read_hits)?;
        writeln!(sink, "read_misses: {}", self.read_misses)?;
        writeln!(sink, "write_hits: {}", self.write_hits)?;
        writeln!(sink, "write_misses: {}", self.write_misses)?;
        writeln!(sink, "hit rate: {:.1}%", self.hit_rate() * 100.0)?;
        self.dump_count += 1;
        Ok(())
    }

    /// Zeros the four counters; does not touch the dump index or sink.
    pub fn clear(&mut self) {
        self.read_hits = 0;
        self.read_misses = 0;
        self.write_hits = 0;
        self.write_misses = 0;
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_defaults_to_one_with_no_accesses() {
        let r = Recorder::new("Data", StatsMode::CountersOnly);
        assert_eq!(r.hit_rate(), 1.0);
    }

    #[test]
    fn update_increments_matching_counters_only() {
        let mut r = Recorder::new("Data", StatsMode::CountersOnly);
        let mut sink = Vec::new();
        r.update(ResultFlags::READ_HIT, 0, &mut sink);
        r.update(ResultFlags::READ_MISS | ResultFlags::READ_L2, 4, &mut sink);
        assert_eq!(r.read_hits, 1);
        assert_eq!(r.read_misses, 1);
        assert_eq!(r.write_hits, 0);
        assert!((r.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mode_with_l2_trace_emits_message_lines() {
        let mut r = Recorder::new("Data", StatsMode::WithL2Trace);
        let mut sink = Vec::new();
        r.update(ResultFlags::READ_MISS | ResultFlags::READ_L2, 0x10, &mut sink);
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("read from L2 10"));
    }

    #[test]
    fn mode_counters_only_emits_no_message_lines() {
        let mut r = Recorder::new("Data", StatsMode::CountersOnly);
        let mut sink = Vec::new();
        r.update(ResultFlags::READ_MISS | ResultFlags::READ_L2, 0x10, &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn clear_resets_counters_but_not_dump_index() {
        let mut r = Recorder::new("Data", StatsMode::CountersOnly);
        let mut sink = Vec::new();
        r.update(ResultFlags::READ_HIT, 0, &mut sink);
        r.dump(&mut sink).unwrap();
        r.clear();
        assert_eq!(r.read_hits, 0);
        assert_eq!(r.hit_rate(), 1.0);
        r.dump(&mut sink).unwrap();
        assert_eq!(r.dump_count, 2);
    }
}
