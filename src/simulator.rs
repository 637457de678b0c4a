//! Top-level simulator: owns both L1 caches, both recorders, the L2 stub,
//! and the invalidation router, and drives a trace to completion one event
//! at a time, cooperatively and single-threaded.

use crate::config::Config;
use crate::dispatcher::{CacheKind, Dispatcher};
use crate::error::SimError;
use crate::l1::{L1Cache, ResultFlags};
use crate::l2::{self, L2Stub};
use crate::stats::Recorder;
use crate::trace::{Event, TraceReader};
use std::io::{BufRead, Write};

pub struct Simulator<W: Write> {
    instr_cache: L1Cache,
    data_cache: L1Cache,
    instr_stats: Recorder,
    data_stats: Recorder,
    l2: L2Stub,
    dispatcher: Dispatcher,
    log: W,
}

impl<W: Write> Simulator<W> {
    pub fn new(config: &Config, log: W) -> Self {
        Self {
            instr_cache: L1Cache::new(config.instr_geometry),
            data_cache: L1Cache::new(config.data_geometry),
            instr_stats: Recorder::new("Instruction", config.mode),
            data_stats: Recorder::new("Data", config.mode),
            l2: L2Stub::new(),
            dispatcher: Dispatcher::new(config.instr_range, config.data_range),
            log,
        }
    }

    /// Processes one event to completion; no suspension points, no partial
    /// state on a continuable error.
    pub fn process_event(&mut self, event: Event) {
        match event {
            Event::ReadData(addr) => {
                let (flags, _byte) = self.data_cache.read(addr, &self.l2);
                self.data_stats.update(flags, addr, &mut self.log);
            }
            Event::WriteData(addr) => {
                let flags = self.data_cache.write(addr, l2::FILLER_BYTE, &self.l2);
                self.data_stats.update(flags, addr, &mut self.log);
            }
            Event::InstructionFetch(addr) => {
                let (flags, _byte) = self.instr_cache.read(addr, &self.l2);
                self.instr_stats.update(flags, addr, &mut self.log);
            }
            Event::Evict(addr) => self.handle_evict(addr),
            Event::ClearCache => {
                self.instr_cache.clear();
                self.data_cache.clear();
                self.instr_stats.clear();
                self.data_stats.clear();
            }
            Event::PrintContent => {
                let _ = self.data_stats.dump(&mut self.log);
                let _ = self.instr_stats.dump(&mut self.log);
            }
        }
    }

    fn handle_evict(&mut self, addr: u32) {
        match self.dispatcher.route_evict(addr) {
            Some(CacheKind::Instruction) => {
                let flags = self.instr_cache.invalidate(addr);
                self.instr_stats.update(flags, addr, &mut self.log);
                if flags == ResultFlags::EVICT_L2_ERROR {
                    log::warn!("benign invalidation miss in instruction cache at {addr:#x}");
                }
            }
            Some(CacheKind::Data) => {
                let flags = self.data_cache.invalidate(addr);
                self.data_stats.update(flags, addr, &mut self.log);
                if flags == ResultFlags::EVICT_L2_ERROR {
                    log::warn!("benign invalidation miss in data cache at {addr:#x}");
                }
            }
            None => {
                log::warn!("routing error: address {addr:#x} is outside both configured ranges");
            }
        }
    }

    /// Drives `trace` to end of file, one event at a time. Stops at the
    /// first unknown command or I/O error; routing errors and benign
    /// invalidation misses are logged and do not stop the run.
    pub fn run<R: BufRead>(&mut self, trace: &mut TraceReader<R>) -> Result<(), SimError> {
        while let Some(event) = trace.next_event()? {
            self.process_event(event);
        }
        Ok(())
    }

    pub fn instr_stats(&self) -> &Recorder {
        &self.instr_stats
    }

    pub fn data_stats(&self) -> &Recorder {
        &self.data_stats
    }
}
