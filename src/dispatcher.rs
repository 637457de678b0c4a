//! Invalidation router: decides which L1 cache an `EVICT` event targets,
//! by address range rather than by event kind (unlike every other event,
//! which names its cache directly).

use crate::config::AddressRange;

/// Which L1 cache an event is destined for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheKind {
    Instruction,
    Data,
}

/// Routes an `EVICT` address to a cache using the two configured,
/// non-overlapping ranges. An address in neither range is a routing
/// error; the event is reported but otherwise ignored by the caller.
pub struct Dispatcher {
    instr_range: AddressRange,
    data_range: AddressRange,
}

impl Dispatcher {
    pub fn new(instr_range: AddressRange, data_range: AddressRange) -> Self {
        Self { instr_range, data_range }
    }

    pub fn route_evict(&self, addr: u32) -> Option<CacheKind> {
        if self.instr_range.contains(addr) {
            Some(CacheKind::Instruction)
        } else if self.data_range.contains(addr) {
            Some(CacheKind::Data)
        } else {
            None
        }
    }
}
