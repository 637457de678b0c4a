//! Validated simulator configuration: cache geometries, address ranges, and
//! statistics mode, built once before any cache exists.

use crate::decode::Geometry;
use crate::error::ConfigError;
use crate::stats::StatsMode;

/// Inclusive address range used to route `EVICT` events to a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    pub lo: u32,
    pub hi: u32,
}

impl AddressRange {
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.lo && addr <= self.hi
    }

    fn overlaps(&self, other: &AddressRange) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }
}

/// Default instruction-cache geometry (16384 sets, 2-way, 64-byte lines).
pub const DEFAULT_INSTR_GEOMETRY: (u32, u32, u32) = (64, 16384, 2);
/// Default data-cache geometry (16384 sets, 4-way, 64-byte lines).
pub const DEFAULT_DATA_GEOMETRY: (u32, u32, u32) = (64, 16384, 4);
/// Default instruction address range, `[0x0, 0xFFFFFF]`.
pub const DEFAULT_INSTR_RANGE: AddressRange = AddressRange { lo: 0x0000_0000, hi: 0x00FF_FFFF };
/// Default data address range, `[0x1000000, 0xFFFFFFFF]`.
pub const DEFAULT_DATA_RANGE: AddressRange = AddressRange { lo: 0x0100_0000, hi: 0xFFFF_FFFF };

#[derive(Clone, Debug)]
pub struct Config {
    pub instr_geometry: Geometry,
    pub data_geometry: Geometry,
    pub instr_range: AddressRange,
    pub data_range: AddressRange,
    pub mode: StatsMode,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instr_geometry: (u32, u32, u32),
        data_geometry: (u32, u32, u32),
        instr_range: AddressRange,
        data_range: AddressRange,
        mode: StatsMode,
    ) -> Result<Self, ConfigError> {
        let (i_line, i_sets, i_ways) = instr_geometry;
        let (d_line, d_sets, d_ways) = data_geometry;
        let instr_geometry = Geometry::new(i_line, i_sets, i_ways)?;
        let data_geometry = Geometry::new(d_line, d_sets, d_ways)?;

        if instr_range.overlaps(&data_range) {
            return Err(ConfigError::OverlappingRanges {
                instr_lo: instr_range.lo,
                instr_hi: instr_range.hi,
                data_lo: data_range.lo,
                data_hi: data_range.hi,
            });
        }

        Ok(Self { instr_geometry, data_geometry, instr_range, data_range, mode })
    }

    pub fn defaults() -> Self {
        Self::new(
            DEFAULT_INSTR_GEOMETRY,
            DEFAULT_DATA_GEOMETRY,
            DEFAULT_INSTR_RANGE,
            DEFAULT_DATA_RANGE,
            StatsMode::CountersOnly,
        )
        .expect("default configuration is always valid")
    }
}
