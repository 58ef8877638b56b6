// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use aligncheck_hal::probe::{REGION_LEN, REGION_START};
use aligncheck_hal::uart::REGISTER_SPAN;
use aligncheck_hal::MemoryMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MemoryRange {
    pub base: u64,
    pub size: String, // e.g. "64KiB"
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct UartSettings {
    /// Bytes the TX FIFO holds before reporting full.
    pub tx_depth: usize,
    /// Bus cycles needed to shift one byte out.
    pub tx_drain_ticks: u32,
}

impl Default for UartSettings {
    fn default() -> Self {
        Self {
            tx_depth: 1,
            tx_drain_ticks: 4,
        }
    }
}

/// One board variant: where memory, the probe window, the UART and the
/// heartbeat cell live, and how fast the core runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoardProfile {
    pub name: String,
    pub clock_mhz: u32,
    pub memory: MemoryRange,
    #[serde(default)]
    pub test_base: u64,
    pub uart_base: u64,
    pub heartbeat: u64,
    #[serde(default)]
    pub uart: UartSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Clock rate must be greater than zero")]
    ZeroClock,
    #[error("Invalid memory size '{0}'")]
    InvalidSize(String),
    #[error("{region} region at {start:#x} does not fit the address space")]
    AddressOverflow { region: &'static str, start: u64 },
    #[error("Test base {0:#x} is not 8-byte aligned")]
    MisalignedTestBase(u64),
    #[error("{region} region {start:#x}..{end:#x} lies outside memory")]
    OutsideMemory {
        region: &'static str,
        start: usize,
        end: usize,
    },
    #[error("{0} and {1} regions overlap")]
    Overlap(&'static str, &'static str),
}

impl BoardProfile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board profile at {:?}", path.as_ref()))?;
        let profile: Self =
            serde_yaml::from_reader(f).context("Failed to parse Board Profile YAML")?;
        profile.memory_map()?;
        Ok(profile)
    }

    /// The 27 MHz soft-core board the firmware defaults to.
    pub fn default_board() -> Self {
        let map = MemoryMap::SOFTCORE;
        Self {
            name: "softcore".to_string(),
            clock_mhz: map.clock_mhz,
            memory: MemoryRange {
                base: map.memory_base as u64,
                size: "64KiB".to_string(),
            },
            test_base: map.test_base as u64,
            uart_base: map.uart_base as u64,
            heartbeat: map.heartbeat as u64,
            uart: UartSettings::default(),
        }
    }

    /// Validates the layout and converts it for the hal.
    pub fn memory_map(&self) -> Result<MemoryMap, LayoutError> {
        if self.clock_mhz == 0 {
            return Err(LayoutError::ZeroClock);
        }
        let size = parse_size(&self.memory.size)
            .map_err(|_| LayoutError::InvalidSize(self.memory.size.clone()))?;

        let memory = span("memory", self.memory.base, size)?;
        let test = span(
            "test",
            self.test_base,
            (REGION_START + REGION_LEN) as u64,
        )?;
        let heartbeat = span("heartbeat", self.heartbeat, 1)?;
        let uart = span("uart", self.uart_base, REGISTER_SPAN as u64)?;

        if self.test_base % 8 != 0 {
            return Err(LayoutError::MisalignedTestBase(self.test_base));
        }

        let map = MemoryMap {
            clock_mhz: self.clock_mhz,
            memory_base: memory.start,
            memory_size: memory.end - memory.start,
            test_base: test.start,
            uart_base: uart.start,
            heartbeat: heartbeat.start,
        };

        let test = map.test_region();
        inside("test", &test, &memory)?;
        inside("heartbeat", &heartbeat, &memory)?;
        disjoint(("test", &test), ("heartbeat", &heartbeat))?;
        disjoint(("memory", &memory), ("uart", &uart))?;

        Ok(map)
    }
}

fn span(region: &'static str, start: u64, len: u64) -> Result<Range<usize>, LayoutError> {
    let overflow = LayoutError::AddressOverflow { region, start };
    let end = start.checked_add(len).ok_or(overflow.clone())?;
    let start = usize::try_from(start).map_err(|_| overflow.clone())?;
    let end = usize::try_from(end).map_err(|_| overflow)?;
    Ok(start..end)
}

fn inside(region: &'static str, r: &Range<usize>, memory: &Range<usize>) -> Result<(), LayoutError> {
    if r.start >= memory.start && r.end <= memory.end {
        Ok(())
    } else {
        Err(LayoutError::OutsideMemory {
            region,
            start: r.start,
            end: r.end,
        })
    }
}

fn disjoint(
    (a, ra): (&'static str, &Range<usize>),
    (b, rb): (&'static str, &Range<usize>),
) -> Result<(), LayoutError> {
    if ra.start < rb.end && rb.start < ra.end {
        Err(LayoutError::Overlap(a, b))
    } else {
        Ok(())
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
