// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use core::ops::Range;

use crate::probe::{REGION_LEN, REGION_START};
use crate::uart::REGISTER_SPAN;

/// Physical layout of one board variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMap {
    pub clock_mhz: u32,
    pub memory_base: usize,
    pub memory_size: usize,
    /// Base address handed to the probe entry point.
    pub test_base: usize,
    pub uart_base: usize,
    /// Byte cell bumped by the idle loop.
    pub heartbeat: usize,
}

impl MemoryMap {
    /// 27 MHz soft-core board: 64 KiB system memory at 0, UART at `0xC000_0000`.
    pub const SOFTCORE: Self = Self {
        clock_mhz: 27,
        memory_base: 0x0000_0000,
        memory_size: 0x1_0000,
        test_base: 0x0000_0000,
        uart_base: 0xC000_0000,
        heartbeat: 0x0000_0F00,
    };

    pub const fn memory(&self) -> Range<usize> {
        self.memory_base..self.memory_base + self.memory_size
    }

    pub const fn test_region(&self) -> Range<usize> {
        let start = self.test_base + REGION_START;
        start..start + REGION_LEN
    }

    pub const fn uart_registers(&self) -> Range<usize> {
        self.uart_base..self.uart_base + REGISTER_SPAN
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::SOFTCORE
    }
}
