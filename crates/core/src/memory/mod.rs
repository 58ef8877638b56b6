// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// A simple flat memory storage
#[derive(Debug)]
pub struct LinearMemory {
    pub data: Vec<u8>,
    pub base_addr: u64,
}

impl LinearMemory {
    pub fn new(size: usize, base_addr: u64) -> Self {
        Self {
            data: vec![0; size],
            base_addr,
        }
    }

    /// True if the whole `[addr, addr + len)` range is backed by this memory.
    pub fn contains(&self, addr: u64, len: u64) -> bool {
        let end = self.base_addr + self.data.len() as u64;
        addr >= self.base_addr && addr.checked_add(len).is_some_and(|e| e <= end)
    }

    pub fn read_u8(&self, addr: u64) -> Option<u8> {
        if self.contains(addr, 1) {
            Some(self.data[(addr - self.base_addr) as usize])
        } else {
            None
        }
    }

    pub fn write_u8(&mut self, addr: u64, value: u8) -> bool {
        if self.contains(addr, 1) {
            self.data[(addr - self.base_addr) as usize] = value;
            true
        } else {
            false
        }
    }

    /// Paints the whole memory with `value`, so bytes nothing wrote stand out.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}
