// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bus;
pub mod memory;
pub mod peripherals;
pub mod svmem;
pub mod verify;

use std::any::Any;

mod tests;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Memory access violation at {0:#x}")]
    MemoryViolation(u64),
    #[error("Invalid board layout: {0}")]
    Layout(#[from] aligncheck_config::LayoutError),
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Trait representing a memory-mapped peripheral.
///
/// Registers are accessed a byte at a time. Reads take `&mut self`: on real
/// devices reading a data register consumes it.
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&mut self, offset: u64) -> SimResult<u8>;
    fn write(&mut self, offset: u64, value: u8) -> SimResult<()>;
    /// Advances the device by one bus cycle. Returns true when it raises
    /// its interrupt line.
    fn tick(&mut self) -> bool {
        false
    }
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

/// Trait representing the system bus
pub trait Bus {
    fn read_u8(&mut self, addr: u64) -> SimResult<u8>;
    fn write_u8(&mut self, addr: u64, value: u8) -> SimResult<()>;
    fn tick_peripherals(&mut self) -> Vec<u32>; // Returns list of raised IRQ lines

    fn read_u16(&mut self, addr: u64) -> SimResult<u16> {
        let b0 = self.read_u8(addr)? as u16;
        let b1 = self.read_u8(addr + 1)? as u16;
        // Little Endian
        Ok(b0 | (b1 << 8))
    }

    fn read_u32(&mut self, addr: u64) -> SimResult<u32> {
        let lo = self.read_u16(addr)? as u32;
        let hi = self.read_u16(addr + 2)? as u32;
        Ok(lo | (hi << 16))
    }

    fn read_u64(&mut self, addr: u64) -> SimResult<u64> {
        let lo = self.read_u32(addr)? as u64;
        let hi = self.read_u32(addr + 4)? as u64;
        Ok(lo | (hi << 32))
    }

    fn write_u16(&mut self, addr: u64, value: u16) -> SimResult<()> {
        self.write_u8(addr, (value & 0xFF) as u8)?;
        self.write_u8(addr + 1, ((value >> 8) & 0xFF) as u8)?;
        Ok(())
    }

    fn write_u32(&mut self, addr: u64, value: u32) -> SimResult<()> {
        self.write_u16(addr, (value & 0xFFFF) as u16)?;
        self.write_u16(addr + 2, ((value >> 16) & 0xFFFF) as u16)?;
        Ok(())
    }

    fn write_u64(&mut self, addr: u64, value: u64) -> SimResult<()> {
        self.write_u32(addr, (value & 0xFFFF_FFFF) as u32)?;
        self.write_u32(addr + 4, (value >> 32) as u32)?;
        Ok(())
    }
}
