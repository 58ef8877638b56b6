// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::memory::LinearMemory;
use crate::peripherals::uart::UartDevice;
use crate::{Bus, Peripheral, SimResult, SimulationError};
use aligncheck_config::BoardProfile;
use aligncheck_hal::uart::REGISTER_SPAN;
use aligncheck_hal::{AddressSpace, MemoryMap, Slot, Width};
use serde::Serialize;

/// IRQ line the board wires the UART to.
pub const UART_IRQ: u32 = 1;

pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub irq: Option<u32>,
    pub dev: Box<dyn Peripheral>,
}

impl PeripheralEntry {
    fn covers(&self, addr: u64, len: u64) -> bool {
        addr >= self.base
            && addr
                .checked_add(len)
                .is_some_and(|end| end <= self.base + self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Unmapped,
    Misaligned,
}

/// A typed access the simulated hardware refused. Real targets trap or drop
/// these; the simulator reads zero, ignores the write and records it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusFault {
    pub addr: u64,
    pub width: usize,
    pub write: bool,
    pub kind: FaultKind,
}

pub struct SystemBus {
    pub ram: LinearMemory,
    pub peripherals: Vec<PeripheralEntry>,
    pub faults: Vec<BusFault>,
    pub pending_irqs: Vec<u32>,
    pub cycles: u64,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    pub fn new() -> Self {
        Self::from_map(&MemoryMap::SOFTCORE, UartDevice::default())
    }

    pub fn from_map(map: &MemoryMap, uart: UartDevice) -> Self {
        let mut bus = Self {
            ram: LinearMemory::new(map.memory_size, map.memory_base as u64),
            peripherals: Vec::new(),
            faults: Vec::new(),
            pending_irqs: Vec::new(),
            cycles: 0,
        };
        bus.add_peripheral(
            "uart",
            map.uart_base as u64,
            REGISTER_SPAN as u64,
            Some(UART_IRQ),
            Box::new(uart),
        );
        bus
    }

    pub fn from_profile(profile: &BoardProfile) -> SimResult<Self> {
        let map = profile.memory_map()?;
        Ok(Self::from_map(&map, UartDevice::new(&profile.uart)))
    }

    pub fn add_peripheral(
        &mut self,
        name: &str,
        base: u64,
        size: u64,
        irq: Option<u32>,
        dev: Box<dyn Peripheral>,
    ) {
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base,
            size,
            irq,
            dev,
        });
    }

    /// View of the bus whose offset 0 is `base`, the way firmware sees the
    /// region handed to it.
    pub fn window(&mut self, base: u64) -> BusWindow<'_> {
        BusWindow { bus: self, base }
    }

    pub fn peripheral<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)?
            .dev
            .as_any()?
            .downcast_ref()
    }

    pub fn peripheral_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.peripherals
            .iter_mut()
            .find(|p| p.name == name)?
            .dev
            .as_any_mut()?
            .downcast_mut()
    }

    pub fn uart(&self) -> Option<&UartDevice> {
        self.peripheral("uart")
    }

    pub fn uart_mut(&mut self) -> Option<&mut UartDevice> {
        self.peripheral_mut("uart")
    }

    fn is_mapped(&self, addr: u64, len: u64) -> bool {
        self.ram.contains(addr, len) || self.peripherals.iter().any(|p| p.covers(addr, len))
    }

    fn check_access(&self, addr: u64, width: usize) -> Option<FaultKind> {
        if addr % width as u64 != 0 {
            Some(FaultKind::Misaligned)
        } else if !self.is_mapped(addr, width as u64) {
            Some(FaultKind::Unmapped)
        } else {
            None
        }
    }

    fn record_fault(&mut self, fault: BusFault) {
        tracing::warn!(
            "Bus fault: {:?} {}-byte {} at {:#x}",
            fault.kind,
            fault.width,
            if fault.write { "store" } else { "load" },
            fault.addr
        );
        self.faults.push(fault);
    }

    /// One bus cycle has passed: let the peripherals advance.
    fn cycle(&mut self) {
        self.cycles += 1;
        let irqs = self.tick_peripherals();
        self.pending_irqs.extend(irqs);
    }

    fn read_sized(&mut self, addr: u64, width: usize) -> SimResult<u64> {
        match width {
            1 => self.read_u8(addr).map(u64::from),
            2 => self.read_u16(addr).map(u64::from),
            4 => self.read_u32(addr).map(u64::from),
            _ => self.read_u64(addr),
        }
    }

    fn write_sized(&mut self, addr: u64, width: usize, raw: u64) -> SimResult<()> {
        match width {
            1 => self.write_u8(addr, raw as u8),
            2 => self.write_u16(addr, raw as u16),
            4 => self.write_u32(addr, raw as u32),
            _ => self.write_u64(addr, raw),
        }
    }

    /// Single `width`-byte load as the CPU would issue it.
    pub fn load_raw(&mut self, addr: u64, width: usize) -> u64 {
        let result = match self.check_access(addr, width) {
            Some(kind) => Err(kind),
            None => self
                .read_sized(addr, width)
                .map_err(|_| FaultKind::Unmapped),
        };
        let value = match result {
            Ok(value) => value,
            Err(kind) => {
                self.record_fault(BusFault {
                    addr,
                    width,
                    write: false,
                    kind,
                });
                0
            }
        };
        self.cycle();
        value
    }

    /// Single `width`-byte store. Faulting stores change nothing.
    pub fn store_raw(&mut self, addr: u64, width: usize, raw: u64) {
        let result = match self.check_access(addr, width) {
            Some(kind) => Err(kind),
            None => self
                .write_sized(addr, width, raw)
                .map_err(|_| FaultKind::Unmapped),
        };
        if let Err(kind) = result {
            self.record_fault(BusFault {
                addr,
                width,
                write: true,
                kind,
            });
        }
        self.cycle();
    }
}

impl Bus for SystemBus {
    fn read_u8(&mut self, addr: u64) -> SimResult<u8> {
        if let Some(byte) = self.ram.read_u8(addr) {
            return Ok(byte);
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.covers(addr, 1)) {
            return p.dev.read(addr - p.base);
        }
        Err(SimulationError::MemoryViolation(addr))
    }

    fn write_u8(&mut self, addr: u64, value: u8) -> SimResult<()> {
        if self.ram.write_u8(addr, value) {
            return Ok(());
        }
        if let Some(p) = self.peripherals.iter_mut().find(|p| p.covers(addr, 1)) {
            return p.dev.write(addr - p.base, value);
        }
        Err(SimulationError::MemoryViolation(addr))
    }

    fn tick_peripherals(&mut self) -> Vec<u32> {
        let mut raised = Vec::new();
        for p in &mut self.peripherals {
            if p.dev.tick() {
                if let Some(irq) = p.irq {
                    tracing::debug!("IRQ {} raised by {}", irq, p.name);
                    raised.push(irq);
                }
            }
        }
        raised
    }
}

impl AddressSpace for SystemBus {
    fn load<W: Width>(&mut self, slot: Slot<W>) -> W {
        W::from_raw(self.load_raw(slot.offset() as u64, W::BYTES))
    }

    fn store<W: Width>(&mut self, slot: Slot<W>, value: W) {
        self.store_raw(slot.offset() as u64, W::BYTES, value.to_raw());
    }
}

/// An [`AddressSpace`] rooted at `base` on a [`SystemBus`].
pub struct BusWindow<'a> {
    bus: &'a mut SystemBus,
    base: u64,
}

impl BusWindow<'_> {
    pub fn base(&self) -> u64 {
        self.base
    }
}

impl AddressSpace for BusWindow<'_> {
    fn load<W: Width>(&mut self, slot: Slot<W>) -> W {
        let addr = self.base.wrapping_add(slot.offset() as u64);
        W::from_raw(self.bus.load_raw(addr, W::BYTES))
    }

    fn store<W: Width>(&mut self, slot: Slot<W>, value: W) {
        let addr = self.base.wrapping_add(slot.offset() as u64);
        self.bus.store_raw(addr, W::BYTES, value.to_raw());
    }
}
