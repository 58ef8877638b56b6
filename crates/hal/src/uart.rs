// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Polled driver for the soft-core UART.
//!
//! Register map (byte registers, word-spaced):
//!
//! | offset | name   | access                                      |
//! |--------|--------|---------------------------------------------|
//! | `0x00` | status | read: [`UartStatus`]; write `0x10`: clear IRQ |
//! | `0x04` | config | reserved for peripheral setup               |
//! | `0x08` | data   | write: transmit; read: pop one received byte |
//!
//! The driver keeps no state of its own. Every query re-reads the status
//! register, `send` blocks according to its [`PollPolicy`], and `receive`
//! never waits.

use core::fmt;

use bitflags::bitflags;

use crate::mmio::{AddressSpace, Slot};
use crate::poll::{PollPolicy, Spin};

pub const STATUS: Slot<u8> = Slot::new(0x00);
pub const CONFIG: Slot<u8> = Slot::new(0x04);
pub const DATA: Slot<u8> = Slot::new(0x08);

/// Bytes of address space claimed by the register file.
pub const REGISTER_SPAN: usize = 0x0C;

bitflags! {
    /// UART status register.
    ///
    /// Bit 0 is "TX FIFO full" and bit 1 "TX FIFO empty". Earlier board
    /// revisions were inconsistent about these two; this is the layout the
    /// simulator and firmware agree on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UartStatus: u8 {
        const TX_FULL = 1 << 0;
        const TX_EMPTY = 1 << 1;
        const RX_EMPTY = 1 << 2;
        const IRQ_PENDING = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UartError {
    #[error("receive FIFO is empty")]
    Empty,
    #[error("transmit FIFO still full after {polls} polls")]
    Blocked { polls: u32 },
}

pub struct Uart<S, P = Spin> {
    regs: S,
    policy: P,
}

impl<S: AddressSpace> Uart<S> {
    /// Driver with the default unbounded transmit wait.
    pub fn new(regs: S) -> Self {
        Self::with_policy(regs, Spin)
    }
}

fn read_status<S: AddressSpace>(regs: &mut S) -> UartStatus {
    UartStatus::from_bits_retain(regs.load(STATUS))
}

impl<S: AddressSpace, P: PollPolicy> Uart<S, P> {
    pub fn with_policy(regs: S, policy: P) -> Self {
        Self { regs, policy }
    }

    pub fn into_inner(self) -> S {
        self.regs
    }

    pub fn status(&mut self) -> UartStatus {
        read_status(&mut self.regs)
    }

    pub fn is_tx_full(&mut self) -> bool {
        self.status().contains(UartStatus::TX_FULL)
    }

    pub fn is_tx_empty(&mut self) -> bool {
        self.status().contains(UartStatus::TX_EMPTY)
    }

    pub fn is_rx_empty(&mut self) -> bool {
        self.status().contains(UartStatus::RX_EMPTY)
    }

    /// Waits for room in the TX FIFO, then writes `byte` to the data register.
    pub fn send(&mut self, byte: u8) -> Result<(), UartError> {
        let regs = &mut self.regs;
        self.policy
            .wait_until(|| !read_status(&mut *regs).contains(UartStatus::TX_FULL))
            .map_err(|t| UartError::Blocked { polls: t.polls })?;
        self.regs.store(DATA, byte);
        Ok(())
    }

    /// Sends bytes in order up to the end of `s` or the first NUL, stopping
    /// at the first failed `send`.
    pub fn send_string(&mut self, s: impl AsRef<[u8]>) -> Result<(), UartError> {
        for &byte in s.as_ref().iter().take_while(|&&b| b != 0) {
            self.send(byte)?;
        }
        Ok(())
    }

    /// Pops one received byte. Never waits: an empty RX FIFO is reported
    /// without touching the data register.
    pub fn receive(&mut self) -> Result<u8, UartError> {
        if self.is_rx_empty() {
            return Err(UartError::Empty);
        }
        Ok(self.regs.load(DATA))
    }

    /// Acknowledges a pending interrupt. Overwrites the status register with
    /// the IRQ bit alone; nothing is read first.
    pub fn clear_irq(&mut self) {
        self.regs.store(STATUS, UartStatus::IRQ_PENDING.bits());
    }
}

impl<S: AddressSpace, P: PollPolicy> fmt::Write for Uart<S, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_string(s).map_err(|_| fmt::Error)
    }
}
