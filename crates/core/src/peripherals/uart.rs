// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::SimResult;
use aligncheck_config::UartSettings;
use aligncheck_hal::uart::{CONFIG, DATA, STATUS};
use aligncheck_hal::UartStatus;
use std::any::Any;
use std::collections::VecDeque;
use std::io::{self, Write};

const STATUS_REG: u64 = STATUS.offset() as u64;
const CONFIG_REG: u64 = CONFIG.offset() as u64;
const DATA_REG: u64 = DATA.offset() as u64;

/// Soft-core UART model.
///
/// The transmitter shifts one byte out every `tx_drain_ticks` bus cycles.
/// Bytes pushed by the host with [`UartDevice::inject_rx`] land in the RX
/// FIFO and raise the IRQ-pending bit until the firmware clears it.
#[derive(Debug)]
pub struct UartDevice {
    config: u8,
    tx_fifo: VecDeque<u8>,
    rx_fifo: VecDeque<u8>,
    tx_depth: usize,
    tx_drain_ticks: u32,
    ticks: u32,
    irq_pending: bool,
    irq_raised: bool,
    transmitted: Vec<u8>,
    overruns: usize,
    echo: bool,
}

impl Default for UartDevice {
    fn default() -> Self {
        Self::new(&UartSettings::default())
    }
}

impl UartDevice {
    pub fn new(settings: &UartSettings) -> Self {
        Self {
            config: 0,
            tx_fifo: VecDeque::new(),
            rx_fifo: VecDeque::new(),
            tx_depth: settings.tx_depth.max(1),
            tx_drain_ticks: settings.tx_drain_ticks.max(1),
            ticks: 0,
            irq_pending: false,
            irq_raised: false,
            transmitted: Vec::new(),
            overruns: 0,
            echo: false,
        }
    }

    /// Mirror every byte that leaves the transmitter to stdout.
    pub fn with_stdout_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn status(&self) -> UartStatus {
        let mut status = UartStatus::empty();
        if self.tx_fifo.len() >= self.tx_depth {
            status |= UartStatus::TX_FULL;
        }
        if self.tx_fifo.is_empty() {
            status |= UartStatus::TX_EMPTY;
        }
        if self.rx_fifo.is_empty() {
            status |= UartStatus::RX_EMPTY;
        }
        if self.irq_pending {
            status |= UartStatus::IRQ_PENDING;
        }
        status
    }

    pub fn inject_rx(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.rx_fifo.extend(bytes);
        self.irq_pending = true;
        self.irq_raised = true;
        tracing::debug!("UART RX <- {} byte(s)", bytes.len());
    }

    /// Bytes that have left the transmitter, oldest first.
    pub fn transmitted(&self) -> &[u8] {
        &self.transmitted
    }

    /// Writes dropped because the TX FIFO was full.
    pub fn overruns(&self) -> usize {
        self.overruns
    }

    pub fn config(&self) -> u8 {
        self.config
    }

    /// Shifts out everything still queued, as if the line ran to idle.
    pub fn flush(&mut self) {
        while let Some(byte) = self.tx_fifo.pop_front() {
            self.emit(byte);
        }
        self.ticks = 0;
    }

    fn emit(&mut self, byte: u8) {
        tracing::trace!("UART TX -> {:#04x}", byte);
        if self.echo {
            let mut out = io::stdout();
            let _ = out.write_all(&[byte]).and_then(|_| out.flush());
        }
        self.transmitted.push(byte);
    }
}

impl crate::Peripheral for UartDevice {
    fn read(&mut self, offset: u64) -> SimResult<u8> {
        let value = match offset {
            STATUS_REG => self.status().bits(),
            CONFIG_REG => self.config,
            DATA_REG => match self.rx_fifo.pop_front() {
                Some(byte) => byte,
                None => {
                    tracing::warn!("UART data read with empty RX FIFO");
                    0
                }
            },
            _ => 0,
        };
        Ok(value)
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        match offset {
            STATUS_REG => {
                if UartStatus::from_bits_retain(value).contains(UartStatus::IRQ_PENDING) {
                    self.irq_pending = false;
                }
            }
            CONFIG_REG => self.config = value,
            DATA_REG => {
                if self.tx_fifo.len() >= self.tx_depth {
                    self.overruns += 1;
                    tracing::warn!("UART TX overrun, dropped {:#04x}", value);
                } else {
                    self.tx_fifo.push_back(value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(&mut self) -> bool {
        if !self.tx_fifo.is_empty() {
            self.ticks += 1;
            if self.ticks >= self.tx_drain_ticks {
                self.ticks = 0;
                if let Some(byte) = self.tx_fifo.pop_front() {
                    self.emit(byte);
                }
            }
        }
        std::mem::take(&mut self.irq_raised)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}
