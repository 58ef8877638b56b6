// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Bare-metal core of the harness: typed MMIO access, the alignment probe
//! and the polled UART driver. Usable from firmware (`no_std`) and from the
//! host simulator alike, since everything is written against [`AddressSpace`].

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod heartbeat;
pub mod mmio;
pub mod poll;
pub mod probe;
pub mod uart;


pub use board::MemoryMap;
pub use heartbeat::Heartbeat;
pub use mmio::{AddressSpace, Mmio, Slot, Width};
pub use poll::{Bounded, PollPolicy, Spin, TimedOut};
pub use uart::{Uart, UartError, UartStatus};
