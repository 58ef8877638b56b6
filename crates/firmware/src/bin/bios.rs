// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#![no_main]
#![no_std]

use aligncheck_hal::{Heartbeat, MemoryMap, Mmio};
use panic_halt as _;
use riscv_rt::entry;

/// Busy pause, two `nop`s per unit.
fn delay(units: u32) {
    for _ in 0..units {
        for _ in 0..2 {
            // SAFETY: `nop` has no side effects.
            unsafe { riscv::asm::nop() };
        }
    }
}

#[entry]
fn main() -> ! {
    // SAFETY: the heartbeat cell is a RAM byte outside the program image,
    // owned by this loop alone.
    let cell = unsafe { Mmio::new(MemoryMap::SOFTCORE.heartbeat) };
    let mut heartbeat = Heartbeat::new(cell);
    heartbeat.reset();

    loop {
        heartbeat.beat();
        delay(1);
    }
}
