// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#![no_main]
#![no_std]

use aligncheck_hal::{probe, MemoryMap, Mmio};
use panic_halt as _;
use riscv_rt::entry;

// Direct-mode trap target: return straight to the faulting context.
#[cfg(feature = "zicsr")]
core::arch::global_asm!(
    ".section .text.probe_trap, \"ax\"",
    ".global probe_trap",
    ".align 2",
    "probe_trap:",
    "    mret",
);

#[cfg(feature = "zicsr")]
fn arm_trap_vector() {
    use riscv::register::mtvec::{self, TrapMode};

    extern "C" {
        fn probe_trap();
    }
    // SAFETY: probe_trap is 4-byte aligned and only executes `mret`.
    unsafe { mtvec::write(probe_trap as usize, TrapMode::Direct) };
}

/// Probe entry point. Boot code passes the base address in `a0`.
#[no_mangle]
pub extern "C" fn probe_main(base_address: usize) -> i32 {
    #[cfg(feature = "zicsr")]
    arm_trap_vector();

    // SAFETY: boot code hands over an 8-byte aligned base with 64 KiB of
    // memory behind it that nothing else touches while the probe runs.
    let mut window = unsafe { Mmio::new(base_address) };
    probe::run(&mut window);

    0
}

#[entry]
fn main() -> ! {
    probe_main(MemoryMap::SOFTCORE.test_base);

    loop {
        // Infinite loop
    }
}
