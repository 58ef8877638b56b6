// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Alignment probe.
//!
//! Fills the top 48 bytes of a 64 KiB window with known literals at every
//! access width, widest first, then four 16-bit arithmetic results. An
//! external reader diffs the region against [`expected_image`] to confirm
//! that each width lands at the right offset in little-endian order.

use crate::mmio::{AddressSpace, Slot};

pub const REGION_START: usize = 0xFFD0;
pub const REGION_LEN: usize = 0x30;

pub const DOUBLE_SLOTS: [Slot<u64>; 2] = [Slot::new(0xFFD0), Slot::new(0xFFD8)];
pub const WORD_SLOTS: [Slot<u32>; 2] = [Slot::new(0xFFE0), Slot::new(0xFFE4)];
pub const HALF_SLOTS: [Slot<u16>; 4] = [
    Slot::new(0xFFE8),
    Slot::new(0xFFEA),
    Slot::new(0xFFEC),
    Slot::new(0xFFEE),
];
pub const BYTE_SLOTS: [Slot<u8>; 8] = [
    Slot::new(0xFFF0),
    Slot::new(0xFFF1),
    Slot::new(0xFFF2),
    Slot::new(0xFFF3),
    Slot::new(0xFFF4),
    Slot::new(0xFFF5),
    Slot::new(0xFFF6),
    Slot::new(0xFFF7),
];

pub const RESULT_A: Slot<i16> = Slot::new(0xFFF8);
pub const RESULT_B: Slot<i16> = Slot::new(0xFFFA);
pub const RESULT_C: Slot<i16> = Slot::new(0xFFFC);
pub const RESULT_D: Slot<i16> = Slot::new(0xFFFE);

pub const DOUBLE_VALUES: [u64; 2] = [0x1122_3344_5566_7788, 0xFFEE_DDCC_BBAA_9988];
pub const WORD_VALUES: [u32; 2] = [0x1122_3344, 0xFFEE_DDCC];
pub const HALF_VALUES: [u16; 4] = [0xFFEE, 0xDDCC, 0xBBAA, 0x1234];
pub const BYTE_VALUES: [u8; 8] = [0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32, 0x10];

pub const RESULT_A_VALUE: i16 = 800 + 50;
pub const RESULT_B_VALUE: i16 = 200 - 75;
pub const RESULT_C_VALUE: i16 = RESULT_A_VALUE.wrapping_neg();
pub const RESULT_D_VALUE: i16 = RESULT_B_VALUE.wrapping_neg();

/// Offset and byte width of every slot, in store order.
pub const LAYOUT: [(usize, usize); 20] = [
    (0xFFD0, 8),
    (0xFFD8, 8),
    (0xFFE0, 4),
    (0xFFE4, 4),
    (0xFFE8, 2),
    (0xFFEA, 2),
    (0xFFEC, 2),
    (0xFFEE, 2),
    (0xFFF0, 1),
    (0xFFF1, 1),
    (0xFFF2, 1),
    (0xFFF3, 1),
    (0xFFF4, 1),
    (0xFFF5, 1),
    (0xFFF6, 1),
    (0xFFF7, 1),
    (0xFFF8, 2),
    (0xFFFA, 2),
    (0xFFFC, 2),
    (0xFFFE, 2),
];

/// Runs the probe against `space`, whose offset 0 is the caller's base
/// address.
///
/// The negated results are computed from what the A/B slots read back, so a
/// broken 16-bit load path shows up in C/D as well.
pub fn run<S: AddressSpace + ?Sized>(space: &mut S) {
    for (slot, value) in DOUBLE_SLOTS.into_iter().zip(DOUBLE_VALUES) {
        space.store(slot, value);
    }
    for (slot, value) in WORD_SLOTS.into_iter().zip(WORD_VALUES) {
        space.store(slot, value);
    }
    for (slot, value) in HALF_SLOTS.into_iter().zip(HALF_VALUES) {
        space.store(slot, value);
    }
    for (slot, value) in BYTE_SLOTS.into_iter().zip(BYTE_VALUES) {
        space.store(slot, value);
    }

    space.store(RESULT_A, RESULT_A_VALUE);
    space.store(RESULT_B, RESULT_B_VALUE);
    let a: i16 = space.load(RESULT_A);
    space.store(RESULT_C, a.wrapping_neg());
    let b: i16 = space.load(RESULT_B);
    space.store(RESULT_D, b.wrapping_neg());
}

/// Region contents a correct target holds after [`run`], starting at
/// [`REGION_START`].
pub fn expected_image() -> [u8; REGION_LEN] {
    let mut image = [0u8; REGION_LEN];
    let mut put = |offset: usize, bytes: &[u8]| {
        let at = offset - REGION_START;
        image[at..at + bytes.len()].copy_from_slice(bytes);
    };

    for (slot, value) in DOUBLE_SLOTS.iter().zip(DOUBLE_VALUES) {
        put(slot.offset(), &value.to_le_bytes());
    }
    for (slot, value) in WORD_SLOTS.iter().zip(WORD_VALUES) {
        put(slot.offset(), &value.to_le_bytes());
    }
    for (slot, value) in HALF_SLOTS.iter().zip(HALF_VALUES) {
        put(slot.offset(), &value.to_le_bytes());
    }
    for (slot, value) in BYTE_SLOTS.iter().zip(BYTE_VALUES) {
        put(slot.offset(), &[value]);
    }
    put(RESULT_A.offset(), &RESULT_A_VALUE.to_le_bytes());
    put(RESULT_B.offset(), &RESULT_B_VALUE.to_le_bytes());
    put(RESULT_C.offset(), &RESULT_C_VALUE.to_le_bytes());
    put(RESULT_D.offset(), &RESULT_D_VALUE.to_le_bytes());

    image
}
