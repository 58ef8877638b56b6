// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Readback side of the alignment probe: diffs the test region on the bus
//! against the image a correct target produces.

use crate::bus::{BusFault, SystemBus};
use aligncheck_hal::probe::{self, REGION_LEN, REGION_START};
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotMismatch {
    pub offset: u64,
    pub width: usize,
    pub expected: u64,
    pub actual: u64,
}

/// The four arithmetic results, decoded as signed 16-bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResults {
    pub a: i16,
    pub b: i16,
    pub c: i16,
    pub d: i16,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub base: u64,
    /// Region contents as lowercase hex, lowest address first.
    pub region: String,
    /// SHA-256 of the region bytes.
    pub digest: String,
    pub results: ProbeResults,
    pub mismatches: Vec<SlotMismatch>,
    pub faults: Vec<BusFault>,
}

impl ProbeReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty() && self.faults.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn le_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Reads the region back byte by byte and compares every slot.
///
/// Readback is a run of ordinary one-byte loads: each costs a bus cycle,
/// and a byte that cannot be read is recorded as a load fault and counts as
/// zero. The report carries every bus fault recorded so far, including those
/// raised while probing.
pub fn verify_probe(bus: &mut SystemBus, base: u64) -> ProbeReport {
    let start = base.wrapping_add(REGION_START as u64);
    let mut region = [0u8; REGION_LEN];
    for (i, byte) in region.iter_mut().enumerate() {
        *byte = bus.load_raw(start.wrapping_add(i as u64), 1) as u8;
    }

    let expected = probe::expected_image();
    let mismatches: Vec<SlotMismatch> = probe::LAYOUT
        .iter()
        .filter_map(|&(offset, width)| {
            let at = offset - REGION_START;
            let want = le_value(&expected[at..at + width]);
            let got = le_value(&region[at..at + width]);
            (want != got).then_some(SlotMismatch {
                offset: offset as u64,
                width,
                expected: want,
                actual: got,
            })
        })
        .collect();

    let result_at = |slot: aligncheck_hal::Slot<i16>| {
        let at = slot.offset() - REGION_START;
        i16::from_le_bytes([region[at], region[at + 1]])
    };
    let results = ProbeResults {
        a: result_at(probe::RESULT_A),
        b: result_at(probe::RESULT_B),
        c: result_at(probe::RESULT_C),
        d: result_at(probe::RESULT_D),
    };

    for m in &mismatches {
        tracing::warn!(
            "Slot {:#x} ({} bytes): expected {:#x}, read {:#x}",
            m.offset,
            m.width,
            m.expected,
            m.actual
        );
    }

    ProbeReport {
        base,
        region: hex::encode(region),
        digest: format!("{:x}", Sha256::digest(region)),
        results,
        mismatches,
        faults: bus.faults.clone(),
    }
}
