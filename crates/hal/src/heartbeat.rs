// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::mmio::{AddressSpace, Slot};

const CELL: Slot<u8> = Slot::new(0);

/// Liveness counter owned by the idle loop. `space` is rooted at the
/// heartbeat cell.
pub struct Heartbeat<S> {
    space: S,
}

impl<S: AddressSpace> Heartbeat<S> {
    pub fn new(space: S) -> Self {
        Self { space }
    }

    pub fn reset(&mut self) {
        self.space.store(CELL, 0u8);
    }

    /// Bumps the counter by one, wrapping at 256, and returns the new value.
    pub fn beat(&mut self) -> u8 {
        let next = self.space.load(CELL).wrapping_add(1);
        self.space.store(CELL, next);
        next
    }

    pub fn into_inner(self) -> S {
        self.space
    }
}
