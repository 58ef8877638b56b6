// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Busy-wait policies for status polling.

/// A wait gave up before the condition became true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut {
    pub polls: u32,
}

/// Decides how long to keep re-reading a status condition.
pub trait PollPolicy {
    /// Calls `ready` until it returns `true`, or gives up.
    fn wait_until<F: FnMut() -> bool>(&mut self, ready: F) -> Result<(), TimedOut>;
}

/// Spins forever. The bare-metal default: there is nothing else to run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl PollPolicy for Spin {
    #[inline]
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) -> Result<(), TimedOut> {
        while !ready() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Gives up after `max_polls` checks. At least one check is always made.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    max_polls: u32,
}

impl Bounded {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    pub const fn max_polls(&self) -> u32 {
        self.max_polls
    }
}

impl PollPolicy for Bounded {
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) -> Result<(), TimedOut> {
        let limit = self.max_polls.max(1);
        for _ in 0..limit {
            if ready() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(TimedOut { polls: limit })
    }
}
