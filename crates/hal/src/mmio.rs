// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use core::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// An access width the bus performs as one load or store.
pub trait Width: Copy + sealed::Sealed {
    const BYTES: usize;

    /// Bit pattern of the value, zero-extended.
    fn to_raw(self) -> u64;

    /// Truncates `raw` to this width.
    fn from_raw(raw: u64) -> Self;
}

macro_rules! impl_width {
    ($($t:ty => $u:ty),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Width for $t {
            const BYTES: usize = core::mem::size_of::<$t>();

            #[inline]
            fn to_raw(self) -> u64 {
                self as $u as u64
            }

            #[inline]
            fn from_raw(raw: u64) -> Self {
                raw as $u as $t
            }
        }
    )*};
}

impl_width!(
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
);

/// A width-tagged location at a fixed offset inside an [`AddressSpace`].
///
/// The offset is always a multiple of the width, so an access through a
/// slot is naturally aligned as long as the space itself is 8-byte aligned.
/// Slots are meant to be built in `const` items, where a misaligned offset
/// is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<W> {
    offset: usize,
    _width: PhantomData<W>,
}

impl<W: Width> Slot<W> {
    pub const fn new(offset: usize) -> Self {
        assert!(offset % W::BYTES == 0, "slot offset is not aligned to its width");
        Self {
            offset,
            _width: PhantomData,
        }
    }

    /// Run-time variant of [`Slot::new`] for offsets that are not known
    /// until the program runs.
    pub const fn checked(offset: usize) -> Option<Self> {
        if offset % W::BYTES == 0 {
            Some(Self {
                offset,
                _width: PhantomData,
            })
        } else {
            None
        }
    }

    pub const fn offset(self) -> usize {
        self.offset
    }

    pub const fn width(self) -> usize {
        W::BYTES
    }
}

/// A region of device-visible memory.
///
/// Every `load` and `store` is observable by hardware: implementations must
/// perform exactly one access of the slot's width, in program order, and
/// never cache, merge or drop it. Loads take `&mut self` because reading a
/// device register can consume state (e.g. popping a receive FIFO).
pub trait AddressSpace {
    fn load<W: Width>(&mut self, slot: Slot<W>) -> W;
    fn store<W: Width>(&mut self, slot: Slot<W>, value: W);
}

impl<S: AddressSpace + ?Sized> AddressSpace for &mut S {
    #[inline]
    fn load<W: Width>(&mut self, slot: Slot<W>) -> W {
        (**self).load(slot)
    }

    #[inline]
    fn store<W: Width>(&mut self, slot: Slot<W>, value: W) {
        (**self).store(slot, value)
    }
}

/// Volatile window onto physical memory starting at `base`.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be 8-byte aligned and every slot accessed through the
    /// window must address memory or registers valid for a volatile access
    /// of that width. No other reference may alias the accessed range while
    /// the window is alive.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }
}

impl AddressSpace for Mmio {
    #[inline]
    fn load<W: Width>(&mut self, slot: Slot<W>) -> W {
        let ptr = self.base.wrapping_add(slot.offset()) as *const W;
        // SAFETY: validity and base alignment are the contract of `Mmio::new`;
        // the slot offset is a multiple of the width.
        unsafe { ptr.read_volatile() }
    }

    #[inline]
    fn store<W: Width>(&mut self, slot: Slot<W>, value: W) {
        let ptr = self.base.wrapping_add(slot.offset()) as *mut W;
        // SAFETY: see `load`.
        unsafe { ptr.write_volatile(value) }
    }
}
