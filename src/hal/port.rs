//! Register Port
//!
//! Every register and FIFO access made by the packet engine goes through a
//! [`RegisterPort`]. Offsets are byte offsets inside the WEMAC register
//! window (see [`crate::unsafe_registers::wemac`]).
//!
//! Two implementations exist:
//! - [`MmioPort`]: volatile accesses to a memory-mapped window
//! - the register simulator used by the unit tests
//!
//! The FIFO data ports are 16 bits wide on the bus, which is why the trait
//! carries separate 16-bit accessors. Implementations that only model 32-bit
//! accesses get a zero-extending default.

use crate::driver::error::{ConfigError, ConfigResult};

// =============================================================================
// Register Port Trait
// =============================================================================

/// Ordered 32-bit and 16-bit access to the WEMAC register window
///
/// Accesses must reach the device in program order. Implementations must not
/// coalesce, reorder or elide reads and writes, since reading the FIFO data
/// ports pops data and writing INT_STA acknowledges interrupts.
pub trait RegisterPort {
    /// Read a 32-bit register
    fn read32(&mut self, offset: usize) -> u32;

    /// Write a 32-bit register
    fn write32(&mut self, offset: usize, value: u32);

    /// Read one 16-bit unit (FIFO data ports)
    fn read16(&mut self, offset: usize) -> u16 {
        self.read32(offset) as u16
    }

    /// Write one 16-bit unit (FIFO data ports)
    fn write16(&mut self, offset: usize, value: u16) {
        self.write32(offset, value as u32);
    }

    /// Read-modify-write a 32-bit register
    fn modify32<F: FnOnce(u32) -> u32>(&mut self, offset: usize, f: F) {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }

    /// Set bits in a 32-bit register
    fn set_bits32(&mut self, offset: usize, bits: u32) {
        self.modify32(offset, |v| v | bits);
    }

    /// Clear bits in a 32-bit register
    fn clear_bits32(&mut self, offset: usize, bits: u32) {
        self.modify32(offset, |v| v & !bits);
    }
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }

    fn read16(&mut self, offset: usize) -> u16 {
        (**self).read16(offset)
    }

    fn write16(&mut self, offset: usize, value: u16) {
        (**self).write16(offset, value);
    }
}

// =============================================================================
// Memory-Mapped Port
// =============================================================================

/// Register port backed by a memory-mapped window
#[derive(Debug)]
pub struct MmioPort {
    base: usize,
    size: usize,
}

impl MmioPort {
    /// Create a port for the window at `base` spanning `size` bytes
    ///
    /// Returns [`ConfigError::ResourceUnavailable`] if the window is empty,
    /// null or not 32-bit aligned.
    ///
    /// # Safety
    ///
    /// `base..base + size` must be a device register window that stays mapped
    /// for the lifetime of the port, and no other code may access it while the
    /// port exists.
    pub unsafe fn new(base: usize, size: usize) -> ConfigResult<Self> {
        if base == 0 || size == 0 || base % 4 != 0 {
            return Err(ConfigError::ResourceUnavailable);
        }
        Ok(Self { base, size })
    }

    /// Base address of the window
    pub fn base(&self) -> usize {
        self.base
    }

    /// Size of the window in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    fn addr(&self, offset: usize) -> usize {
        debug_assert!(offset < self.size, "register offset outside the window");
        self.base + offset
    }
}

impl RegisterPort for MmioPort {
    #[inline(always)]
    fn read32(&mut self, offset: usize) -> u32 {
        // SAFETY: the window was declared valid device memory in `new`.
        unsafe { core::ptr::read_volatile(self.addr(offset) as *const u32) }
    }

    #[inline(always)]
    fn write32(&mut self, offset: usize, value: u32) {
        // SAFETY: the window was declared valid device memory in `new`.
        unsafe { core::ptr::write_volatile(self.addr(offset) as *mut u32, value) }
    }

    #[inline(always)]
    fn read16(&mut self, offset: usize) -> u16 {
        // SAFETY: the window was declared valid device memory in `new`.
        unsafe { core::ptr::read_volatile(self.addr(offset) as *const u16) }
    }

    #[inline(always)]
    fn write16(&mut self, offset: usize, value: u16) {
        // SAFETY: the window was declared valid device memory in `new`.
        unsafe { core::ptr::write_volatile(self.addr(offset) as *mut u16, value) }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
