//! MII Management HAL
//!
//! The WEMAC runs the management cycle itself; software only programs the
//! address, pulses the command register and then moves the data word. The
//! controller has no busy flag, so each cycle waits a fixed pulse width.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, Result};
use crate::hal::port::RegisterPort;
use crate::internal::constants::{MAX_PHY_ADDR, MAX_PHY_REG, MII_PULSE_US};
use crate::internal::register::wemac::{
    MAC_MADR, MAC_MADR_PHY_SHIFT, MAC_MCMD, MAC_MCMD_READ, MAC_MRDD, MAC_MWTD,
};

// =============================================================================
// MII Bus Trait
// =============================================================================

/// Trait for MII management bus operations
///
/// This trait can be implemented by different backends, allowing the PHY
/// helpers to work with the WEMAC controller or with a test double.
pub trait MiiBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

impl<M: MiiBus + ?Sized> MiiBus for &mut M {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        (**self).read(phy_addr, reg_addr)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        (**self).write(phy_addr, reg_addr, value)
    }
}

// =============================================================================
// Register-Backed MII Controller
// =============================================================================

/// MII controller driving the WEMAC management registers
///
/// Borrows the register port and delay for the duration of one or more
/// management cycles. Callers hold the MAC context lock while it exists.
pub struct RegisterMii<'a, P: RegisterPort, D: DelayNs> {
    port: &'a mut P,
    delay: &'a mut D,
    pulse_us: u32,
}

impl<'a, P: RegisterPort, D: DelayNs> RegisterMii<'a, P, D> {
    /// Create a controller with the default command pulse width
    pub fn new(port: &'a mut P, delay: &'a mut D) -> Self {
        Self::with_pulse(port, delay, MII_PULSE_US)
    }

    /// Create a controller with a custom command pulse width
    pub fn with_pulse(port: &'a mut P, delay: &'a mut D, pulse_us: u32) -> Self {
        Self {
            port,
            delay,
            pulse_us,
        }
    }

    fn validate(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_PHY_REG {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }

    /// Select the PHY register and pulse the command register
    fn cycle(&mut self, phy_addr: u8, reg_addr: u8) {
        let madr = ((phy_addr as u32) << MAC_MADR_PHY_SHIFT) | reg_addr as u32;
        self.port.write32(MAC_MADR, madr);
        self.port.write32(MAC_MCMD, MAC_MCMD_READ);
        self.delay.delay_us(self.pulse_us);
        self.port.write32(MAC_MCMD, 0);
    }
}

impl<P: RegisterPort, D: DelayNs> MiiBus for RegisterMii<'_, P, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::validate(phy_addr, reg_addr)?;
        self.cycle(phy_addr, reg_addr);
        Ok((self.port.read32(MAC_MRDD) & 0xFFFF) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::validate(phy_addr, reg_addr)?;
        self.cycle(phy_addr, reg_addr);
        self.port.write32(MAC_MWTD, value as u32);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
