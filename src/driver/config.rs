//! Configuration types for the WEMAC driver

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_MAC_ADDR, DEFAULT_PHY_ADDR, FLUSH_TIMEOUT, MAX_PHY_ADDR, MII_PULSE_US, WATCHDOG_TICKS,
};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// Link state as last observed by the periodic PHY poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No carrier
    #[default]
    Down,
    /// Link established
    Up,
}

impl LinkState {
    /// Returns `true` if the link is up
    pub const fn is_up(self) -> bool {
        matches!(self, LinkState::Up)
    }
}

/// WEMAC driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not attached
    #[default]
    Uninitialized,
    /// Attached but not started
    Initialized,
    /// Running (TX/RX enabled)
    Running,
    /// Stopped (TX/RX disabled but still attached)
    Stopped,
}

/// Complete WEMAC configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WemacConfig {
    /// MAC address (6 bytes)
    pub mac_address: [u8; 6],
    /// PHY address on the MII bus (0-31)
    pub phy_addr: u8,
    /// Ticks without transmit progress before the device is reinitialized
    pub watchdog_ticks: u8,
    /// Upper bound on polls of the self-clearing RX FIFO flush bit
    pub flush_timeout: u32,
    /// Width of the MII command pulse in microseconds
    pub mii_pulse_us: u32,
    /// Enable promiscuous mode (receive all frames)
    pub promiscuous: bool,
}

impl Default for WemacConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WemacConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            phy_addr: DEFAULT_PHY_ADDR,
            watchdog_ticks: WATCHDOG_TICKS,
            flush_timeout: FLUSH_TIMEOUT,
            mii_pulse_us: MII_PULSE_US,
            promiscuous: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    ///
    /// If not set, the board default 08:08:11:18:12:27 is used.
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY address
    #[must_use]
    pub const fn with_phy_addr(mut self, addr: u8) -> Self {
        self.phy_addr = addr;
        self
    }

    /// Set the watchdog reload value in ticks
    #[must_use]
    pub const fn with_watchdog_ticks(mut self, ticks: u8) -> Self {
        self.watchdog_ticks = ticks;
        self
    }

    /// Set the bound on RX FIFO flush polls
    #[must_use]
    pub const fn with_flush_timeout(mut self, polls: u32) -> Self {
        self.flush_timeout = polls;
        self
    }

    /// Set the MII command pulse width
    #[must_use]
    pub const fn with_mii_pulse_us(mut self, pulse_us: u32) -> Self {
        self.mii_pulse_us = pulse_us;
        self
    }

    /// Enable or disable promiscuous mode
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Check the configuration for values the hardware cannot honor
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress);
        }
        if self.watchdog_ticks == 0 || self.flush_timeout == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
