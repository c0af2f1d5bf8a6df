//! Core WEMAC driver implementation.
//!
//! This module contains the [`Wemac`] MAC context and its control path:
//!
//! - Attach and detach (bring-up, PHY probe, clock gating)
//! - Initialize/stop
//! - Link configuration (speed, duplex, MAC address, promiscuous mode)
//! - MII/PHY register access
//!
//! The packet engine lives in sibling modules:
//! - [`tx`](super::tx): transmit channel allocation
//! - [`rx`](super::rx): receive FIFO draining
//! - [`interrupt`](super::interrupt): interrupt dispatch
//! - [`watchdog`](super::watchdog): link polling and transmit watchdog

use embedded_hal::delay::DelayNs;

use super::config::{Duplex, LinkState, Speed, State, WemacConfig};
use super::error::{ConfigError, Error, IoError, Result};
use super::tx::TxChannels;
use crate::hal::clock::ClockGate;
use crate::hal::mii::{MiiBus, RegisterMii};
use crate::hal::port::RegisterPort;
use crate::internal::constants::{
    FLUSH_SETTLE_US, MAX_FRAME_LEN, PHY_POWER_UP_DELAY_US, RESET_DELAY_US,
};
use crate::internal::phy_regs::standard::{bmcr, phy_reg};
use crate::internal::register::wemac::{
    CTL, CTL_RST, CTL_RX_EN, CTL_TX_EN, INT_CTL, INT_ENABLE_MASK, INT_STA, MAC_A0, MAC_A1,
    MAC_CLRT, MAC_CLRT_COLLISION_WINDOW, MAC_CLRT_RETRANSMIT, MAC_CTL0, MAC_CTL0_SETUP,
    MAC_CTL0_SOFT_RST, MAC_CTL1, MAC_CTL1_DUPLEX, MAC_CTL1_SETUP, MAC_IPGR, MAC_IPGR_IPG1,
    MAC_IPGR_IPG2, MAC_IPGT, MAC_IPGT_FULL_DUPLEX, MAC_IPGT_HALF_DUPLEX, MAC_MAXF, MAC_MCFG,
    MAC_MCFG_CLK_DIV, MAC_MCFG_CLK_MASK, MAC_MCFG_CLK_SHIFT, MAC_SUPP, MAC_SUPP_SPEED_100,
    RX_CTL, RX_CTL_FLUSH, RX_CTL_PASS_ALL, RX_CTL_SETUP, RX_FBC, TX_MODE, TX_MODE_ABORT_EN,
};
use crate::phy::GenericPhy;

// =============================================================================
// Statistics
// =============================================================================

/// Packet engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WemacStats {
    /// Frames delivered to the network stack
    pub rx_packets: u32,
    /// Frames dropped for lack of a large enough buffer
    pub rx_dropped: u32,
    /// RX FIFO marker mismatches
    pub rx_framing_errors: u32,
    /// RX FIFO flushes that did not complete in time
    pub rx_flush_timeouts: u32,
    /// Frames handed to a transmit channel
    pub tx_packets: u32,
    /// Aborted, oversized or stalled transmissions
    pub tx_errors: u32,
    /// Forced reinitializations after a transmit stall
    pub watchdog_resets: u32,
}

// =============================================================================
// WEMAC Driver
// =============================================================================

/// Allwinner A10 WEMAC driver
///
/// This is the MAC context: it owns the register port and holds every piece
/// of state the packet engine shares between the interrupt handler, the
/// periodic tick and control-path calls. It has no internal locking; wrap
/// it in [`SharedWemac`](crate::sync::SharedWemac) to use it from several
/// execution contexts.
///
/// # Type Parameters
/// * `P` - Register port mapping the WEMAC window
/// * `D` - Delay provider for reset and MII timing
///
/// # Example
/// ```ignore
/// let port = unsafe { MmioPort::new(WEMAC_BASE, WEMAC_SIZE)? };
/// let mut clock = AhbClockGate::new(unsafe { MmioPort::new(CCM_BASE, 0x400)? });
///
/// let mut wemac = Wemac::attach(port, delay, &mut clock, WemacConfig::default())?;
/// wemac.init()?;
/// ```
///
/// # Module Organization
///
/// The driver is split across several modules for clarity:
/// - Control path (this module): attach, init, stop, configuration
/// - [`tx`](super::tx): channel allocation and FIFO writes
/// - [`rx`](super::rx): FIFO draining and recovery
/// - [`interrupt`](super::interrupt): interrupt servicing
/// - [`watchdog`](super::watchdog): the periodic tick
pub struct Wemac<P: RegisterPort, D: DelayNs> {
    /// Register port
    pub(super) port: P,
    /// Delay provider
    pub(super) delay: D,
    /// Current configuration
    pub(super) config: WemacConfig,
    /// Attached PHY
    pub(super) phy: GenericPhy,
    /// Current state
    pub(super) state: State,
    /// MAC address
    pub(super) mac_addr: [u8; 6],
    /// Current link speed
    pub(super) speed: Speed,
    /// Current duplex mode
    pub(super) duplex: Duplex,
    /// Link state from the last PHY poll
    pub(super) link: LinkState,
    /// Busy transmit channels
    pub(super) tx: TxChannels,
    /// Watchdog countdown in ticks, 0 = disarmed
    pub(super) watchdog: u8,
    /// RX completion gate: set when no receive is in flight
    pub(super) rx_idle: bool,
    /// Last value written to INT_CTL
    pub(super) int_mask: u32,
    /// Counters
    pub(super) stats: WemacStats,
}

impl<P: RegisterPort, D: DelayNs> Wemac<P, D> {
    // =========================================================================
    // Attach / Detach
    // =========================================================================

    /// Bring up the controller and probe its PHY
    ///
    /// The clock gate is opened before the first register access. If the
    /// PHY does not answer, the registers are quiesced and the gate closed
    /// again before returning.
    ///
    /// After attach the driver is in the `Initialized` state with interrupts
    /// masked. Call [`init`](Self::init) to start it.
    ///
    /// # Errors
    /// - `InvalidConfig` / `InvalidPhyAddress` - configuration rejected
    /// - `ClockError` / `GpioError` - the clock gate failed to open
    /// - `ResourceUnavailable` - no PHY at the configured address
    pub fn attach<C: ClockGate>(
        port: P,
        delay: D,
        clock: &mut C,
        config: WemacConfig,
    ) -> Result<Self> {
        config.validate()?;
        clock.enable()?;

        let mut wemac = Self {
            port,
            delay,
            phy: GenericPhy::new(config.phy_addr),
            mac_addr: config.mac_address,
            config,
            state: State::Uninitialized,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
            link: LinkState::Down,
            tx: TxChannels::EMPTY,
            watchdog: 0,
            rx_idle: true,
            int_mask: 0,
            stats: WemacStats::default(),
        };

        wemac.configure_mac_defaults();
        wemac.reset();

        let phy = wemac.phy;
        if let Err(e) = phy.probe(&mut wemac.mii()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("no PHY at address {}", wemac.config.phy_addr);

            wemac.quiesce();
            clock.disable();
            return Err(match e {
                Error::Io(_) => ConfigError::ResourceUnavailable.into(),
                config_error => config_error,
            });
        }

        let addr = wemac.mac_addr;
        wemac.write_station_address(&addr);
        wemac.port.write32(CTL, CTL_RST | CTL_TX_EN | CTL_RX_EN);

        wemac.state = State::Initialized;
        Ok(wemac)
    }

    /// Stop the controller, close the clock gate and release the port
    pub fn detach<C: ClockGate>(mut self, clock: &mut C) -> P {
        self.quiesce();
        clock.disable();
        self.state = State::Uninitialized;
        self.port
    }

    /// Program the MAC registers with their power-on configuration
    fn configure_mac_defaults(&mut self) {
        // Flush RX FIFO
        self.port.set_bits32(RX_CTL, RX_CTL_FLUSH);
        self.delay.delay_us(FLUSH_SETTLE_US);

        // Release MAC soft reset
        self.port.clear_bits32(MAC_CTL0, MAC_CTL0_SOFT_RST);

        // MII management clock
        self.port.modify32(MAC_MCFG, |v| {
            (v & !MAC_MCFG_CLK_MASK) | (MAC_MCFG_CLK_DIV << MAC_MCFG_CLK_SHIFT)
        });

        // Clear RX counter
        self.port.write32(RX_FBC, 0);

        // Disable and acknowledge all interrupts
        self.mask_interrupts();
        let pending = self.port.read32(INT_STA);
        self.port.write32(INT_STA, pending);
        self.delay.delay_us(FLUSH_SETTLE_US);

        self.port.set_bits32(MAC_CTL0, MAC_CTL0_SETUP);

        // Duplex follows the PHY's current BMCR
        let full_duplex = self.read_phy(phy_reg::BMCR).map_or(true, |v| v & bmcr::DUPLEX_FULL != 0);
        self.duplex = if full_duplex { Duplex::Full } else { Duplex::Half };
        self.port.modify32(MAC_CTL1, |v| {
            let v = v | MAC_CTL1_SETUP;
            if full_duplex { v | MAC_CTL1_DUPLEX } else { v }
        });

        self.port.write32(MAC_IPGT, ipgt_for(self.duplex));
        self.port.write32(MAC_IPGR, MAC_IPGR_IPG2 | (MAC_IPGR_IPG1 << 8));
        self.port.write32(MAC_CLRT, MAC_CLRT_RETRANSMIT | (MAC_CLRT_COLLISION_WINDOW << 8));
        self.port.write32(MAC_MAXF, MAX_FRAME_LEN as u32);
    }

    /// Pulse the global reset
    fn reset(&mut self) {
        self.port.write32(CTL, 0);
        self.delay.delay_us(RESET_DELAY_US);
        self.port.write32(CTL, CTL_RST);
        self.delay.delay_us(RESET_DELAY_US);
    }

    /// Mask interrupts and disable the datapath
    fn quiesce(&mut self) {
        self.mask_interrupts();
        self.port.write32(CTL, 0);
    }

    // =========================================================================
    // Initialize / Stop
    // =========================================================================

    /// Initialize the datapath and start the driver
    ///
    /// Resets the MAC, powers up the PHY, adopts its speed and duplex, then
    /// enables RX/TX and interrupts. Any in-flight transmission is forgotten:
    /// the channel mask is cleared and the watchdog disarmed. The link is
    /// marked down so the next poll resolves it again.
    ///
    /// # Errors
    /// - `InvalidState` - driver not attached
    pub fn init(&mut self) -> Result<()> {
        if self.state == State::Uninitialized {
            return Err(IoError::InvalidState.into());
        }

        self.reset();

        // Power up the PHY and let it settle
        let phy = self.phy;
        let bmcr_val = match phy.power_up(&mut self.mii()) {
            Ok(_) => {
                self.delay.delay_us(PHY_POWER_UP_DELAY_US);
                self.read_phy(phy_reg::BMCR).unwrap_or(0)
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("PHY power-up failed: {}", _e);
                0
            }
        };
        let status = crate::phy::generic::ieee802_3::status_from_bmcr(bmcr_val);
        self.apply_link(status.speed, status.duplex);

        self.port.set_bits32(CTL, CTL_RST | CTL_TX_EN | CTL_RX_EN);
        self.arm_interrupts();
        self.port.set_bits32(TX_MODE, TX_MODE_ABORT_EN);
        self.port.set_bits32(RX_CTL, RX_CTL_SETUP);
        if self.config.promiscuous {
            self.port.set_bits32(RX_CTL, RX_CTL_PASS_ALL);
        }

        self.tx = TxChannels::EMPTY;
        self.watchdog = 0;
        self.rx_idle = true;
        self.link = LinkState::Down;
        self.state = State::Running;
        Ok(())
    }

    /// Stop the driver (disable interrupts, TX and RX)
    ///
    /// # Errors
    /// - `InvalidState` - driver is not running
    pub fn stop(&mut self) -> Result<()> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }

        self.mask_interrupts();
        self.port.clear_bits32(CTL, CTL_TX_EN | CTL_RX_EN);

        self.tx = TxChannels::EMPTY;
        self.watchdog = 0;
        self.rx_idle = true;
        self.state = State::Stopped;
        Ok(())
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the current MAC address
    #[inline(always)]
    pub fn mac_address(&self) -> &[u8; 6] {
        &self.mac_addr
    }

    /// Get the current link speed
    #[inline(always)]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Get the current duplex mode
    #[inline(always)]
    pub fn duplex(&self) -> Duplex {
        self.duplex
    }

    /// Get the link state from the last poll
    #[inline(always)]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Get the remaining watchdog ticks (0 = disarmed)
    #[inline(always)]
    pub fn watchdog_ticks(&self) -> u8 {
        self.watchdog
    }

    /// Get the value last written to the interrupt mask
    #[inline(always)]
    pub fn interrupt_mask(&self) -> u32 {
        self.int_mask
    }

    /// Check whether the RX completion gate is open
    #[inline(always)]
    pub fn rx_idle(&self) -> bool {
        self.rx_idle
    }

    /// Get the packet counters
    #[inline(always)]
    pub fn stats(&self) -> &WemacStats {
        &self.stats
    }

    /// Get the active configuration
    pub fn config(&self) -> &WemacConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    #[cfg(test)]
    pub(crate) fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the station address
    pub fn set_mac_address(&mut self, addr: &[u8; 6]) {
        self.mac_addr = *addr;
        self.write_station_address(addr);
    }

    fn write_station_address(&mut self, addr: &[u8; 6]) {
        let high = (addr[0] as u32) << 16 | (addr[1] as u32) << 8 | addr[2] as u32;
        let low = (addr[3] as u32) << 16 | (addr[4] as u32) << 8 | addr[5] as u32;
        self.port.write32(MAC_A1, high);
        self.port.write32(MAC_A0, low);
    }

    /// Enable or disable promiscuous mode
    pub fn set_promiscuous(&mut self, enable: bool) {
        self.config.promiscuous = enable;
        if enable {
            self.port.set_bits32(RX_CTL, RX_CTL_PASS_ALL);
        } else {
            self.port.clear_bits32(RX_CTL, RX_CTL_PASS_ALL);
        }
    }

    /// Program the MAC for the given link parameters
    pub fn set_link(&mut self, speed: Speed, duplex: Duplex) {
        self.apply_link(speed, duplex);
    }

    pub(super) fn apply_link(&mut self, speed: Speed, duplex: Duplex) {
        self.port.modify32(MAC_SUPP, |v| match speed {
            Speed::Mbps100 => v | MAC_SUPP_SPEED_100,
            Speed::Mbps10 => v & !MAC_SUPP_SPEED_100,
        });
        self.port.modify32(MAC_CTL1, |v| match duplex {
            Duplex::Full => v | MAC_CTL1_DUPLEX,
            Duplex::Half => v & !MAC_CTL1_DUPLEX,
        });
        self.port.write32(MAC_IPGT, ipgt_for(duplex));
        self.speed = speed;
        self.duplex = duplex;
    }

    // =========================================================================
    // Interrupt Mask
    // =========================================================================

    /// Disable every interrupt source
    pub(super) fn mask_interrupts(&mut self) {
        self.port.write32(INT_CTL, 0);
        self.int_mask = 0;
    }

    /// Re-enable the RX and TX interrupt sources
    pub(super) fn arm_interrupts(&mut self) {
        let mask = self.port.read32(INT_CTL) | INT_ENABLE_MASK;
        self.port.write32(INT_CTL, mask);
        self.int_mask = mask;
    }

    // =========================================================================
    // PHY Access
    // =========================================================================

    pub(super) fn mii(&mut self) -> RegisterMii<'_, P, D> {
        RegisterMii::with_pulse(&mut self.port, &mut self.delay, self.config.mii_pulse_us)
    }

    /// Read a register of the attached PHY
    pub fn read_phy(&mut self, reg: u8) -> Result<u16> {
        let addr = self.phy.address();
        self.mii().read(addr, reg)
    }

    /// Write a register of the attached PHY
    pub fn write_phy(&mut self, reg: u8, value: u16) -> Result<()> {
        let addr = self.phy.address();
        self.mii().write(addr, reg, value)
    }
}

/// Back-to-back inter-packet gap for a duplex mode
const fn ipgt_for(duplex: Duplex) -> u32 {
    match duplex {
        Duplex::Full => MAC_IPGT_FULL_DUPLEX,
        Duplex::Half => MAC_IPGT_HALF_DUPLEX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
