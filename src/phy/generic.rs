//! Generic Clause 22 PHY
//!
//! The WEMAC boards carry simple 10/100 PHYs that need nothing beyond the
//! IEEE 802.3 standard registers, so one generic driver covers them.

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::{ConfigError, Result};
use crate::hal::mii::MiiBus;
use crate::internal::phy_regs::standard::{bmsr, phy_reg};

// =============================================================================
// Link Status
// =============================================================================

/// Ethernet link status information
///
/// Contains the negotiated or configured link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// Create a new link status
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 10 Mbps Half Duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }
}

// =============================================================================
// PHY Capabilities
// =============================================================================

/// PHY technology abilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyCapabilities {
    /// Supports 100BASE-TX Full Duplex
    pub speed_100_fd: bool,
    /// Supports 100BASE-TX Half Duplex
    pub speed_100_hd: bool,
    /// Supports 10BASE-T Full Duplex
    pub speed_10_fd: bool,
    /// Supports 10BASE-T Half Duplex
    pub speed_10_hd: bool,
    /// Supports auto-negotiation
    pub auto_negotiation: bool,
}

impl PhyCapabilities {
    /// Highest-priority mode present in this ability set
    pub const fn best(&self) -> Option<LinkStatus> {
        if self.speed_100_fd {
            Some(LinkStatus::new(Speed::Mbps100, Duplex::Full))
        } else if self.speed_100_hd {
            Some(LinkStatus::new(Speed::Mbps100, Duplex::Half))
        } else if self.speed_10_fd {
            Some(LinkStatus::new(Speed::Mbps10, Duplex::Full))
        } else if self.speed_10_hd {
            Some(LinkStatus::new(Speed::Mbps10, Duplex::Half))
        } else {
            None
        }
    }
}

// =============================================================================
// Generic PHY
// =============================================================================

/// Generic IEEE 802.3 PHY at a fixed MII address
#[derive(Debug, Clone, Copy)]
pub struct GenericPhy {
    addr: u8,
}

impl GenericPhy {
    /// Create a PHY handle for the given address
    pub const fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// Get the PHY address (0-31)
    pub const fn address(&self) -> u8 {
        self.addr
    }

    /// Check that a PHY answers at this address
    ///
    /// Returns the PHY identifier, or [`ConfigError::ResourceUnavailable`]
    /// when the ID registers read as all zeros or all ones.
    pub fn probe<M: MiiBus>(&self, mii: &mut M) -> Result<u32> {
        let id = ieee802_3::read_phy_id(mii, self.addr)?;
        if id == 0 || id == 0xFFFF_FFFF {
            return Err(ConfigError::ResourceUnavailable.into());
        }
        Ok(id)
    }

    /// Clear the power-down bit and return the resulting BMCR
    pub fn power_up<M: MiiBus>(&self, mii: &mut M) -> Result<u16> {
        ieee802_3::power_up(mii, self.addr)
    }

    /// Read BMSR
    pub fn read_status<M: MiiBus>(&self, mii: &mut M) -> Result<u16> {
        mii.read(self.addr, phy_reg::BMSR)
    }

    /// Resolve speed and duplex for a link that is up
    ///
    /// `bmsr_val` is a BMSR value read just before. The ability registers
    /// are consulted only when auto-negotiation completed; otherwise, or
    /// when both ends share no mode, the forced BMCR setting applies.
    pub fn resolve_link<M: MiiBus>(&self, mii: &mut M, bmsr_val: u16) -> Result<LinkStatus> {
        if bmsr_val & bmsr::AN_COMPLETE != 0 {
            if let Some(status) = ieee802_3::negotiated_link(mii, self.addr)? {
                return Ok(status);
            }
        }
        ieee802_3::link_status_from_bmcr(mii, self.addr)
    }

    /// Get current link status with speed/duplex
    ///
    /// Returns `None` if link is down, `Some(LinkStatus)` if link is up.
    pub fn link_status<M: MiiBus>(&self, mii: &mut M) -> Result<Option<LinkStatus>> {
        let bmsr_val = self.read_status(mii)?;
        if bmsr_val & bmsr::LINK_STATUS == 0 {
            return Ok(None);
        }
        self.resolve_link(mii, bmsr_val).map(Some)
    }
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Helper functions using standard IEEE 802.3 registers
pub mod ieee802_3 {
    use super::*;
    use crate::internal::phy_regs::standard::{anar, bmcr};

    /// Read PHY ID from PHYIDR1 and PHYIDR2
    pub fn read_phy_id<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<u32> {
        let id1 = mii.read(phy_addr, phy_reg::PHYIDR1)? as u32;
        let id2 = mii.read(phy_addr, phy_reg::PHYIDR2)? as u32;
        Ok((id1 << 16) | id2)
    }

    /// Clear BMCR power-down, returning the value written
    pub fn power_up<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<u16> {
        let bmcr_val = mii.read(phy_addr, phy_reg::BMCR)? & !bmcr::POWER_DOWN;
        mii.write(phy_addr, phy_reg::BMCR, bmcr_val)?;
        Ok(bmcr_val)
    }

    /// Read capabilities from BMSR
    pub fn read_capabilities<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<PhyCapabilities> {
        let bmsr_val = mii.read(phy_addr, phy_reg::BMSR)?;

        Ok(PhyCapabilities {
            speed_100_fd: (bmsr_val & bmsr::TX_FD_CAPABLE) != 0,
            speed_100_hd: (bmsr_val & bmsr::TX_HD_CAPABLE) != 0,
            speed_10_fd: (bmsr_val & bmsr::T10_FD_CAPABLE) != 0,
            speed_10_hd: (bmsr_val & bmsr::T10_HD_CAPABLE) != 0,
            auto_negotiation: (bmsr_val & bmsr::AN_ABILITY) != 0,
        })
    }

    /// Abilities advertised by both ends (ANAR & ANLPAR)
    pub fn common_abilities<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<PhyCapabilities> {
        let anar_val = mii.read(phy_addr, phy_reg::ANAR)?;
        let anlpar_val = mii.read(phy_addr, phy_reg::ANLPAR)?;
        Ok(abilities_from_word(anar_val & anlpar_val))
    }

    /// Best common mode after auto-negotiation, if any
    pub fn negotiated_link<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<Option<LinkStatus>> {
        Ok(common_abilities(mii, phy_addr)?.best())
    }

    /// Decode an ANAR/ANLPAR ability word
    pub const fn abilities_from_word(word: u16) -> PhyCapabilities {
        PhyCapabilities {
            speed_100_fd: (word & anar::TX_FD) != 0,
            speed_100_hd: (word & anar::TX_HD) != 0,
            speed_10_fd: (word & anar::T10_FD) != 0,
            speed_10_hd: (word & anar::T10_HD) != 0,
            auto_negotiation: true,
        }
    }

    /// Get link status from BMCR (when AN is disabled or for current state)
    pub fn link_status_from_bmcr<M: MiiBus>(mii: &mut M, phy_addr: u8) -> Result<LinkStatus> {
        let bmcr_val = mii.read(phy_addr, phy_reg::BMCR)?;
        Ok(status_from_bmcr(bmcr_val))
    }

    /// Decode forced speed and duplex from a BMCR value
    pub const fn status_from_bmcr(bmcr_val: u16) -> LinkStatus {
        let speed = if (bmcr_val & bmcr::SPEED_100) != 0 {
            Speed::Mbps100
        } else {
            Speed::Mbps10
        };

        let duplex = if (bmcr_val & bmcr::DUPLEX_FULL) != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        };

        LinkStatus::new(speed, duplex)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::error::{Error, IoError};
    use crate::internal::phy_regs::standard::{anar, bmcr, bmsr, phy_reg};
    use crate::testing::MockMii;

    const ADDR: u8 = 1;

    #[test]
    fn probe_accepts_real_id() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::PHYIDR1, 0x0181);
        mii.set_register(ADDR, phy_reg::PHYIDR2, 0xB8A0);

        assert_eq!(GenericPhy::new(ADDR).probe(&mut mii), Ok(0x0181_B8A0));
    }

    #[test]
    fn probe_rejects_absent_phy() {
        let mut mii = MockMii::new();
        assert_eq!(
            GenericPhy::new(ADDR).probe(&mut mii),
            Err(Error::Config(ConfigError::ResourceUnavailable))
        );

        mii.set_register(ADDR, phy_reg::PHYIDR1, 0xFFFF);
        mii.set_register(ADDR, phy_reg::PHYIDR2, 0xFFFF);
        assert_eq!(
            GenericPhy::new(ADDR).probe(&mut mii),
            Err(Error::Config(ConfigError::ResourceUnavailable))
        );
    }

    #[test]
    fn power_up_clears_only_power_down() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::BMCR, bmcr::POWER_DOWN | bmcr::SPEED_100);

        let value = GenericPhy::new(ADDR).power_up(&mut mii).unwrap();
        assert_eq!(value, bmcr::SPEED_100);
        assert_eq!(mii.get_register(ADDR, phy_reg::BMCR), Some(bmcr::SPEED_100));
    }

    #[test]
    fn link_down_reports_none() {
        let mut mii = MockMii::new();
        assert_eq!(GenericPhy::new(ADDR).link_status(&mut mii), Ok(None));
    }

    #[test]
    fn negotiated_link_uses_common_abilities() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::BMSR, bmsr::LINK_STATUS | bmsr::AN_COMPLETE);
        mii.set_register(
            ADDR,
            phy_reg::ANAR,
            anar::TX_FD | anar::TX_HD | anar::T10_FD | anar::T10_HD | anar::SELECTOR_IEEE802_3,
        );
        // Partner lacks 100 full duplex
        mii.set_register(
            ADDR,
            phy_reg::ANLPAR,
            anar::TX_HD | anar::T10_FD | anar::SELECTOR_IEEE802_3,
        );

        let status = GenericPhy::new(ADDR).link_status(&mut mii).unwrap();
        assert_eq!(status, Some(LinkStatus::new(Speed::Mbps100, Duplex::Half)));
    }

    #[test]
    fn forced_link_reads_bmcr() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::BMSR, bmsr::LINK_STATUS);
        mii.set_register(ADDR, phy_reg::BMCR, bmcr::DUPLEX_FULL);

        let status = GenericPhy::new(ADDR).link_status(&mut mii).unwrap();
        assert_eq!(status, Some(LinkStatus::new(Speed::Mbps10, Duplex::Full)));
    }

    #[test]
    fn empty_common_set_falls_back_to_bmcr() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::BMSR, bmsr::LINK_STATUS | bmsr::AN_COMPLETE);
        mii.set_register(ADDR, phy_reg::ANAR, anar::TX_FD);
        mii.set_register(ADDR, phy_reg::ANLPAR, anar::T10_HD);
        mii.set_register(ADDR, phy_reg::BMCR, bmcr::SPEED_100 | bmcr::DUPLEX_FULL);

        let status = GenericPhy::new(ADDR).link_status(&mut mii).unwrap();
        assert_eq!(status, Some(LinkStatus::fast_full()));
    }

    #[test]
    fn resolve_skips_abilities_without_autoneg() {
        let mut mii = MockMii::new();
        mii.set_register(ADDR, phy_reg::ANAR, anar::TX_FD);
        mii.set_register(ADDR, phy_reg::ANLPAR, anar::TX_FD);
        mii.set_register(ADDR, phy_reg::BMCR, 0);

        let phy = GenericPhy::new(ADDR);
        assert_eq!(phy.resolve_link(&mut mii, bmsr::LINK_STATUS), Ok(LinkStatus::slow_half()));
        assert_eq!(
            phy.resolve_link(&mut mii, bmsr::LINK_STATUS | bmsr::AN_COMPLETE),
            Ok(LinkStatus::fast_full())
        );
    }

    #[test]
    fn capabilities_from_bmsr() {
        let mut mii = MockMii::new();
        mii.set_register(
            ADDR,
            phy_reg::BMSR,
            bmsr::TX_FD_CAPABLE | bmsr::T10_HD_CAPABLE | bmsr::AN_ABILITY,
        );

        let caps = ieee802_3::read_capabilities(&mut mii, ADDR).unwrap();
        assert!(caps.speed_100_fd);
        assert!(!caps.speed_100_hd);
        assert!(!caps.speed_10_fd);
        assert!(caps.speed_10_hd);
        assert!(caps.auto_negotiation);
        assert_eq!(caps.best(), Some(LinkStatus::fast_full()));
    }

    #[test]
    fn mii_failures_propagate() {
        let mut mii = MockMii::new();
        mii.fail_reads(true);
        assert_eq!(
            GenericPhy::new(ADDR).link_status(&mut mii),
            Err(Error::Io(IoError::PhyError))
        );
    }

    #[test]
    fn status_from_bmcr_decodes_half_10() {
        assert_eq!(ieee802_3::status_from_bmcr(0), LinkStatus::slow_half());
    }
}
