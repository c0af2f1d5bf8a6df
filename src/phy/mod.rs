//! Ethernet PHY support
//!
//! The PHY layer talks to the transceiver only through the [`MiiBus`]
//! trait, which keeps it independent of the MAC and testable against a mock
//! register file.
//!
//! # Example
//!
//! ```ignore
//! use a10_wemac::hal::RegisterMii;
//! use a10_wemac::phy::GenericPhy;
//!
//! let mut mii = RegisterMii::new(&mut port, &mut delay);
//! let phy = GenericPhy::new(1);
//!
//! phy.probe(&mut mii)?;
//! if let Some(link) = phy.link_status(&mut mii)? {
//!     // program MAC speed/duplex from `link`
//! }
//! ```
//!
//! [`MiiBus`]: crate::hal::MiiBus

pub mod generic;

pub use generic::{GenericPhy, LinkStatus, PhyCapabilities};

// Re-export IEEE 802.3 standard register definitions
pub use crate::internal::phy_regs::standard::{anar, bmcr, bmsr, phy_reg};
