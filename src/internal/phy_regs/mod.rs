//! PHY Register Definitions
//!
//! This module contains register definitions for PHY devices accessed over the
//! MII management port. These are distinct from the memory-mapped WEMAC
//! registers in [`register`](super::register).
//!
//! # Module Organization
//!
//! - [`standard`] - IEEE 802.3 Clause 22 standard PHY registers (0-15)
//!
//! # Access Method
//!
//! PHY registers are reached through the MADR/MCMD/MRDD/MWTD registers of
//! the MAC, not direct memory mapping.

pub mod standard;
