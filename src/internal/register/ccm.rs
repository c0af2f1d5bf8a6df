//! Clock Control Module (CCM) register definitions
//!
//! Only the AHB gating bit of the EMAC is used.

/// AHB gating register 0 offset
pub const CCM_AHB_GATING0_OFFSET: usize = 0x60;

/// EMAC AHB clock gate (bit 17)
pub const CCM_AHB_GATE_EMAC: u32 = 1 << 17;
