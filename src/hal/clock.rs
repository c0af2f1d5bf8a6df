//! Clock Gating HAL
//!
//! The WEMAC sits behind an AHB clock gate in the A10 clock control module
//! (CCM). Attach opens the gate before the first register access and detach
//! closes it after the last one. Boards that switch the PHY supply through a
//! GPIO wrap the gate in a [`PowerPinGate`].

use embedded_hal::digital::OutputPin;

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::port::RegisterPort;
use crate::internal::register::ccm::{CCM_AHB_GATE_EMAC, CCM_AHB_GATING0_OFFSET};

/// Clock configuration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Clock not configured
    #[default]
    Unconfigured,
    /// Clock enabled
    Enabled,
    /// Clock disabled
    Disabled,
}

// =============================================================================
// Clock Gate Trait
// =============================================================================

/// Enables and disables the clocks feeding the WEMAC
pub trait ClockGate {
    /// Open the gate
    fn enable(&mut self) -> ConfigResult<()>;

    /// Close the gate
    fn disable(&mut self);
}

impl<G: ClockGate + ?Sized> ClockGate for &mut G {
    fn enable(&mut self) -> ConfigResult<()> {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable();
    }
}

// =============================================================================
// AHB Clock Gate
// =============================================================================

/// EMAC AHB gate in the CCM
///
/// Only the EMAC bit of the shared gating register is touched.
#[derive(Debug)]
pub struct AhbClockGate<P: RegisterPort> {
    ccm: P,
    state: ClockState,
}

impl<P: RegisterPort> AhbClockGate<P> {
    /// Create a gate over a port mapping the CCM register window
    pub const fn new(ccm: P) -> Self {
        Self {
            ccm,
            state: ClockState::Unconfigured,
        }
    }

    /// Check if the gate is open
    pub fn is_enabled(&self) -> bool {
        self.state == ClockState::Enabled
    }

    /// Get current clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Consume the gate and return the CCM port
    pub fn release(self) -> P {
        self.ccm
    }
}

impl<P: RegisterPort> ClockGate for AhbClockGate<P> {
    fn enable(&mut self) -> ConfigResult<()> {
        self.ccm.set_bits32(CCM_AHB_GATING0_OFFSET, CCM_AHB_GATE_EMAC);
        if self.ccm.read32(CCM_AHB_GATING0_OFFSET) & CCM_AHB_GATE_EMAC == 0 {
            return Err(ConfigError::ClockError);
        }
        self.state = ClockState::Enabled;
        Ok(())
    }

    fn disable(&mut self) {
        self.ccm.clear_bits32(CCM_AHB_GATING0_OFFSET, CCM_AHB_GATE_EMAC);
        self.state = ClockState::Disabled;
    }
}

// =============================================================================
// PHY Power Pin
// =============================================================================

/// Clock gate that also drives an active-high PHY power pin
///
/// The pin is raised before the inner gate opens and lowered after it closes.
#[derive(Debug)]
pub struct PowerPinGate<G: ClockGate, PIN: OutputPin> {
    inner: G,
    power_pin: PIN,
}

impl<G: ClockGate, PIN: OutputPin> PowerPinGate<G, PIN> {
    /// Wrap `inner` with a power pin
    pub fn new(inner: G, power_pin: PIN) -> Self {
        Self { inner, power_pin }
    }

    /// Consume the wrapper and return the gate and pin
    pub fn release(self) -> (G, PIN) {
        (self.inner, self.power_pin)
    }
}

impl<G: ClockGate, PIN: OutputPin> ClockGate for PowerPinGate<G, PIN> {
    fn enable(&mut self) -> ConfigResult<()> {
        self.power_pin
            .set_high()
            .map_err(|_| ConfigError::GpioError)?;
        if let Err(e) = self.inner.enable() {
            let _ = self.power_pin.set_low();
            return Err(e);
        }
        Ok(())
    }

    fn disable(&mut self) {
        self.inner.disable();
        let _ = self.power_pin.set_low();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
