//! ISR-safe WEMAC wrapper using critical sections.
//!
//! Provides [`SharedWemac`], the single lock around the MAC context shared
//! by the interrupt handler, the periodic tick and the control path.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use super::ticker::TickControl;
use crate::driver::config::State;
use crate::driver::error::{ConfigError, ConfigResult, IoError, Result};
use crate::driver::net::NetworkStack;
use crate::driver::rx::RxOutcome;
use crate::driver::watchdog::TickReport;
use crate::driver::wemac::Wemac;
use crate::hal::port::RegisterPort;

/// ISR-safe WEMAC wrapper using critical sections.
///
/// Every register access and every MAC context update runs inside
/// `critical_section::with()`. Network stack upcalls (frame delivery, link
/// and completion notifications) run after the critical section ends, so the
/// stack may call back into the wrapper.
///
/// Stopping cancels the tick first and waits for a running one, then takes
/// the lock.
///
/// # Example
///
/// ```ignore
/// static WEMAC: SharedWemac<MmioPort, Delay> = SharedWemac::new();
///
/// WEMAC.install(Wemac::attach(port, delay, &mut clock, config)?)?;
/// WEMAC.init()?;
///
/// #[interrupt]
/// fn EMAC() {
///     WEMAC.on_interrupt(&mut stack);
/// }
///
/// fn on_timer() {
///     WEMAC.tick(&mut stack);
/// }
/// ```
pub struct SharedWemac<P: RegisterPort, D: DelayNs> {
    inner: CriticalSectionCell<Option<Wemac<P, D>>>,
    ticker: TickControl,
}

impl<P: RegisterPort, D: DelayNs> SharedWemac<P, D> {
    /// Create an empty wrapper (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
            ticker: TickControl::new(),
        }
    }

    /// Hand an attached driver to the wrapper
    ///
    /// # Errors
    /// - `AlreadyInitialized` - a driver is already installed
    pub fn install(&self, wemac: Wemac<P, D>) -> ConfigResult<()> {
        self.inner.with(|slot| {
            if slot.is_some() {
                return Err(ConfigError::AlreadyInitialized);
            }
            *slot = Some(wemac);
            Ok(())
        })
    }

    /// Cancel the tick and take the driver back out
    pub fn take(&self) -> Option<Wemac<P, D>> {
        self.ticker.cancel();
        self.inner.replace(None)
    }

    /// Check if a driver is installed
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Returns `None` if no driver is installed. Interrupts are disabled for
    /// the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Wemac<P, D>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Wemac<P, D>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }

    /// Tick cancellation state
    pub fn ticker(&self) -> &TickControl {
        &self.ticker
    }

    // =========================================================================
    // Control Path
    // =========================================================================

    /// Initialize the driver and arm the tick
    ///
    /// # Errors
    /// - `InvalidState` - no driver installed, or it is not attached
    pub fn init(&self) -> Result<()> {
        self.with(Wemac::init)
            .unwrap_or(Err(IoError::InvalidState.into()))?;
        self.ticker.arm();
        Ok(())
    }

    /// Cancel the tick, then stop the driver
    ///
    /// # Errors
    /// - `InvalidState` - no driver installed, or it is not running
    pub fn stop(&self) -> Result<()> {
        self.ticker.cancel();
        self.with(Wemac::stop)
            .unwrap_or(Err(IoError::InvalidState.into()))
    }

    /// Start queued packets on free transmit channels
    pub fn send<N: NetworkStack + ?Sized>(&self, net: &mut N) -> usize {
        self.with(|w| w.start_tx(net)).unwrap_or(0)
    }

    // =========================================================================
    // Interrupt and Tick Entry Points
    // =========================================================================

    /// Interrupt handler entry point
    ///
    /// Services the interrupt under the lock, then delivers the frame it
    /// read, reports released channels and refills them. If a frame was
    /// read, the FIFO is drained until empty. Returns the number of frames
    /// delivered.
    pub fn on_interrupt<N: NetworkStack + ?Sized>(&self, net: &mut N) -> usize {
        let Some(outcome) = self.with(Wemac::service_interrupt) else {
            return 0;
        };

        let mut delivered = 0;
        let more = match outcome.rx {
            Some(RxOutcome::Delivered(frame)) => {
                net.deliver(frame);
                delivered += 1;
                true
            }
            _ => false,
        };

        if !outcome.completed.is_empty() {
            net.tx_completed(outcome.completed);
            self.send(net);
        }

        if more {
            delivered += self.drain(net);
        }
        delivered
    }

    /// Periodic tick entry point
    ///
    /// Polls the link, advances the watchdog, then drains the RX FIFO as a
    /// fallback for missed or masked interrupts. Returns `None` when the
    /// tick is cancelled, not yet armed, or already running elsewhere.
    pub fn tick<N: NetworkStack + ?Sized>(&self, net: &mut N) -> Option<TickReport> {
        let _guard = self.ticker.enter()?;

        let report = self.with(|w| w.tick(net))?;
        if let Some(state) = report.link_change {
            net.link_changed(state);
        }

        let running = self.with(|w| w.state() == State::Running).unwrap_or(false);
        if running {
            self.drain(net);
        }
        Some(report)
    }

    /// Deliver every frame in the RX FIFO
    ///
    /// Each frame is read under the lock and delivered with it released.
    /// Stops at an empty FIFO or a framing error. Returns the number of
    /// frames delivered.
    pub fn drain<N: NetworkStack + ?Sized>(&self, net: &mut N) -> usize {
        let mut delivered = 0;
        while let Some(RxOutcome::Delivered(frame)) = self.with(Wemac::drain_one) {
            net.deliver(frame);
            delivered += 1;
        }
        delivered
    }
}

impl<P: RegisterPort, D: DelayNs> Default for SharedWemac<P, D> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
