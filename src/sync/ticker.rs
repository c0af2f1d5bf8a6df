//! Cancellation for the periodic tick.
//!
//! The platform owns the timer and calls the tick every
//! [`TICK_PERIOD_MS`](crate::constants::TICK_PERIOD_MS). The
//! driver only needs to know whether a tick may run and whether one is
//! running, so that teardown can wait for it to finish before the hardware
//! goes away.

use super::primitives::CriticalSectionCell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TickState {
    armed: bool,
    in_flight: bool,
}

/// Stop token for the periodic tick
///
/// # Example
///
/// ```ignore
/// static TICK: TickControl = TickControl::new();
///
/// fn on_timer() {
///     if let Some(_guard) = TICK.enter() {
///         // run one tick
///     }
/// }
/// ```
pub struct TickControl {
    state: CriticalSectionCell<TickState>,
}

impl TickControl {
    /// Create a disarmed control (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(TickState {
                armed: false,
                in_flight: false,
            }),
        }
    }

    /// Allow ticks to run
    pub fn arm(&self) {
        self.state.with(|s| s.armed = true);
    }

    /// Check if ticks are allowed to run
    pub fn is_armed(&self) -> bool {
        self.state.get().armed
    }

    /// Check if a tick is running right now
    pub fn is_in_flight(&self) -> bool {
        self.state.get().in_flight
    }

    /// Begin a tick
    ///
    /// Returns `None` once cancelled or while another tick is still running.
    /// The tick ends when the guard is dropped.
    pub fn enter(&self) -> Option<TickGuard<'_>> {
        self.state.with(|s| {
            if !s.armed || s.in_flight {
                return None;
            }
            s.in_flight = true;
            Some(TickGuard { control: self })
        })
    }

    /// Stop future ticks and wait for a running one to finish
    ///
    /// Must not be called from inside a tick.
    pub fn cancel(&self) {
        self.state.with(|s| s.armed = false);
        while self.is_in_flight() {
            core::hint::spin_loop();
        }
    }
}

impl Default for TickControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a tick as running; dropping it ends the tick
pub struct TickGuard<'a> {
    control: &'a TickControl,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.control.state.with(|s| s.in_flight = false);
    }
}
