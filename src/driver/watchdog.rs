//! Link polling and the transmit watchdog.
//!
//! Both run from the periodic tick, never from interrupt context. The tick
//! also acts as the receive polling fallback; the drain loop itself is run
//! by the caller so that frames can be delivered with the lock released.

use embedded_hal::delay::DelayNs;

use super::config::{LinkState, State};
use super::error::IoError;
use super::net::NetworkStack;
use super::rx::RxOutcome;
use super::wemac::Wemac;
use crate::hal::port::RegisterPort;
use crate::internal::phy_regs::standard::bmsr;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// New link state, if it changed since the last tick
    pub link_change: Option<LinkState>,
    /// The watchdog expired and the device was reinitialized
    pub stalled: bool,
    /// Frames resubmitted after a reinitialization
    pub resubmitted: usize,
}

impl TickReport {
    /// The error this tick recovered from, if any
    pub fn error(&self) -> Option<IoError> {
        self.stalled.then_some(IoError::TransmitStalled)
    }
}

impl<P: RegisterPort, D: DelayNs> Wemac<P, D> {
    /// Poll the PHY and track link transitions
    ///
    /// Returns the new state when it differs from the last poll. A steady
    /// link costs one BMSR read. On a transition to up the speed and duplex
    /// are resolved and the MAC is reprogrammed. A failed PHY read leaves
    /// the state untouched.
    pub fn poll_link(&mut self) -> Option<LinkState> {
        let phy = self.phy;
        let bmsr_val = match phy.read_status(&mut self.mii()) {
            Ok(value) => value,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("PHY link poll failed: {}", _e);
                return None;
            }
        };

        let state = if bmsr_val & bmsr::LINK_STATUS != 0 {
            LinkState::Up
        } else {
            LinkState::Down
        };
        if state == self.link {
            return None;
        }

        if state == LinkState::Up {
            let link = match phy.resolve_link(&mut self.mii(), bmsr_val) {
                Ok(link) => link,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("PHY link resolution failed: {}", _e);
                    return None;
                }
            };
            self.apply_link(link.speed, link.duplex);

            #[cfg(feature = "defmt")]
            defmt::info!("link up: {} {}", link.speed, link.duplex);
        } else {
            #[cfg(feature = "defmt")]
            defmt::info!("link down");
        }

        self.link = state;
        Some(state)
    }

    /// Advance the transmit watchdog by one tick
    ///
    /// Returns `true` when it expired. Expiry counts a transmit error and
    /// forces a full reinitialization, which leaves both channels free. The
    /// PHY keeps its link across the MAC reset, so a link that was up is
    /// programmed back with the speed and duplex it negotiated.
    pub fn watchdog_tick(&mut self) -> bool {
        if self.watchdog == 0 {
            return false;
        }
        self.watchdog -= 1;
        if self.watchdog != 0 {
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("transmit stalled, reinitializing (busy mask {})", self.tx.bits());

        self.stats.tx_errors += 1;
        self.stats.watchdog_resets += 1;
        self.state = State::Stopped;

        let negotiated = (self.link == LinkState::Up).then_some((self.speed, self.duplex));
        if let Err(_e) = self.init() {
            #[cfg(feature = "defmt")]
            defmt::warn!("reinitialization failed: {}", _e);
        }
        if let Some((speed, duplex)) = negotiated {
            self.apply_link(speed, duplex);
            self.link = LinkState::Up;
        }
        true
    }

    /// Run the link poll and watchdog for one tick
    ///
    /// After a watchdog reset, queued packets are resubmitted. The receive
    /// drain is left to the caller, see [`drain`](Self::drain).
    pub fn tick<N: NetworkStack + ?Sized>(&mut self, net: &mut N) -> TickReport {
        if self.state != State::Running {
            return TickReport::default();
        }

        let mut report = TickReport {
            link_change: self.poll_link(),
            ..TickReport::default()
        };
        if self.watchdog_tick() {
            report.stalled = true;
            report.resubmitted = self.start_tx(net);
        }
        report
    }

    /// Drain every frame in the RX FIFO into the network stack
    ///
    /// Stops at the first empty FIFO or error. Returns the number of frames
    /// delivered.
    pub fn drain<N: NetworkStack + ?Sized>(&mut self, net: &mut N) -> usize {
        let mut delivered = 0;
        loop {
            match self.drain_one() {
                RxOutcome::Delivered(frame) => {
                    net.deliver(frame);
                    delivered += 1;
                }
                RxOutcome::NoFrame | RxOutcome::Error(_) => break,
            }
        }
        delivered
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
