//! Interrupt status handling for the WEMAC.
//!
//! This module provides the [`InterruptStatus`] structure for parsing
//! INT_STA and the dispatcher that routes a serviced interrupt to the
//! receive and transmit paths.

use embedded_hal::delay::DelayNs;

use super::config::State;
use super::rx::RxOutcome;
use super::tx::{TxChannel, TxChannels};
use super::wemac::Wemac;
use crate::hal::port::RegisterPort;
use crate::internal::register::wemac::{
    INT_RX_READY, INT_STA, INT_TX0_ABORT, INT_TX0_DONE, INT_TX1_ABORT, INT_TX1_DONE,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from INT_STA.
///
/// # Example
///
/// ```ignore
/// let status = InterruptStatus::from_raw(raw);
/// if status.rx_ready {
///     // Drain the RX FIFO
/// }
/// if status.has_error() {
///     // A transmission was aborted
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Channel 0 finished transmitting
    pub tx0_done: bool,
    /// Channel 1 finished transmitting
    pub tx1_done: bool,
    /// Channel 0 frame aborted
    pub tx0_abort: bool,
    /// Channel 1 frame aborted
    pub tx1_abort: bool,
    /// Frame waiting in the RX FIFO
    pub rx_ready: bool,
}

impl InterruptStatus {
    /// Create from raw INT_STA value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            tx0_done: (status & INT_TX0_DONE) != 0,
            tx1_done: (status & INT_TX1_DONE) != 0,
            tx0_abort: (status & INT_TX0_ABORT) != 0,
            tx1_abort: (status & INT_TX1_ABORT) != 0,
            rx_ready: (status & INT_RX_READY) != 0,
        }
    }

    /// Convert back to the raw register layout
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.tx0_done {
            val |= INT_TX0_DONE;
        }
        if self.tx1_done {
            val |= INT_TX1_DONE;
        }
        if self.tx0_abort {
            val |= INT_TX0_ABORT;
        }
        if self.tx1_abort {
            val |= INT_TX1_ABORT;
        }
        if self.rx_ready {
            val |= INT_RX_READY;
        }
        val
    }

    /// Check if any known source is pending
    #[inline]
    pub fn any(&self) -> bool {
        self.rx_ready || self.tx_any()
    }

    /// Check if any transmit completion or abort is pending
    #[inline]
    pub fn tx_any(&self) -> bool {
        self.tx0_done || self.tx1_done || self.tx0_abort || self.tx1_abort
    }

    /// Check if a transmission was aborted
    #[inline]
    pub fn has_error(&self) -> bool {
        self.tx0_abort || self.tx1_abort
    }

    /// Check whether `channel` completed
    #[inline]
    pub fn is_done(&self, channel: TxChannel) -> bool {
        match channel {
            TxChannel::Ch0 => self.tx0_done,
            TxChannel::Ch1 => self.tx1_done,
        }
    }

    /// Check whether `channel` aborted
    #[inline]
    pub fn is_aborted(&self, channel: TxChannel) -> bool {
        match channel {
            TxChannel::Ch0 => self.tx0_abort,
            TxChannel::Ch1 => self.tx1_abort,
        }
    }
}

/// What one interrupt service pass did
#[derive(Debug)]
pub struct IrqOutcome {
    /// Status read from (and cleared in) INT_STA
    pub status: InterruptStatus,
    /// Result of the receive drain, if one ran
    pub rx: Option<RxOutcome>,
    /// Channels released by this interrupt
    pub completed: TxChannels,
}

impl IrqOutcome {
    const fn idle(status: InterruptStatus) -> Self {
        Self {
            status,
            rx: None,
            completed: TxChannels::EMPTY,
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

impl<P: RegisterPort, D: DelayNs> Wemac<P, D> {
    /// Service the interrupt line
    ///
    /// Masks every source, then reads INT_STA and writes the same value back
    /// to acknowledge it. A pending RX-ready drains one frame, but only while
    /// the completion gate is open. TX completions and aborts release their
    /// channels. The mask is re-armed only if the gate is open at the end;
    /// otherwise the next tick re-arms it.
    pub fn service_interrupt(&mut self) -> IrqOutcome {
        self.mask_interrupts();
        let raw = self.port.read32(INT_STA);
        self.port.write32(INT_STA, raw);
        let status = InterruptStatus::from_raw(raw);

        if self.state != State::Running {
            return IrqOutcome::idle(status);
        }

        let mut outcome = IrqOutcome::idle(status);
        if status.rx_ready && self.rx_idle {
            self.rx_idle = false;
            outcome.rx = Some(self.drain_one());
        }

        if status.tx_any() {
            outcome.completed = self.complete_tx(&status);
        }

        if self.rx_idle {
            self.arm_interrupts();
        }
        outcome
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
