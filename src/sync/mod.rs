//! Synchronization and Concurrency Support
//!
//! The MAC context is shared by three independent contexts: the interrupt
//! handler, the periodic tick and the control path. This module provides
//! the lock that serializes them and the stop token for the tick:
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], ISR-safe
//!   interior mutability
//! - **Ticker** (`ticker`): [`TickControl`], the cancellable tick
//! - **Shared Wrapper** (`shared`): [`SharedWemac`], the locked MAC context
//!   with the interrupt, tick and control-path entry points
//!
//! # Example
//!
//! ```ignore
//! use a10_wemac::sync::SharedWemac;
//!
//! static WEMAC: SharedWemac<MmioPort, Delay> = SharedWemac::new();
//!
//! fn main() {
//!     WEMAC.install(Wemac::attach(port, delay, &mut clock, config).unwrap()).unwrap();
//!     WEMAC.init().unwrap();
//! }
//!
//! #[interrupt]
//! fn EMAC() {
//!     WEMAC.on_interrupt(&mut stack);
//! }
//! ```

mod primitives;
mod shared;
mod ticker;

pub use primitives::CriticalSectionCell;
pub use shared::SharedWemac;
pub use ticker::{TickControl, TickGuard};
