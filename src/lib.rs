//! Edge-timed RPM and pulse-width measurement.
//!
//! Interrupt handlers time the edges of each input line; a periodic
//! [`Registry::update`] converts the latest interval of every active channel
//! into a filtered, bounded value.
//!
//! ```ignore
//! let mut tacho: Tachometer<MyBoard> = Tachometer::new(EstimatorConfig::default());
//! tacho.bind(1, Pin(2))?;
//! tacho.set_filter_cutoff(5)?;
//! tacho.init(1)?;
//!
//! loop {
//!     tacho.update();
//!     let rpm = tacho.channel(1).map_or(0.0, |channel| channel.filtered());
//! }
//! ```

#![no_std]

#[macro_use]
mod fmt;

mod board;
mod capture;
mod channel;
mod config;
mod estimator;
mod registry;
pub mod filters;
pub mod mode;

pub use board::{Board, Pin, Trigger};
pub use capture::{CaptureBank, Captures, EdgeCapture, PERIOD_CHANNELS, Reading};
#[cfg(feature = "pulse-width")]
pub use capture::PULSE_CHANNELS;
pub use channel::{Channel, ChannelState};
pub use config::{ChannelConfig, ConfigError, EstimatorConfig, PulseUnit};
pub use estimator::{
    CycleReport, CycleTiming, FilterState, MAX_RISE_PER_US, STALL_TIMEOUT_US, SampleStatus,
};
pub use mode::{Mode, Period};
#[cfg(feature = "pulse-width")]
pub use mode::PulseWidth;
pub use registry::{Registry, Tachometer};
#[cfg(feature = "pulse-width")]
pub use registry::PulseMeter;
