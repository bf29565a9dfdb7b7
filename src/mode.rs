//! Measurement strategies.
//!
//! A mode fixes the edge trigger, the handler table, the capture bank and the
//! conversion from a raw microsecond sample to an engineering value.

use crate::board::{Board, Trigger};
use crate::capture::{CaptureBank, PERIOD_CHANNELS, PeriodHandlers};
#[cfg(feature = "pulse-width")]
use crate::capture::{PULSE_CHANNELS, PulseHandlers};
use crate::config::ChannelConfig;
#[cfg(feature = "pulse-width")]
use crate::config::PulseUnit;

const MICROS_PER_MINUTE: f32 = 60_000_000.0;

/// Capture strategy for a registry of `N` channels.
pub trait Mode<const N: usize> {
    const TRIGGER: Trigger;

    /// Whether the estimator watches for stopped rotation and spikes.
    const DETECTS_STALL: bool;

    fn bank<B: Board>() -> &'static CaptureBank<N>;

    /// Interrupt entry point for slot `index` (channel `index + 1`).
    fn handler<B: Board>(index: usize) -> fn();

    fn convert(sample_us: u32, config: &ChannelConfig) -> f32;
}

/// Times the interval between rising edges and reports RPM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period;

impl Mode<PERIOD_CHANNELS> for Period {
    const TRIGGER: Trigger = Trigger::Rising;
    const DETECTS_STALL: bool = true;

    fn bank<B: Board>() -> &'static CaptureBank<PERIOD_CHANNELS> {
        &B::captures().period
    }

    fn handler<B: Board>(index: usize) -> fn() {
        PeriodHandlers::<B>::TABLE[index]
    }

    fn convert(sample_us: u32, _config: &ChannelConfig) -> f32 {
        per_minute(sample_us)
    }
}

/// Times the high phase of each pulse.
#[cfg(feature = "pulse-width")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWidth;

#[cfg(feature = "pulse-width")]
impl Mode<PULSE_CHANNELS> for PulseWidth {
    const TRIGGER: Trigger = Trigger::Change;
    const DETECTS_STALL: bool = false;

    fn bank<B: Board>() -> &'static CaptureBank<PULSE_CHANNELS> {
        &B::captures().pulse
    }

    fn handler<B: Board>(index: usize) -> fn() {
        PulseHandlers::<B>::TABLE[index]
    }

    fn convert(sample_us: u32, config: &ChannelConfig) -> f32 {
        match config.unit {
            PulseUnit::PerMinute => per_minute(sample_us),
            PulseUnit::Micros => sample_us as f32,
        }
    }
}

/// Events per minute for one event every `sample_us`. Zero means no sample yet.
#[inline]
fn per_minute(sample_us: u32) -> f32 {
    if sample_us == 0 {
        0.0
    } else {
        MICROS_PER_MINUTE / sample_us as f32
    }
}
