//! Periodic update step.
//!
//! [`FilterState`] holds what every channel of a registry shares: the time of
//! the last performed cycle, the low-pass gain derived from it, and the most
//! recently published value. [`step`] turns one channel's raw capture into its
//! filtered output.

use heapless::Vec;

use crate::capture::Reading;
use crate::channel::Channel;
use crate::config::EstimatorConfig;
use crate::filters::LowPass;

/// No edge for this long means the shaft has stopped.
pub const STALL_TIMEOUT_US: u32 = 1_000_000;

/// Largest plausible rise of the raw value, in units per microsecond of
/// estimator time. Faster rises are treated as spikes.
pub const MAX_RISE_PER_US: f32 = 10_000.0;

/// Outcome of one channel in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleStatus {
    /// Output advanced toward the new value.
    Accepted,
    /// Value under the minimum, output advanced toward zero.
    BelowMinimum,
    /// No recent edge, output advanced toward zero.
    Stalled,
    /// Implausible jump. Raw value recorded, output held.
    Spike,
    /// Value over the maximum, output held.
    AboveMaximum,
    /// Change absorbed by the dead zone, output advanced toward the held value.
    WithinDeadZone,
}

impl SampleStatus {
    /// Whether the channel's filtered output was written this cycle.
    pub fn published(&self) -> bool {
        !matches!(self, SampleStatus::Spike | SampleStatus::AboveMaximum)
    }
}

/// Timing of a cycle that was allowed to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTiming {
    pub now_us: u32,
    pub dt_us: u32,
    pub gain: f32,
    pub filter: LowPass,
}

/// Per-channel results of one performed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport<const N: usize> {
    pub timing: CycleTiming,
    samples: Vec<(u8, SampleStatus), N>,
}

impl<const N: usize> CycleReport<N> {
    pub(crate) fn new(timing: CycleTiming) -> Self {
        Self {
            timing,
            samples: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, channel: u8, status: SampleStatus) {
        // One entry per slot, so capacity N is never exceeded
        let pushed = self.samples.push((channel, status));
        debug_assert!(pushed.is_ok());
    }

    /// Channel numbers and outcomes, in slot order.
    pub fn samples(&self) -> &[(u8, SampleStatus)] {
        &self.samples
    }

    pub fn status(&self, channel: u8) -> Option<SampleStatus> {
        self.samples
            .iter()
            .find(|(number, _)| *number == channel)
            .map(|(_, status)| *status)
    }
}

/// State shared by all channels of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    last_update_us: u32,
    gain: f32,
    latest: f32,
}

impl FilterState {
    pub const fn new() -> Self {
        Self {
            last_update_us: 0,
            gain: 0.0,
            latest: 0.0,
        }
    }

    /// Start a cycle at `now`, or `None` if the update rate limit says wait.
    ///
    /// A refused cycle changes nothing, including the timing cursor.
    pub fn begin(&mut self, now: u32, config: &EstimatorConfig) -> Option<CycleTiming> {
        let dt_us = now.wrapping_sub(self.last_update_us);

        if let Some(min_interval) = config.min_update_interval_us() {
            if (dt_us as f32) < min_interval {
                return None;
            }
        }

        let filter = config.low_pass();
        self.gain = filter.gain(dt_us);

        Some(CycleTiming {
            now_us: now,
            dt_us,
            gain: self.gain,
            filter,
        })
    }

    pub fn finish(&mut self, timing: &CycleTiming) {
        self.last_update_us = timing.now_us;
    }

    pub(crate) fn publish(&mut self, value: f32) {
        self.latest = value;
    }

    /// Time of the last performed cycle.
    pub fn last_update_us(&self) -> u32 {
        self.last_update_us
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Most recent filtered value written by any channel.
    pub fn latest(&self) -> f32 {
        self.latest
    }
}

/// Run one channel through the estimator.
///
/// `detects_stall` enables the stopped-rotation and spike checks, which only
/// make sense for period measurements.
pub(crate) fn step(
    channel: &mut Channel,
    mut raw: f32,
    reading: Reading,
    timing: &CycleTiming,
    detects_stall: bool,
) -> SampleStatus {
    let config = *channel.config();
    let mut stalled = false;

    if detects_stall {
        if timing.now_us.wrapping_sub(reading.start_us) > STALL_TIMEOUT_US {
            raw = 0.0;
            stalled = true;
        }

        if raw > config.min && (raw - channel.raw()) / timing.dt_us as f32 > MAX_RISE_PER_US {
            channel.record_raw(raw);
            trace!("channel {}: spike to {}, output held", channel.number(), raw);
            return SampleStatus::Spike;
        }
    }

    channel.record_raw(raw);

    let (value, status) = if stalled {
        channel.dead_zone_mut().reset();
        (0.0, SampleStatus::Stalled)
    } else if raw < config.min {
        channel.dead_zone_mut().reset();
        (0.0, SampleStatus::BelowMinimum)
    } else if config.has_max() && raw > config.max {
        trace!("channel {}: {} over max, output held", channel.number(), raw);
        return SampleStatus::AboveMaximum;
    } else {
        match channel.dead_zone_mut().apply(raw, config.dead_zone) {
            (held, true) => (held, SampleStatus::WithinDeadZone),
            (value, false) => (value, SampleStatus::Accepted),
        }
    };

    let filtered = timing.filter.apply(channel.filtered(), value, timing.gain);
    channel.publish(filtered);
    status
}
