use core::marker::PhantomData;

use num_traits::AsPrimitive;

use crate::board::{Board, Pin};
use crate::capture::PERIOD_CHANNELS;
#[cfg(feature = "pulse-width")]
use crate::capture::PULSE_CHANNELS;
use crate::channel::Channel;
use crate::config::{self, ConfigError, EstimatorConfig};
use crate::estimator::{self, CycleReport, FilterState};
use crate::mode::Mode;
#[cfg(feature = "pulse-width")]
use crate::mode::PulseWidth;
use crate::mode::Period;

/// Optical tachometer: up to three rising-edge period channels reporting RPM.
pub type Tachometer<B> = Registry<B, Period, PERIOD_CHANNELS>;

/// Up to eight pulse-width channels.
#[cfg(feature = "pulse-width")]
pub type PulseMeter<B> = Registry<B, PulseWidth, PULSE_CHANNELS>;

/// Fixed table of channel slots plus the estimator state they share.
///
/// Channel numbers run from 1 to `N`. Each slot owns at most one [`Channel`];
/// [`bind`](Self::bind) and [`unbind`](Self::unbind) are the only ways to
/// change ownership.
pub struct Registry<B: Board, M: Mode<N>, const N: usize> {
    slots: [Option<Channel>; N],
    config: EstimatorConfig,
    filter: FilterState,
    _board: PhantomData<fn() -> (B, M)>,
}

impl<B, M, const N: usize> Registry<B, M, N>
where
    B: Board,
    M: Mode<N>,
{
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            slots: [const { None }; N],
            config,
            filter: FilterState::new(),
            _board: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Replace the shared settings. Checked as a unit.
    pub fn set_config(&mut self, config: EstimatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Low-pass cutoff in Hz, 0 disables filtering.
    pub fn set_filter_cutoff<T: AsPrimitive<f32>>(&mut self, hz: T) -> Result<(), ConfigError> {
        self.config.filter_cutoff_hz = config::frequency(hz)?;
        Ok(())
    }

    /// Maximum cycles per second, 0 disables the limit.
    pub fn set_update_rate<T: AsPrimitive<f32>>(&mut self, hz: T) -> Result<(), ConfigError> {
        self.config.update_rate_hz = config::frequency(hz)?;
        Ok(())
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Most recent filtered value published by any channel.
    pub fn latest(&self) -> f32 {
        self.filter.latest()
    }

    pub fn channel(&self, number: u8) -> Option<&Channel> {
        let index = Self::index(number).ok()?;
        self.slots[index].as_ref()
    }

    /// Mutable access for configuration between cycles.
    pub fn channel_mut(&mut self, number: u8) -> Option<&mut Channel> {
        let index = Self::index(number).ok()?;
        self.slots[index].as_mut()
    }

    pub fn active_channels(&self) -> impl Iterator<Item = &Channel> {
        self.slots.iter().flatten().filter(|channel| channel.is_active())
    }

    /// Give `number` a fresh instance reading `pin`.
    ///
    /// An existing occupant is unbound first and returned. Out-of-range
    /// numbers leave every slot untouched.
    pub fn bind(&mut self, number: u8, pin: Pin) -> Result<Option<Channel>, ConfigError> {
        let index = Self::index(number)?;

        let previous = self.release(index);
        if let Some(previous) = &previous {
            debug!(
                "channel {}: pin {} replaced by pin {}",
                number,
                previous.pin().map_or(0, |pin| pin.0),
                pin.0
            );
        } else {
            debug!("channel {}: bound to pin {}", number, pin.0);
        }

        self.slots[index] = Some(Channel::bound(number, pin));
        Ok(previous)
    }

    /// Release `number`, returning its instance. Empty or invalid slots are a no-op.
    pub fn unbind(&mut self, number: u8) -> Option<Channel> {
        let index = Self::index(number).ok()?;
        let released = self.release(index);
        if released.is_some() {
            debug!("channel {}: unbound", number);
        }
        released
    }

    /// Validate the channel and its shared settings, then attach its interrupt.
    ///
    /// On failure the channel is left bound but inactive, detached if it was
    /// running, and the error is also kept in [`Channel::last_error`].
    pub fn init(&mut self, number: u8) -> Result<(), ConfigError> {
        let index = Self::index(number)?;
        let config = self.config;
        let channel = self.slots[index]
            .as_mut()
            .ok_or(ConfigError::NotBound { channel: number })?;

        let checked = channel
            .validate(N as u8)
            .and_then(|()| config.validate())
            .and_then(|()| channel.pin().ok_or(ConfigError::PinUnset));

        let pin = match checked {
            Ok(pin) => pin,
            Err(error) => {
                warn!("channel {}: init failed: {}", number, error);
                if channel.is_active() {
                    if let Some(pin) = channel.pin() {
                        B::detach_interrupt(pin);
                    }
                }
                channel.fail(error);
                return Err(error);
            }
        };

        if channel.is_active() {
            B::detach_interrupt(pin);
        }

        if let Some(capture) = M::bank::<B>().slot(index) {
            capture.arm(pin, B::micros());
        }
        B::pin_mode_input_pullup(pin);
        B::attach_interrupt(pin, M::TRIGGER, M::handler::<B>(index));
        channel.activate();

        debug!("channel {}: active on pin {}", number, pin.0);
        Ok(())
    }

    /// Run one estimator cycle at the board's current time.
    pub fn update(&mut self) -> Option<CycleReport<N>> {
        self.update_at(B::micros())
    }

    /// Run one estimator cycle at `now`.
    ///
    /// Returns `None` when the update rate limit skips the cycle, in which case
    /// no state changes at all.
    pub fn update_at(&mut self, now: u32) -> Option<CycleReport<N>> {
        let timing = self.filter.begin(now, &self.config)?;
        let bank = M::bank::<B>();
        let mut report = CycleReport::new(timing);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(channel) = slot.as_mut().filter(|channel| channel.is_active()) else {
                continue;
            };
            let Some(capture) = bank.slot(index) else {
                continue;
            };

            let reading = capture.read();
            let raw = M::convert(reading.sample_us, channel.config());
            let status = estimator::step(channel, raw, reading, &timing, M::DETECTS_STALL);

            if status.published() {
                self.filter.publish(channel.filtered());
            }
            report.record(channel.number(), status);
        }

        self.filter.finish(&timing);
        Some(report)
    }

    fn index(number: u8) -> Result<usize, ConfigError> {
        if number == 0 || number as usize > N {
            return Err(ConfigError::ChannelOutOfRange {
                channel: number,
                capacity: N as u8,
            });
        }
        Ok(number as usize - 1)
    }

    /// Detach and take the occupant of `index`, if any.
    fn release(&mut self, index: usize) -> Option<Channel> {
        let mut channel = self.slots[index].take()?;

        if channel.is_active() {
            if let Some(pin) = channel.pin() {
                B::detach_interrupt(pin);
            }
        }
        if let Some(capture) = M::bank::<B>().slot(index) {
            capture.clear();
        }

        channel.release();
        Some(channel)
    }
}

impl<B: Board, M: Mode<N>, const N: usize> Drop for Registry<B, M, N> {
    fn drop(&mut self) {
        // Handlers must not outlive the slots they write to
        for channel in self.slots.iter().flatten() {
            if channel.is_active() {
                if let Some(pin) = channel.pin() {
                    B::detach_interrupt(pin);
                }
            }
        }
    }
}
