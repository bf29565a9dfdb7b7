use num_traits::AsPrimitive;

use crate::board::Pin;
use crate::config::{self, ChannelConfig, ConfigError, PulseUnit};
use crate::filters::DeadZone;

/// Lifecycle of a measurement instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Not attached to any slot.
    #[default]
    Unbound,
    /// Owns a slot but has not passed `init`.
    Bound,
    /// Interrupt attached; takes part in estimator cycles.
    Active,
}

/// One physical sensor input.
///
/// Registries own their channels. A channel handed back by a rebind or an
/// unbind is [`ChannelState::Unbound`] and keeps its last configuration and
/// outputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    number: u8,
    pin: Option<Pin>,
    state: ChannelState,
    config: ChannelConfig,
    raw: f32,
    filtered: f32,
    dead_zone: DeadZone,
    last_error: Option<ConfigError>,
}

impl Channel {
    /// An unbound instance: channel 0, no pin.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bound(number: u8, pin: Pin) -> Self {
        Self {
            number,
            pin: Some(pin),
            state: ChannelState::Bound,
            ..Self::default()
        }
    }

    /// Channel number, 0 for an instance that was never bound.
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn pin(&self) -> Option<Pin> {
        self.pin
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state != ChannelState::Unbound
    }

    pub fn is_active(&self) -> bool {
        self.state == ChannelState::Active
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Converted value of the latest sample, before limits and filtering.
    pub fn raw(&self) -> f32 {
        self.raw
    }

    /// Output after the low-pass filter and min/max handling.
    pub fn filtered(&self) -> f32 {
        self.filtered
    }

    /// Why the last `init` failed, cleared by a successful one.
    pub fn last_error(&self) -> Option<ConfigError> {
        self.last_error
    }

    pub fn set_min<T: AsPrimitive<f32>>(&mut self, value: T) -> Result<(), ConfigError> {
        self.config.min = config::bound(value)?;
        Ok(())
    }

    /// 0 disables the upper bound.
    pub fn set_max<T: AsPrimitive<f32>>(&mut self, value: T) -> Result<(), ConfigError> {
        self.config.max = config::bound(value)?;
        Ok(())
    }

    /// 0 disables the dead zone.
    pub fn set_dead_zone<T: AsPrimitive<f32>>(&mut self, value: T) -> Result<(), ConfigError> {
        self.config.dead_zone = config::dead_zone(value)?;
        Ok(())
    }

    pub fn set_unit(&mut self, unit: PulseUnit) -> Result<(), ConfigError> {
        self.config.unit = unit;
        Ok(())
    }

    /// Replace the whole configuration. Checked as a unit.
    pub fn set_config(&mut self, config: ChannelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Checks everything `init` needs against a registry of `capacity` slots.
    pub fn validate(&self, capacity: u8) -> Result<(), ConfigError> {
        if self.number == 0 || self.number > capacity {
            return Err(ConfigError::ChannelOutOfRange {
                channel: self.number,
                capacity,
            });
        }

        if self.pin.is_none() {
            return Err(ConfigError::PinUnset);
        }

        self.config.validate()
    }

    pub(crate) fn activate(&mut self) {
        self.state = ChannelState::Active;
        self.last_error = None;
        self.raw = 0.0;
        self.filtered = 0.0;
        self.dead_zone.reset();
    }

    pub(crate) fn release(&mut self) {
        self.state = ChannelState::Unbound;
    }

    pub(crate) fn fail(&mut self, error: ConfigError) {
        if self.state == ChannelState::Active {
            self.state = ChannelState::Bound;
        }
        self.last_error = Some(error);
    }

    pub(crate) fn record_raw(&mut self, raw: f32) {
        self.raw = raw;
    }

    pub(crate) fn publish(&mut self, filtered: f32) {
        self.filtered = filtered;
    }

    pub(crate) fn dead_zone_mut(&mut self) -> &mut DeadZone {
        &mut self.dead_zone
    }
}
