use num_traits::AsPrimitive;

use crate::filters::LowPass;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    ChannelOutOfRange { channel: u8, capacity: u8 },
    NotBound { channel: u8 },
    PinUnset,
    NegativeFrequency,
    InvalidBound,
    MaxBelowMin,
    NegativeDeadZone,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ChannelOutOfRange { channel, capacity } => {
                write!(f, "channel {} is not in 1..={}", channel, capacity)
            }
            ConfigError::NotBound { channel } => write!(f, "channel {} has no bound input", channel),
            ConfigError::PinUnset => write!(f, "no pin assigned"),
            ConfigError::NegativeFrequency => {
                write!(f, "filter and update frequencies must be finite and >= 0")
            }
            ConfigError::InvalidBound => write!(f, "min and max must be finite and >= 0"),
            ConfigError::MaxBelowMin => write!(f, "max must not be less than min"),
            ConfigError::NegativeDeadZone => write!(f, "dead zone must be finite and >= 0"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::ChannelOutOfRange { channel, capacity } => {
                defmt::write!(fmt, "channel {} is not in 1..={}", channel, capacity)
            }
            ConfigError::NotBound { channel } => {
                defmt::write!(fmt, "channel {} has no bound input", channel)
            }
            ConfigError::PinUnset => defmt::write!(fmt, "no pin assigned"),
            ConfigError::NegativeFrequency => defmt::write!(fmt, "negative frequency"),
            ConfigError::InvalidBound => defmt::write!(fmt, "invalid min/max"),
            ConfigError::MaxBelowMin => defmt::write!(fmt, "max below min"),
            ConfigError::NegativeDeadZone => defmt::write!(fmt, "negative dead zone"),
        }
    }
}

/// How a pulse width is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseUnit {
    /// Events per minute, `60 / width_seconds`.
    #[default]
    PerMinute,
    /// Width in microseconds, unconverted.
    Micros,
}

/// Settings shared by every channel in a registry.
///
/// Both frequencies use 0 to mean "disabled".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimatorConfig {
    /// Low-pass cutoff in Hz.
    pub filter_cutoff_hz: f32,
    /// Maximum number of estimator cycles per second.
    pub update_rate_hz: f32,
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_frequency(self.filter_cutoff_hz)?;
        check_frequency(self.update_rate_hz)
    }

    pub fn low_pass(&self) -> LowPass {
        LowPass::from_cutoff(self.filter_cutoff_hz)
    }

    /// Shortest spacing between two performed cycles, if rate limiting is on.
    pub fn min_update_interval_us(&self) -> Option<f32> {
        if self.update_rate_hz > 0.0 {
            Some(1_000_000.0 / self.update_rate_hz)
        } else {
            None
        }
    }
}

/// Per-channel acceptance window and output shaping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelConfig {
    /// Values below this read as zero.
    pub min: f32,
    /// Values above this leave the output unchanged. 0 disables the check.
    pub max: f32,
    /// Changes no larger than this are ignored. 0 disables the dead zone.
    pub dead_zone: f32,
    /// Pulse-width conversion. Period channels always report RPM.
    pub unit: PulseUnit,
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bound(self.min)?;
        check_bound(self.max)?;

        // A zero max means "no upper bound", so only a real bound can undercut min
        if self.max > 0.0 && self.max < self.min {
            return Err(ConfigError::MaxBelowMin);
        }

        check_dead_zone(self.dead_zone)
    }

    pub fn has_max(&self) -> bool {
        self.max > 0.0
    }
}

pub(crate) fn frequency<T: AsPrimitive<f32>>(value: T) -> Result<f32, ConfigError> {
    let value = value.as_();
    check_frequency(value)?;
    Ok(value)
}

pub(crate) fn bound<T: AsPrimitive<f32>>(value: T) -> Result<f32, ConfigError> {
    let value = value.as_();
    check_bound(value)?;
    Ok(value)
}

pub(crate) fn dead_zone<T: AsPrimitive<f32>>(value: T) -> Result<f32, ConfigError> {
    let value = value.as_();
    check_dead_zone(value)?;
    Ok(value)
}

fn check_frequency(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeFrequency)
    }
}

fn check_bound(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidBound)
    }
}

fn check_dead_zone(value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeDeadZone)
    }
}
