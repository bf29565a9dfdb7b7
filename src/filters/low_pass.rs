const TWO_PI: f32 = core::f32::consts::TAU;

/// First-order low-pass filter over a variable sampling interval.
///
/// The gain weights the previous output:
/// `output = gain * previous + (1 - gain) * input`, with
/// `gain = 1 / (1 + 2π * cutoff * dt)`. Longer intervals give smaller gains,
/// so a slow cadence tracks the input more closely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowPass {
    /// Output follows the input exactly.
    None,

    /// Cutoff frequency in Hz, always > 0.
    FirstOrder { cutoff_hz: f32 },
}

impl LowPass {
    /// Cutoffs of zero or below disable the filter.
    pub fn from_cutoff(cutoff_hz: f32) -> Self {
        if cutoff_hz > 0.0 {
            LowPass::FirstOrder { cutoff_hz }
        } else {
            LowPass::None
        }
    }

    /// Gain for a cycle `dt_us` microseconds after the previous one.
    ///
    /// Zero when the filter is disabled.
    pub fn gain(&self, dt_us: u32) -> f32 {
        match self {
            LowPass::None => 0.0,
            LowPass::FirstOrder { cutoff_hz } => {
                1.0 / (1.0 + TWO_PI * cutoff_hz * dt_us as f32 / 1_000_000.0)
            }
        }
    }

    pub fn apply(&self, previous: f32, input: f32, gain: f32) -> f32 {
        match self {
            LowPass::None => input,
            LowPass::FirstOrder { .. } => gain * previous + (1.0 - gain) * input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_passes_input() {
        let filter = LowPass::from_cutoff(0.0);
        assert_eq!(filter, LowPass::None);
        assert_eq!(filter.gain(10_000), 0.0);
        assert_eq!(filter.apply(100.0, 250.0, 0.9), 250.0);
    }

    #[test]
    fn gain_matches_formula() {
        let filter = LowPass::from_cutoff(5.0);
        // 1 / (1 + 2π * 5 * 0.01)
        let expected = 1.0 / (1.0 + TWO_PI * 0.05);
        assert!((filter.gain(10_000) - expected).abs() < 1e-6);
    }

    #[test]
    fn gain_is_one_for_zero_interval() {
        let filter = LowPass::from_cutoff(5.0);
        assert_eq!(filter.gain(0), 1.0);
    }

    #[test]
    fn longer_interval_lowers_gain() {
        let filter = LowPass::from_cutoff(2.0);
        assert!(filter.gain(50_000) < filter.gain(10_000));
    }

    #[test]
    fn blends_previous_and_input() {
        let filter = LowPass::from_cutoff(1.0);
        let out = filter.apply(0.0, 100.0, 0.25);
        assert!((out - 75.0).abs() < 1e-4);
    }
}
