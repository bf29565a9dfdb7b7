use num_traits::float::FloatCore;

/// Suppresses changes no larger than a tolerance.
///
/// Holds the last accepted value until the input moves strictly more than
/// `tolerance` away from it. A tolerance of zero disables the zone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeadZone {
    last_output: f32,
}

impl DeadZone {
    pub const fn new() -> Self {
        Self { last_output: 0.0 }
    }

    /// Returns the value to use and whether the input was absorbed by the zone.
    pub fn apply(&mut self, input: f32, tolerance: f32) -> (f32, bool) {
        if tolerance <= 0.0 {
            self.last_output = input;
            return (input, false);
        }

        let diff = FloatCore::abs(input - self.last_output);

        // Only update if change exceeds the tolerance
        if diff > tolerance {
            self.last_output = input;
            (input, false)
        } else {
            (self.last_output, true)
        }
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    pub fn reset(&mut self) {
        self.last_output = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tolerance_passes_through() {
        let mut zone = DeadZone::new();
        assert_eq!(zone.apply(1500.0, 0.0), (1500.0, false));
        assert_eq!(zone.apply(1501.0, 0.0), (1501.0, false));
    }

    #[test]
    fn ignores_small_changes() {
        let mut zone = DeadZone::new();
        zone.apply(1500.0, 8.0);

        assert_eq!(zone.apply(1505.0, 8.0), (1500.0, true));
        assert_eq!(zone.apply(1492.0, 8.0), (1500.0, true));

        // Exactly at the tolerance is still inside
        assert_eq!(zone.apply(1508.0, 8.0), (1500.0, true));

        assert_eq!(zone.apply(1509.0, 8.0), (1509.0, false));
        assert_eq!(zone.last_output(), 1509.0);
    }

    #[test]
    fn reset_forgets_reference() {
        let mut zone = DeadZone::new();
        zone.apply(1500.0, 8.0);
        zone.reset();
        assert_eq!(zone.apply(5.0, 8.0), (0.0, true));
    }
}
