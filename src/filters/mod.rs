/// Output shaping applied by the estimator.
///
/// The low-pass gain is shared by all channels and recomputed once per cycle;
/// the dead zone keeps per-channel state.
mod dead_zone;
mod low_pass;

pub use dead_zone::DeadZone;
pub use low_pass::LowPass;
