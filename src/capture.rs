//! Interrupt-time edge capture.
//!
//! Each channel slot owns one [`EdgeCapture`]. Handlers write it, the
//! estimator reads it. Every field is a single atomic word with relaxed
//! ordering: a read racing an edge may pair an interval from one edge with the
//! start stamp of the next, which costs at most one cycle of stale data.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::board::{Board, Pin};

/// Period-mode channel capacity.
pub const PERIOD_CHANNELS: usize = 3;

/// Pulse-width-mode channel capacity.
#[cfg(feature = "pulse-width")]
pub const PULSE_CHANNELS: usize = 8;

/// Raw timing state for one slot.
#[derive(Debug)]
pub struct EdgeCapture {
    /// Last complete interval or pulse width, µs. Zero until one is measured.
    sample_us: AtomicU32,
    /// Timestamp of the edge that opened the current interval.
    start_us: AtomicU32,
    pin: AtomicU8,
}

/// Snapshot of an [`EdgeCapture`] taken by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub sample_us: u32,
    pub start_us: u32,
}

impl EdgeCapture {
    pub const fn new() -> Self {
        Self {
            sample_us: AtomicU32::new(0),
            start_us: AtomicU32::new(0),
            pin: AtomicU8::new(0),
        }
    }

    /// Rising edge in period mode: close the running interval, open the next.
    #[inline]
    pub fn on_period_edge(&self, now: u32) {
        let start = self.start_us.load(Ordering::Relaxed);
        self.sample_us.store(now.wrapping_sub(start), Ordering::Relaxed);
        self.start_us.store(now, Ordering::Relaxed);
    }

    /// Level change in pulse-width mode. `high` is the level after the edge.
    #[inline]
    pub fn on_pulse_edge(&self, now: u32, high: bool) {
        if high {
            self.start_us.store(now, Ordering::Relaxed);
        } else {
            let start = self.start_us.load(Ordering::Relaxed);
            self.sample_us.store(now.wrapping_sub(start), Ordering::Relaxed);
        }
    }

    pub fn read(&self) -> Reading {
        Reading {
            sample_us: self.sample_us.load(Ordering::Relaxed),
            start_us: self.start_us.load(Ordering::Relaxed),
        }
    }

    pub fn pin(&self) -> Pin {
        Pin(self.pin.load(Ordering::Relaxed))
    }

    /// Prepare the slot for `pin`. Only call while the line is detached.
    pub(crate) fn arm(&self, pin: Pin, now: u32) {
        self.pin.store(pin.0, Ordering::Relaxed);
        self.sample_us.store(0, Ordering::Relaxed);
        self.start_us.store(now, Ordering::Relaxed);
    }

    /// Forget any sample. Only call while the line is detached.
    pub(crate) fn clear(&self) {
        self.sample_us.store(0, Ordering::Relaxed);
        self.start_us.store(0, Ordering::Relaxed);
    }
}

impl Default for EdgeCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed set of capture slots, indexed by channel number minus one.
#[derive(Debug)]
pub struct CaptureBank<const N: usize> {
    slots: [EdgeCapture; N],
}

impl<const N: usize> CaptureBank<N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { EdgeCapture::new() }; N],
        }
    }

    pub fn slot(&self, index: usize) -> Option<&EdgeCapture> {
        self.slots.get(index)
    }
}

impl<const N: usize> Default for CaptureBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// All capture banks of a board. Lives in a `static`, see [`Board::captures`].
#[derive(Debug)]
pub struct Captures {
    pub period: CaptureBank<PERIOD_CHANNELS>,
    #[cfg(feature = "pulse-width")]
    pub pulse: CaptureBank<PULSE_CHANNELS>,
}

impl Captures {
    pub const fn new() -> Self {
        Self {
            period: CaptureBank::new(),
            #[cfg(feature = "pulse-width")]
            pulse: CaptureBank::new(),
        }
    }
}

impl Default for Captures {
    fn default() -> Self {
        Self::new()
    }
}

// Interrupt entry points. One instantiation per slot, so a handler carries its
// slot index in its own code rather than in a captured environment.

fn period_edge<B: Board, const SLOT: usize>() {
    let capture = &B::captures().period.slots[SLOT];
    capture.on_period_edge(B::micros());
}

#[cfg(feature = "pulse-width")]
fn pulse_edge<B: Board, const SLOT: usize>() {
    let capture = &B::captures().pulse.slots[SLOT];
    let now = B::micros();
    capture.on_pulse_edge(now, B::digital_read(capture.pin()));
}

pub(crate) struct PeriodHandlers<B>(core::marker::PhantomData<B>);

impl<B: Board> PeriodHandlers<B> {
    pub(crate) const TABLE: [fn(); PERIOD_CHANNELS] = [
        period_edge::<B, 0>,
        period_edge::<B, 1>,
        period_edge::<B, 2>,
    ];
}

#[cfg(feature = "pulse-width")]
pub(crate) struct PulseHandlers<B>(core::marker::PhantomData<B>);

#[cfg(feature = "pulse-width")]
impl<B: Board> PulseHandlers<B> {
    pub(crate) const TABLE: [fn(); PULSE_CHANNELS] = [
        pulse_edge::<B, 0>,
        pulse_edge::<B, 1>,
        pulse_edge::<B, 2>,
        pulse_edge::<B, 3>,
        pulse_edge::<B, 4>,
        pulse_edge::<B, 5>,
        pulse_edge::<B, 6>,
        pulse_edge::<B, 7>,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_edge_measures_interval() {
        let capture = EdgeCapture::new();
        capture.arm(Pin(2), 1_000);

        capture.on_period_edge(11_000);
        assert_eq!(capture.read(), Reading { sample_us: 10_000, start_us: 11_000 });

        capture.on_period_edge(16_000);
        assert_eq!(capture.read().sample_us, 5_000);
    }

    #[test]
    fn period_edge_survives_counter_wrap() {
        let capture = EdgeCapture::new();
        capture.arm(Pin(2), u32::MAX - 499);

        capture.on_period_edge(500);
        assert_eq!(capture.read().sample_us, 1_000);
    }

    #[test]
    fn pulse_edge_times_high_phase() {
        let capture = EdgeCapture::new();
        capture.arm(Pin(4), 0);

        capture.on_pulse_edge(20_000, true);
        // Rising edge alone produces no sample
        assert_eq!(capture.read().sample_us, 0);

        capture.on_pulse_edge(21_500, false);
        assert_eq!(capture.read().sample_us, 1_500);
    }

    #[test]
    fn arm_resets_sample_and_records_pin() {
        let capture = EdgeCapture::new();
        capture.on_period_edge(42);
        capture.arm(Pin(9), 100);

        assert_eq!(capture.pin(), Pin(9));
        assert_eq!(capture.read(), Reading { sample_us: 0, start_us: 100 });
    }

    #[test]
    fn bank_slots_are_bounded() {
        let bank: CaptureBank<3> = CaptureBank::new();
        assert!(bank.slot(2).is_some());
        assert!(bank.slot(3).is_none());
    }
}
