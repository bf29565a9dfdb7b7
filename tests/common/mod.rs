//! Simulated board for integration tests.
//!
//! `mock_board!(Name)` defines a board type with its own clock, pin levels,
//! interrupt table and capture statics, so tests running in parallel never
//! share state. Pull it in with `#[macro_use] mod common;`.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use edge_tach::{Pin, Trigger};

pub const PINS: usize = 32;

pub struct MockState {
    now: AtomicU32,
    levels: [AtomicBool; PINS],
    pullups: [AtomicBool; PINS],
    handlers: Mutex<[Option<(Trigger, fn())>; PINS]>,
    detaches: AtomicU32,
}

impl MockState {
    pub const fn new() -> Self {
        Self {
            now: AtomicU32::new(0),
            levels: [const { AtomicBool::new(false) }; PINS],
            pullups: [const { AtomicBool::new(false) }; PINS],
            handlers: Mutex::new([None; PINS]),
            detaches: AtomicU32::new(0),
        }
    }

    pub fn now(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn set_time(&self, us: u32) {
        self.now.store(us, Ordering::SeqCst);
    }

    pub fn level(&self, pin: Pin) -> bool {
        self.levels[pin.0 as usize].load(Ordering::SeqCst)
    }

    pub fn set_level(&self, pin: Pin, high: bool) {
        self.levels[pin.0 as usize].store(high, Ordering::SeqCst);
    }

    pub fn set_pullup(&self, pin: Pin) {
        self.pullups[pin.0 as usize].store(true, Ordering::SeqCst);
    }

    pub fn has_pullup(&self, pin: Pin) -> bool {
        self.pullups[pin.0 as usize].load(Ordering::SeqCst)
    }

    pub fn attach(&self, pin: Pin, trigger: Trigger, handler: fn()) {
        self.handlers.lock().unwrap()[pin.0 as usize] = Some((trigger, handler));
    }

    pub fn detach(&self, pin: Pin) {
        self.handlers.lock().unwrap()[pin.0 as usize] = None;
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }

    pub fn detach_count(&self) -> u32 {
        self.detaches.load(Ordering::SeqCst)
    }

    pub fn trigger(&self, pin: Pin) -> Option<Trigger> {
        self.handlers.lock().unwrap()[pin.0 as usize].map(|(trigger, _)| trigger)
    }

    pub fn is_attached(&self, pin: Pin) -> bool {
        self.trigger(pin).is_some()
    }

    /// Deliver an interrupt for `pin` at `us`, if one is attached.
    ///
    /// Rising triggers only fire when the level goes from low to high.
    pub fn edge(&self, pin: Pin, us: u32, high: bool) {
        let was_high = self.level(pin);
        self.set_time(us);
        self.set_level(pin, high);

        let entry = self.handlers.lock().unwrap()[pin.0 as usize];
        match entry {
            Some((Trigger::Rising, handler)) if high && !was_high => handler(),
            Some((Trigger::Change, handler)) if high != was_high => handler(),
            _ => {}
        }
    }

    /// One full optical pulse: rising edge at `us`, falling shortly after.
    pub fn pulse(&self, pin: Pin, us: u32) {
        self.edge(pin, us, true);
        self.edge(pin, us.wrapping_add(100), false);
    }

    /// One high phase of `width` µs starting at `us`.
    pub fn high_for(&self, pin: Pin, us: u32, width: u32) {
        self.edge(pin, us, true);
        self.edge(pin, us.wrapping_add(width), false);
    }
}

macro_rules! mock_board {
    ($name:ident) => {
        struct $name;

        impl $name {
            fn mock() -> &'static $crate::common::MockState {
                static STATE: $crate::common::MockState = $crate::common::MockState::new();
                &STATE
            }
        }

        impl edge_tach::Board for $name {
            fn micros() -> u32 {
                Self::mock().now()
            }

            fn pin_mode_input_pullup(pin: edge_tach::Pin) {
                Self::mock().set_pullup(pin);
            }

            fn attach_interrupt(pin: edge_tach::Pin, trigger: edge_tach::Trigger, handler: fn()) {
                Self::mock().attach(pin, trigger, handler);
            }

            fn detach_interrupt(pin: edge_tach::Pin) {
                Self::mock().detach(pin);
            }

            fn digital_read(pin: edge_tach::Pin) -> bool {
                Self::mock().level(pin)
            }

            fn captures() -> &'static edge_tach::Captures {
                static CAPTURES: edge_tach::Captures = edge_tach::Captures::new();
                &CAPTURES
            }
        }
    };
}

/// Interval in µs between edges for a shaft turning at `rpm`.
pub fn period_for(rpm: f32) -> u32 {
    (60_000_000.0 / rpm) as u32
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-3 * b.abs().max(1.0)
}
