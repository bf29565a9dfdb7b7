use crate::capture::Captures;

/// Digital input line, numbered the way the board numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(pub u8);

impl core::fmt::Display for Pin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which transitions on a line fire its interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Low to high only.
    Rising,
    /// Both directions; the handler reads the pin to tell them apart.
    Change,
}

/// Platform services the measurement engine relies on.
///
/// Everything is an associated function because interrupt entry points take
/// no arguments: a handler can only reach the clock, the pin level and its
/// capture slot through the board type it was monomorphized for.
pub trait Board {
    /// Free-running microsecond counter. Expected to wrap at `u32::MAX`.
    fn micros() -> u32;

    /// Configure `pin` as a digital input with the internal pull-up enabled.
    fn pin_mode_input_pullup(pin: Pin);

    /// Route interrupts for `pin` to `handler`.
    fn attach_interrupt(pin: Pin, trigger: Trigger, handler: fn());

    /// Stop delivering interrupts for `pin`.
    fn detach_interrupt(pin: Pin);

    /// Current logic level of `pin`, `true` when high.
    fn digital_read(pin: Pin) -> bool;

    /// Capture state shared between handlers and the estimator.
    ///
    /// Implementors return a reference to a `static`:
    ///
    /// ```ignore
    /// static CAPTURES: Captures = Captures::new();
    ///
    /// fn captures() -> &'static Captures {
    ///     &CAPTURES
    /// }
    /// ```
    fn captures() -> &'static Captures;
}
