//! Line controller abstraction
//!
//! The driver needs three digital lines: RST and DC are always outputs,
//! DD is bidirectional. This trait is the full contract the protocol layer
//! places on whatever owns the pins; the `ccdbg-linux-gpio` crate provides
//! the Linux character-device implementation and `ccdbg-dummy` an emulated
//! target for tests.
//!
//! Pin operations are infallible by design: line access failures are a
//! wiring problem, not a protocol state, so implementations log them and
//! carry on rather than abort a session that may still be usable.

use core::time::Duration;

/// Direction of the bidirectional DD (debug data) line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Line is driven by the target, sampled by the driver
    Input,
    /// Line is driven by the driver
    Output,
}

/// Low-level access to the three debug lines.
pub trait LineController {
    /// Re-request all three lines as outputs driven low.
    ///
    /// Called on activation; the target is held under the driver's control
    /// until [`release`](Self::release).
    fn attach(&mut self);

    /// Release all three lines to inputs, letting the target run free.
    fn release(&mut self);

    /// Drive the RST line.
    fn set_reset(&mut self, high: bool);

    /// Drive the DC (debug clock) line.
    fn set_clock(&mut self, high: bool);

    /// Drive the DD (debug data) line. Only meaningful while the line
    /// direction is [`Direction::Output`].
    fn set_data(&mut self, high: bool);

    /// Sample the DD line level.
    fn data(&mut self) -> bool;

    /// Re-request the DD line in the given direction.
    ///
    /// The driver guarantees it only calls this on an actual direction
    /// change and drives the line low around the switch.
    fn set_data_direction(&mut self, dir: Direction);

    /// Block until a falling edge is seen on the DD line, up to `timeout`.
    ///
    /// Returns whether the edge occurred before the timeout. This must be
    /// edge detection, not a level poll: the target holds DD low while
    /// busy and the release is what signals the result is available.
    fn wait_data_falling(&mut self, timeout: Duration) -> bool;

    /// Dwell for a protocol setup/hold/settle window.
    fn delay(&mut self, d: Duration);
}

#[cfg(feature = "std")]
impl<T: LineController + ?Sized> LineController for std::boxed::Box<T> {
    fn attach(&mut self) {
        (**self).attach()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn set_reset(&mut self, high: bool) {
        (**self).set_reset(high)
    }

    fn set_clock(&mut self, high: bool) {
        (**self).set_clock(high)
    }

    fn set_data(&mut self, high: bool) {
        (**self).set_data(high)
    }

    fn data(&mut self) -> bool {
        (**self).data()
    }

    fn set_data_direction(&mut self, dir: Direction) {
        (**self).set_data_direction(dir)
    }

    fn wait_data_falling(&mut self, timeout: Duration) -> bool {
        (**self).wait_data_falling(timeout)
    }

    fn delay(&mut self, d: Duration) {
        (**self).delay(d)
    }
}
