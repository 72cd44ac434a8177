//! Hardware Boundaries
//!
//! ## Echo sensor
//!
//! An ultrasonic ranger is driven by a trigger pulse; the echo line then
//! stays high for the round-trip time of the sound. Measuring that pulse is
//! the driver's job. The core only needs a synchronous, bounded primitive:
//!
//! ```text
//! ping(timeout) ─┬─ WouldBlock        echo still pending, poll again
//!                ├─ Ok(Some(µs))      round-trip duration
//!                ├─ Ok(None)          no echo before the timeout
//!                └─ Err(Other(e))     driver fault
//! ```
//!
//! The `nb` contract lets interrupt- or timer-driven drivers report
//! progress without blocking, while [`RangeFinder`](crate::acquisition::RangeFinder)
//! blocks on it with `nb::block!`. The driver must itself give up once
//! `timeout_us` has elapsed so the loop never stalls longer than that.
//!
//! ## Example Implementation
//!
//! ```rust
//! use rangeguard_core::traits::EchoSensor;
//!
//! /// Sensor that always sees a target 10 cm away
//! struct Fixed;
//!
//! impl EchoSensor for Fixed {
//!     type Error = ();
//!
//!     fn ping(&mut self, _timeout_us: u32) -> nb::Result<Option<u32>, ()> {
//!         Ok(Some(583))
//!     }
//! }
//! ```

/// Trigger-and-time-the-echo primitive for one sensor
pub trait EchoSensor {
    /// Driver fault type
    type Error: core::fmt::Debug;

    /// Fire the trigger (on first call) and report the echo duration
    ///
    /// Returns `nb::Error::WouldBlock` while the echo is pending. The
    /// measurement is finished once this returns anything else.
    fn ping(&mut self, timeout_us: u32) -> nb::Result<Option<u32>, Self::Error>;
}

/// Single binary output (LED, relay, boost enable)
pub trait OutputLine {
    /// Drive the output high
    fn set_high(&mut self);

    /// Drive the output low
    fn set_low(&mut self);
}

impl<T: EchoSensor + ?Sized> EchoSensor for &mut T {
    type Error = T::Error;

    fn ping(&mut self, timeout_us: u32) -> nb::Result<Option<u32>, Self::Error> {
        (**self).ping(timeout_us)
    }
}

impl<T: OutputLine + ?Sized> OutputLine for &mut T {
    fn set_high(&mut self) {
        (**self).set_high()
    }

    fn set_low(&mut self) {
        (**self).set_low()
    }
}
