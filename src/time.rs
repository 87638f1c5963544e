//! Monotonic time source
//!
//! The Clause 72 software timeout and the serdes calibration spins are
//! bounded in wall-clock milliseconds. The driver takes time as an
//! injected trait so the same state machines run against a hardware
//! timer on target and a fake clock in host tests.

/// Millisecond monotonic clock
pub trait TimeSource {
    /// Milliseconds since an arbitrary epoch
    ///
    /// Must be monotonic between driver calls; wrapping at `u32::MAX`
    /// is handled by the driver.
    fn now_ms(&mut self) -> u32;
}

/// Elapsed milliseconds between two timestamps, wrap-safe
pub const fn elapsed_ms(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}
