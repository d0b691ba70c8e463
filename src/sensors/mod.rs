//! Sensors
//!
//! Sources of orientation change lines. The live source is the
//! `monitor-sensor` helper from iio-sensor-proxy, the fixture source is fed
//! by hand.

pub mod fixture;
pub mod monitor_sensor;

use std::os::fd::BorrowedFd;

pub use fixture::FixtureSource;
pub use monitor_sensor::MonitorSensor;

pub trait OrientationEventSource {
    /// Every complete line buffered right now. Never blocks.
    fn read_available(&mut self) -> Vec<String>;

    /// Throw away whatever is buffered. Returns how many lines were dropped.
    fn drain(&mut self) -> usize {
        self.read_available().len()
    }

    /// Descriptor to wait on for readability, `None` if there is nothing
    /// to wait for.
    fn readiness_fd(&self) -> Option<BorrowedFd<'_>>;

    /// The source will never produce another line.
    fn is_closed(&self) -> bool {
        false
    }
}
