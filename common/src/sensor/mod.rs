mod dht;
mod dummysensor;

pub use dht::{decode_frame, frame_from_pulses, SensorModel, FRAME_BITS};
pub use dummysensor::DummySensor;

use heat_alert_model::Reading;

/// Error type for sensor reads.
///
/// The monitor treats every variant the same way: no data this cycle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("timed out waiting for the sensor")]
    Timeout,
    #[error("checksum mismatch (expected {expected:#04x}, got {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// A temperature/humidity sensor.
///
/// Implemented once per hardware driver, and by [`DummySensor`] for running
/// without hardware.
pub trait SensorReader {
    /// Take one reading. Blocks for as long as the driver needs.
    fn read(&mut self) -> Result<Reading, SensorError>;
}

impl<S: SensorReader + ?Sized> SensorReader for Box<S> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        (**self).read()
    }
}
