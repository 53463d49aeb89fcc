use heat_alert_model::Reading;

use super::{SensorError, SensorReader};

/// Replays a fixed script of readings, starting over when it runs out.
#[derive(Clone, Debug)]
pub struct DummySensor {
    script: Vec<Result<Reading, SensorError>>,
    position: usize,
}

impl DummySensor {
    /// A warming-up room that crosses the default threshold once per cycle.
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyreadings.json");

        let readings = serde_json::from_str::<Vec<Reading>>(json_data)?;
        Ok(Self::from_readings(readings))
    }

    pub fn from_readings(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self::from_script(readings.into_iter().map(Ok))
    }

    /// Readings and failures, in order.
    pub fn from_script(script: impl IntoIterator<Item = Result<Reading, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            position: 0,
        }
    }
}

impl SensorReader for DummySensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        if self.script.is_empty() {
            return Err(SensorError::Timeout);
        }

        let step = self.script[self.position].clone();
        self.position = (self.position + 1) % self.script.len();
        step
    }
}

#[test]
fn test_dummy_sensor() {
    let mut sensor = DummySensor::new().unwrap();
    let first = sensor.read().unwrap();

    assert_eq!(first, Reading::new(29.0, 52.0));
    assert_eq!(sensor.script.len(), 8);
    assert!(sensor
        .script
        .iter()
        .any(|step| matches!(step, Ok(reading) if reading.exceeds(33.0))));
}

#[test]
fn test_dummy_sensor_wraps_and_fails() {
    let mut sensor = DummySensor::from_script([Ok(Reading::new(20.0, 40.0)), Err(SensorError::Timeout)]);

    assert!(sensor.read().is_ok());
    assert_eq!(sensor.read(), Err(SensorError::Timeout));
    assert!(sensor.read().is_ok());

    let mut empty = DummySensor::from_readings([]);
    assert_eq!(empty.read(), Err(SensorError::Timeout));
}
