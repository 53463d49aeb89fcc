use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};
use heat_alert_common::model::Reading;
use heat_alert_common::{
    config::ApiKey, Config, DryRunGateway, DummySensor, Indicators, Monitor, SensorError,
    SensorReader,
};
use tokio::time::Instant;

#[derive(Clone, Default)]
struct Line(Rc<RefCell<Vec<bool>>>);

impl Line {
    fn pulses(&self) -> usize {
        self.0.borrow().iter().filter(|level| **level).count()
    }

    fn is_low(&self) -> bool {
        self.0.borrow().last() == Some(&false)
    }
}

impl ErrorType for Line {
    type Error = Infallible;
}

impl OutputPin for Line {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(true);
        Ok(())
    }
}

struct Stopwatch {
    sensor: DummySensor,
    started: Instant,
    reads: Rc<RefCell<Vec<u64>>>,
}

impl SensorReader for Stopwatch {
    fn read(&mut self) -> Result<Reading, SensorError> {
        let elapsed = self.started.elapsed().as_secs_f64().round() as u64;
        self.reads.borrow_mut().push(elapsed);
        self.sensor.read()
    }
}

fn config() -> Config {
    Config {
        api_key: ApiKey::new("dry-run"),
        mobile_number: "910000000000".into(),
        ..Config::default()
    }
}

#[tokio::test(start_paused = true)]
async fn warming_room_scenario() {
    let reads = Rc::new(RefCell::new(Vec::new()));
    let sensor = Stopwatch {
        sensor: DummySensor::new().unwrap(),
        started: Instant::now(),
        reads: reads.clone(),
    };
    let success = Line::default();
    let failure = Line::default();
    let indicators = Indicators::new(success.clone(), failure.clone());

    let monitor = Monitor::new(config(), sensor, indicators, DryRunGateway);
    monitor.run(tokio::time::sleep(Duration::from_secs(175))).await;

    // 29, 30, 32, no data, 33 every 10 s; 35 and 34 each alert and cool down for 60 s
    assert_eq!(*reads.borrow(), vec![0, 10, 20, 30, 40, 50, 111, 172]);
    assert_eq!(success.pulses(), 2);
    assert_eq!(failure.pulses(), 0);
    assert!(success.is_low());
    assert!(failure.is_low());
}

#[tokio::test(start_paused = true)]
async fn sensor_that_never_answers() {
    let success = Line::default();
    let failure = Line::default();
    let indicators = Indicators::new(success.clone(), failure.clone());
    let sensor = DummySensor::from_script([Err(SensorError::Timeout)]);

    let started = Instant::now();
    let monitor = Monitor::new(config(), sensor, indicators, DryRunGateway);
    monitor.run(tokio::time::sleep(Duration::from_secs(45))).await;

    assert_eq!(started.elapsed().as_secs_f64().round() as u64, 45);
    assert_eq!(success.pulses() + failure.pulses(), 0);
    assert!(success.is_low() && failure.is_low());
}
