//! The polling loop: read, compare against the threshold, alert, cool down.

use std::future::Future;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use heat_alert_model::{AlertResult, Reading};

use crate::alert::{AlertSender, SmsGateway};
use crate::config::Config;
use crate::indicator::Indicators;
use crate::sensor::SensorReader;

/// Where the loop currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    Alerting,
    Cooldown,
    Terminating,
}

/// What one iteration observed.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// The sensor failed or had no temperature.
    NoData,
    /// A temperature at or below the threshold.
    Normal(f32),
    /// A threshold breach and the result of the alert attempt.
    Alerted {
        temperature: f32,
        result: AlertResult,
    },
}

impl PollOutcome {
    /// How long to wait before the next poll. Alerts always cool down,
    /// whether or not the message went out.
    pub fn pause(&self, config: &Config) -> Duration {
        match self {
            PollOutcome::Alerted { .. } => config.cooldown,
            PollOutcome::NoData | PollOutcome::Normal(_) => config.poll_interval,
        }
    }
}

pub struct Monitor<S, P: OutputPin, G> {
    config: Config,
    sensor: S,
    indicators: Indicators<P>,
    sender: AlertSender<G>,
    state: MonitorState,
}

impl<S, P, G> Monitor<S, P, G>
where
    S: SensorReader,
    P: OutputPin,
    G: SmsGateway,
{
    pub fn new(config: Config, sensor: S, indicators: Indicators<P>, gateway: G) -> Self {
        let sender = AlertSender::new(gateway, &config);

        Self {
            config,
            sensor,
            indicators,
            sender,
            state: MonitorState::Polling,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run one iteration without the trailing sleep.
    ///
    /// Sensor and delivery errors end up in the outcome and the log; nothing
    /// escapes the iteration.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let reading = match self.sensor.read() {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("Sensor error: {e}");
                return PollOutcome::NoData;
            }
        };

        let Some(temperature) = reading.temperature_celsius else {
            log::warn!("Sensor read failed.");
            return PollOutcome::NoData;
        };
        log_reading(temperature, &reading);

        if !reading.exceeds(self.config.threshold_celsius) {
            return PollOutcome::Normal(temperature);
        }

        self.transition(MonitorState::Alerting);
        let result = self.sender.send(temperature).await;
        self.indicators.pulse(result.success).await;

        PollOutcome::Alerted {
            temperature,
            result,
        }
    }

    /// Enter the pause that follows `outcome` and return how long it lasts.
    ///
    /// An alert always moves the loop into [`MonitorState::Cooldown`].
    pub fn begin_pause(&mut self, outcome: &PollOutcome) -> Duration {
        if matches!(outcome, PollOutcome::Alerted { .. }) {
            self.transition(MonitorState::Cooldown);
        }
        outcome.pause(&self.config)
    }

    /// The pause elapsed; back to polling.
    pub fn end_pause(&mut self) {
        self.transition(MonitorState::Polling);
    }

    /// Poll until `shutdown` completes, then release the indicator lines.
    ///
    /// `shutdown` is only observed while sleeping between polls; a sensor
    /// read, HTTP request or indicator pulse in progress is finished first.
    /// Returns the final state, which is always [`MonitorState::Terminating`].
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> MonitorState {
        log::info!("Monitoring temperature... (Press Ctrl+C to stop)");
        tokio::pin!(shutdown);

        loop {
            let outcome = self.poll_once().await;
            let pause = self.begin_pause(&outcome);

            tokio::select! {
                _ = tokio::time::sleep(pause) => self.end_pause(),
                _ = &mut shutdown => break,
            }
        }

        self.transition(MonitorState::Terminating);
        log::info!("Script terminated by user.");
        self.indicators.release();
        self.state
    }

    fn transition(&mut self, next: MonitorState) {
        if self.state != next {
            log::debug!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

fn log_reading(temperature: f32, reading: &Reading) {
    match reading.humidity_percent {
        Some(humidity) => log::info!("Temperature: {temperature}C | Humidity: {humidity}%"),
        None => log::info!("Temperature: {temperature}C | Humidity: n/a"),
    }
}
