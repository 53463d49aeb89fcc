//! Temperature alert loop shared by the Raspberry Pi runner and the simulator.
//!
//! The loop only talks to its collaborators through small seams:
//! [`sensor::SensorReader`] for the sensor, [`embedded_hal::digital::OutputPin`]
//! for the indicator lines and [`alert::SmsGateway`] for the SMS API.

pub mod alert;
pub mod config;
pub mod indicator;
pub mod monitor;
pub mod sensor;

pub use heat_alert_model as model;

pub use alert::{AlertSender, CircuitDigestGateway, DryRunGateway, SmsGateway};
pub use config::{Config, ConfigError, PinAssignment};
pub use indicator::{Indicators, PULSE_DURATION};
pub use monitor::{Monitor, MonitorState, PollOutcome};
pub use sensor::{DummySensor, SensorError, SensorModel, SensorReader};
