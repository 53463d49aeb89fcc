//! Data model shared by the monitor loop and its runners.
//!
//! Everything here is transient: a [`Reading`] lives for one poll, an
//! [`AlertRequest`] for one send attempt and an [`AlertResult`] only long
//! enough to drive the indicators.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A single poll of the temperature/humidity sensor.
///
/// A missing temperature means the sensor answered but produced no usable
/// value; the monitor treats it like a failed read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_celsius: Option<f32>,
    pub humidity_percent: Option<f32>,
}

impl Reading {
    pub const fn new(temperature_celsius: f32, humidity_percent: f32) -> Self {
        Self {
            temperature_celsius: Some(temperature_celsius),
            humidity_percent: Some(humidity_percent),
        }
    }

    /// A reading without data.
    pub const fn empty() -> Self {
        Self {
            temperature_celsius: None,
            humidity_percent: None,
        }
    }

    /// Returns `true` if the temperature is present and strictly above `threshold`.
    pub fn exceeds(&self, threshold_celsius: f32) -> bool {
        self.temperature_celsius
            .is_some_and(|temperature| temperature > threshold_celsius)
    }
}

/// Everything needed to ask the SMS gateway for one alert.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertRequest {
    location: String,
    time: NaiveTime,
    temperature_celsius: f32,
    mobile_number: String,
}

impl AlertRequest {
    pub fn new(
        location: impl Into<String>,
        time: NaiveTime,
        temperature_celsius: f32,
        mobile_number: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            time,
            temperature_celsius,
            mobile_number: mobile_number.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn mobile_number(&self) -> &str {
        &self.mobile_number
    }

    /// Location and 12-hour local time, e.g. `Home at 02:05 PM`.
    pub fn place_and_time(&self) -> String {
        format!("{} at {}", self.location, self.time.format("%I:%M %p"))
    }

    /// Temperature as measured with the unit letter: `35C` for whole degrees,
    /// `33.4C` otherwise.
    pub fn temperature_label(&self) -> String {
        format!("{}C", self.temperature_celsius)
    }

    /// The JSON body expected by the gateway.
    pub fn payload(&self) -> SmsPayload {
        SmsPayload {
            mobiles: self.mobile_number.clone(),
            var1: self.place_and_time(),
            var2: self.temperature_label(),
        }
    }
}

/// Request body of the templated SMS endpoint.
///
/// `var1` and `var2` fill the two placeholders of the server-side template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsPayload {
    pub mobiles: String,
    pub var1: String,
    pub var2: String,
}

/// Outcome of one send attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertResult {
    pub success: bool,
    /// Response body on success, a description of the failure otherwise.
    pub detail: String,
}

impl AlertResult {
    pub fn delivered(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}
