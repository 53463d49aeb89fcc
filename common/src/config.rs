use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::sensor::SensorModel;

/// Compile-time API key, if one was provided when building.
const BUILTIN_API_KEY: Option<&str> = option_env!("HEAT_ALERT_API_KEY");

/// Error raised while building or validating a [`Config`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("mobile number {0:?} must contain digits only (country code first)")]
    MobileNumber(String),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("GPIO{0} is assigned more than once")]
    DuplicatePin(u8),
}

/// The API key, kept out of `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// BCM pin numbers of the sensor data line and the two indicator lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinAssignment {
    pub sensor: u8,
    pub success: u8,
    pub failure: u8,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            sensor: 4,
            success: 23,
            failure: 24,
        }
    }
}

/// Process-wide settings, built once at startup and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_key: ApiKey,
    /// Selects the message template on the gateway side.
    pub template_id: String,
    /// Country code followed by the subscriber number, digits only.
    pub mobile_number: String,
    pub location: String,
    pub threshold_celsius: f32,
    pub poll_interval: Duration,
    pub cooldown: Duration,
    pub pins: PinAssignment,
    pub sensor_model: SensorModel,
    pub api_base: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: ApiKey::new(BUILTIN_API_KEY.unwrap_or_default()),
            template_id: "102".into(),
            mobile_number: String::new(),
            location: "Home".into(),
            threshold_celsius: 33.0,
            poll_interval: Duration::from_secs(10),
            cooldown: Duration::from_secs(60),
            pins: PinAssignment::default(),
            sensor_model: SensorModel::Dht11,
            api_base: "https://www.circuitdigest.cloud".into(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults.
    ///
    /// | Env Var                        | Default                           |
    /// |--------------------------------|-----------------------------------|
    /// | `HEAT_ALERT_API_KEY`           | compile-time `HEAT_ALERT_API_KEY` |
    /// | `HEAT_ALERT_TEMPLATE_ID`       | `102`                             |
    /// | `HEAT_ALERT_MOBILE`            | required                          |
    /// | `HEAT_ALERT_LOCATION`          | `Home`                            |
    /// | `HEAT_ALERT_THRESHOLD_C`       | `33`                              |
    /// | `HEAT_ALERT_POLL_SECS`         | `10`                              |
    /// | `HEAT_ALERT_COOLDOWN_SECS`     | `60`                              |
    /// | `HEAT_ALERT_SENSOR_PIN`        | `4`                               |
    /// | `HEAT_ALERT_SUCCESS_PIN`       | `23`                              |
    /// | `HEAT_ALERT_FAILURE_PIN`       | `24`                              |
    /// | `HEAT_ALERT_SENSOR_MODEL`      | `dht11`                           |
    /// | `HEAT_ALERT_API_BASE`          | `https://www.circuitdigest.cloud` |
    /// | `HEAT_ALERT_HTTP_TIMEOUT_SECS` | `10`                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let text = |key: &str| lookup(key).map(|value| value.trim().to_string());

        if let Some(key) = text("HEAT_ALERT_API_KEY") {
            config.api_key = ApiKey::new(key);
        }
        if let Some(template_id) = text("HEAT_ALERT_TEMPLATE_ID") {
            config.template_id = template_id;
        }
        if let Some(mobile) = text("HEAT_ALERT_MOBILE") {
            config.mobile_number = mobile;
        }
        if let Some(location) = text("HEAT_ALERT_LOCATION") {
            config.location = location;
        }
        if let Some(base) = text("HEAT_ALERT_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(threshold) = parsed::<f32>(&lookup, "HEAT_ALERT_THRESHOLD_C")? {
            if !threshold.is_finite() {
                return Err(ConfigError::Invalid {
                    key: "HEAT_ALERT_THRESHOLD_C",
                    value: threshold.to_string(),
                    reason: "must be a finite number".into(),
                });
            }
            config.threshold_celsius = threshold;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HEAT_ALERT_POLL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HEAT_ALERT_COOLDOWN_SECS")? {
            config.cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64>(&lookup, "HEAT_ALERT_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(pin) = parsed::<u8>(&lookup, "HEAT_ALERT_SENSOR_PIN")? {
            config.pins.sensor = pin;
        }
        if let Some(pin) = parsed::<u8>(&lookup, "HEAT_ALERT_SUCCESS_PIN")? {
            config.pins.success = pin;
        }
        if let Some(pin) = parsed::<u8>(&lookup, "HEAT_ALERT_FAILURE_PIN")? {
            config.pins.failure = pin;
        }
        if let Some(model) = parsed::<SensorModel>(&lookup, "HEAT_ALERT_SENSOR_MODEL")? {
            config.sensor_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings the loop cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::Missing("HEAT_ALERT_API_KEY"));
        }
        if self.template_id.is_empty() {
            return Err(ConfigError::Missing("HEAT_ALERT_TEMPLATE_ID"));
        }
        if self.mobile_number.is_empty() {
            return Err(ConfigError::Missing("HEAT_ALERT_MOBILE"));
        }
        if !self.mobile_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::MobileNumber(self.mobile_number.clone()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("HEAT_ALERT_POLL_SECS"));
        }
        if self.cooldown.is_zero() {
            return Err(ConfigError::ZeroDuration("HEAT_ALERT_COOLDOWN_SECS"));
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("HEAT_ALERT_HTTP_TIMEOUT_SECS"));
        }

        let PinAssignment {
            sensor,
            success,
            failure,
        } = self.pins;
        if sensor == success || sensor == failure {
            return Err(ConfigError::DuplicatePin(sensor));
        }
        if success == failure {
            return Err(ConfigError::DuplicatePin(success));
        }

        Ok(())
    }

    /// Full URL of the templated send endpoint, without the query string.
    pub fn send_url(&self) -> String {
        format!("{}/send_sms", self.api_base)
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let value = value.trim();

    value
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("HEAT_ALERT_API_KEY", "secret"),
        ("HEAT_ALERT_MOBILE", "919876543210"),
    ];

    #[test]
    fn defaults_fill_everything_but_credentials() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.api_key.expose(), "secret");
        assert_eq!(config.template_id, "102");
        assert_eq!(config.location, "Home");
        assert_eq!(config.threshold_celsius, 33.0);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.pins, PinAssignment::default());
        assert_eq!(config.sensor_model, SensorModel::Dht11);
        assert_eq!(
            config.send_url(),
            "https://www.circuitdigest.cloud/send_sms"
        );
    }

    #[test]
    fn overrides_are_applied() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("HEAT_ALERT_THRESHOLD_C", "28.5"),
            ("HEAT_ALERT_POLL_SECS", "2"),
            ("HEAT_ALERT_COOLDOWN_SECS", "300"),
            ("HEAT_ALERT_SENSOR_MODEL", "DHT22"),
            ("HEAT_ALERT_SUCCESS_PIN", "17"),
            ("HEAT_ALERT_API_BASE", "http://localhost:8080/"),
            ("HEAT_ALERT_LOCATION", " Server room "),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.threshold_celsius, 28.5);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.cooldown, Duration::from_secs(300));
        assert_eq!(config.sensor_model, SensorModel::Dht22);
        assert_eq!(config.pins.success, 17);
        assert_eq!(config.location, "Server room");
        assert_eq!(config.send_url(), "http://localhost:8080/send_sms");
    }

    #[test]
    fn missing_mobile_is_rejected() {
        let result = Config::from_lookup(lookup(&[("HEAT_ALERT_API_KEY", "secret")]));
        assert_eq!(result, Err(ConfigError::Missing("HEAT_ALERT_MOBILE")));
    }

    #[test]
    fn mobile_must_be_digits() {
        let result = Config::from_lookup(lookup(&[
            ("HEAT_ALERT_API_KEY", "secret"),
            ("HEAT_ALERT_MOBILE", "+91 98765"),
        ]));
        assert_matches!(result, Err(ConfigError::MobileNumber(_)));
    }

    #[test]
    fn unparsable_numbers_name_the_variable() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HEAT_ALERT_POLL_SECS", "ten"));

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid {
                key: "HEAT_ALERT_POLL_SECS",
                ..
            }
        );
    }

    #[test]
    fn zero_cooldown_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HEAT_ALERT_COOLDOWN_SECS", "0"));

        assert_eq!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::ZeroDuration("HEAT_ALERT_COOLDOWN_SECS"))
        );
    }

    #[test]
    fn pins_must_be_distinct() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HEAT_ALERT_FAILURE_PIN", "23"));

        assert_eq!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::DuplicatePin(23))
        );
    }

    #[test]
    fn api_key_is_not_printed() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
