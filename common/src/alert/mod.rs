mod gateway;

pub use gateway::{
    CircuitDigestGateway, DryRunGateway, GatewayError, GatewayResponse, SmsGateway,
};

use chrono::NaiveTime;
use heat_alert_model::{AlertRequest, AlertResult};

use crate::config::Config;

/// The only status the gateway uses for an accepted message.
const STATUS_OK: u16 = 200;

/// Builds alert requests and hands them to a [`SmsGateway`].
pub struct AlertSender<G> {
    gateway: G,
    location: String,
    mobile_number: String,
}

impl<G: SmsGateway> AlertSender<G> {
    pub fn new(gateway: G, config: &Config) -> Self {
        Self {
            gateway,
            location: config.location.clone(),
            mobile_number: config.mobile_number.clone(),
        }
    }

    /// The request describing `temperature_celsius` measured at `time`.
    pub fn request(&self, temperature_celsius: f32, time: NaiveTime) -> AlertRequest {
        AlertRequest::new(
            self.location.as_str(),
            time,
            temperature_celsius,
            self.mobile_number.as_str(),
        )
    }

    /// Alert about `temperature_celsius`, stamped with the current local time.
    pub async fn send(&self, temperature_celsius: f32) -> AlertResult {
        let request = self.request(temperature_celsius, chrono::Local::now().time());
        self.deliver(&request).await
    }

    /// Make a single delivery attempt. Failures are logged and returned, never raised.
    pub async fn deliver(&self, request: &AlertRequest) -> AlertResult {
        let payload = request.payload();

        match self.gateway.send(&payload).await {
            Ok(response) if response.status == STATUS_OK => {
                log::info!("[OK] SMS sent: {}, Temp = {}", payload.var1, payload.var2);
                log::info!("Response: {}", response.body);
                AlertResult::delivered(response.body)
            }
            Ok(response) => {
                log::error!("[ERROR] SMS failed. Status: {}", response.status);
                log::error!("Response: {}", response.body);
                AlertResult::failed(format!("HTTP {}: {}", response.status, response.body))
            }
            Err(e) => {
                log::error!("Connection error: {e}");
                AlertResult::failed(e.to_string())
            }
        }
    }
}
