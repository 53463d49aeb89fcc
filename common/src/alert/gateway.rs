use std::future::Future;

use heat_alert_model::SmsPayload;
use reqwest::header::AUTHORIZATION;

use crate::config::{ApiKey, Config};

/// Raw answer of the gateway. Any status counts as a response; interpreting
/// it is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

/// Error type for failures below HTTP (DNS, connect, TLS, timeout, body read).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Something that can deliver an SMS payload.
pub trait SmsGateway {
    /// Send one payload. Never retries.
    fn send(
        &self,
        payload: &SmsPayload,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>>;
}

/// The circuitdigest.cloud templated SMS endpoint.
pub struct CircuitDigestGateway {
    client: reqwest::Client,
    url: String,
    template_id: String,
    api_key: ApiKey,
}

impl CircuitDigestGateway {
    /// Build the HTTP client with the configured request timeout.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.send_url(),
            template_id: config.template_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The POST request for `payload`, ready to execute.
    pub fn request(&self, payload: &SmsPayload) -> Result<reqwest::Request, GatewayError> {
        let request = self
            .client
            .post(&self.url)
            .query(&[("ID", self.template_id.as_str())])
            .header(AUTHORIZATION, self.api_key.expose())
            .json(payload)
            .build()?;
        Ok(request)
    }
}

impl SmsGateway for CircuitDigestGateway {
    async fn send(&self, payload: &SmsPayload) -> Result<GatewayResponse, GatewayError> {
        let request = self.request(payload)?;
        log::debug!("-> POST {}", request.url());

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        log::debug!("<- {status}");
        let body = response.text().await?;

        Ok(GatewayResponse { status, body })
    }
}

/// Logs the payload instead of sending it and always answers 200.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunGateway;

impl SmsGateway for DryRunGateway {
    async fn send(&self, payload: &SmsPayload) -> Result<GatewayResponse, GatewayError> {
        log::info!(
            "Dry run, not sending SMS to {}: {} / {}",
            payload.mobiles,
            payload.var1,
            payload.var2
        );

        Ok(GatewayResponse {
            status: 200,
            body: r#"{"status":"dry-run"}"#.into(),
        })
    }
}
