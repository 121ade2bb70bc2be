//! Send API client: POST an `OutboundMessage` to the page's message endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::send::OutboundMessage;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("messenger access token not configured")]
    NotConfigured,
    #[error("send api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("send api error: {status} {body}")]
    Api { status: StatusCode, body: String },
}

/// Transport for outbound messages. The gateway uses `SendApiClient`; tests substitute recorders.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// reqwest-backed client for the Messenger send API. No retries.
#[derive(Clone)]
pub struct SendApiClient {
    send_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl SendApiClient {
    pub fn new(send_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            send_url: send_url.into(),
            access_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Delivery for SendApiClient {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(DeliveryError::NotConfigured)?;
        let res = self
            .client
            .post(&self.send_url)
            .query(&[("access_token", token)])
            .json(message)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError::Api { status, body });
        }
        Ok(())
    }
}
