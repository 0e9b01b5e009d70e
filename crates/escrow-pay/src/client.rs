//! Escrow Pay HTTP client.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::error::EscrowError;
use crate::payload::EscrowTransactionPayload;

/// Upstream bodies larger than this are refused (1 MiB).
const MAX_RESPONSE_BODY_SIZE: usize = 1024 * 1024;

/// Escrow API account credentials. Server-held, never taken from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct EscrowCredentials {
    pub email: String,
    pub api_key: String,
}

impl EscrowCredentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }

    /// `Basic base64(email:api_key)`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.email, self.api_key);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

impl fmt::Debug for EscrowCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscrowCredentials")
            .field("email", &self.email)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// The parts of a successful Escrow Pay response the storefront needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowResponse {
    pub landing_page: String,
    #[serde(deserialize_with = "string_or_number")]
    pub transaction_id: String,
    pub token: String,
}

/// Escrow sends `transaction_id` as a number; accept a string too.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Creates Escrow Pay transactions.
pub trait EscrowApi: Send + Sync {
    /// Issue exactly one create-transaction call.
    fn send(
        &self,
        payload: &EscrowTransactionPayload,
        credentials: &EscrowCredentials,
    ) -> impl Future<Output = Result<EscrowResponse, EscrowError>> + Send;
}

/// reqwest-backed [`EscrowApi`] bound to one endpoint for its lifetime.
#[derive(Debug, Clone)]
pub struct EscrowPayClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl EscrowPayClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, EscrowError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EscrowError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoint })
    }
}

impl EscrowApi for EscrowPayClient {
    async fn send(
        &self,
        payload: &EscrowTransactionPayload,
        credentials: &EscrowCredentials,
    ) -> Result<EscrowResponse, EscrowError> {
        let mut response = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::AUTHORIZATION, credentials.basic_auth_header())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "escrow request failed");
                EscrowError::Transport(e.to_string())
            })?;

        let status = response.status();

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_BODY_SIZE as u64 {
                return Err(EscrowError::ResponseTooLarge {
                    limit: MAX_RESPONSE_BODY_SIZE,
                });
            }
        }

        // The body is read exactly once; JSON decoding happens on the buffer.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read escrow response body");
            EscrowError::Transport(e.to_string())
        })? {
            if body.len() + chunk.len() > MAX_RESPONSE_BODY_SIZE {
                return Err(EscrowError::ResponseTooLarge {
                    limit: MAX_RESPONSE_BODY_SIZE,
                });
            }
            body.extend_from_slice(&chunk);
        }

        interpret_response(status.as_u16(), &body)
    }
}

/// Map a raw upstream status and body onto the client result.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<EscrowResponse, EscrowError> {
    let text = String::from_utf8_lossy(body).into_owned();

    if !(200..300).contains(&status) {
        tracing::error!(status, body = %text, "escrow pay error");
        return Err(EscrowError::Upstream { status, body: text });
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(status, error = %e, body = %text, "escrow pay: unusable success body");
        EscrowError::UnexpectedResponse { status, body: text }
    })
}
