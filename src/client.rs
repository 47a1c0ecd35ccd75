use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use sonic_rs::Value;
use tracing::error;

use crate::config::ClientConfig;
use crate::error::{PushError, PushErrorKind, PushResult};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::types::{PushReceipt, PushRequest, display_json};

const PUSH_PATH: &str = "/push";

/// Body of a non-2xx answer. A missing `detail` is a decode failure.
#[derive(Deserialize)]
struct RejectionBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Async client for the ox-db `/push` endpoint.
///
/// Cheap to clone; clones share the config and the transport. Calls are independent
/// of each other and may run concurrently.
#[derive(Clone)]
pub struct PushClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl PushClient {
    /// Client for [`crate::DEFAULT_BASE_URL`] over reqwest.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn push_url(&self) -> String {
        format!("{}{PUSH_PATH}", self.config.base_url())
    }

    /// Submits `request` and normalizes the outcome.
    ///
    /// Every failure, whether transport, rejection or malformed body, comes back as a
    /// [`PushError`] and is logged before returning.
    pub async fn push(&self, request: &PushRequest) -> PushResult<PushReceipt> {
        let url = self.push_url();
        let result = self.send_push(&url, request).await;
        if let Err(err) = &result {
            error!(
                url = %url,
                kind = ?err.kind(),
                status = ?err.status(),
                "ox-db push failed: {err}"
            );
        }
        result
    }

    async fn send_push(&self, url: &str, request: &PushRequest) -> PushResult<PushReceipt> {
        let body = sonic_rs::to_vec(request).map_err(PushError::encode)?;
        let http = HttpRequest::post(url)
            .with_header(CONTENT_TYPE.as_str(), "application/json")
            .with_body(body);

        let response = self.transport.send(http).await?;
        if !response.is_success() {
            let rejection: RejectionBody = response.json()?;
            let detail = rejection.detail.ok_or_else(|| {
                PushError::new(
                    PushErrorKind::Decode,
                    Some(response.status()),
                    "missing field `detail` in error response",
                )
            })?;
            return Err(PushError::rejected(response.status(), display_json(&detail)));
        }

        let value: Value = response.json()?;
        Ok(PushReceipt::new(value))
    }
}

impl Default for PushClient {
    fn default() -> Self {
        Self::new()
    }
}
