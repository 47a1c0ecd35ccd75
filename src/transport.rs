use std::{
    future::Future,
    pin::Pin,
    time::Instant,
};

use bytes::Bytes;
use reqwest::header::HeaderValue;
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{PushError, PushErrorKind, PushResult};

pub type HttpBytes = Bytes;
pub type HttpFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, HttpBytes)>,
    pub body: HttpBytes,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<HttpBytes>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<HttpBytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_ref())
    }
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: HttpBytes,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> PushResult<T> {
        sonic_rs::from_slice(&self.body).map_err(|err| PushError::decode(Some(self.status), err))
    }
}

/// Seam between [`crate::PushClient`] and the network. Implementations only move bytes;
/// status handling stays in the client.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> HttpFuture<PushResult<HttpResponse>>;
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: ReqwestClient::new(),
        }
    }

    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> HttpFuture<PushResult<HttpResponse>> {
        let client = self.client.clone();
        Box::pin(async move {
            let start = Instant::now();
            let mut req = client.request(request.method, &request.url);

            for (key, value) in request.headers {
                let value = HeaderValue::from_bytes(value.as_ref()).map_err(|err| {
                    PushError::new(PushErrorKind::Encode, None, err.to_string())
                })?;
                req = req.header(key, value);
            }

            debug!(url = %request.url, bytes = request.body.len(), "sending request");
            let resp = req
                .body(request.body)
                .send()
                .await
                .map_err(PushError::from_reqwest)?;

            let status = resp.status().as_u16();
            let body = resp.bytes().await.map_err(PushError::from_reqwest)?;
            debug!(status, bytes = body.len(), elapsed = ?start.elapsed(), "received response");

            Ok(HttpResponse { status, body })
        })
    }
}
