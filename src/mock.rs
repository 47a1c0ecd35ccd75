use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use serde::Serialize;
use sonic_rs::to_vec;

use crate::error::{PushError, PushErrorKind, PushResult};
use crate::transport::{HttpBytes, HttpFuture, HttpRequest, HttpResponse, Transport};

/// Outcome of the last completed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockTransportState {
    Idle,
    Failed,
}

/// What the mock does with the next request, before any queued response is consulted.
#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    #[default]
    Pass,
    /// Fails before the request is sent: nothing reaches the outbound log.
    ConnectError(String),
    /// Fails after the request was sent: it is logged, the answer is lost.
    ReceiveError(String),
}

impl MockBehavior {
    pub fn connect_error(reason: impl Into<String>) -> Self {
        Self::ConnectError(reason.into())
    }

    pub fn receive_error(reason: impl Into<String>) -> Self {
        Self::ReceiveError(reason.into())
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: HttpBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<HttpBytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }

    pub fn json<T: Serialize>(status: u16, payload: &T) -> PushResult<Self> {
        let body = to_vec(payload).map_err(PushError::encode)?;
        Ok(Self::new(status, body))
    }
}

#[derive(Clone, Debug)]
pub struct MockTransportSnapshot {
    pub state: MockTransportState,
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub behavior_remaining: usize,
    pub response_queue_len: usize,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct MockTransportInner {
    state: MockTransportState,
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    behaviors: VecDeque<MockBehavior>,
    responses: VecDeque<MockResponse>,
    outbound_log: Vec<HttpRequest>,
    last_error: Option<String>,
}

impl MockTransportInner {
    fn snapshot(&self) -> MockTransportSnapshot {
        MockTransportSnapshot {
            state: self.state,
            request_count: self.request_count,
            last_url: self.last_url.clone(),
            last_status: self.last_status,
            behavior_remaining: self.behaviors.len(),
            response_queue_len: self.responses.len(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for MockTransportInner {
    fn default() -> Self {
        Self {
            state: MockTransportState::Idle,
            request_count: 0,
            last_url: None,
            last_status: None,
            behaviors: VecDeque::new(),
            responses: VecDeque::new(),
            outbound_log: Vec::new(),
            last_error: None,
        }
    }
}

/// In-memory [`Transport`] for deterministic tests.
///
/// Responses are served in queue order. With an empty queue the mock answers `200` with an
/// empty body, which the client reports as a decode failure.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviors(behaviors: impl IntoIterator<Item = MockBehavior>) -> Self {
        let inner = MockTransportInner {
            behaviors: behaviors.into_iter().collect(),
            ..MockTransportInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn snapshot(&self) -> MockTransportSnapshot {
        self.inner
            .lock()
            .expect("mock transport mutex poisoned while taking snapshot")
            .snapshot()
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.inner
            .lock()
            .expect("mock transport mutex poisoned while queueing response")
            .responses
            .push_back(response);
    }

    pub fn queue_json<T: Serialize>(&self, status: u16, payload: &T) -> PushResult<()> {
        self.queue_response(MockResponse::json(status, payload)?);
        Ok(())
    }

    pub fn queue_text(&self, status: u16, body: impl Into<String>) {
        self.queue_response(MockResponse::text(status, body));
    }

    /// Every request that reached the mock's wire, oldest first.
    pub fn outbound(&self) -> Vec<HttpRequest> {
        self.inner
            .lock()
            .expect("mock transport mutex poisoned while reading outbound log")
            .outbound_log
            .clone()
    }

    fn begin(&self, request: &HttpRequest) -> (MockBehavior, Option<MockResponse>) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport mutex poisoned while starting request");
        inner.request_count += 1;
        inner.last_error = None;
        let behavior = inner.behaviors.pop_front().unwrap_or_default();
        if !matches!(behavior, MockBehavior::ConnectError(_)) {
            inner.outbound_log.push(request.clone());
            inner.last_url = Some(request.url.clone());
        }
        let response = match behavior {
            MockBehavior::Pass => inner.responses.pop_front(),
            _ => None,
        };
        (behavior, response)
    }

    fn fail(&self, message: String) -> PushError {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport mutex poisoned while recording error");
        inner.state = MockTransportState::Failed;
        inner.last_status = None;
        inner.last_error = Some(message.clone());
        PushError::new(PushErrorKind::Transport, None, message)
    }

    fn finish(&self, response: MockResponse) -> HttpResponse {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport mutex poisoned while recording response");
        inner.state = MockTransportState::Idle;
        inner.last_status = Some(response.status);
        HttpResponse {
            status: response.status,
            body: response.body,
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> HttpFuture<PushResult<HttpResponse>> {
        let transport = self.clone();
        Box::pin(async move {
            let (behavior, response) = transport.begin(&request);

            match behavior {
                MockBehavior::ConnectError(reason) | MockBehavior::ReceiveError(reason) => {
                    Err(transport.fail(reason))
                }
                MockBehavior::Pass => {
                    let response = response.unwrap_or_else(|| MockResponse::new(200, Bytes::new()));
                    Ok(transport.finish(response))
                }
            }
        })
    }
}
