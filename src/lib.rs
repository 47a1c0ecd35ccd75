//! Async client for the ox-db `/push` endpoint, with an in-memory mock transport for
//! fully deterministic tests.

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod transport;
pub mod types;

pub use client::PushClient;
pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL};
pub use error::{PushError, PushErrorKind, PushResult};
pub use mock::{
    MockBehavior, MockResponse, MockTransport, MockTransportSnapshot, MockTransportState,
};
pub use transport::{HttpBytes, HttpFuture, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{PushReceipt, PushRequest, SUCCESS_PREFIX};
