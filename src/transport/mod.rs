//! HTTP transport layer.
//!
//! * `ReqwestAsync` / `UreqBlocking` are the default transports.
//! * Callers may plug their own implementation of [`async_transport::AsyncTransport`]
//!   or [`blocking_transport::BlockingTransport`] through the client builders.

#[cfg(feature = "async")]
pub mod async_transport;
#[cfg(feature = "blocking")]
pub mod blocking_transport;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
pub mod request;

use crate::Error;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// A fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

/// Raw response returned by a transport.
///
/// A transport returns `Ok` as soon as a status line arrived. The body is
/// drained before returning so the connection is released; a failure while
/// draining it is kept in `body` (with [`crate::TransportErrorKind::Body`])
/// instead of failing the whole exchange.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Result<Vec<u8>, Error>,
}
