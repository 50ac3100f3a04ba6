//! High-level blocking idler client.

use crate::{
    BodySnippetConfig, Error, api,
    transport::{
        TransportRequest,
        blocking_transport::{BlockingTransport, DynBlockingTransport, UreqBlocking},
        request::{Request, Response},
    },
    util::url::{endpoint_url, normalize_base_url},
};
use http::HeaderMap;
use std::{sync::Arc, time::Duration};
use url::Url;

#[cfg(feature = "tracing")]
use tracing::field;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configures and constructs [`BlockingClient`].
pub struct BlockingClientBuilder {
    raw_base: String,
    base_url: Url,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    no_proxy: bool,
    default_headers: HeaderMap,
    body_snippet: BodySnippetConfig,
    transport: Option<DynBlockingTransport>,
}

impl BlockingClientBuilder {
    fn try_new(base: impl AsRef<str>) -> Result<Self, Error> {
        let raw_base = base.as_ref().to_owned();
        let base_url = normalize_base_url(&raw_base)?;
        Ok(Self {
            raw_base,
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            no_proxy: false,
            default_headers: HeaderMap::new(),
            body_snippet: BodySnippetConfig::default(),
            transport: None,
        })
    }

    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    pub fn read_timeout(mut self, value: Duration) -> Self {
        self.read_timeout = value;
        self
    }

    pub fn default_header(
        mut self,
        name: http::header::HeaderName,
        value: http::HeaderValue,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    pub fn capture_body_snippet(mut self, enabled: bool) -> Self {
        self.body_snippet.enabled = enabled;
        self
    }

    pub fn max_body_snippet_bytes(mut self, max_bytes: usize) -> Self {
        self.body_snippet.max_bytes = max_bytes;
        self
    }

    /// Send requests through `transport` instead of the default `ureq` agent.
    ///
    /// Proxy and connect/read timeout settings are then the transport's
    /// business; `timeout` is still passed along with every request.
    pub fn transport(mut self, transport: impl BlockingTransport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<BlockingClient, Error> {
        let transport: DynBlockingTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqBlocking::try_new(
                &self.user_agent,
                self.timeout,
                self.connect_timeout,
                self.read_timeout,
                self.no_proxy,
            )?),
        };

        Ok(BlockingClient {
            inner: Arc::new(Inner {
                raw_base: self.raw_base,
                base: self.base_url,
                timeout: self.timeout,
                default_headers: self.default_headers,
                body_snippet: self.body_snippet,
                transport,
            }),
        })
    }
}

/// Blocking client for the idler service.
///
/// Cloning is cheap and clones share the same transport.
#[derive(Clone)]
pub struct BlockingClient {
    inner: Arc<Inner>,
}

struct Inner {
    raw_base: String,
    base: Url,
    timeout: Duration,
    default_headers: HeaderMap,
    body_snippet: BodySnippetConfig,
    transport: DynBlockingTransport,
}

impl BlockingClient {
    /// Start configuring a client for the idler at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `base` is not an absolute,
    /// hierarchical URL or carries a query or fragment.
    pub fn builder(base: impl AsRef<str>) -> Result<BlockingClientBuilder, Error> {
        BlockingClientBuilder::try_new(base)
    }

    /// Client with default settings for the idler at `base`.
    ///
    /// # Errors
    ///
    /// Fails like [`BlockingClient::builder`] on an invalid base URL, or with
    /// [`Error::InvalidConfig`] when the default transport cannot be built.
    pub fn new(base: impl AsRef<str>) -> Result<Self, Error> {
        Self::builder(base)?.build()
    }

    /// Base URL exactly as it was given to the builder.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.raw_base
    }

    #[must_use]
    pub fn idler(&self) -> api::BlockingIdlerService {
        api::BlockingIdlerService::new(self.clone())
    }

    /// Shortcut for [`api::BlockingIdlerService::is_idle`].
    pub fn is_idle(&self, tenant: &str) -> Result<bool, Error> {
        self.idler().is_idle(tenant)
    }

    /// Shortcut for [`api::BlockingIdlerService::un_idle`].
    pub fn un_idle(&self, tenant: &str) -> Result<(), Error> {
        self.idler().un_idle(tenant)
    }

    /// Sends `req` and hands the response to `handle`, which decides whether
    /// the body matters.
    pub(crate) fn execute_request<T>(
        &self,
        req: &Request,
        handle: impl FnOnce(Response, BodySnippetConfig) -> Result<T, Error>,
    ) -> Result<T, Error> {
        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new();

        let url = endpoint_url(&self.inner.base, req.segments.iter().map(|s| s.as_str()))?;

        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "idler.request",
            http.method = %req.method,
            http.host = %self.inner.base.host_str().unwrap_or_default(),
            http.path = %url.path(),
            http.status = field::Empty,
            request_id = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let resp = match self.inner.transport.send(TransportRequest {
            method: req.method.clone(),
            url: url.clone(),
            headers: self.inner.default_headers.clone(),
            timeout: self.inner.timeout,
        }) {
            Ok(resp) => resp,
            Err(err) => {
                #[cfg(feature = "metrics")]
                crate::transport::metrics::record_outcome(
                    &req.method,
                    url.path(),
                    None,
                    start.elapsed(),
                    Some(err.kind()),
                );
                #[cfg(feature = "tracing")]
                {
                    span.record("error_kind", field::debug(err.kind()));
                    span.record("latency_ms", start.elapsed().as_millis() as i64);
                }
                return Err(err);
            }
        };

        let status = resp.status;
        let response = Response {
            method: req.method.clone(),
            url: url.clone(),
            status,
            headers: resp.headers,
            body: resp.body,
        };

        #[cfg(feature = "tracing")]
        {
            span.record("http.status", status.as_u16() as i64);
            span.record("latency_ms", start.elapsed().as_millis() as i64);
            if let Some(rid) = crate::util::diagnostics::request_id(&response.headers) {
                span.record("request_id", field::display(rid));
            }
        }

        let result = handle(response, self.inner.body_snippet);

        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(
            &req.method,
            url.path(),
            Some(status),
            start.elapsed(),
            result.as_ref().err().map(Error::kind),
        );
        #[cfg(feature = "tracing")]
        {
            if let Err(err) = &result {
                span.record("error_kind", field::debug(err.kind()));
            }
        }

        result
    }
}
