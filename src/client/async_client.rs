//! High-level asynchronous idler client.

use crate::{
    BodySnippetConfig, Error, api,
    transport::{
        TransportRequest,
        async_transport::{AsyncTransport, DynAsyncTransport, ReqwestAsync},
        request::{Request, Response},
    },
    util::url::{endpoint_url, normalize_base_url},
};
use http::HeaderMap;
use std::{sync::Arc, time::Duration};
use url::Url;

#[cfg(feature = "tracing")]
use tracing::{Instrument, field};

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configures and constructs [`Client`].
pub struct ClientBuilder {
    raw_base: String,
    base_url: Url,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    no_proxy: bool,
    default_headers: HeaderMap,
    body_snippet: BodySnippetConfig,
    transport: Option<DynAsyncTransport>,
}

impl ClientBuilder {
    /// Create a builder with opinionated defaults.
    fn try_new(base: impl AsRef<str>) -> Result<Self, Error> {
        let raw_base = base.as_ref().to_owned();
        let base_url = normalize_base_url(&raw_base)?;
        Ok(Self {
            raw_base,
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            no_proxy: false,
            default_headers: HeaderMap::new(),
            body_snippet: BodySnippetConfig::default(),
            transport: None,
        })
    }

    /// Ignore system proxy environment variables.
    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Adjust the per-request timeout.
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Adjust the connection establishment timeout.
    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Add a default header applied to every request.
    pub fn default_header(
        mut self,
        name: http::header::HeaderName,
        value: http::HeaderValue,
    ) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Add a set of default headers applied to every request.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Enable/disable capturing `body_snippet` on errors and decode failures.
    pub fn capture_body_snippet(mut self, enabled: bool) -> Self {
        self.body_snippet.enabled = enabled;
        self
    }

    /// Set max bytes to keep for `body_snippet`.
    pub fn max_body_snippet_bytes(mut self, max_bytes: usize) -> Self {
        self.body_snippet.max_bytes = max_bytes;
        self
    }

    /// Send requests through `transport` instead of the default `reqwest` client.
    ///
    /// Proxy and connect timeout settings are then the transport's business;
    /// `timeout` is still passed along with every request.
    pub fn transport(mut self, transport: impl AsyncTransport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let transport: DynAsyncTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestAsync::try_new(
                &self.user_agent,
                self.timeout,
                self.connect_timeout,
                self.no_proxy,
            )?),
        };

        Ok(Client {
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

/// Async client for the idler service.
///
/// Cloning is cheap and clones share the same transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    raw_base: String,
    base: Url,
    timeout: Duration,
    default_headers: HeaderMap,
    body_snippet: BodySnippetConfig,
    transport: DynAsyncTransport,
}

impl Client {
    /// Start configuring a client for the idler at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `base` is not an absolute,
    /// hierarchical URL or carries a query or fragment.
    pub fn builder(base: impl AsRef<str>) -> Result<ClientBuilder, Error> {
        ClientBuilder::try_new(base)
    }

    /// Client with default settings for the idler at `base`.
    ///
    /// # Errors
    ///
    /// Fails like [`Client::builder`] on an invalid base URL, or with
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
    pub fn idler(&self) -> api::IdlerService {
        api::IdlerService::new(self.clone())
    }

    /// Shortcut for [`api::IdlerService::is_idle`].
    pub async fn is_idle(&self, tenant: &str) -> Result<bool, Error> {
        self.idler().is_idle(tenant).await
    }

    /// Shortcut for [`api::IdlerService::un_idle`].
    pub async fn un_idle(&self, tenant: &str) -> Result<(), Error> {
        self.idler().un_idle(tenant).await
    }

    /// Sends `req` and hands the response to `handle`, which decides whether
    /// the body matters.
    pub(crate) async fn execute_request<T>(
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

        let sent = self.inner.transport.send(TransportRequest {
            method: req.method.clone(),
            url: url.clone(),
            headers: self.inner.default_headers.clone(),
            timeout: self.inner.timeout,
        });
        #[cfg(feature = "tracing")]
        let sent = sent.instrument(span.clone());

        let resp = match sent.await {
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

        let result = {
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            handle(response, self.inner.body_snippet)
        };

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
