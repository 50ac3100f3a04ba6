use super::{TransportRequest, TransportResponse};
use crate::error::{Error, TransportErrorKind};
use http::Method;
use std::{sync::Arc, time::Duration};
use ureq::Agent;

/// Trait implemented by any blocking HTTP layer.
pub trait BlockingTransport: Send + Sync + 'static {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error>;
}

pub type DynBlockingTransport = Arc<dyn BlockingTransport>;

impl<T: BlockingTransport + ?Sized> BlockingTransport for Arc<T> {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        (**self).send(req)
    }
}

/// Default blocking transport built on `ureq`.
#[derive(Clone)]
pub struct UreqBlocking {
    agent: Agent,
}

impl UreqBlocking {
    /// Construct a new transport.
    ///
    /// * `ua` – User-Agent header.
    /// * `timeout` – overall per-request timeout.
    /// * `connect_timeout` – connection establishment timeout.
    /// * `read_timeout` – timeout for receiving the response body.
    /// * `no_proxy` – ignore system proxy environment variables.
    pub fn try_new(
        ua: &str,
        timeout: Duration,
        connect_timeout: Duration,
        read_timeout: Duration,
        no_proxy: bool,
    ) -> Result<Self, Error> {
        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .timeout_connect(Some(connect_timeout))
            .timeout_recv_body(Some(read_timeout))
            .user_agent(ua);

        if no_proxy {
            builder = builder.proxy(None);
        }

        Ok(Self {
            agent: Agent::new_with_config(builder.build()),
        })
    }
}

fn classify(err: &ureq::Error) -> TransportErrorKind {
    match err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            TransportErrorKind::Timeout
        }
        ureq::Error::Io(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
            ) =>
        {
            TransportErrorKind::Connect
        }
        _ => TransportErrorKind::Other,
    }
}

impl BlockingTransport for UreqBlocking {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let TransportRequest {
            method,
            url,
            headers,
            timeout,
        } = req;
        let path = url.path().to_string().into_boxed_str();

        // The idler API is GET-only.
        if method != Method::GET {
            return Err(Error::InvalidConfig {
                message: format!("unsupported HTTP method for blocking client: {method}")
                    .into_boxed_str(),
                source: None,
            });
        }

        let transport_err = |kind: TransportErrorKind, err: ureq::Error| Error::Transport {
            method: method.clone(),
            path: path.clone(),
            kind,
            source: Box::new(err),
        };

        let mut builder = self.agent.get(url.as_str());
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        let mut response = builder
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()
            .map_err(|err| transport_err(classify(&err), err))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|err| transport_err(TransportErrorKind::Body, err));

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
