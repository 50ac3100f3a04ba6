use crate::Error;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// Transport-independent description of one idler API call.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub segments: Vec<String>,
}

impl Request {
    #[must_use]
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }
}

/// Response to a [`Request`].
///
/// `body` carries the read error when the connection broke after the status
/// line; status and headers are always valid.
#[derive(Debug)]
pub struct Response {
    pub method: Method,
    /// Resolved endpoint URL the request was sent to.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Result<Vec<u8>, Error>,
}

impl Response {
    /// Body bytes, empty when the body could not be read.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}
