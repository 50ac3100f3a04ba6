use crate::transport::request::{Request, Response};
use crate::util::{diagnostics, url::sanitize_url_for_error};
use crate::{BodySnippetConfig, Error, HttpError, IdleStatus, Namespace};
use http::StatusCode;

pub(crate) const CALL_IS_IDLE: &str = "isidle";
pub(crate) const CALL_UNIDLE: &str = "unidle";

fn idler_request(call: &'static str, namespace: &Namespace) -> Request {
    Request::get(["api", "idler", call, namespace.as_str()])
}

/// Maps an `isidle` response to the idle flag.
///
/// 404 is not an error: the idler only watches a single cluster and answers
/// 404 for namespaces living elsewhere, which are reported as not idle. The
/// body is not consulted in that case.
pub(crate) fn idle_state(resp: Response, snippet: BodySnippetConfig) -> Result<bool, Error> {
    if resp.status == StatusCode::NOT_FOUND {
        #[cfg(feature = "tracing")]
        tracing::debug!(path = resp.url.path(), "idler does not track namespace, not idle");
        return Ok(false);
    }

    let body = resp.body?;
    let status: IdleStatus = serde_json::from_slice(&body).map_err(|source| Error::Decode {
        status: resp.status,
        method: resp.method.clone(),
        path: resp.url.path().to_string().into_boxed_str(),
        request_id: diagnostics::request_id(&resp.headers),
        body_snippet: diagnostics::body_snippet(&body, snippet),
        source: Box::new(source),
    })?;
    Ok(status.is_idle)
}

/// Maps an `unidle` response: only 200 counts as accepted, whatever the body.
///
/// For other statuses the body only feeds diagnostics, so an unreadable one
/// leaves `message` and `body_snippet` empty.
pub(crate) fn unidle_outcome(resp: Response, snippet: BodySnippetConfig) -> Result<(), Error> {
    if resp.status == StatusCode::OK {
        return Ok(());
    }

    let body = resp.body_bytes();
    Err(Error::UnexpectedStatus {
        error: HttpError {
            status: resp.status,
            method: resp.method.clone(),
            url: Box::new(sanitize_url_for_error(&resp.url)),
            message: diagnostics::extract_message(body),
            request_id: diagnostics::request_id(&resp.headers),
            body_snippet: diagnostics::body_snippet(body, snippet),
        },
        call: CALL_UNIDLE,
    })
}

/// Idler APIs.
#[derive(Clone)]
#[cfg(feature = "async")]
pub struct IdlerService {
    client: crate::Client,
}

#[cfg(feature = "async")]
impl IdlerService {
    pub(crate) fn new(client: crate::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "async")]
impl IdlerService {
    /// `GET /api/idler/isidle/<namespace>`
    ///
    /// Returns whether the tenant's Jenkins is idled. On failure use
    /// [`Error::assumed_idle`] to pick the fallback state.
    pub async fn is_idle(&self, tenant: &str) -> Result<bool, Error> {
        let namespace = Namespace::for_tenant(tenant);
        let idle = self
            .client
            .execute_request(&idler_request(CALL_IS_IDLE, &namespace), idle_state)
            .await?;
        #[cfg(feature = "tracing")]
        tracing::debug!("Jenkins is idle ({idle}) in {namespace}");
        Ok(idle)
    }

    /// `GET /api/idler/unidle/<namespace>`
    pub async fn un_idle(&self, tenant: &str) -> Result<(), Error> {
        let namespace = Namespace::for_tenant(tenant);
        self.client
            .execute_request(&idler_request(CALL_UNIDLE, &namespace), unidle_outcome)
            .await
    }
}

/// Idler APIs (blocking).
#[cfg(feature = "blocking")]
#[derive(Clone)]
pub struct BlockingIdlerService {
    client: crate::BlockingClient,
}

#[cfg(feature = "blocking")]
impl BlockingIdlerService {
    pub(crate) fn new(client: crate::BlockingClient) -> Self {
        Self { client }
    }
}

#[cfg(feature = "blocking")]
impl BlockingIdlerService {
    /// `GET /api/idler/isidle/<namespace>`
    ///
    /// Returns whether the tenant's Jenkins is idled. On failure use
    /// [`Error::assumed_idle`] to pick the fallback state.
    pub fn is_idle(&self, tenant: &str) -> Result<bool, Error> {
        let namespace = Namespace::for_tenant(tenant);
        let idle = self
            .client
            .execute_request(&idler_request(CALL_IS_IDLE, &namespace), idle_state)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("Jenkins is idle ({idle}) in {namespace}");
        Ok(idle)
    }

    /// `GET /api/idler/unidle/<namespace>`
    pub fn un_idle(&self, tenant: &str) -> Result<(), Error> {
        let namespace = Namespace::for_tenant(tenant);
        self.client
            .execute_request(&idler_request(CALL_UNIDLE, &namespace), unidle_outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TransportErrorKind};
    use http::{HeaderMap, HeaderValue, Method};
    use url::Url;

    fn response(status: u16, body: &str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("rid-42"));
        Response {
            method: Method::GET,
            url: Url::parse("http://idler:8080/api/idler/isidle/acme-jenkins?x=1").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Ok(body.as_bytes().to_vec()),
        }
    }

    fn lost_body(status: u16) -> Response {
        Response {
            body: Err(Error::Transport {
                method: Method::GET,
                path: "/api/idler/isidle/acme-jenkins".into(),
                kind: TransportErrorKind::Body,
                source: "peer disconnected".into(),
            }),
            ..response(status, "")
        }
    }

    #[test]
    fn idler_request_targets_namespace_segment() {
        let req = idler_request(CALL_UNIDLE, &Namespace::for_tenant("acme-jenkins"));
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.segments, ["api", "idler", "unidle", "acme-jenkins"]);
    }

    #[test]
    fn idle_state_treats_not_found_as_awake() {
        let idle = idle_state(response(404, "not json at all"), BodySnippetConfig::default());
        assert!(!idle.unwrap());
    }

    #[test]
    fn idle_state_decodes_any_other_status() {
        let snippet = BodySnippetConfig::default();
        assert!(idle_state(response(200, r#"{"is_idle": true}"#), snippet).unwrap());
        assert!(!idle_state(response(200, r#"{"is_idle": false}"#), snippet).unwrap());
        assert!(!idle_state(response(200, "{}"), snippet).unwrap());
        assert!(idle_state(response(500, r#"{"is_idle": true}"#), snippet).unwrap());
    }

    #[test]
    fn idle_state_reports_decode_failures() {
        let err = idle_state(response(200, "not-json"), BodySnippetConfig::default())
            .expect_err("malformed body");
        assert!(!err.assumed_idle());
        match err {
            Error::Decode {
                status,
                path,
                request_id,
                body_snippet,
                ..
            } => {
                assert_eq!(status, StatusCode::OK);
                assert_eq!(&*path, "/api/idler/isidle/acme-jenkins");
                assert_eq!(request_id.as_deref(), Some("rid-42"));
                assert_eq!(body_snippet.as_deref(), Some("not-json"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn unidle_outcome_accepts_only_ok() {
        let snippet = BodySnippetConfig::default();
        assert!(unidle_outcome(response(200, ""), snippet).is_ok());

        for status in [201, 202, 204, 404, 503] {
            let err = unidle_outcome(response(status, ""), snippet).expect_err("non-200");
            assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
            assert!(err.to_string().contains(&status.to_string()));
        }
    }

    #[test]
    fn unidle_outcome_sanitizes_url_and_keeps_diagnostics() {
        let err = unidle_outcome(
            response(503, r#"{"message": "openshift unavailable"}"#),
            BodySnippetConfig::default(),
        )
        .expect_err("503");
        match err {
            Error::UnexpectedStatus { error, call } => {
                assert_eq!(call, "unidle");
                assert_eq!(error.url.query(), None);
                assert_eq!(error.message.as_deref(), Some("openshift unavailable"));
                assert_eq!(error.request_id.as_deref(), Some("rid-42"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn status_decides_before_the_body_is_read() {
        let snippet = BodySnippetConfig::default();
        assert!(!idle_state(lost_body(404), snippet).unwrap());
        assert!(unidle_outcome(lost_body(200), snippet).is_ok());
    }

    #[test]
    fn lost_body_fails_when_the_status_needs_it() {
        let snippet = BodySnippetConfig::default();

        let err = idle_state(lost_body(200), snippet).expect_err("body needed");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.assumed_idle());

        match unidle_outcome(lost_body(503), snippet).expect_err("503") {
            Error::UnexpectedStatus { error, .. } => {
                assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(error.message, None);
                assert_eq!(error.body_snippet, None);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
