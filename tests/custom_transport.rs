#![cfg(feature = "blocking")]

use http::{HeaderMap, StatusCode};
use idler_client::transport::{
    TransportRequest, TransportResponse, blocking_transport::BlockingTransport,
};
use idler_client::{BlockingClient, Error, ErrorKind, TransportErrorKind};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// Records every request and answers with a canned status and body.
#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<(String, Duration)>>>,
    status: u16,
    body: &'static str,
}

impl Recorder {
    fn answering(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            ..Self::default()
        }
    }

    fn urls(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

impl BlockingTransport for Recorder {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        self.seen
            .lock()
            .unwrap()
            .push((req.url.to_string(), req.timeout));
        Ok(TransportResponse {
            status: StatusCode::from_u16(self.status).unwrap(),
            headers: HeaderMap::new(),
            body: Ok(self.body.as_bytes().to_vec()),
        })
    }
}

/// Delivers a status line, then loses the body mid-read.
struct TruncatedBody(u16);

impl BlockingTransport for TruncatedBody {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        Ok(TransportResponse {
            status: StatusCode::from_u16(self.0).unwrap(),
            headers: HeaderMap::new(),
            body: Err(Error::Transport {
                method: req.method,
                path: req.url.path().into(),
                kind: TransportErrorKind::Body,
                source: "connection reset while reading body".into(),
            }),
        })
    }
}

fn truncating_client(status: u16) -> BlockingClient {
    BlockingClient::builder("http://idler.test")
        .unwrap()
        .transport(TruncatedBody(status))
        .build()
        .unwrap()
}

#[test]
fn one_request_per_call_with_configured_timeout() {
    let recorder = Recorder::answering(200, r#"{"is_idle": true}"#);
    let client = BlockingClient::builder("http://idler.test:9000")
        .unwrap()
        .timeout(Duration::from_secs(3))
        .transport(recorder.clone())
        .build()
        .unwrap();

    assert!(client.is_idle("acme").unwrap());
    client.un_idle("beta-jenkins").unwrap();

    assert_eq!(
        recorder.urls(),
        [
            "http://idler.test:9000/api/idler/isidle/acme-jenkins",
            "http://idler.test:9000/api/idler/unidle/beta-jenkins",
        ]
    );
    let seen = recorder.seen.lock().unwrap();
    assert!(seen.iter().all(|(_, timeout)| *timeout == Duration::from_secs(3)));
}

#[test]
fn clones_share_the_transport() {
    let recorder = Recorder::answering(404, "");
    let client = BlockingClient::builder("http://idler.test")
        .unwrap()
        .transport(recorder.clone())
        .build()
        .unwrap();

    let threads: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|tenant| {
            let client = client.clone();
            std::thread::spawn(move || client.is_idle(tenant))
        })
        .collect();
    for handle in threads {
        assert!(!handle.join().unwrap().unwrap());
    }

    let mut urls = recorder.urls();
    urls.sort();
    assert_eq!(
        urls,
        [
            "http://idler.test/api/idler/isidle/a-jenkins",
            "http://idler.test/api/idler/isidle/b-jenkins",
            "http://idler.test/api/idler/isidle/c-jenkins",
        ]
    );
}

#[test]
fn lost_body_is_not_assumed_idle() {
    let err = truncating_client(200).is_idle("acme").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(
        err,
        Error::Transport {
            kind: TransportErrorKind::Body,
            ..
        }
    ));
    assert!(!err.assumed_idle());
}

#[test]
fn lost_body_is_ignored_when_status_decides() {
    assert!(!truncating_client(404).is_idle("acme").unwrap());
    truncating_client(200).un_idle("acme").unwrap();

    let err = truncating_client(503).un_idle("acme").unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[test]
fn body_snippet_can_be_disabled() {
    let client = BlockingClient::builder("http://idler.test")
        .unwrap()
        .capture_body_snippet(false)
        .transport(Recorder::answering(200, "<html>maintenance</html>"))
        .build()
        .unwrap();

    match client.is_idle("acme").unwrap_err() {
        Error::Decode { body_snippet, .. } => assert_eq!(body_snippet, None),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn body_snippet_is_bounded() {
    let client = BlockingClient::builder("http://idler.test")
        .unwrap()
        .max_body_snippet_bytes(6)
        .transport(Recorder::answering(502, "<html>bad gateway</html>"))
        .build()
        .unwrap();

    let err = client.un_idle("acme").unwrap_err();
    match err {
        Error::UnexpectedStatus { error, .. } => {
            assert_eq!(error.status, StatusCode::BAD_GATEWAY);
            assert_eq!(error.body_snippet.as_deref(), Some("<html>"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[cfg(feature = "async")]
mod injected_async {
    use super::*;
    use async_trait::async_trait;
    use idler_client::Client;
    use idler_client::transport::async_transport::AsyncTransport;

    #[async_trait]
    impl AsyncTransport for Recorder {
        async fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
            BlockingTransport::send(self, req)
        }
    }

    #[tokio::test]
    async fn async_client_sends_through_injected_transport() {
        let recorder = Recorder::answering(200, r#"{"is_idle": false}"#);
        let client = Client::builder("http://idler.test/base")
            .unwrap()
            .timeout(Duration::from_secs(4))
            .transport(recorder.clone())
            .build()
            .unwrap();

        assert!(!client.is_idle("acme").await.unwrap());
        client.un_idle("acme").await.unwrap();

        assert_eq!(
            recorder.urls(),
            [
                "http://idler.test/base/api/idler/isidle/acme-jenkins",
                "http://idler.test/base/api/idler/unidle/acme-jenkins",
            ]
        );
        let seen = recorder.seen.lock().unwrap();
        assert!(seen.iter().all(|(_, timeout)| *timeout == Duration::from_secs(4)));
    }
}
