//! Property-based tests using proptest
//!
//! These tests verify credential encoding, request isolation in the Basic
//! auth transport, and endpoint normalization using randomized inputs.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gke_pods::kubernetes::auth::basic_auth_header;
use gke_pods::kubernetes::{
    BasicAuthTransport, Config, KubeClient, RequestExecutor, TransportError,
};
use proptest::prelude::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, Response, Url};

/// Executor that keeps the headers it was handed
#[derive(Default)]
struct Capture {
    headers: Mutex<Option<HeaderMap>>,
}

#[async_trait]
impl RequestExecutor for Capture {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError> {
        *self.headers.lock().unwrap() = Some(request.headers().clone());
        Ok(http::Response::new("").into())
    }
}

fn decode_basic(value: &HeaderValue) -> String {
    let text = value.to_str().expect("header is ASCII");
    let encoded = text.strip_prefix("Basic ").expect("Basic scheme");
    String::from_utf8(STANDARD.decode(encoded).expect("valid base64")).expect("utf-8")
}

/// Generate a request with a handful of custom headers
fn arb_headers() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("x-[a-z]{1,12}", "[ -~]{0,24}"), 0..6)
}

proptest! {
    /// The header always decodes back to exactly username:password
    #[test]
    fn header_decodes_to_credentials(
        username in "\\PC{0,32}",
        password in "\\PC{0,32}",
    ) {
        let value = basic_auth_header(&username, &password).unwrap();
        prop_assert_eq!(decode_basic(&value), format!("{}:{}", username, password));
    }

    /// The caller's request is identical before and after the call, and the
    /// forwarded copy carries the caller's headers plus Authorization
    #[test]
    fn transport_never_mutates_caller_request(
        username in "[a-z]{1,16}",
        password in "[ -~]{0,16}",
        headers in arb_headers(),
    ) {
        let capture = Arc::new(Capture::default());
        let cfg = Config {
            base_url: "http://localhost".to_string(),
            username: username.clone(),
            password: password.clone(),
        };
        let transport = BasicAuthTransport::new(&cfg, capture.clone());

        let mut request = Request::new(Method::GET, Url::parse("http://localhost/api/v1").unwrap());
        for (name, value) in &headers {
            request.headers_mut().append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        let before = request.headers().clone();

        tokio_test::block_on(transport.execute(&request)).unwrap();

        prop_assert_eq!(request.headers(), &before);
        prop_assert!(request.headers().get(AUTHORIZATION).is_none());

        let seen = capture.headers.lock().unwrap().take().unwrap();
        prop_assert_eq!(decode_basic(&seen[AUTHORIZATION]), format!("{}:{}", username, password));
        for (name, _) in &headers {
            let sent: Vec<_> = seen.get_all(name.as_str()).iter().collect();
            let original: Vec<_> = before.get_all(name.as_str()).iter().collect();
            prop_assert_eq!(sent, original);
        }
    }

    /// Any number of trailing slashes collapses to a single /api/v1 suffix
    #[test]
    fn endpoint_strips_trailing_slashes(
        host in "[a-z]{1,10}(\\.[a-z]{2,5})?",
        port in 1u16..,
        slashes in 0usize..4,
    ) {
        let base_url = format!("http://{}:{}{}", host, port, "/".repeat(slashes));
        let client = KubeClient::new(&Config {
            base_url,
            ..Default::default()
        }).unwrap();

        let endpoint = client.endpoint_url();
        prop_assert!(endpoint.ends_with("/api/v1"));
        prop_assert!(!endpoint.contains("//api"));
    }
}
