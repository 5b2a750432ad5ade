use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use stressweb_core::{
    BatchDispatcher, FailureKind, Method, NoProgress, Outcome, RequestIssuer, RequestSpec,
    ReqwestTransport, RunConfig, DEFAULT_USER_AGENT,
};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issuer(timeout: Duration) -> RequestIssuer {
    let transport = ReqwestTransport::new(8, timeout).unwrap();
    RequestIssuer::new(Arc::new(transport), timeout)
}

fn get(url: &str) -> RequestSpec {
    RequestSpec::new(url, Method::Get, BTreeMap::new(), None).unwrap()
}

#[tokio::test]
async fn test_ok_response_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = issuer(Duration::from_secs(5))
        .attempt(&get(&format!("{}/health", server.uri())))
        .await;

    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = issuer(Duration::from_secs(5))
        .attempt(&get(&server.uri()))
        .await;

    assert_eq!(outcome, Outcome::Failure(FailureKind::Status(500)));
}

#[tokio::test]
async fn test_post_sends_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"ping":true}"#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    let spec = RequestSpec::new(
        &format!("{}/submit", server.uri()),
        Method::Post,
        headers,
        Some(Bytes::from_static(br#"{"ping":true}"#)),
    )
    .unwrap();

    let outcome = issuer(Duration::from_secs(5)).attempt(&spec).await;

    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let outcome = issuer(Duration::from_millis(100))
        .attempt(&get(&server.uri()))
        .await;

    assert_eq!(outcome, Outcome::Failure(FailureKind::Timeout));
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    // Bind then drop a listener to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let outcome = issuer(Duration::from_secs(5))
        .attempt(&get(&format!("http://127.0.0.1:{port}/")))
        .await;

    assert_eq!(outcome, Outcome::Failure(FailureKind::Connect));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatch_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(25)
        .mount(&server)
        .await;

    let dispatcher = BatchDispatcher::new(issuer(Duration::from_secs(5)), Arc::new(NoProgress));
    let config = RunConfig::new(25, 5, 10).unwrap();

    let stats = dispatcher
        .run(Arc::new(get(&server.uri())), &config)
        .await
        .unwrap();

    assert_eq!(stats.sent, 25);
    assert_eq!(stats.success, 25);
    assert_eq!(stats.failure, 0);
    assert_eq!(stats.batches, 3);
}
