use crate::error::Result;
use crate::outcome::{FailureKind, Outcome};
use crate::request::{Method, RequestSpec};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::trace;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<u16, TransportError>> + Send + 'a>>;

/// Classified transport failure. Carries the underlying message for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connect(_) => FailureKind::Connect,
            TransportError::Io(_) => FailureKind::Io,
            TransportError::Protocol(_) => FailureKind::Protocol,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_redirect() || e.is_decode() {
            TransportError::Protocol(e.to_string())
        } else {
            TransportError::Io(e.to_string())
        }
    }
}

/// HTTP capability the engine drives. Returns the response status code.
pub trait HttpTransport: Send + Sync {
    fn name(&self) -> &'static str;

    fn send<'a>(&'a self, spec: &'a RequestSpec, timeout: Duration) -> TransportFuture<'a>;
}

/// Transport that never touches the network (always answers 200 after a delay)
pub struct MockTransport {
    delay: Duration,
    status: u16,
}

impl MockTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay, status: 200 }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl HttpTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn send<'a>(&'a self, _spec: &'a RequestSpec, _timeout: Duration) -> TransportFuture<'a> {
        Box::pin(async move {
            sleep(self.delay).await;
            Ok(self.status)
        })
    }
}

/// reqwest-backed transport sharing one connection pool across all workers
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Idle connections per host are capped at `concurrency`.
    pub fn new(concurrency: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(concurrency)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    fn send<'a>(&'a self, spec: &'a RequestSpec, timeout: Duration) -> TransportFuture<'a> {
        Box::pin(async move {
            let method = match spec.method() {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
            };

            let mut request = self
                .client
                .request(method, spec.url().clone())
                .timeout(timeout);
            for (name, value) in spec.headers() {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(body) = spec.body() {
                request = request.body(body.clone());
            }

            let response = request.send().await?;
            let status = response.status().as_u16();

            // Drain so the connection can go back to the pool; the status
            // alone decides the outcome.
            let _ = response.bytes().await;

            Ok(status)
        })
    }
}

/// Performs exactly one attempt and classifies it. Never fails.
#[derive(Clone)]
pub struct RequestIssuer {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl RequestIssuer {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves within `timeout` whatever the transport does with the
    /// deadline it is handed.
    pub async fn attempt(&self, spec: &RequestSpec) -> Outcome {
        let send = self.transport.send(spec, self.timeout);
        match tokio::time::timeout(self.timeout, send).await {
            Err(_) => Outcome::Failure(FailureKind::Timeout),
            Ok(Ok(status)) => Outcome::from_status(status),
            Ok(Err(e)) => {
                trace!(error = %e, "attempt failed");
                Outcome::Failure(e.kind())
            }
        }
    }
}
