use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Url};
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::{OutcomeStatus, RequestOutcome, TransportFailure};

/// Issues a single request and reports how it went.
///
/// Implementations must not share mutable state between calls; everything
/// observed about the attempt is returned in the outcome.
#[async_trait]
pub trait RequestExecutor: Send + Sync + 'static {
    async fn execute(&self, request_id: u64) -> RequestOutcome;
}

#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request_id: u64) -> RequestOutcome {
        execute_request(&self.client, &self.url, self.timeout, request_id).await
    }
}

/// Sends one GET and times it up to the response head (or the failure).
///
/// The body is drained afterwards so the connection returns to the pool; a
/// failing drain does not change the outcome.
pub async fn execute_request(
    client: &Client,
    url: &Url,
    timeout: Duration,
    request_id: u64,
) -> RequestOutcome {
    let start = Instant::now();
    let result = client.get(url.clone()).timeout(timeout).send().await;
    let response_time = start.elapsed();

    let status = match result {
        Ok(response) => {
            let code = response.status().as_u16();
            if let Err(err) = drain_response_body(response).await {
                debug!("Request {} body drain failed: {}", request_id, err);
            }
            OutcomeStatus::from_status_code(code)
        }
        Err(err) => {
            let failure = classify_transport_error(&err);
            debug!("Request {} failed ({}): {}", request_id, failure, err);
            OutcomeStatus::TransportError(failure)
        }
    };

    RequestOutcome {
        request_id,
        status,
        response_time,
    }
}

/// Maps a client error onto a stable failure class.
#[must_use]
pub fn classify_transport_error(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        return TransportFailure::Timeout;
    }
    if err.is_redirect() {
        return TransportFailure::Redirect;
    }
    if let Some(kind) = io_error_kind(err) {
        if matches!(kind, ErrorKind::TimedOut) {
            return TransportFailure::Timeout;
        }
        if matches!(kind, ErrorKind::ConnectionRefused) {
            return TransportFailure::ConnectionRefused;
        }
        if matches!(
            kind,
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
        ) {
            return TransportFailure::ConnectionReset;
        }
    }
    if err.is_connect() {
        if is_dns_failure(err) {
            return TransportFailure::Dns;
        }
        return TransportFailure::Connect;
    }
    if err.is_body() || err.is_decode() {
        return TransportFailure::Body;
    }
    if err.is_request() {
        return TransportFailure::Request;
    }
    TransportFailure::Other
}

fn io_error_kind(err: &reqwest::Error) -> Option<ErrorKind> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        source = inner.source();
    }
    None
}

// hyper's resolver wraps getaddrinfo failures in an error displayed as "dns error".
fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.to_string().starts_with("dns error") {
            return true;
        }
        source = inner.source();
    }
    false
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
