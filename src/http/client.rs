use std::time::Duration;

use reqwest::{Client, Url, redirect};
use tokio::net::lookup_host;
use tracing::{debug, error};
use url::Host;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

/// Redirects followed before a request is classified as a redirect failure.
const REDIRECT_LIMIT: usize = 10;

/// Builds the client shared by every request of a run.
///
/// The timeout covers the whole request/response cycle. TLS verification is
/// left at the client defaults.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
        .build()
        .map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            HttpError::BuildClientFailed { source: err }
        })
}

/// Resolves the target host once before the run starts.
///
/// IP literals are accepted without a lookup.
///
/// # Errors
///
/// Returns an error when the host cannot be resolved or resolves to nothing.
pub async fn resolve_target(url: &Url) -> Result<(), HttpError> {
    let Some(Host::Domain(domain)) = url.host() else {
        return Ok(());
    };
    let port = url.port_or_known_default().unwrap_or(80);
    let mut addrs = lookup_host((domain, port))
        .await
        .map_err(|err| HttpError::ResolveHost {
            host: domain.to_owned(),
            port,
            source: err,
        })?;
    match addrs.next() {
        Some(addr) => {
            debug!("Resolved {} to {}", domain, addr);
            Ok(())
        }
        None => Err(HttpError::NoAddressesResolved {
            host: domain.to_owned(),
        }),
    }
}
