use std::time::Duration;

use reqwest::Url;

use crate::args::{PositiveU64, PositiveUsize};
use crate::error::{ConfigError, ValidationError};

const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Immutable parameters of a single load test run.
///
/// Only constructible through [`TestRunConfig::new`], so a value of this type
/// always carries a positive request count, a positive concurrency, a non-zero
/// timeout and an absolute http(s) URL with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunConfig {
    url: Url,
    total_requests: PositiveU64,
    concurrency: PositiveUsize,
    timeout: Duration,
}

impl TestRunConfig {
    /// Validates raw run parameters.
    ///
    /// A concurrency above `total_requests` is accepted; the run then consists
    /// of a single partial batch.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for zero counts, a zero timeout, or a URL that
    /// does not parse, has no host, or is not http/https.
    pub fn new(
        url: &str,
        total_requests: u64,
        concurrency: usize,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let total_requests =
            PositiveU64::try_from(total_requests).map_err(|err| ConfigError::FieldMustBePositive {
                field: "requests".to_owned(),
                source: err,
            })?;
        let concurrency =
            PositiveUsize::try_from(concurrency).map_err(|err| ConfigError::FieldMustBePositive {
                field: "concurrency".to_owned(),
                source: err,
            })?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                source: ValidationError::DurationZero,
            });
        }
        let url = parse_target_url(url)?;

        Ok(Self {
            url,
            total_requests,
            concurrency,
            timeout,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn total_requests(&self) -> PositiveU64 {
        self.total_requests
    }

    #[must_use]
    pub const fn concurrency(&self) -> PositiveUsize {
        self.concurrency
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
        url: trimmed.to_owned(),
        source: err,
    })?;
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(ConfigError::UnsupportedScheme {
            url: trimmed.to_owned(),
            scheme: url.scheme().to_owned(),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::UrlMissingHost {
            url: trimmed.to_owned(),
        });
    }
    Ok(url)
}
