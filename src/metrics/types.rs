use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The only status code counted as a successful request.
pub const SUCCESS_STATUS: u16 = 200;

/// Failure classes for requests that never produced an HTTP status.
///
/// Each class has a fixed description, so repeated failures of the same kind
/// always land on the same tally key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportFailure {
    Timeout,
    Dns,
    ConnectionRefused,
    ConnectionReset,
    Connect,
    Redirect,
    Body,
    Request,
    Other,
}

impl TransportFailure {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            TransportFailure::Timeout => "request timed out",
            TransportFailure::Dns => "dns resolution failed",
            TransportFailure::ConnectionRefused => "connection refused",
            TransportFailure::ConnectionReset => "connection reset",
            TransportFailure::Connect => "connection failed",
            TransportFailure::Redirect => "redirect policy violated",
            TransportFailure::Body => "response body error",
            TransportFailure::Request => "request error",
            TransportFailure::Other => "transport error",
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success(u16),
    HttpError(u16),
    TransportError(TransportFailure),
}

impl OutcomeStatus {
    #[must_use]
    pub const fn from_status_code(code: u16) -> Self {
        if code == SUCCESS_STATUS {
            OutcomeStatus::Success(code)
        } else {
            OutcomeStatus::HttpError(code)
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, OutcomeStatus::Success(_))
    }

    /// Tally key for failed outcomes, `None` for successes.
    #[must_use]
    pub const fn error_key(self) -> Option<ErrorKey> {
        match self {
            OutcomeStatus::Success(_) => None,
            OutcomeStatus::HttpError(code) => Some(ErrorKey::HttpStatus(code)),
            OutcomeStatus::TransportError(failure) => Some(ErrorKey::Transport(failure)),
        }
    }
}

/// Result of one request attempt. Never mutated after the executor returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub request_id: u64,
    pub status: OutcomeStatus,
    pub response_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    HttpStatus(u16),
    Transport(TransportFailure),
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::HttpStatus(code) => write!(f, "HTTP {}", code),
            ErrorKey::Transport(failure) => f.write_str(failure.description()),
        }
    }
}

/// Occurrence counts per error key. Counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    counts: BTreeMap<ErrorKey, u64>,
}

impl ErrorTally {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    pub fn from_outcomes<'outcome, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'outcome RequestOutcome>,
    {
        let mut tally = Self::new();
        for outcome in outcomes {
            tally.record(outcome);
        }
        tally
    }

    /// Counts the outcome if it is a failure; successes are ignored.
    pub fn record(&mut self, outcome: &RequestOutcome) {
        if let Some(key) = outcome.status.error_key() {
            self.increment(key);
        }
    }

    pub fn increment(&mut self, key: ErrorKey) {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, key: ErrorKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, u64)> + '_ {
        self.counts.iter().map(|(key, count)| (*key, *count))
    }
}

/// Append-only record of outcomes in batch completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultLog {
    outcomes: Vec<RequestOutcome>,
}

impl ResultLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Appends a gathered batch, keeping the order in which it completed.
    pub fn extend_batch(&mut self, batch: Vec<RequestOutcome>) {
        self.outcomes.extend(batch);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestOutcome> {
        self.outcomes.iter()
    }
}

impl<'log> IntoIterator for &'log ResultLog {
    type Item = &'log RequestOutcome;
    type IntoIter = std::slice::Iter<'log, RequestOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl FromIterator<RequestOutcome> for ResultLog {
    fn from_iter<I: IntoIterator<Item = RequestOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}
