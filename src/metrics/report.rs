use std::time::Duration;

use tokio::time::Instant;

use super::types::{ErrorTally, ResultLog};

/// Percentiles reported for successful latencies, ascending.
pub const PERCENTILES: [u8; 5] = [50, 75, 90, 95, 99];
const PERCENT_DIVISOR: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentileValue {
    pub percentile: u8,
    pub latency: Duration,
}

/// Latency statistics over successful requests only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyStats {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    pub percentiles: Vec<PercentileValue>,
}

impl LatencyStats {
    #[must_use]
    pub fn percentile(&self, percentile: u8) -> Option<Duration> {
        self.percentiles
            .iter()
            .find(|value| value.percentile == percentile)
            .map(|value| value.latency)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Wall clock of the whole run, not the sum of request times.
    pub total_duration: Duration,
    /// Requests per second; `None` when the run took no measurable time.
    pub throughput: Option<f64>,
    /// `None` when no request succeeded.
    pub latency: Option<LatencyStats>,
    pub errors: ErrorTally,
}

/// Computes aggregate statistics for a finished (or cancelled) run.
///
/// Pure: the same log and timestamps always produce the same summary.
#[must_use]
pub fn report(log: &ResultLog, started_at: Instant, ended_at: Instant) -> Summary {
    let total_requests = u64::try_from(log.len()).unwrap_or(u64::MAX);
    let mut success_latencies: Vec<Duration> = log
        .iter()
        .filter(|outcome| outcome.status.is_success())
        .map(|outcome| outcome.response_time)
        .collect();
    let successful_requests = u64::try_from(success_latencies.len()).unwrap_or(u64::MAX);
    let failed_requests = total_requests.saturating_sub(successful_requests);

    let total_duration = ended_at.saturating_duration_since(started_at);
    let throughput = if total_duration.is_zero() {
        None
    } else {
        Some(total_requests as f64 / total_duration.as_secs_f64())
    };

    success_latencies.sort_unstable();

    Summary {
        total_requests,
        successful_requests,
        failed_requests,
        total_duration,
        throughput,
        latency: latency_stats(&success_latencies),
        errors: ErrorTally::from_outcomes(log),
    }
}

fn latency_stats(sorted: &[Duration]) -> Option<LatencyStats> {
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let percentiles = PERCENTILES
        .iter()
        .filter_map(|percentile| {
            sorted
                .get(percentile_index(sorted.len(), *percentile))
                .map(|latency| PercentileValue {
                    percentile: *percentile,
                    latency: *latency,
                })
        })
        .collect();

    Some(LatencyStats {
        min,
        max,
        mean: mean(sorted),
        median: median(sorted),
        percentiles,
    })
}

/// Nearest-rank index: `floor(len * p / 100)`, clamped to the last element.
pub(crate) fn percentile_index(len: usize, percentile: u8) -> usize {
    len.saturating_mul(usize::from(percentile))
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0)
        .min(len.saturating_sub(1))
}

fn mean(values: &[Duration]) -> Duration {
    let total_nanos = values
        .iter()
        .fold(0u128, |acc, value| acc.saturating_add(value.as_nanos()));
    let count = u128::try_from(values.len()).unwrap_or(u128::MAX);
    nanos_to_duration(total_nanos.checked_div(count).unwrap_or(0))
}

fn median(sorted: &[Duration]) -> Duration {
    let mid = sorted.len().checked_div(2).unwrap_or(0);
    let upper = sorted.get(mid).copied().unwrap_or_default();
    if sorted.len().checked_rem(2) == Some(0) {
        let lower = mid
            .checked_sub(1)
            .and_then(|idx| sorted.get(idx))
            .copied()
            .unwrap_or(upper);
        let sum = lower.as_nanos().saturating_add(upper.as_nanos());
        nanos_to_duration(sum.checked_div(2).unwrap_or(0))
    } else {
        upper
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
