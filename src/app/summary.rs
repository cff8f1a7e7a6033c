use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::metrics::{LatencyStats, PERCENTILES, Summary};

/// Milliseconds per second.
const MS_PER_SEC: u128 = 1_000;

/// Run metadata printed alongside the computed statistics.
pub(crate) struct SummaryContext {
    pub(crate) target: String,
    pub(crate) started_at: DateTime<Local>,
    pub(crate) cancelled: bool,
}

pub(crate) fn print_summary(
    summary: &Summary,
    context: &SummaryContext,
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(summary, context) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let view = JsonSummary::new(summary, context);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

pub(crate) fn summary_lines(summary: &Summary, context: &SummaryContext) -> Vec<String> {
    let mut lines = Vec::new();
    let heading = if context.cancelled {
        "Load Test Summary (cancelled)"
    } else {
        "Load Test Summary"
    };
    lines.push(heading.to_owned());
    lines.push(format!(
        "Started: {}",
        context.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(format!("Target: {}", context.target));
    lines.push(format!(
        "Duration: {}",
        format_seconds(summary.total_duration)
    ));
    lines.push(format!("Total Requests: {}", summary.total_requests));
    lines.push(format!("Successful: {}", summary.successful_requests));
    lines.push(format!("Failed: {}", summary.failed_requests));
    lines.push(summary.throughput.map_or_else(
        || "Requests/sec: n/a".to_owned(),
        |rps| format!("Requests/sec: {:.2}", rps),
    ));
    lines.extend(summary.latency.as_ref().map_or_else(
        || vec!["No successful requests.".to_owned()],
        latency_lines,
    ));

    if !summary.errors.is_empty() {
        lines.push("Errors:".to_owned());
        for (key, count) in summary.errors.iter() {
            lines.push(format!("  {}: {}", key, count));
        }
    }

    lines
}

fn latency_lines(latency: &LatencyStats) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Latency min/max: {} / {}",
            format_seconds(latency.min),
            format_seconds(latency.max)
        ),
        format!(
            "Latency mean/median: {} / {}",
            format_seconds(latency.mean),
            format_seconds(latency.median)
        ),
    ];
    lines.extend(PERCENTILES.iter().filter_map(|&percentile| {
        latency
            .percentile(percentile)
            .map(|value| format!("P{}: {}", percentile, format_seconds(value)))
    }));
    lines
}

/// Seconds with millisecond precision, e.g. `1.250s`.
fn format_seconds(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = millis.checked_div(MS_PER_SEC).unwrap_or(0);
    let frac = millis.checked_rem(MS_PER_SEC).unwrap_or(0);
    format!("{}.{:03}s", secs, frac)
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    started_at: String,
    target: String,
    cancelled: bool,
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    duration_secs: f64,
    requests_per_sec: Option<f64>,
    latency: Option<JsonLatency>,
    errors: Vec<JsonErrorCount>,
}

#[derive(Debug, Serialize)]
struct JsonLatency {
    min_secs: f64,
    max_secs: f64,
    mean_secs: f64,
    median_secs: f64,
    percentiles_secs: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct JsonErrorCount {
    error: String,
    count: u64,
}

impl JsonSummary {
    fn new(summary: &Summary, context: &SummaryContext) -> Self {
        let latency = summary.latency.as_ref().map(|latency| JsonLatency {
            min_secs: latency.min.as_secs_f64(),
            max_secs: latency.max.as_secs_f64(),
            mean_secs: latency.mean.as_secs_f64(),
            median_secs: latency.median.as_secs_f64(),
            percentiles_secs: latency
                .percentiles
                .iter()
                .map(|value| (format!("p{}", value.percentile), value.latency.as_secs_f64()))
                .collect(),
        });
        let errors = summary
            .errors
            .iter()
            .map(|(key, count)| JsonErrorCount {
                error: key.to_string(),
                count,
            })
            .collect();

        Self {
            started_at: context.started_at.to_rfc3339(),
            target: context.target.clone(),
            cancelled: context.cancelled,
            total_requests: summary.total_requests,
            successful_requests: summary.successful_requests,
            failed_requests: summary.failed_requests,
            duration_secs: summary.total_duration.as_secs_f64(),
            requests_per_sec: summary.throughput,
            latency,
            errors,
        }
    }
}
