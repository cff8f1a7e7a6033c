use clap::Parser;
use std::time::Duration;

use super::defaults::{DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, DEFAULT_TIMEOUT};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_positive_u64, parse_positive_usize,
};
use super::types::{OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Batch-oriented async HTTP load tester: bounded concurrency, per-request timing, error tallies and latency percentiles."
)]
pub struct TesterArgs {
    /// Target URL to load test
    pub url: Option<String>,

    /// Total number of requests to send
    #[arg(long = "requests", short = 'n', default_value = DEFAULT_REQUESTS, value_parser = parse_positive_u64)]
    pub requests: PositiveU64,

    /// Number of requests dispatched concurrently per batch
    #[arg(long = "concurrency", short = 'c', alias = "concurrent", default_value = DEFAULT_CONCURRENCY, value_parser = parse_positive_usize)]
    pub concurrency: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h, plain numbers are seconds)
    #[arg(long = "timeout", short = 't', default_value = DEFAULT_TIMEOUT, value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Path to a TOML or JSON config file
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Skip the interactive confirmation prompt
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Summary output format
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Disable the live progress line
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Skip resolving the target host before the run starts
    #[arg(long = "no-pre-lookup")]
    pub no_pre_lookup: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by WEBLOAD_LOG/RUST_LOG)
    #[arg(long, short)]
    pub verbose: bool,
}
