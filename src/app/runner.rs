use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::args::TesterArgs;
use crate::domain::TestRunConfig;
use crate::error::AppResult;
use crate::http;
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

use super::progress::setup_progress_indicator;
use super::summary::{SummaryContext, print_summary};

/// Runs one load test and prints its summary. A cancelled run still prints
/// the partial summary and succeeds.
pub(crate) async fn run_local(config: TestRunConfig, args: &TesterArgs) -> AppResult<()> {
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let progress_handle =
        setup_progress_indicator(progress_rx, !args.no_progress, args.no_color);

    let started_at = Local::now();
    let result = http::run(&config, !args.no_pre_lookup, shutdown_rx, Some(&progress_tx)).await;

    drop(progress_tx);
    if shutdown_tx.send(()).is_err() {
        debug!("Signal handler already stopped.");
    }
    let (signal_result, progress_result) = tokio::join!(signal_handle, progress_handle);
    if let Err(err) = signal_result {
        error!("Signal handler task failed: {}", err);
    }
    if let Err(err) = progress_result {
        error!("Progress task failed: {}", err);
    }

    let outcome = result.inspect_err(|err| error!("Load test failed: {}", err))?;

    let context = SummaryContext {
        target: config.url().to_string(),
        started_at,
        cancelled: outcome.cancelled,
    };
    print_summary(&outcome.summary(), &context, args.output_format)
}
