use std::ops::Range;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::args::PositiveUsize;
use crate::domain::TestRunConfig;
use crate::error::AppResult;
use crate::metrics::{self, ErrorTally, RequestOutcome, ResultLog, Summary};
use crate::shutdown::{ShutdownReceiver, shutdown_requested, wait_for_shutdown};

use super::client::{build_client, resolve_target};
use super::executor::{HttpExecutor, RequestExecutor};

/// Splits `[0, total)` into consecutive request-id ranges of at most
/// `concurrency` ids.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    next: u64,
    total: u64,
    batch_size: u64,
}

impl BatchPlan {
    #[must_use]
    pub fn new(total: u64, concurrency: PositiveUsize) -> Self {
        Self {
            next: 0,
            total,
            batch_size: u64::try_from(concurrency.get()).unwrap_or(u64::MAX),
        }
    }
}

impl Iterator for BatchPlan {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.batch_size).min(self.total);
        self.next = end;
        Some(start..end)
    }
}

/// Progress after a batch has been gathered. `completed` strictly increases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchProgress {
    pub completed: u64,
    pub total: u64,
    pub percent: f64,
    pub errors: u64,
}

impl BatchProgress {
    #[must_use]
    pub fn new(completed: u64, total: u64, errors: u64) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 * 100.0 / total as f64
        };
        Self {
            completed,
            total,
            percent,
            errors,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub log: ResultLog,
    pub tally: ErrorTally,
    pub started_at: Instant,
    pub ended_at: Instant,
    /// Set when a shutdown stopped the run before every batch completed.
    pub cancelled: bool,
}

impl RunOutcome {
    #[must_use]
    pub fn summary(&self) -> Summary {
        metrics::report(&self.log, self.started_at, self.ended_at)
    }
}

/// Builds the HTTP executor for `config` and drives the run.
///
/// # Errors
///
/// Returns a run-level error when the client cannot be built or, with
/// `pre_lookup`, when the target host does not resolve. Individual request
/// failures are recorded as outcomes instead.
pub async fn run(
    config: &TestRunConfig,
    pre_lookup: bool,
    shutdown_rx: ShutdownReceiver,
    progress_tx: Option<&mpsc::UnboundedSender<BatchProgress>>,
) -> AppResult<RunOutcome> {
    let client = build_client(config.timeout())?;
    if pre_lookup {
        resolve_target(config.url()).await?;
    }
    let executor = Arc::new(HttpExecutor::new(
        client,
        config.url().clone(),
        config.timeout(),
    ));
    run_load(config, executor, shutdown_rx, progress_tx).await
}

/// Runs every batch to completion unless a shutdown arrives.
///
/// A batch is fully gathered before the next one is dispatched, so at most
/// `concurrency` requests are ever in flight. On shutdown the in-flight batch
/// is aborted and discarded; outcomes of gathered batches are kept.
///
/// # Errors
///
/// Returns an error if a request task panics.
pub async fn run_load<E>(
    config: &TestRunConfig,
    executor: Arc<E>,
    mut shutdown_rx: ShutdownReceiver,
    progress_tx: Option<&mpsc::UnboundedSender<BatchProgress>>,
) -> AppResult<RunOutcome>
where
    E: RequestExecutor,
{
    let total = config.total_requests().get();
    let mut log = ResultLog::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut tally = ErrorTally::new();
    let mut completed: u64 = 0;
    let mut cancelled = false;

    info!(
        "Starting load test: url={} requests={} concurrency={}",
        config.url(),
        total,
        config.concurrency().get()
    );

    let started_at = Instant::now();
    for batch in BatchPlan::new(total, config.concurrency()) {
        if shutdown_requested(&mut shutdown_rx) {
            cancelled = true;
            break;
        }

        let batch_len = batch.end.saturating_sub(batch.start);
        let mut tasks = JoinSet::new();
        for request_id in batch {
            let executor = Arc::clone(&executor);
            tasks.spawn(async move { executor.execute(request_id).await });
        }

        let gathered = tokio::select! {
            biased;
            () = wait_for_shutdown(&mut shutdown_rx) => None,
            outcomes = gather_batch(&mut tasks) => Some(outcomes?),
        };
        let Some(outcomes) = gathered else {
            tasks.abort_all();
            cancelled = true;
            break;
        };

        for outcome in &outcomes {
            tally.record(outcome);
        }
        log.extend_batch(outcomes);
        completed = completed.saturating_add(batch_len);

        debug!(
            "Batch done: {}/{} completed, {} errors",
            completed,
            total,
            tally.total()
        );
        if let Some(progress_tx) = progress_tx
            && progress_tx
                .send(BatchProgress::new(completed, total, tally.total()))
                .is_err()
        {
            debug!("Progress receiver closed; continuing without progress updates.");
        }
    }
    let ended_at = Instant::now();

    if cancelled {
        warn!(
            "Run cancelled after {}/{} requests; the in-flight batch was discarded.",
            completed, total
        );
    }

    Ok(RunOutcome {
        log,
        tally,
        started_at,
        ended_at,
        cancelled,
    })
}

async fn gather_batch(
    tasks: &mut JoinSet<RequestOutcome>,
) -> Result<Vec<RequestOutcome>, JoinError> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined?);
    }
    Ok(outcomes)
}
