//! Request outcomes, error tallies and the statistics reporter.
mod report;
mod types;


pub use report::{LatencyStats, PERCENTILES, PercentileValue, Summary, report};
pub use types::{
    ErrorKey, ErrorTally, OutcomeStatus, RequestOutcome, ResultLog, SUCCESS_STATUS,
    TransportFailure,
};
