//! HTTP request execution and the batch load driver.
mod client;
mod driver;
mod executor;


pub use client::{build_client, resolve_target};
pub use driver::{BatchPlan, BatchProgress, RunOutcome, run, run_load};
pub use executor::{HttpExecutor, RequestExecutor, classify_transport_error, execute_request};
