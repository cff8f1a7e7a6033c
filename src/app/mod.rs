mod confirm;
mod progress;
mod runner;
mod summary;

pub(crate) use confirm::confirm_run;
pub(crate) use runner::run_local;
