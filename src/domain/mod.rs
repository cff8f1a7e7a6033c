//! Run-level domain types shared by the driver and the presentation layer.
mod run;

#[cfg(test)]
mod tests;

pub use run::TestRunConfig;
