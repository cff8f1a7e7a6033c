//! Core library for the `webload` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration parsing, run validation, the batch load driver and
//! the statistics reporter. The primary user-facing interface is the
//! `webload` command-line application; library APIs may evolve as the CLI
//! grows.
pub mod args;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;

mod app;
mod entry;
mod logger;
mod shutdown_handlers;

pub use entry::run;
