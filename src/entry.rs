use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{confirm_run, run_local};
use crate::args::{DEFAULT_CONFIG_FILES, TesterArgs};
use crate::domain::TestRunConfig;
use crate::error::{AppError, AppResult, ValidationError};

/// Parses the command line, validates the run and drives it to completion.
///
/// # Errors
///
/// Returns configuration errors before any request is sent, and run-level
/// errors such as an unresolvable target host.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    apply_config(&mut args, &matches)?;
    crate::logger::init_logging(args.verbose, args.no_color);

    let config = build_run_config(&args)?;

    if !args.yes {
        let stdin = std::io::stdin();
        if !confirm_run(stdin.lock(), std::io::stderr(), &config)? {
            eprintln!("Test cancelled.");
            return Ok(());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_local(config, &args))
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut TesterArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

fn build_run_config(args: &TesterArgs) -> AppResult<TestRunConfig> {
    let Some(url) = args.url.as_deref() else {
        tracing::error!("Missing URL (pass it as an argument or set it in the config file).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let config = TestRunConfig::new(
        url,
        u64::from(args.requests),
        usize::from(args.concurrency),
        args.request_timeout,
    )?;
    Ok(config)
}
