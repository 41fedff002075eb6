use std::ffi::OsString;
use std::path::Path;

use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{RunReport, RunSettings, run_load};
use crate::args::{DEFAULT_CONFIG_FILES, LoadArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::logger::init_logging;

/// Parses arguments, merges the config file, and runs until shutdown.
///
/// # Errors
///
/// Returns an error for invalid arguments or config, a log file that cannot
/// be opened, and startup failures of the run itself.
pub fn run() -> AppResult<()> {
    let Some((args, matches)) = parse_args(std::env::args_os().collect())? else {
        return Ok(());
    };
    let args = resolve_args(args, &matches)?;

    init_logging(args.verbose, Path::new(&args.logfile))?;
    let settings = match RunSettings::from_args(&args) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("Invalid run settings: {}", err);
            return Err(err);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(run_load(&settings))?;
    print_report(&report);
    Ok(())
}

fn parse_args(raw_args: Vec<OsString>) -> AppResult<Option<(LoadArgs, ArgMatches)>> {
    let mut cmd = LoadArgs::command();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = match cmd.try_get_matches_from(raw_args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let args = LoadArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn resolve_args(mut args: LoadArgs, matches: &ArgMatches) -> AppResult<LoadArgs> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    args.validate()?;
    Ok(args)
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

fn print_report(report: &RunReport) {
    let totals = report.totals;
    println!(
        "{} requests, {} failed, {} bytes; peak {} workers",
        totals.requests, totals.failures, totals.bytes, report.peak_workers
    );
    if report.slaves_connected > 0 {
        println!("controlled {} slave(s)", report.slaves_connected);
    }
}
