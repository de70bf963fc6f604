//! Demonstration CLI for the `tuner` crate.
//!
//! Reads a TOML file declaring tuning parameters, runs an exhaustive tuning pass against a
//! user-supplied shell command whose exit code and stdout determine validity/cost, and prints the
//! best configuration found. Ctrl-C requests a graceful early stop rather than killing the
//! process outright.

mod spec_file;

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use log::LevelFilter;
use structopt::StructOpt;

use tuner::technique::Exhaustive;
use tuner::{Cancelled, Config, CostError, Technique, Tuner};

use crate::spec_file::SpecFile;

#[derive(StructOpt)]
#[structopt(name = "tuner-cli", about = "Auto-tune a command line's parameters.")]
struct Options {
    /// Path to a TOML file declaring the tuning parameters.
    #[structopt(parse(from_os_str))]
    spec: PathBuf,
    /// Shell command to run for each configuration. `{name}` placeholders are substituted with
    /// the bound value of that parameter.
    command: String,
    /// Append a line per evaluation to this file.
    #[structopt(long, parse(from_os_str))]
    log_file: Option<PathBuf>,
    /// Suppress progress messages.
    #[structopt(long)]
    quiet: bool,
    /// Verbose (debug-level) logging.
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let options = Options::from_args();

    simple_logger::SimpleLogger::new()
        .with_level(if options.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()
        .context("failed to initialise logger")?;

    let spec_toml = std::fs::read_to_string(&options.spec)
        .with_context(|| format!("couldn't read parameter spec `{}`", options.spec.display()))?;
    let spec_file: SpecFile =
        toml::from_str(&spec_toml).with_context(|| format!("couldn't parse `{}`", options.spec.display()))?;
    let parameters = spec_file.into_parameters()?;

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        ctrlc::set_handler(move || {
            log::warn!("received interrupt, finishing current evaluation then stopping");
            cancelled.store(true, Ordering::Relaxed);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let mut tuner = Tuner::new(
        parameters,
        Technique::from(Exhaustive::new()),
        "exhaustive",
        Config {
            silent: options.quiet,
            log_file: options.log_file.clone(),
        },
    )?;

    let command_template = options.command.clone();
    let mut abort = Cancelled(cancelled);
    let data = tuner.tune(
        &mut |config| run_command(&command_template, config),
        Some(&mut abort),
    )?;

    match (data.best_cost(), data.best_configuration()) {
        (Some(cost), Some(config)) => {
            println!("best cost: {cost}");
            println!("best configuration: {config}");
        }
        _ => println!("no valid configuration was found"),
    }
    println!(
        "{} evaluated ({} valid, {} invalid) out of {}",
        data.num_evaluated(),
        data.num_valid(),
        data.num_invalid(),
        data.search_space_size()
    );

    Ok(())
}

/// Substitutes `{name}` placeholders in `template` with `config`'s bindings, then runs the result
/// as a shell command. A non-zero exit code is reported as an invalid configuration; stdout,
/// parsed as an `f64`, is the cost.
fn run_command(template: &str, config: &tuner::Configuration) -> Result<tuner::Cost, CostError> {
    let mut command_str = template.to_owned();
    for (name, value) in config.bindings() {
        command_str = command_str.replace(&format!("{{{name}}}"), &value.to_string());
    }

    let output = Command::new("sh")
        .arg("-c")
        .arg(&command_str)
        .output()
        .map_err(CostError::other)?;
    if !output.status.success() {
        return Err(CostError::InvalidConfiguration);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let cost: f64 = stdout
        .trim()
        .parse()
        .map_err(|_| CostError::other(CommandOutputError(stdout.trim().to_owned())))?;
    Ok(tuner::Cost::from(cost))
}

#[derive(Debug)]
struct CommandOutputError(String);

impl std::fmt::Display for CommandOutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command did not print a numeric cost on stdout (got {:?})", self.0)
    }
}

impl std::error::Error for CommandOutputError {}
