//! counterbench CLI: run the counter contention benchmark.
//!
//! One subcommand per strategy (`lost-update`, `in-place`, `row-lock`,
//! `optimistic`) plus `compare`, which runs all four with the same settings.
//!
//! Exit status is 0 whenever the harness completes, including runs whose
//! final value misses the expected one. It is 1 only when the configuration is
//! invalid or the store cannot be reached before anything has run. Once one
//! strategy has reported, a later strategy that cannot start is printed as an
//! error next to the reports that did complete.

mod commands;
mod format;

use std::path::Path;
use std::process;

use clap::ArgMatches;
use counterbench_concurrency::StrategyKind;
use counterbench_core::{BackingStore, Error, Result};
use counterbench_engine::config::CONFIG_FILE_NAME;
use counterbench_engine::{BenchmarkConfig, Orchestrator, RunReport};
use counterbench_storage::MemoryStore;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_comparison, format_error, format_report, format_run_failure, OutputMode};

fn main() {
    let matches = build_cli().get_matches();
    init_logging();

    let (name, sub) = match matches.subcommand() {
        Some(pair) => pair,
        None => unreachable!("subcommand_required"),
    };

    if name == "init-config" {
        print!("{}", BenchmarkConfig::default_toml());
        return;
    }

    let output_mode = if sub.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let kinds = match strategies_for(name) {
        Some(kinds) => kinds,
        None => unreachable!("unknown subcommand {}", name),
    };

    match run(sub, &kinds) {
        Ok(outcome) => {
            println!("{}", outcome.render(output_mode));
            for (kind, e) in &outcome.failures {
                eprintln!("{}", format_run_failure(*kind, e, output_mode));
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "benchmark aborted");
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    }
}

/// Everything one invocation produced
#[derive(Debug)]
struct Outcome {
    /// Reports of the strategies that ran, in run order
    reports: Vec<RunReport>,
    /// Strategies that could not start after an earlier one had reported
    failures: Vec<(StrategyKind, Error)>,
}

impl Outcome {
    fn render(&self, mode: OutputMode) -> String {
        match self.reports.as_slice() {
            [single] => format_report(single, mode),
            many => format_comparison(many, mode),
        }
    }
}

/// Log to stderr so that `--json` output on stdout stays parseable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn strategies_for(subcommand: &str) -> Option<Vec<StrategyKind>> {
    if subcommand == "compare" {
        return Some(StrategyKind::ALL.to_vec());
    }
    subcommand.parse::<StrategyKind>().ok().map(|kind| vec![kind])
}

fn run(matches: &ArgMatches, kinds: &[StrategyKind]) -> Result<Outcome> {
    let config = resolve_config(matches)?;
    let store = MemoryStore::with_config(config.store_config());
    tracing::debug!(
        op_latency = ?store.config().op_latency,
        lock_timeout = ?store.config().lock_timeout,
        "memory store ready"
    );
    let orchestrator = Orchestrator::new(store, config)?;
    run_strategies(&orchestrator, kinds)
}

/// Run `kinds` in order, keeping every report that completes
///
/// A failure before any strategy has reported is returned as the error.
fn run_strategies<S: BackingStore>(
    orchestrator: &Orchestrator<S>,
    kinds: &[StrategyKind],
) -> Result<Outcome> {
    tracing::info!(
        workers = orchestrator.config().workers,
        iterations = orchestrator.config().iterations,
        strategies = kinds.len(),
        "benchmark starting"
    );

    let mut outcome = Outcome {
        reports: Vec::with_capacity(kinds.len()),
        failures: Vec::new(),
    };
    for &kind in kinds {
        match orchestrator.run_kind(kind) {
            Ok(result) => outcome.reports.push(RunReport::from_result(&result)),
            Err(e) if outcome.reports.is_empty() => return Err(e),
            Err(e) => {
                tracing::error!(strategy = %kind, error = %e, "run failed");
                outcome.failures.push((kind, e));
            }
        }
    }
    Ok(outcome)
}

/// Defaults, then config file, then environment, then flags.
fn resolve_config(matches: &ArgMatches) -> Result<BenchmarkConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => BenchmarkConfig::from_file(Path::new(path))?,
        None if Path::new(CONFIG_FILE_NAME).exists() => {
            BenchmarkConfig::from_file(Path::new(CONFIG_FILE_NAME))?
        }
        None => BenchmarkConfig::default(),
    };

    config.apply_env()?;

    if let Some(&workers) = matches.get_one::<usize>("workers") {
        config.workers = workers;
    }
    if let Some(&iterations) = matches.get_one::<u64>("iterations") {
        config.iterations = iterations;
    }
    if let Some(&initial) = matches.get_one::<i64>("initial") {
        config.initial_value = initial;
    }
    if let Some(&latency) = matches.get_one::<u64>("latency-us") {
        config.op_latency_us = latency;
    }
    if let Some(&timeout) = matches.get_one::<u64>("lock-timeout-ms") {
        config.lock_timeout_ms = Some(timeout);
    }
    if let Some(&attempts) = matches.get_one::<u32>("max-retries") {
        config.retry.max_attempts = attempts;
    }

    config.validate()?;
    Ok(config)
}
