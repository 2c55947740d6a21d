//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Subcommand name and help text for each single-strategy entry point.
pub const STRATEGY_COMMANDS: [(&str, &str); 4] = [
    (
        "lost-update",
        "Read, add one, write back unconditionally (loses updates)",
    ),
    ("in-place", "Single store-side increment per update"),
    ("row-lock", "Exclusive row lock around read-modify-write"),
    (
        "optimistic",
        "Version-checked compare-and-swap with bounded retry",
    ),
];

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    let mut cmd = Command::new("counterbench")
        .about("Compare concurrency-control strategies on a contended counter")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("TOML config file (default: ./counterbench.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('n')
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Concurrent workers (default: 10)")
                .global(true),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .short('m')
                .value_name("M")
                .value_parser(value_parser!(u64))
                .help("Increments per worker (default: 10000)")
                .global(true),
        )
        .arg(
            Arg::new("initial")
                .long("initial")
                .value_name("VALUE")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .help("Counter value at the start of the run (default: 0)")
                .global(true),
        )
        .arg(
            Arg::new("latency-us")
                .long("latency-us")
                .value_name("MICROS")
                .value_parser(value_parser!(u64))
                .help("Simulated round trip before every store operation")
                .global(true),
        )
        .arg(
            Arg::new("lock-timeout-ms")
                .long("lock-timeout-ms")
                .value_name("MILLIS")
                .value_parser(value_parser!(u64))
                .help("Upper bound on row lock waits")
                .global(true),
        )
        .arg(
            Arg::new("max-retries")
                .long("max-retries")
                .value_name("ATTEMPTS")
                .value_parser(value_parser!(u32))
                .help("Optimistic attempts per increment, 0 = unbounded (default: 10000)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    for (name, about) in STRATEGY_COMMANDS {
        cmd = cmd.subcommand(Command::new(name).about(about));
    }

    cmd.subcommand(Command::new("compare").about("Run all four strategies back to back"))
        .subcommand(Command::new("init-config").about("Print a commented default config file"))
}
