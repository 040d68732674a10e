//! pcopy CLI - threaded copy of a single large file

use clap::Parser;
use pcopy::config::{CliArgs, CopyConfig, OutputFormat};
use pcopy::core::ParallelCopier;
use pcopy::error::{PcopyError, Result};
use pcopy::progress::ProgressReporter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let args = CliArgs::parse();

    init_logging(args.verbose);

    let result = run(args);
    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    std::process::exit(exit_code(&result));
}

/// Process exit status for a finished run
fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Install the console subscriber, plus a syslog layer on Unix.
/// `RUST_LOG` wins over `-v` when set.
///
/// - no flag: info, message only
/// - `-v`: debug, with level
/// - `-vv` and up: debug, with level, file and line
///
/// Syslog records always carry the level and source location.
fn init_logging(verbosity: u8) {
    let default_level = if verbosity == 0 { "info" } else { "debug" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pcopy={}", default_level)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_level(verbosity > 0)
        .with_file(verbosity > 1)
        .with_line_number(verbosity > 1);

    let registry = tracing_subscriber::registry().with(filter).with(console);

    #[cfg(unix)]
    {
        // None when the syslog connection is already claimed; console output still works
        let syslog = syslog_tracing::Syslog::new(c"pcopy", Default::default(), Default::default()).map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
        });
        registry.with(syslog).init();
    }

    #[cfg(not(unix))]
    registry.init();
}

fn run(args: CliArgs) -> Result<()> {
    let config = CopyConfig::from_cli(&args).map_err(PcopyError::ConfigError)?;

    if config.dry_run {
        let plan = ParallelCopier::new(config).plan()?;
        match args.output_format {
            OutputFormat::Text => plan.print_summary(),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&plan)
                    .map_err(|e| PcopyError::config(format!("failed to serialize plan: {}", e)))?
            ),
        }
        return Ok(());
    }

    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    let report = ParallelCopier::new(config).with_progress(progress).execute()?;

    if !args.quiet {
        match args.output_format {
            OutputFormat::Text => report.print_summary(),
            OutputFormat::Json => println!("{}", report.to_json()?),
        }
    }

    Ok(())
}
