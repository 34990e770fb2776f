//! reframe - re-encode videos at a fixed frame rate
//!
//! Entry point of the command-line tool. The process exit code mirrors the
//! child's: a child exiting with N makes `reframe` exit with N, a child
//! killed by signal S gives 128 + S, and an ffmpeg that cannot be launched
//! gives 127.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reframe::cli::{Args, Commands};
use reframe::config::Config;
use reframe::error::ReframeError;
use reframe::process::ExitReport;
use reframe::workflow::{BatchSummary, Workflow};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let started = start(&args);
    let (code, guard) = match started {
        Ok((config, guard)) => (finish(execute(args, config).await), guard),
        Err(e) => (finish(Err(e)), None),
    };

    // Flush the file writer before leaving
    drop(guard);
    std::process::exit(code);
}

/// Load configuration and install logging
///
/// A log directory that cannot be used only disables the file layer.
fn start(args: &Args) -> Result<(Config, Option<WorkerGuard>)> {
    let config = Config::discover(args.config.as_deref(), std::env::current_dir()?)?;
    let guard = match setup_logging(args.verbose, &config.logging.directory) {
        Ok(guard) => Some(guard),
        Err(e) => {
            setup_console_logging(args.verbose);
            warn!("File logging disabled: {:#}", e);
            None
        }
    };
    Ok((config, guard))
}

/// Map the outcome to the process exit code
fn finish(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            let code = err
                .downcast_ref::<ReframeError>()
                .map(ReframeError::exit_code)
                .unwrap_or(1);
            eprintln!("Error: {:#}", err);
            code
        }
    }
}

async fn execute(args: Args, config: Config) -> Result<i32> {
    let json = args.json;
    let workflow = Workflow::from_config(config);

    match args.command {
        Commands::Run { tokens } => {
            let result = workflow.run_tokens(tokens).await;
            print_report(&result, json)?;
            result?;
        }
        Commands::Reencode { input, output, fps } => {
            info!("Re-encoding video file: {}", input.display());
            let result = workflow.reencode_file(&input, output.as_deref(), fps).await;
            print_report(&result, json)?;
            result?;
        }
        Commands::Batch { input_dir, output_dir, fps } => {
            info!("Re-encoding directory: {}", input_dir.display());
            workflow.transcoder().check_availability().await?;

            let summary = workflow
                .reencode_directory(&input_dir, output_dir.as_deref(), fps)
                .await?;
            print_summary(&summary, json)?;
            return Ok(batch_exit_code(&summary));
        }
        Commands::Check => {
            let version = workflow.transcoder().version_info().await?;
            if json {
                println!("{}", serde_json::json!({
                    "binary_path": workflow.config().ffmpeg.binary_path,
                    "version": version,
                }));
            } else {
                println!("{}", version);
            }
        }
        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", output.display());
            }
            Config::default().save_to_file(&output)?;
            info!("Default configuration written to {}", output.display());
        }
    }

    Ok(0)
}

fn batch_exit_code(summary: &BatchSummary) -> i32 {
    if summary.is_success() { 0 } else { 1 }
}

/// JSON view of a run; abnormal exits keep their code and signal
fn report_json(result: &reframe::error::Result<ExitReport>) -> Option<serde_json::Value> {
    match result {
        Ok(report) => serde_json::to_value(report).ok(),
        Err(ReframeError::AbnormalExit { program, code, signal }) => Some(serde_json::json!({
            "program": program,
            "code": code,
            "signal": signal,
        })),
        Err(_) => None,
    }
}

fn print_report(result: &reframe::error::Result<ExitReport>, json: bool) -> Result<()> {
    if json {
        if let Some(value) = report_json(result) {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("\nProcessed: {} succeeded, {} failed", summary.succeeded.len(), summary.failed.len());
    if !summary.failed.is_empty() {
        println!("{:<10} {:<60}", "Exit code", "File");
        println!("{}", "-".repeat(70));
        for failure in &summary.failed {
            println!("{:<10} {:<60}", failure.exit_code, failure.path.display());
        }
    }
    Ok(())
}

fn log_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Create the log directory, naming it in the error
fn prepare_log_dir(log_dir: &Path) -> Result<(), ReframeError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        ReframeError::Config(format!("Cannot create log directory {}: {}", log_dir.display(), e))
    })
}

/// Console-only logging
fn setup_console_logging(verbose: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level(verbose).into()))
        .with(console_layer)
        .try_init();
}

fn setup_logging(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    // Create log directory
    prepare_log_dir(log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(log_dir, "reframe.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let level = log_level(verbose);

    // Console layer on stderr so --json output stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber.try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          level, log_dir.join("reframe.log").display());

    Ok(guard)
}
