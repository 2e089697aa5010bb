//! CLI entrypoint for replbridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use replbridge_application::{
    CommandBridge, DebugSession, Immediate, LaunchTrigger, TranscriptLogger,
};
use replbridge_domain::TerminationPolicy;
use replbridge_infrastructure::{
    ConfigLoader, FileConfig, JsonlTranscriptLogger, PortMonitor, PryDialect, TokioProcessSpawner,
};
use replbridge_presentation::{Cli, ConsoleListener, DebugRepl, OutputFormatter, formatter_for};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    if cli.show_config {
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting replbridge");

    // === Dependency Injection ===
    let dialect = match config.session.dialect.as_str() {
        "pry" => PryDialect::new(),
        other => bail!("Unsupported dialect: {}", other),
    };
    let bridge_config = config.bridge_config(&dialect)?;
    let formatter: Arc<dyn OutputFormatter> =
        formatter_for(config.output.format, config.output.strip_ansi).into();

    let mut spawner = TokioProcessSpawner::new();
    if let Some(dir) = &config.process.working_dir {
        spawner = spawner.with_working_dir(dir);
    }

    let mut builder = CommandBridge::builder(bridge_config, Arc::new(spawner))
        .with_listener(Arc::new(ConsoleListener::new(Arc::clone(&formatter))));
    if let Some(path) = &config.logging.transcript_file {
        let transcript: Arc<dyn TranscriptLogger> = Arc::new(
            JsonlTranscriptLogger::open(path)
                .with_context(|| format!("Failed to open transcript file {}", path))?,
        );
        builder = builder.with_transcript_logger(transcript);
    }
    let bridge = builder.build();

    let session = Arc::new(
        DebugSession::new(bridge, dialect).with_auto_relaunch(config.session.auto_relaunch),
    );

    let trigger: Arc<dyn LaunchTrigger> = if config.session.wait_for_port {
        Arc::new(
            PortMonitor::new(config.session.port)
                .with_poll_interval(Duration::from_millis(config.session.poll_interval_ms)),
        )
    } else {
        Arc::new(Immediate)
    };

    // === Attach loop + REPL ===
    let cancel = CancellationToken::new();
    let session_over = CancellationToken::new();
    let attach = tokio::spawn({
        let session = Arc::clone(&session);
        let trigger = Arc::clone(&trigger);
        let cancel = cancel.clone();
        let session_over = session_over.clone();
        async move {
            let result = session.attach_loop(trigger.as_ref(), &cancel).await;
            session_over.cancel();
            result
        }
    });

    let repl = DebugRepl::new(Arc::clone(&session), formatter, session_over)
        .with_waiting_for(trigger.describe());
    let repl_result = repl.run().await;

    cancel.cancel();
    if let Err(e) = session.terminate().await {
        warn!("Failed to detach cleanly: {}", e);
    }

    match attach.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(e) => warn!("Attach loop panicked: {}", e),
    }
    repl_result?;

    Ok(())
}

/// Command-line flags win over every configuration source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(program) = &cli.program {
        config.process.program = Some(program.clone());
    }
    if !cli.args.is_empty() {
        config.process.args = cli.args.clone();
    }
    if let Some(marker) = &cli.marker {
        config.marker.pattern = Some(marker.clone());
    }
    if let Some(port) = cli.port {
        config.session.port = port;
    }
    if cli.no_wait {
        config.session.wait_for_port = false;
    }
    if let Some(ms) = cli.min_interval_ms {
        config.bridge.min_command_interval_ms = ms;
    }
    if cli.abandon_pending {
        config.bridge.on_terminate = TerminationPolicy::AbandonPending;
    }
    if cli.raw {
        config.output.strip_ansi = false;
    }
    if let Some(format) = cli.output {
        config.output.format = format.into();
    }
    if let Some(path) = &cli.transcript {
        config.logging.transcript_file = Some(path.display().to_string());
    }
    if let Some(path) = &cli.log_file {
        config.logging.log_file = Some(path.display().to_string());
    }
}

/// Initialize logging based on verbosity level, to stderr or a log file.
fn init_logging(verbose: u8, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match log_file {
        Some(path) => {
            let path = Path::new(path);
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replbridge_domain::OutputFormat;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "replbridge",
            "--program",
            "sh",
            "--marker",
            r"^\$ ",
            "--port",
            "4444",
            "--no-wait",
            "--abandon-pending",
            "--raw",
            "-o",
            "json",
            "--",
            "-i",
        ])
        .unwrap();
        let mut config = FileConfig::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.process.program.as_deref(), Some("sh"));
        assert_eq!(config.process.args, vec!["-i"]);
        assert_eq!(config.marker.pattern.as_deref(), Some(r"^\$ "));
        assert_eq!(config.session.port, 4444);
        assert!(!config.session.wait_for_port);
        assert_eq!(config.bridge.on_terminate, TerminationPolicy::AbandonPending);
        assert!(!config.output.strip_ansi);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["replbridge"]).unwrap();
        let mut config = FileConfig::default();
        config.session.port = 1234;
        apply_overrides(&mut config, &cli);

        assert_eq!(config, {
            let mut expected = FileConfig::default();
            expected.session.port = 1234;
            expected
        });
    }
}
