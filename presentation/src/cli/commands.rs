//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for console responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// One JSON object per response
    Json,
}

impl From<OutputFormat> for replbridge_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => replbridge_domain::OutputFormat::Text,
            OutputFormat::Json => replbridge_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for replbridge
#[derive(Parser, Debug)]
#[command(name = "replbridge")]
#[command(author, version, about = "Drive an interactive debugger console one command at a time")]
#[command(long_about = r#"
replbridge attaches to an interactive debugger console (pry-remote by default)
and turns it into a request/response channel: each command you type is written
once the console is ready, and its output is shown once the prompt reappears.

By default it waits for the debuggee to open its debugger port, attaches, and
re-attaches every time the console exits.

Configuration files are loaded from (in priority order):
1. REPLBRIDGE_* environment variables (e.g. REPLBRIDGE_SESSION__PORT=4444)
2. --config <path>       Explicit config file
3. ./replbridge.toml     Project-level config
4. ~/.config/replbridge/config.toml   Global config

Console commands:
  <expression>       Evaluate in the debuggee
  :bt                Stack trace
  :next :step :finish :continue :pause
  :vars              Local variables
  :break <file:line> Set a breakpoint
  :raw <text>        Send text verbatim
  :help  :quit

Example:
  replbridge
  replbridge --port 4444 --transcript session.jsonl
  replbridge --no-wait --program sh --marker '^\$ ' -- -i
"#)]
pub struct Cli {
    /// Console executable (overrides the dialect's launch command)
    #[arg(long, value_name = "PATH")]
    pub program: Option<String>,

    /// Arguments for --program
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,

    /// Prompt regex that marks the end of a response
    #[arg(long, value_name = "REGEX")]
    pub marker: Option<String>,

    /// Debugger port to wait for before attaching
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Launch the console immediately instead of waiting for the port
    #[arg(long)]
    pub no_wait: bool,

    /// Minimum spacing between commands, in milliseconds
    #[arg(long, value_name = "MS")]
    pub min_interval_ms: Option<u64>,

    /// Leave pending commands unresolved when the console exits
    #[arg(long)]
    pub abandon_pending: bool,

    /// Show responses verbatim (keep ANSI codes and `=> ` markers)
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append a JSONL transcript of the session to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
