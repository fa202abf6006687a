use clap::Parser;
use comaudit::application::dto::OutputFormat;
use comaudit::com_audit::domain::RiskLevel;
use std::path::PathBuf;

/// Audit COM registrations for risky permissions, remote activation and elevation
#[derive(Parser, Debug)]
#[command(name = "comaudit")]
#[command(version)]
#[command(
    about = "Audit COM registrations for risky permissions, remote activation and elevation",
    long_about = None
)]
pub struct Args {
    /// Registry snapshot to audit (.json, .yml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Output format: text or json [default: text]
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Config file (defaults to ./comaudit.config.yml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exit with code 1 when a finding at or above this level is present
    /// (low, medium, high, critical)
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<RiskLevel>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
