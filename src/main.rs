mod cli;
mod config;

use cli::Args;
use comaudit::adapters::outbound::console::StderrProgressReporter;
use comaudit::adapters::outbound::filesystem::SnapshotReader;
use comaudit::application::analyzers::CancellationToken;
use comaudit::application::dto::{AuditRequest, AuditResponse, OutputFormat, StageTrail};
use comaudit::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use comaudit::application::use_cases::AuditPipelineUseCase;
use comaudit::com_audit::domain::RiskLevel;
use comaudit::com_audit::policies::KnownFolders;
use comaudit::logging::{init_logging, LogConfig};
use comaudit::shared::error::{AuditError, ExitCode};
use comaudit::shared::Result;
use config::ConfigFile;
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_logging(LogConfig::new().debug(args.debug).ansi(!args.no_color));

    let cancellation = CancellationToken::new();
    spawn_interrupt_listener(cancellation.clone());

    let code = match run(args, cancellation).await {
        Ok(code) => code,
        Err(e) if is_cancelled(&e) => {
            if let Some(trail) = e.downcast_ref::<StageTrail>() {
                tracing::warn!(stages = ?trail.states(), "audit aborted");
            }
            eprintln!("\n⛔ Audit aborted: {}", e.root_cause());
            ExitCode::Cancelled
        }
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(code.as_i32());
}

/// Cancels the run on the first Ctrl-C; the stages notice at their next unit
fn spawn_interrupt_listener(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling audit");
            cancellation.cancel();
        }
    });
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<AuditError>()
        .is_some_and(AuditError::is_cancelled)
}

async fn run(args: Args, cancellation: CancellationToken) -> Result<ExitCode> {
    let config = load_config(args.config.as_deref())?.unwrap_or_default();

    let format = resolve_format(args.format, config.format.as_deref())?;
    let fail_on = resolve_fail_on(args.fail_on, config.fail_on.as_deref())?;
    let color = !args.no_color
        && config.color.unwrap_or(true)
        && args.output.is_none()
        && std::io::stdout().is_terminal();
    let known_folders = resolve_known_folders(&config);

    eprintln!("📖 Loading registry snapshot: {}", args.snapshot.display());
    let registry = SnapshotReader::new().read(&args.snapshot)?;

    let use_case = AuditPipelineUseCase::new(Arc::new(registry), StderrProgressReporter::new());
    let request = AuditRequest::new(known_folders)
        .with_fail_on(fail_on)
        .with_cancellation(cancellation);
    let response = use_case.execute(request).await?;

    eprintln!("{}", FormatterFactory::progress_message(format));
    let formatted_output = FormatterFactory::create(format, color).format(&response.report)?;
    PresenterFactory::create(PresenterType::from(args.output)).present(&formatted_output)?;

    print_summary(&response, fail_on);

    if response.has_findings_above_threshold {
        Ok(ExitCode::FindingsDetected)
    } else {
        Ok(ExitCode::Success)
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Option<ConfigFile>> {
    match explicit {
        Some(path) => config::load_config_from_path(path).map(Some),
        None => {
            let cwd = std::env::current_dir()?;
            config::discover_config(&cwd)
        }
    }
}

/// CLI flag wins over the config file; neither means text
fn resolve_format(cli: Option<OutputFormat>, config: Option<&str>) -> Result<OutputFormat> {
    match (cli, config) {
        (Some(format), _) => Ok(format),
        (None, Some(value)) => value.parse().map_err(|message| {
            AuditError::Validation {
                message: format!("config field 'format': {}", message),
            }
            .into()
        }),
        (None, None) => Ok(OutputFormat::default()),
    }
}

fn resolve_fail_on(cli: Option<RiskLevel>, config: Option<&str>) -> Result<Option<RiskLevel>> {
    match (cli, config) {
        (Some(level), _) => Ok(Some(level)),
        (None, Some(value)) => value.parse().map(Some).map_err(|message| {
            AuditError::Validation {
                message: format!("config field 'fail_on': {}", message),
            }
            .into()
        }),
        (None, None) => Ok(None),
    }
}

fn resolve_known_folders(config: &ConfigFile) -> KnownFolders {
    let (system, program_files) = match &config.known_folders {
        Some(folders) => (folders.system.clone(), folders.program_files.clone()),
        None => (None, None),
    };
    KnownFolders::from_env().with_overrides(system, program_files)
}

fn print_summary(response: &AuditResponse, fail_on: Option<RiskLevel>) {
    let summary = response.report.summary();
    eprintln!(
        "📊 {} COM object(s) audited, {} with findings, {} elevated",
        summary.total_objects, summary.risky_objects, summary.elevated_objects
    );
    for stage in &response.stages {
        tracing::debug!(
            stage = %stage.name,
            state = ?stage.state,
            processed = stage.processed,
            omitted = stage.omitted,
            "stage summary"
        );
    }
    if let Some(threshold) = fail_on {
        if response.has_findings_above_threshold {
            eprintln!(
                "⚠️  {} finding(s) at or above {}",
                response.report.findings_at_or_above(threshold),
                threshold
            );
        }
    }
}
