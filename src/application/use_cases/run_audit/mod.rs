use crate::application::analyzers::{
    Analyzer, CancellationToken, RegistryAnalyzer, SecurityAnalyzer, StageContext, StageOutputs,
    StageReport, StageState,
};
use crate::application::dto::{AuditRequest, AuditResponse, StageTrail};
use crate::com_audit::policies::TrustClassifier;
use crate::com_audit::services::ReportBuilder;
use crate::ports::outbound::{ProgressReporter, RegistryStore};
use crate::shared::error::AuditError;
use crate::shared::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// AuditPipelineUseCase - runs the registry and security stages and builds the report
///
/// Stages run sequentially in a fixed order. The registry stage's component
/// map is handed to the security stage through [`StageOutputs`].
///
/// # Type Parameters
/// * `S` - RegistryStore implementation
/// * `PR` - ProgressReporter implementation
pub struct AuditPipelineUseCase<S, PR> {
    store: Arc<S>,
    progress_reporter: PR,
}

impl<S, PR> AuditPipelineUseCase<S, PR>
where
    S: RegistryStore,
    PR: ProgressReporter,
{
    pub fn new(store: Arc<S>, progress_reporter: PR) -> Self {
        Self {
            store,
            progress_reporter,
        }
    }

    /// Executes one audit run
    ///
    /// # Errors
    /// Returns the first fatal stage error: `EnumerationFailed`,
    /// `DependencyMissing` or `Cancelled`. Per-unit failures never surface here.
    /// The error carries a [`StageTrail`] context with every stage's final
    /// state; `downcast_ref::<AuditError>()` still reaches the cause.
    pub async fn execute(&self, request: AuditRequest) -> Result<AuditResponse> {
        let registry = RegistryAnalyzer::new(Arc::clone(&self.store));
        let security = SecurityAnalyzer::new(
            Arc::clone(&self.store),
            TrustClassifier::new(request.known_folders.clone()),
        );

        let mut stages = vec![
            StageReport::pending(registry.name()),
            StageReport::pending(security.name()),
        ];
        let mut outputs = StageOutputs::new();

        let result = self
            .run_stage(&registry, &outputs, &request.cancellation, &mut stages[0])
            .await;
        let components = match result {
            Ok(components) => components,
            Err(e) => return Err(e.context(StageTrail::new(stages))),
        };
        self.progress_reporter.report(&format!(
            "✅ Found {} COM object(s)",
            components.len()
        ));
        outputs.set_components(components);

        let result = self
            .run_stage(&security, &outputs, &request.cancellation, &mut stages[1])
            .await;
        let security_output = match result {
            Ok(output) => output,
            Err(e) => return Err(e.context(StageTrail::new(stages))),
        };

        let components = outputs.take_components().unwrap_or_default();
        let report = ReportBuilder::build(
            ReportBuilder::default_metadata(),
            security_output.machine,
            components,
            security_output.results,
        );

        let has_findings_above_threshold = request
            .fail_on
            .is_some_and(|threshold| report.findings_at_or_above(threshold) > 0);

        self.progress_reporter.report_completion(&format!(
            "✅ Analyzed {} COM object(s)",
            report.security.len()
        ));

        Ok(AuditResponse {
            report,
            stages,
            has_findings_above_threshold,
        })
    }

    /// Runs one stage and records its final state in `report`
    async fn run_stage<A: Analyzer>(
        &self,
        stage: &A,
        outputs: &StageOutputs,
        cancellation: &CancellationToken,
        report: &mut StageReport,
    ) -> Result<A::Output> {
        report.state = StageState::Running;
        info!(stage = stage.name(), "{}", stage.description());
        self.progress_reporter
            .report(&format!("🔍 {}...", stage.description()));

        let result = match stage.validate_dependencies(outputs) {
            Ok(()) => {
                let ctx = StageContext::new(outputs, &self.progress_reporter, cancellation);
                stage.analyze(ctx).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(run) => {
                report.state = StageState::Completed;
                report.processed = run.processed;
                report.omitted = run.omitted;
                info!(
                    stage = stage.name(),
                    processed = run.processed,
                    omitted = run.omitted,
                    "stage completed"
                );
                Ok(run.output)
            }
            Err(e) => {
                let cancelled = e
                    .downcast_ref::<AuditError>()
                    .is_some_and(AuditError::is_cancelled);
                if cancelled {
                    report.state = StageState::Cancelled;
                    warn!(stage = stage.name(), "stage cancelled");
                } else {
                    report.state = StageState::Failed;
                    warn!(stage = stage.name(), error = %e, "stage failed");
                    self.progress_reporter
                        .report_error(&format!("❌ {} stage failed: {}", stage.name(), e));
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests;
