use super::{AccessControlEvaluator, Analyzer, StageContext, StageDependency, StageRun};
use crate::com_audit::domain::{MachineSecurity, SecurityInfo};
use crate::com_audit::policies::TrustClassifier;
use crate::com_audit::services::RiskAggregator;
use crate::ports::outbound::{ProgressInfo, RegistryStore};
use crate::shared::error::AuditError;
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info_span, Span};

const OPERATION: &str = "Analyzing Security";

/// What the security stage hands to report assembly
#[derive(Debug, Clone, Default)]
pub struct SecurityStageOutput {
    pub results: BTreeMap<String, SecurityInfo>,
    pub machine: MachineSecurity,
}

/// Security stage: evaluates, classifies and scores every discovered component
pub struct SecurityAnalyzer<S> {
    evaluator: AccessControlEvaluator<S>,
    classifier: TrustClassifier,
    span: Span,
}

impl<S: RegistryStore> SecurityAnalyzer<S> {
    pub fn new(store: Arc<S>, classifier: TrustClassifier) -> Self {
        Self {
            evaluator: AccessControlEvaluator::new(store),
            classifier,
            span: info_span!("stage", name = "Security"),
        }
    }
}

#[async_trait]
impl<S: RegistryStore> Analyzer for SecurityAnalyzer<S> {
    type Output = SecurityStageOutput;

    fn name(&self) -> &'static str {
        "Security"
    }

    fn description(&self) -> &'static str {
        "Analyzes COM object security settings and identifies risks"
    }

    fn dependencies(&self) -> &'static [StageDependency] {
        &[StageDependency::Components]
    }

    async fn analyze(&self, ctx: StageContext<'_>) -> Result<StageRun<SecurityStageOutput>> {
        let components = ctx
            .outputs
            .components()
            .ok_or_else(|| AuditError::DependencyMissing {
                stage: self.name().to_string(),
                dependency: StageDependency::Components.to_string(),
            })?;

        let machine = self.span.in_scope(|| MachineSecurity {
            default_access_level: self.evaluator.machine_default_access_level(),
        });

        let total = components.len();
        let mut results = BTreeMap::new();

        for (index, (id, record)) in components.iter().enumerate() {
            ctx.checkpoint(self.name()).await?;
            ctx.progress.report_progress(
                &ProgressInfo::new(OPERATION, index + 1, total).with_extra(format!("CLSID: {}", id)),
            );

            let info = self.span.in_scope(|| {
                let mut info = self.evaluator.evaluate(id, record);
                info.trust_level = self.classifier.classify(record);
                info.risks = RiskAggregator::aggregate(&info);
                if !info.risks.is_empty() {
                    debug!(id = %id, findings = info.risks.len(), "component has findings");
                }
                info
            });
            results.insert(id.clone(), info);
        }

        debug!(parent: &self.span, processed = results.len(), "security evaluation finished");
        Ok(StageRun {
            processed: results.len(),
            omitted: total - results.len(),
            output: SecurityStageOutput { results, machine },
        })
    }
}
