//! Pipeline stages
//!
//! Each stage implements [`Analyzer`]. The orchestrator runs them in a fixed
//! order and hands later stages the outputs of earlier ones through
//! [`StageOutputs`].

mod access_control;
mod registry_analyzer;
mod security_analyzer;

pub use access_control::AccessControlEvaluator;
pub use registry_analyzer::RegistryAnalyzer;
pub use security_analyzer::{SecurityAnalyzer, SecurityStageOutput};

use crate::com_audit::domain::ComponentMap;
use crate::ports::outbound::ProgressReporter;
use crate::shared::error::AuditError;
use crate::shared::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the caller and the stages
///
/// Clones share the same flag. Stages check it once per unit of work.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Named inputs a stage can require from earlier stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDependency {
    /// Component map produced by the registry stage
    Components,
}

impl StageDependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageDependency::Components => "components",
        }
    }
}

impl fmt::Display for StageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed container for outputs handed from one stage to the next
///
/// Each slot is written once, at a stage boundary, and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StageOutputs {
    components: Option<ComponentMap>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> Option<&ComponentMap> {
        self.components.as_ref()
    }

    pub fn set_components(&mut self, components: ComponentMap) {
        self.components = Some(components);
    }

    pub fn take_components(&mut self) -> Option<ComponentMap> {
        self.components.take()
    }

    pub fn has(&self, dependency: StageDependency) -> bool {
        match dependency {
            StageDependency::Components => self.components.is_some(),
        }
    }
}

/// Lifecycle state of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Final bookkeeping for one stage of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub name: String,
    pub state: StageState,
    /// Units that produced output
    pub processed: usize,
    /// Units skipped or dropped after a per-unit error
    pub omitted: usize,
}

impl StageReport {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: StageState::Pending,
            processed: 0,
            omitted: 0,
        }
    }
}

/// What a stage produced plus its unit counts
#[derive(Debug, Clone)]
pub struct StageRun<T> {
    pub output: T,
    pub processed: usize,
    pub omitted: usize,
}

/// Per-run handles passed to a stage
pub struct StageContext<'a> {
    pub outputs: &'a StageOutputs,
    pub progress: &'a dyn ProgressReporter,
    pub cancellation: &'a CancellationToken,
}

impl<'a> StageContext<'a> {
    pub fn new(
        outputs: &'a StageOutputs,
        progress: &'a dyn ProgressReporter,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            outputs,
            progress,
            cancellation,
        }
    }

    /// Yields to the runtime, then fails with `Cancelled` if cancellation was requested
    pub async fn checkpoint(&self, stage: &str) -> Result<()> {
        tokio::task::yield_now().await;
        if self.cancellation.is_cancelled() {
            return Err(AuditError::Cancelled {
                stage: stage.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A pipeline stage
#[async_trait]
pub trait Analyzer: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Inputs this stage reads from [`StageOutputs`]
    fn dependencies(&self) -> &'static [StageDependency] {
        &[]
    }

    /// Fails with `DependencyMissing` for the first declared input that is absent
    fn validate_dependencies(&self, outputs: &StageOutputs) -> Result<()> {
        match self.dependencies().iter().find(|d| !outputs.has(**d)) {
            Some(missing) => Err(AuditError::DependencyMissing {
                stage: self.name().to_string(),
                dependency: missing.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Runs the stage over all of its units
    ///
    /// # Errors
    /// Returns `EnumerationFailed` when the top-level input cannot be listed,
    /// `Cancelled` when the token is set, and `DependencyMissing` when a
    /// declared input is absent. Per-unit failures are logged, never returned.
    async fn analyze(&self, ctx: StageContext<'_>) -> Result<StageRun<Self::Output>>;
}
