use crate::application::analyzers::CancellationToken;
use crate::com_audit::domain::RiskLevel;
use crate::com_audit::policies::KnownFolders;

/// AuditRequest - input for one audit run
#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    /// Folders used to classify install paths
    pub known_folders: KnownFolders,
    /// Findings at or above this level flag the run
    pub fail_on: Option<RiskLevel>,
    /// Checked once per unit of work by every stage
    pub cancellation: CancellationToken,
}

impl AuditRequest {
    pub fn new(known_folders: KnownFolders) -> Self {
        Self {
            known_folders,
            ..Self::default()
        }
    }

    pub fn with_fail_on(mut self, fail_on: Option<RiskLevel>) -> Self {
        self.fail_on = fail_on;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}
