use crate::application::analyzers::{StageReport, StageState};
use crate::com_audit::domain::AuditReport;
use std::fmt;

/// AuditResponse - result of a completed audit run
#[derive(Debug, Clone)]
pub struct AuditResponse {
    pub report: AuditReport,
    /// Final state of every stage, in execution order
    pub stages: Vec<StageReport>,
    /// True when `fail_on` was set and a finding reached it
    pub has_findings_above_threshold: bool,
}

/// Stage states of a run that stopped early
///
/// Attached as context to the error returned by the audit use case, so the
/// underlying `AuditError` stays reachable through `downcast_ref` while
/// callers can still recover the `[Failed, Pending]` style trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTrail {
    pub stages: Vec<StageReport>,
}

impl StageTrail {
    pub fn new(stages: Vec<StageReport>) -> Self {
        Self { stages }
    }

    pub fn states(&self) -> Vec<StageState> {
        self.stages.iter().map(|stage| stage.state).collect()
    }
}

impl fmt::Display for StageTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Audit stopped early (")?;
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", stage.name, stage.state)?;
        }
        write!(f, ")")
    }
}
