use super::*;
use crate::adapters::outbound::registry::InMemoryRegistry;
use crate::com_audit::domain::{
    AccessControlEntry, AccessRights, RiskLevel, SecurityDescriptor, TrustLevel,
};
use crate::com_audit::policies::KnownFolders;
use crate::ports::outbound::ProgressInfo;
use std::sync::Mutex;

#[derive(Default)]
struct MockProgressReporter {
    updates: Mutex<Vec<ProgressInfo>>,
    errors: Mutex<Vec<String>>,
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, _message: &str) {}

    fn report_progress(&self, info: &ProgressInfo) {
        self.updates.lock().unwrap().push(info.clone());
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn report_completion(&self, _message: &str) {}
}

fn folders() -> KnownFolders {
    KnownFolders::new(
        vec![r"C:\Windows\System32".to_string()],
        vec![r"C:\Program Files".to_string()],
    )
}

fn registry() -> InMemoryRegistry {
    InMemoryRegistry::builder()
        .key(r"HKCR\CLSID\{A}", |k| {
            k.default_value("Alpha").security(SecurityDescriptor::new(
                Some("SYSTEM".to_string()),
                vec![AccessControlEntry::allow(
                    "Everyone",
                    AccessRights::FULL_CONTROL,
                )],
            ))
        })
        .key(r"HKCR\CLSID\{A}\InprocServer32", |k| {
            k.default_value(r"C:\Windows\System32\alpha.dll")
                .value("ThreadingModel", "Both")
        })
        .key(r"HKCR\CLSID\{B}", |k| k.default_value("Beta"))
        .key(r"HKCR\CLSID\{B}\LocalServer32", |k| {
            k.default_value(r"C:\Program Files\Beta\beta.exe")
        })
        .empty_key(r"HKCR\CLSID\{Unnamed}")
        .build()
}

fn use_case(registry: InMemoryRegistry) -> AuditPipelineUseCase<InMemoryRegistry, MockProgressReporter> {
    AuditPipelineUseCase::new(Arc::new(registry), MockProgressReporter::default())
}

#[tokio::test]
async fn test_execute_builds_report() {
    let use_case = use_case(registry());
    let response = use_case
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap();

    let report = &response.report;
    assert_eq!(report.components.len(), 2);
    assert_eq!(report.security.len(), 2);
    assert_eq!(report.security["{A}"].info.trust_level, TrustLevel::System);
    assert!(report.security["{A}"].is_system_object);
    assert_eq!(
        report.security["{B}"].info.trust_level,
        TrustLevel::ProgramFiles
    );
    assert_eq!(report.security["{A}"].info.owner, "SYSTEM");
    assert_eq!(report.metadata.tool_name, "comaudit");
    assert!(!response.has_findings_above_threshold);
}

#[tokio::test]
async fn test_execute_records_stage_states() {
    let response = use_case(registry())
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap();

    assert_eq!(response.stages.len(), 2);
    assert_eq!(response.stages[0].name, "Registry");
    assert_eq!(response.stages[0].state, StageState::Completed);
    assert_eq!(response.stages[0].processed, 2);
    assert_eq!(response.stages[0].omitted, 1);
    assert_eq!(response.stages[1].name, "Security");
    assert_eq!(response.stages[1].state, StageState::Completed);
    assert_eq!(response.stages[1].processed, 2);
}

#[tokio::test]
async fn test_execute_reports_progress_for_both_stages() {
    let use_case = use_case(registry());
    use_case
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap();

    let updates = use_case.progress_reporter.updates.lock().unwrap();
    let registry_updates: Vec<_> = updates
        .iter()
        .filter(|u| u.operation == "Analyzing COM Objects")
        .collect();
    let security_updates: Vec<_> = updates
        .iter()
        .filter(|u| u.operation == "Analyzing Security")
        .collect();

    assert_eq!(registry_updates.len(), 3);
    assert_eq!(security_updates.len(), 2);
    for (i, update) in security_updates.iter().enumerate() {
        assert_eq!(update.current, i + 1);
        assert_eq!(update.total, 2);
    }
}

#[tokio::test]
async fn test_fail_on_threshold() {
    let response = use_case(registry())
        .execute(AuditRequest::new(folders()).with_fail_on(Some(RiskLevel::High)))
        .await
        .unwrap();
    assert!(response.has_findings_above_threshold);

    let quiet = InMemoryRegistry::builder()
        .key(r"HKCR\CLSID\{C}", |k| k.default_value("Gamma"))
        .build();
    let response = use_case(quiet)
        .execute(AuditRequest::new(folders()).with_fail_on(Some(RiskLevel::Low)))
        .await
        .unwrap();
    assert!(!response.has_findings_above_threshold);
}

#[tokio::test]
async fn test_missing_component_root_fails_run() {
    let use_case = use_case(InMemoryRegistry::new());
    let err = use_case
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap_err();

    match err.downcast_ref::<AuditError>() {
        Some(AuditError::EnumerationFailed { stage, path, .. }) => {
            assert_eq!(stage, "Registry");
            assert_eq!(path, r"HKCR\CLSID");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(use_case.progress_reporter.errors.lock().unwrap().len(), 1);

    let trail = err.downcast_ref::<StageTrail>().unwrap();
    assert_eq!(trail.states(), vec![StageState::Failed, StageState::Pending]);
}

#[tokio::test]
async fn test_cancelled_run_is_not_a_failure() {
    let token = CancellationToken::new();
    token.cancel();
    let use_case = use_case(registry());

    let err = use_case
        .execute(AuditRequest::new(folders()).with_cancellation(token))
        .await
        .unwrap_err();

    let audit = err.downcast_ref::<AuditError>().unwrap();
    assert!(audit.is_cancelled());
    assert_eq!(audit.stage(), Some("Registry"));
    assert!(use_case.progress_reporter.errors.lock().unwrap().is_empty());
    assert!(use_case.progress_reporter.updates.lock().unwrap().is_empty());

    let trail = err.downcast_ref::<StageTrail>().unwrap();
    assert_eq!(trail.states(), vec![StageState::Cancelled, StageState::Pending]);
    assert_eq!(trail.stages[0].processed, 0);
}

#[tokio::test]
async fn test_repeated_runs_match_except_metadata() {
    let use_case = use_case(registry());
    let first = use_case
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap();
    let second = use_case
        .execute(AuditRequest::new(folders()))
        .await
        .unwrap();

    assert_eq!(first.report.components, second.report.components);
    assert_eq!(first.report.security, second.report.security);
    assert_ne!(first.report.metadata.run_id, second.report.metadata.run_id);
}
