/// Use cases module containing application business logic orchestration
mod run_audit;

pub use run_audit::AuditPipelineUseCase;
