/// Data Transfer Objects for the application layer
///
/// DTOs carry requests into the audit use case and results back out,
/// keeping the CLI and formatters apart from pipeline internals.
mod audit_request;
mod audit_response;
mod output_format;

pub use audit_request::AuditRequest;
pub use audit_response::{AuditResponse, StageTrail};
pub use output_format::OutputFormat;
