//! comaudit - COM registry security auditor
//!
//! This library walks the COM registrations in a registry store, evaluates
//! their access-control lists and DCOM settings, classifies how trusted their
//! install location is, and reports risky configurations. It follows
//! hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`com_audit`): Pure audit logic, risk policies and report models
//! - **Application Layer** (`application`): Pipeline stages, use cases and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use comaudit::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let registry = SnapshotReader::new().read(Path::new("snapshot.json"))?;
//! let use_case = AuditPipelineUseCase::new(Arc::new(registry), StderrProgressReporter::new());
//!
//! let response = use_case
//!     .execute(AuditRequest::new(KnownFolders::from_env()))
//!     .await?;
//!
//! let output = TextFormatter::new().format(&response.report)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod com_audit;
pub mod logging;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemWriter, SnapshotReader, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::registry::InMemoryRegistry;
    pub use crate::application::analyzers::CancellationToken;
    pub use crate::application::dto::{AuditRequest, AuditResponse, OutputFormat};
    pub use crate::application::use_cases::AuditPipelineUseCase;
    pub use crate::com_audit::domain::{
        AuditReport, ComponentRecord, RiskLevel, SecurityFinding, SecurityInfo, TrustLevel,
    };
    pub use crate::com_audit::policies::{KnownFolders, PermissionRiskPolicy, TrustClassifier};
    pub use crate::com_audit::services::RiskAggregator;
    pub use crate::ports::outbound::{
        OutputPresenter, ProgressReporter, RegistryStore, ReportFormatter,
    };
    pub use crate::shared::Result;
}
