/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (registry snapshot, console, file system).
pub mod formatter;
pub mod output_presenter;
pub mod progress_reporter;
pub mod registry_store;

pub use formatter::ReportFormatter;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::{ProgressInfo, ProgressReporter};
pub use registry_store::{OptionalKey, RegistryStore, RegistryValue, StoreError, StoreResult};
