/// Mock implementations for testing
mod mock_progress_reporter;
mod mock_registry_store;

pub use mock_progress_reporter::{CancellingProgressReporter, MockProgressReporter};
pub use mock_registry_store::MockRegistryStore;
