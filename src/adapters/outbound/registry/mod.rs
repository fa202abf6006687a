/// Registry store adapters backed by snapshot data
mod memory_store;
mod snapshot;

pub use memory_store::{InMemoryRegistry, InMemoryRegistryBuilder, KeySpec};
pub use snapshot::{SnapshotDocument, SnapshotNode};
