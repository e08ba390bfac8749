//! Dataset storage for Spindle.
//!
//! The pipeline stages depend only on the [`DatasetStore`] trait. An
//! in-memory backend is provided for embedded use and tests.

mod fingerprint;
mod memory;
mod traits;

pub use fingerprint::fingerprint;
pub use memory::InMemoryDataset;
pub use traits::{DatasetStore, StorageError, TriplePattern};
