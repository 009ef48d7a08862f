//! In-memory lecture cache.
//!
//! Holds the last successfully fetched list per category. The refresh cycle
//! is the only writer; readers get a cheap clone and never wait on network
//! I/O.

mod model;
mod store;

pub use model::Snapshot;
pub use store::SnapshotStore;
