//! Storage Layer
//!
//! The write-side port (`ContentStore`), the read side the public API serves
//! from (`RecordSource`), and the in-memory backend implementing both.
//!
//! # Architecture
//!
//! Writes go `Model`/`RecordFactory` → `ContentStore` directly. Reads never
//! touch this module from the data-access layer; they go through the
//! `gateway`, whose loopback adapter ends up in `api`, which reads from a
//! `RecordSource`.

mod content_store;
mod error;
mod memory_store;
mod stored_record;

pub use content_store::{ContentStore, DeleteResult, StoreAttributes};
pub use error::StoreError;
pub use memory_store::MemoryStore;
pub use stored_record::{RecordSource, StoredRecord};
