//! Managed storage layout and SQLite video index.
//!
//! This crate provides:
//! - The on-disk layout (`videos/`, `frames/`, `transcripts/`, `scenes/`)
//!   with predictable per-video paths and atomic artifact writes
//! - The SQLite index over video records, transcript segments, and scenes
//! - Per-video write locks for single-writer-per-video discipline

pub mod error;
pub mod index;
pub mod layout;
pub mod lock;

pub use error::{StoreError, StoreResult};
pub use index::VideoIndex;
pub use layout::StorageLayout;
pub use lock::WriteLocks;
