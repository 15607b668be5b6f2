//! Core traits defined in `codeshare-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
