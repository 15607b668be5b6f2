//! Record store implementations.

pub mod share;

pub use share::{ShareRepository, SqliteShareRepository};
