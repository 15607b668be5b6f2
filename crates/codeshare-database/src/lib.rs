//! # codeshare-database
//!
//! SQLite connection management and the share record store.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{ShareRepository, SqliteShareRepository};
