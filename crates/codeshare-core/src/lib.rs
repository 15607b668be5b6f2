//! # codeshare-core
//!
//! Core crate for CodeShare. Contains the configuration schema, the
//! byte storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CodeShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
