//! Share lifecycle: codes, keys, expiry, and the operations built on them.

pub mod code;
pub mod expiry;
pub mod service;

pub use code::CodeGenerator;
pub use expiry::{ExpiryPolicy, is_expired};
pub use service::{ShareDownload, ShareService, UploadShare};
