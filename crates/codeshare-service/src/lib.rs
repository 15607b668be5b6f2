//! # codeshare-service
//!
//! The share lifecycle: access code issuance, key derivation, expiry
//! evaluation, and the upload / resolve / authorize / detail operations
//! that tie the record store and the content store together.
//!
//! Dependencies are passed in at construction time via `Arc` references.

pub mod clock;
pub mod share;

pub use clock::{Clock, ManualClock, SystemClock};
pub use share::{CodeGenerator, ExpiryPolicy, ShareDownload, ShareService, UploadShare};
