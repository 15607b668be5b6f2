//! # codeshare-storage
//!
//! Byte storage for CodeShare: the local filesystem provider, the content
//! store that names and places uploads, streaming content fingerprints,
//! and spooled upload bodies.

pub mod content;
pub mod fingerprint;
pub mod incoming;
pub mod providers;

pub use content::ContentStore;
pub use fingerprint::fingerprint;
pub use incoming::IncomingFile;
pub use providers::local::LocalStorageProvider;
