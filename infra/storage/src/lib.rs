//! A sandboxed storage engine for uploaded attachments.
//!
//! Provides a secure abstraction over the filesystem with protections
//! against the usual I/O pitfalls:
//!
//! - **Sandbox security**: strict path traversal protection against the
//!   canonical root, including symlinked ancestors.
//! - **Atomic writes**: unique temp write + `fsync` + rename, so a crash
//!   never leaves a half-written attachment behind.
//! - **Namespacing & sharding**: one namespace per owner, with prefix
//!   shard directories to keep large namespaces listable.
//! - **Transparent compression**: optional LZ4 block compression.
//! - **Self-healing**: stale temporary files are swept on startup.
//!
//! # Example
//!
//! ```rust
//! use atelier_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).connect().await?;
//!
//!     let owner = storage.namespace("user_12345")?;
//!     owner.write("Jx2fQ81pKwWn", b"attachment bytes").await?;
//!
//!     let data = owner.read("Jx2fQ81pKwWn").await?;
//!     assert_eq!(data, b"attachment bytes");
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod sandbox;

pub use engine::{Compression, NamespacedStorage, Storage, StorageBuilder};
pub use error::{StorageError, StorageErrorExt};
