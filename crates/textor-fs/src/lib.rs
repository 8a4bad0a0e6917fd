//! Filesystem layer for Textor
//!
//! Content hashing, root-containment checks, atomic I/O and directory
//! scanning. Nothing in here knows about the ledger; `textor-core` builds on
//! these primitives.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod scan;

pub use checksum::{Normalization, calculate_hash, compute_file_checksum};
pub use config::ConfigStore;
pub use constants::TextorPath;
pub use error::{Error, Result};
pub use io::{FileLock, RobustnessConfig};
pub use path::{GuardedPath, NormalizedPath, relative_key, secure_join};
pub use scan::{is_generated, scan, scan_directory};
