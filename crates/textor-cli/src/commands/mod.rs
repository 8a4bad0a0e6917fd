//! Command implementations for textor-cli

pub mod files;
pub mod status;
pub mod sync;

pub use files::{run_move, run_remove};
pub use status::run_status;
pub use sync::{run_prune, run_sync, run_validate};
