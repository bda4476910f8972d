//! apismoke common library
//!
//! Request and response shapes for the project board API exercised by the
//! smoke runner. Pure data, no I/O.

pub mod types;

pub use types::*;

/// apismoke version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
