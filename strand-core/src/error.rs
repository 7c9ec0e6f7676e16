//! Error Types
//!
//! Crate-level error type and result alias. Search-time failures of the
//! theory core are never represented here: refutations are reported to the
//! host as conflicts and unsupported constructs set the solver's
//! incompleteness flag. `StrandError` covers genuine API misuse.

use thiserror::Error;

/// Errors surfaced by the strand crates.
#[derive(Debug, Error)]
pub enum StrandError {
    /// Internal invariant violation surfaced through a fallible API.
    #[error("internal error: {0}")]
    Internal(String),
    /// Operation outside the supported fragment.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result alias over [`StrandError`].
pub type Result<T> = std::result::Result<T, StrandError>;
