//! Error types for the safe binding layer.
//!
//! Initialization failures ([`LoadError`]) mean the native library could not
//! be found or is unusable; everything else is scoped to the single call
//! that produced it and leaves the cookie usable.

use std::path::PathBuf;
use std::thread::ThreadId;

use thiserror::Error;

pub use magus_ffi::LoadError;

/// Errors reported by cookie and detector operations.
#[derive(Debug, Error)]
pub enum MagicError {
    /// The native library could not be located or bound. Fatal for the
    /// process; the same error is returned on every subsequent attempt.
    #[error(transparent)]
    Init(#[from] LoadError),

    /// `magic_open` returned no cookie. The native layer defers most
    /// validation to load, so this only happens on allocation failure.
    #[error("magic_open returned no cookie (allocation failure)")]
    Open,

    /// A database operation (load, check, compile) failed. Carries the
    /// native diagnostic; recoverable by retrying with a valid database.
    #[error("magic database error: {message} (errno {errno})")]
    Database {
        /// Text from `magic_error`, or a placeholder when the native layer
        /// reported nothing.
        message: String,
        /// Last OS error number seen by the native layer (`magic_errno`).
        errno: i32,
    },

    /// A query failed inside the native library. The cookie remains usable.
    #[error("libmagic detection failed: {}", .message.as_deref().unwrap_or("no diagnostic available"))]
    Detect {
        /// Text from `magic_error`, if any was produced.
        message: Option<String>,
    },

    /// The queried path does not exist. Distinct from [`MagicError::Detect`]
    /// so callers can tell bad input from a real detection failure.
    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The cookie was queried before a database was loaded.
    #[error("no magic database loaded; call load() before querying")]
    NotLoaded,

    /// The cookie was used after `close()`.
    #[error("magic cookie is closed")]
    Closed,

    /// The cookie was used from a thread other than the one that opened it.
    /// Concurrent access to one cookie crashes inside libmagic; open one
    /// cookie per thread instead.
    #[error("magic cookie owned by thread {owner:?} used from {current:?}; cookies are single-threaded")]
    WrongThread {
        /// Thread that opened the cookie.
        owner: ThreadId,
        /// Thread that attempted the call.
        current: ThreadId,
    },

    /// The path cannot be represented in the platform's native encoding
    /// (interior NUL byte, or non-Unicode on Windows).
    #[error("path cannot be passed to libmagic: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Result alias for binding operations.
pub type Result<T> = std::result::Result<T, MagicError>;
