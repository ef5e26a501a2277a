//! Initialization errors.

use thiserror::Error;

/// Failure to produce a usable native library handle.
///
/// Both variants mean the installation is broken; the result is cached and
/// callers should not retry within the process. `Clone` so the cached
/// failure can be handed out on every later call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Every candidate location was tried and none opened.
    #[error("failed to find libmagic after trying {tried} candidate locations; check your installation")]
    NotFound {
        /// Number of candidates attempted.
        tried: usize,
    },

    /// A shared object opened but lacks a required entry point.
    #[error("library at `{path}` has no `{symbol}` entry point; not a usable libmagic")]
    MissingSymbol {
        /// Source the library was opened from.
        path: String,
        /// Name of the missing `magic_*` symbol.
        symbol: &'static str,
    },
}
