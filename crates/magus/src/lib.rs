//! # magus
//!
//! Safe Rust bindings to the libmagic file-type identification library.
//!
//! The shared object is discovered at runtime (no link-time dependency), a
//! native "magic cookie" is opened and configured per detector, and byte
//! buffers or file paths are forwarded to libmagic's analysis routines.
//! Return codes and native error strings come back as [`MagicError`]. All
//! content-sniffing heuristics live inside libmagic itself.
//!
//! ```no_run
//! # fn main() -> magus::Result<()> {
//! // One-off identification through the per-thread cache:
//! let description = magus::from_file("report.pdf", false)?;
//! let mime = magus::from_file("report.pdf", true)?;
//!
//! // Or hold a configured detector:
//! let magic = magus::Magic::builder().mime(true).build()?;
//! assert_eq!(magic.file("report.pdf")?, "application/pdf");
//! # Ok(())
//! # }
//! ```
//!
//! A cookie is bound to the thread that opened it; using it from another
//! thread is reported as an error rather than left to crash inside the
//! native library. The module-level helpers keep one detector per thread,
//! so they are safe to call from anywhere.

pub mod cookie;
mod convenience;
pub mod detector;
pub mod error;

pub use cookie::{Cookie, FALLBACK_MIME};
pub use convenience::{from_buffer, from_file};
pub use detector::{Magic, MagicBuilder};
pub use error::{LoadError, MagicError, Result};
pub use magus_core::Flags;
