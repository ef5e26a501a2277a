//! # magus-core
//!
//! Pure-logic layer for the magus libmagic bindings.
//!
//! This crate contains everything that can be computed without touching the
//! native library: the [`Flags`](flags::Flags) bitmask and the platform-aware
//! candidate sequence used to discover the shared object. No `unsafe` code is
//! permitted at the crate level; actual `dlopen`/symbol resolution lives in
//! `magus-ffi`.

#![deny(unsafe_code)]

pub mod flags;
pub mod locate;

pub use flags::Flags;
pub use locate::{Candidate, Platform};
