//! # magus-ffi
//!
//! FFI boundary for the magus libmagic bindings.
//!
//! This crate walks the candidate sequence produced by `magus-core`, opens
//! the first shared object that loads, binds the `magic_*` entry points into
//! a [`sys::NativeApi`] table, and caches exactly one table per process.
//! Failure to produce a table is an initialization error: it signals a broken
//! installation, is cached for the life of the process, and is never retried.
//!
//! Nothing here owns a cookie; lifecycle and error translation live in the
//! `magus` crate.

pub mod error;
pub mod load;
pub mod sys;

pub use error::LoadError;
pub use sys::{NativeApi, api};
