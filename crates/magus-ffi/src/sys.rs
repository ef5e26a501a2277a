//! Raw libmagic entry points.
//!
//! [`NativeApi`] is the full `magic_*` call surface, bound once from the
//! shared object the loader found and cached for the life of the process in
//! [`api`]. The table holds plain function pointers copied out of the opened
//! library; the `Library` itself is kept alive inside the table so the
//! pointers stay valid.
//!
//! Everything here is `unsafe` to call: the caller must pass a cookie
//! obtained from `magic_open` that has not been closed, and must not call
//! into the same cookie from two threads.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_void};
use std::sync::OnceLock;

use libloading::{Library, Symbol};

use crate::error::LoadError;
use crate::load;

/// Opaque cookie handle, `magic_t` in `<magic.h>`.
pub type magic_t = *mut c_void;

/// Resolved `magic_*` entry points plus the library that provides them.
#[derive(Debug)]
pub struct NativeApi {
    pub magic_open: unsafe extern "C" fn(c_int) -> magic_t,
    pub magic_close: unsafe extern "C" fn(magic_t),
    pub magic_error: unsafe extern "C" fn(magic_t) -> *const c_char,
    pub magic_errno: unsafe extern "C" fn(magic_t) -> c_int,
    pub magic_load: unsafe extern "C" fn(magic_t, *const c_char) -> c_int,
    pub magic_file: unsafe extern "C" fn(magic_t, *const c_char) -> *const c_char,
    pub magic_buffer: unsafe extern "C" fn(magic_t, *const c_void, usize) -> *const c_char,
    pub magic_setflags: unsafe extern "C" fn(magic_t, c_int) -> c_int,
    pub magic_check: unsafe extern "C" fn(magic_t, *const c_char) -> c_int,
    pub magic_compile: unsafe extern "C" fn(magic_t, *const c_char) -> c_int,

    /// Keeps the mapping alive; the function pointers above dangle without it.
    _library: Library,

    /// Where the library came from, for diagnostics.
    source: String,
}

/// Copy one typed entry point out of the library, or fail initialization.
macro_rules! bind {
    ($lib:expr, $source:expr, $name:ident: $ty:ty) => {{
        let symbol: Symbol<'_, $ty> = unsafe {
            $lib.get(concat!(stringify!($name), "\0").as_bytes())
        }
        .map_err(|_| LoadError::MissingSymbol {
            path: $source.clone(),
            symbol: stringify!($name),
        })?;
        *symbol
    }};
}

impl NativeApi {
    fn bind() -> Result<NativeApi, LoadError> {
        let load::LoadedLibrary { library, source } = load::open_native_library()?;
        let api = NativeApi {
            magic_open: bind!(library, source, magic_open: unsafe extern "C" fn(c_int) -> magic_t),
            magic_close: bind!(library, source, magic_close: unsafe extern "C" fn(magic_t)),
            magic_error: bind!(library, source, magic_error: unsafe extern "C" fn(magic_t) -> *const c_char),
            magic_errno: bind!(library, source, magic_errno: unsafe extern "C" fn(magic_t) -> c_int),
            magic_load: bind!(library, source, magic_load: unsafe extern "C" fn(magic_t, *const c_char) -> c_int),
            magic_file: bind!(library, source, magic_file: unsafe extern "C" fn(magic_t, *const c_char) -> *const c_char),
            magic_buffer: bind!(library, source, magic_buffer: unsafe extern "C" fn(magic_t, *const c_void, usize) -> *const c_char),
            magic_setflags: bind!(library, source, magic_setflags: unsafe extern "C" fn(magic_t, c_int) -> c_int),
            magic_check: bind!(library, source, magic_check: unsafe extern "C" fn(magic_t, *const c_char) -> c_int),
            magic_compile: bind!(library, source, magic_compile: unsafe extern "C" fn(magic_t, *const c_char) -> c_int),
            _library: library,
            source,
        };
        Ok(api)
    }

    /// Where the library was loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

static NATIVE: OnceLock<Result<NativeApi, LoadError>> = OnceLock::new();

/// The process-wide entry-point table.
///
/// Resolved on first call; both success and failure are cached, so a broken
/// installation reports the same [`LoadError`] on every call without
/// re-walking the filesystem. The table is never unloaded.
pub fn api() -> Result<&'static NativeApi, LoadError> {
    NATIVE
        .get_or_init(NativeApi::bind)
        .as_ref()
        .map_err(Clone::clone)
}
