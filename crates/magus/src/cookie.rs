//! Cookie lifecycle management.
//!
//! A [`Cookie`] owns one native `magic_t` handle: open → load → query* →
//! close. Close is idempotent and also runs on drop, so a handle is released
//! exactly once on every exit path. Every native call is preceded by a
//! state check (closed cookies error instead of touching freed memory) and
//! an owner-thread check (libmagic crashes under concurrent use of one
//! handle, so cross-thread use is reported as [`MagicError::WrongThread`]
//! rather than left to segfault).

use std::ffi::{CStr, CString, c_char};
use std::path::Path;
use std::ptr;
use std::thread::{self, ThreadId};

use magus_core::Flags;
use magus_ffi::sys::magic_t;
use magus_ffi::{NativeApi, api};

use crate::error::{MagicError, Result};

/// Generic MIME type substituted when a MIME-mode query produces neither a
/// result nor a diagnostic (libmagic 5.09-era defect).
pub const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open { loaded: bool },
    Closed,
}

/// One configured detector instance backed by a native magic cookie.
///
/// A cookie must have a database loaded ([`Cookie::load`]) before it can be
/// queried. It may be moved to another thread wholesale, but all operations
/// must come from the thread that opened it.
pub struct Cookie {
    api: &'static NativeApi,
    handle: magic_t,
    flags: Flags,
    state: State,
    owner: ThreadId,
}

// Moving a Cookie transfers sole ownership; the owner-thread check in front
// of every native call is what upholds libmagic's one-thread-per-handle
// contract at runtime. Not Sync: shared cross-thread access stays impossible.
unsafe impl Send for Cookie {}

impl Cookie {
    /// Open a new cookie with the given flags.
    ///
    /// Initializes the native library on first use; a broken installation
    /// surfaces here as [`MagicError::Init`].
    pub fn open(flags: Flags) -> Result<Cookie> {
        let api = api()?;
        let handle = unsafe { (api.magic_open)(flags.bits()) };
        if handle.is_null() {
            return Err(MagicError::Open);
        }
        tracing::debug!(?flags, "opened magic cookie");
        Ok(Cookie {
            api,
            handle,
            flags,
            state: State::Open { loaded: false },
            owner: thread::current().id(),
        })
    }

    /// Flags currently applied to this cookie.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// `true` until [`Cookie::close`] (or drop).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state != State::Closed
    }

    /// `true` once a database has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Open { loaded: true })
    }

    /// Load a magic database.
    ///
    /// `database` is a colon-separated list of database files; `None` loads
    /// the system default, honoring the native `MAGIC` environment variable.
    /// On failure the cookie stays open and a later load may succeed.
    pub fn load(&mut self, database: Option<&Path>) -> Result<()> {
        self.guard()?;
        let (_db, raw) = self.db_arg(database)?;
        let status = unsafe { (self.api.magic_load)(self.handle, raw) };
        if status != 0 {
            return Err(self.database_error());
        }
        self.state = State::Open { loaded: true };
        tracing::debug!(database = ?database, "magic database loaded");
        Ok(())
    }

    /// Load the default system database (`load(None)`).
    pub fn load_default(&mut self) -> Result<()> {
        self.load(None)
    }

    /// Replace the flag bitmask on the live cookie.
    ///
    /// Much cheaper than opening a fresh cookie per output mode: the loaded
    /// database is kept and only the output shape changes.
    pub fn set_flags(&mut self, flags: Flags) -> Result<()> {
        self.guard()?;
        let status = unsafe { (self.api.magic_setflags)(self.handle, flags.bits()) };
        if status != 0 {
            // Some builds reject flags they were compiled without
            // (e.g. PRESERVE_ATIME where utime(2) is missing).
            return Err(MagicError::Detect {
                message: self.last_error(),
            });
        }
        self.flags = flags;
        Ok(())
    }

    /// Identify the contents of a byte buffer.
    pub fn buffer(&self, buf: &[u8]) -> Result<String> {
        self.query_guard()?;
        let text = unsafe { (self.api.magic_buffer)(self.handle, buf.as_ptr().cast(), buf.len()) };
        self.query_result(text)
    }

    /// Identify the contents of the file at `path`.
    ///
    /// Checks existence first: a missing file is [`MagicError::FileNotFound`],
    /// never an ambiguous native failure.
    pub fn file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        self.query_guard()?;
        if !path.exists() {
            return Err(MagicError::FileNotFound(path.to_owned()));
        }
        let cpath = path_to_cstring(path)?;
        let text = unsafe { (self.api.magic_file)(self.handle, cpath.as_ptr()) };
        self.query_result(text)
    }

    /// Check the validity of database entries (`None` for the default).
    pub fn check(&self, database: Option<&Path>) -> Result<()> {
        self.guard()?;
        let (_db, raw) = self.db_arg(database)?;
        let status = unsafe { (self.api.magic_check)(self.handle, raw) };
        if status != 0 {
            return Err(self.database_error());
        }
        Ok(())
    }

    /// Compile database files; output lands in the working directory as
    /// `<basename>.mgc` (`None` compiles the default database).
    pub fn compile(&self, database: Option<&Path>) -> Result<()> {
        self.guard()?;
        let (_db, raw) = self.db_arg(database)?;
        let status = unsafe { (self.api.magic_compile)(self.handle, raw) };
        if status != 0 {
            return Err(self.database_error());
        }
        Ok(())
    }

    /// Release the native handle. Safe to call more than once; the second
    /// and later calls are no-ops.
    pub fn close(&mut self) {
        if self.state != State::Closed {
            self.state = State::Closed;
            unsafe { (self.api.magic_close)(self.handle) };
            tracing::debug!("closed magic cookie");
        }
    }

    /// Closed-state and owner-thread check in front of every native call.
    fn guard(&self) -> Result<()> {
        if self.state == State::Closed {
            return Err(MagicError::Closed);
        }
        let current = thread::current().id();
        if current != self.owner {
            return Err(MagicError::WrongThread {
                owner: self.owner,
                current,
            });
        }
        Ok(())
    }

    /// Queries additionally require a loaded database.
    fn query_guard(&self) -> Result<()> {
        self.guard()?;
        if !self.is_loaded() {
            return Err(MagicError::NotLoaded);
        }
        Ok(())
    }

    /// Optional database path as a (owned, raw) C-string argument pair. The
    /// owned value must outlive the native call.
    fn db_arg(&self, database: Option<&Path>) -> Result<(Option<CString>, *const c_char)> {
        let owned = database.map(path_to_cstring).transpose()?;
        let raw = owned.as_ref().map_or(ptr::null(), |c| c.as_ptr());
        Ok((owned, raw))
    }

    /// Latest native diagnostic, if any.
    fn last_error(&self) -> Option<String> {
        let ptr = unsafe { (self.api.magic_error)(self.handle) };
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
        }
    }

    fn database_error(&self) -> MagicError {
        MagicError::Database {
            message: self
                .last_error()
                .unwrap_or_else(|| "no diagnostic available".to_owned()),
            errno: unsafe { (self.api.magic_errno)(self.handle) },
        }
    }

    fn query_result(&self, text: *const c_char) -> Result<String> {
        let raw = if text.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
        };
        let diagnostic = if raw.is_none() { self.last_error() } else { None };
        resolve_query(raw, diagnostic, self.flags)
    }
}

impl Drop for Cookie {
    fn drop(&mut self) {
        // No thread check: dropping consumes the sole reference, so there
        // can be no concurrent native call on this handle.
        self.close();
    }
}

/// Turn a raw query outcome into a result.
///
/// A null return normally comes with a diagnostic from `magic_error`. Some
/// libmagic releases (5.09 era) fail MIME-mode queries with neither; that
/// specific combination gets the [`FALLBACK_MIME`] substitute instead of an
/// error. The shim is deliberately scoped to MIME mode only.
fn resolve_query(raw: Option<String>, diagnostic: Option<String>, flags: Flags) -> Result<String> {
    match (raw, diagnostic) {
        (Some(text), _) => Ok(text),
        (None, Some(message)) => Err(MagicError::Detect {
            message: Some(message),
        }),
        (None, None) if flags.wants_mime() => Ok(FALLBACK_MIME.to_owned()),
        (None, None) => Err(MagicError::Detect { message: None }),
    }
}

/// Transcode a path to the platform's native byte encoding. Implicit
/// coercion at the FFI boundary is unsafe across platforms, so this is the
/// single place a path becomes a C string.
#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| MagicError::InvalidPath(path.to_owned()))
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString> {
    let utf8 = path
        .to_str()
        .ok_or_else(|| MagicError::InvalidPath(path.to_owned()))?;
    CString::new(utf8).map_err(|_| MagicError::InvalidPath(path.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_query_success_passes_through() {
        let out = resolve_query(Some("PDF document".into()), None, Flags::NONE).unwrap();
        assert_eq!(out, "PDF document");
        // A stale diagnostic never overrides a real result.
        let out = resolve_query(Some("data".into()), Some("stale".into()), Flags::MIME).unwrap();
        assert_eq!(out, "data");
    }

    #[test]
    fn test_resolve_query_diagnostic_is_detect_error() {
        let err = resolve_query(None, Some("could not read".into()), Flags::MIME).unwrap_err();
        match err {
            MagicError::Detect { message } => assert_eq!(message.as_deref(), Some("could not read")),
            other => panic!("expected Detect, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_query_mime_fallback() {
        // The 5.09 shim: MIME mode, no result, no diagnostic.
        for flags in [Flags::MIME_TYPE, Flags::MIME_ENCODING, Flags::MIME] {
            let out = resolve_query(None, None, flags).unwrap();
            assert_eq!(out, FALLBACK_MIME);
        }
    }

    #[test]
    fn test_resolve_query_no_fallback_outside_mime_mode() {
        let err = resolve_query(None, None, Flags::NONE).unwrap_err();
        match err {
            MagicError::Detect { message } => assert!(message.is_none()),
            other => panic!("expected Detect, got {other:?}"),
        }
    }

    #[test]
    fn test_path_with_interior_nul_is_rejected() {
        let path = Path::new("bad\0name");
        match path_to_cstring(path) {
            Err(MagicError::InvalidPath(p)) => assert_eq!(p, path),
            other => panic!("expected InvalidPath, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_paths_pass_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        // Non-UTF-8 is fine on unix; the bytes go through untouched.
        let path = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9"));
        let c = path_to_cstring(path).unwrap();
        assert_eq!(c.as_bytes(), b"/tmp/caf\xe9");
    }
}
