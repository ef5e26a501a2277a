//! Shared-object discovery.
//!
//! Walks the candidate sequence from [`magus_core::locate`] and opens the
//! first one that loads. `File` candidates that do not exist on disk are
//! skipped without a dlopen attempt, so a long candidate list stays cheap
//! and the loader never reports spurious open failures for paths that were
//! never there.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

use libloading::Library;
use magus_core::locate::{self, Candidate, Platform};

use crate::error::LoadError;

/// A successfully opened shared object plus the candidate that produced it.
pub struct LoadedLibrary {
    pub library: Library,
    /// Human-readable source, kept for diagnostics (e.g. missing-symbol
    /// errors reported against the file that was actually opened).
    pub source: String,
}

/// Locate and open the native library.
///
/// Tries each candidate in order and returns the first success. Exhausting
/// the sequence is [`LoadError::NotFound`]; retrying within the process is
/// pointless since the sequence depends only on the platform, environment,
/// and installed files.
pub fn open_native_library() -> Result<LoadedLibrary, LoadError> {
    open_from(locate::candidates(Platform::current()))
}

fn open_from(sequence: Vec<Candidate>) -> Result<LoadedLibrary, LoadError> {
    let tried = sequence.len();
    for candidate in sequence {
        if let Some(loaded) = try_candidate(&candidate) {
            tracing::info!(source = %loaded.source, "loaded libmagic");
            return Ok(loaded);
        }
    }
    Err(LoadError::NotFound { tried })
}

fn try_candidate(candidate: &Candidate) -> Option<LoadedLibrary> {
    match candidate {
        Candidate::File(path) => {
            if !path.exists() {
                tracing::trace!(path = %path.display(), "candidate not on disk, skipping");
                return None;
            }
            try_open(path.as_os_str())
        }
        Candidate::Name(name) => try_open(OsStr::new(name)),
        Candidate::LinkerCache(soname) => {
            let path = linker_cache_lookup(soname)?;
            if !path.exists() {
                return None;
            }
            try_open(path.as_os_str())
        }
    }
}

fn try_open(spec: &OsStr) -> Option<LoadedLibrary> {
    // Library::new requires the object's initializers to be benign; libmagic
    // has no constructors beyond the C runtime's.
    match unsafe { Library::new(spec) } {
        Ok(library) => Some(LoadedLibrary {
            library,
            source: spec.to_string_lossy().into_owned(),
        }),
        Err(err) => {
            tracing::debug!(candidate = %spec.to_string_lossy(), error = %err, "candidate failed to open");
            None
        }
    }
}

/// Resolve a soname through `ldconfig -p`, with a `/usr/lib` fallback for
/// systems where the cache is unavailable (musl, stripped-down containers).
fn linker_cache_lookup(soname: &str) -> Option<PathBuf> {
    let output = Command::new("ldconfig").arg("-p").output().ok();
    let resolved = output
        .filter(|o| o.status.success())
        .and_then(|o| parse_ldconfig(&String::from_utf8_lossy(&o.stdout), soname));
    resolved.or_else(|| Some(PathBuf::from(format!("/usr/lib/{soname}"))))
}

/// Pick the first cache line for `soname` and return the path after `=>`.
fn parse_ldconfig(output: &str, soname: &str) -> Option<PathBuf> {
    output.lines().find_map(|line| {
        let line = line.trim_start();
        if !line.starts_with(soname) {
            return None;
        }
        let (_, path) = line.rsplit_once(" => ")?;
        Some(PathBuf::from(path.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LDCONFIG_SAMPLE: &str = "\
295 libs found in cache `/etc/ld.so.cache'
\tlibmenu.so.6 (libc6,x86-64) => /lib/x86_64-linux-gnu/libmenu.so.6
\tlibmagic.so.1 (libc6,x86-64) => /lib/x86_64-linux-gnu/libmagic.so.1
\tlibmagic.so (libc6,x86-64) => /lib/x86_64-linux-gnu/libmagic.so
\tlibm.so.6 (libc6,x86-64) => /lib/x86_64-linux-gnu/libm.so.6
";

    #[test]
    fn test_parse_ldconfig_finds_soname() {
        assert_eq!(
            parse_ldconfig(LDCONFIG_SAMPLE, "libmagic.so.1"),
            Some(PathBuf::from("/lib/x86_64-linux-gnu/libmagic.so.1"))
        );
        assert_eq!(
            parse_ldconfig(LDCONFIG_SAMPLE, "libmagic.so"),
            Some(PathBuf::from("/lib/x86_64-linux-gnu/libmagic.so.1"))
        );
    }

    #[test]
    fn test_parse_ldconfig_no_match() {
        assert_eq!(parse_ldconfig(LDCONFIG_SAMPLE, "libmagique.so"), None);
        assert_eq!(parse_ldconfig("", "libmagic.so.1"), None);
    }

    #[test]
    fn test_exhausted_sequence_reports_not_found() {
        let sequence = vec![
            Candidate::File(PathBuf::from("/nonexistent/libmagic.so.1")),
            Candidate::File(PathBuf::from("/also/nonexistent/libmagic.so")),
        ];
        match open_from(sequence) {
            Err(LoadError::NotFound { tried }) => assert_eq!(tried, 2),
            Err(other) => panic!("expected NotFound, got {other:?}"),
            Ok(loaded) => panic!("unexpectedly opened {}", loaded.source),
        }
    }
}
