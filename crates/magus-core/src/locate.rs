//! Library-discovery strategy.
//!
//! Produces the ordered candidate sequence the FFI loader walks when looking
//! for the libmagic shared object. Each platform gets its own generator
//! variant; the loader in `magus-ffi` is the only place a candidate is
//! actually opened. Keeping the sequence pure makes the search order
//! testable without a native library installed.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit shared-object override.
///
/// When set, the named file is tried before any conventional location.
pub const LIB_OVERRIDE_ENV: &str = "MAGUS_LIBMAGIC";

/// MacPorts, classic Homebrew, and Apple-silicon Homebrew library dirs.
const DARWIN_LIB_DIRS: &[&str] = &["/opt/local/lib", "/usr/local/lib", "/opt/homebrew/lib"];

/// Intel Homebrew keg root; each installed version gets a subdirectory.
const DARWIN_CELLAR: &str = "/usr/local/Cellar/libmagic";

/// DLL name variants shipped by the various Windows/Cygwin/MSYS builds.
const WINDOWS_DLL_NAMES: &[&str] = &[
    "libmagic.dll",
    "magic1.dll",
    "magic-1.dll",
    "cygmagic-1.dll",
    "libmagic-1.dll",
    "msys-magic-1.dll",
];

/// Versioned soname first: many distros ship `libmagic.so.1` without the
/// unversioned dev symlink.
const LINUX_SONAMES: &[&str] = &["libmagic.so.1", "libmagic.so"];

/// A single place the shared object might be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Concrete path on disk. The loader skips it without an open attempt
    /// if the file does not exist.
    File(PathBuf),
    /// Bare library name, resolved through the system loader search path
    /// (`dlopen` search order, or `%PATH%` for `LoadLibrary`).
    Name(String),
    /// Soname to resolve through the glibc/musl linker cache (`ldconfig -p`),
    /// falling back to `/usr/lib/<soname>` when the cache is unavailable.
    LinkerCache(&'static str),
}

/// Platform selector for the candidate generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Anything else gets a generic ELF-style fallback.
    Other,
}

impl Platform {
    /// The platform this build is running on.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

/// Candidate sequence for the running process.
///
/// Reads [`LIB_OVERRIDE_ENV`] and the current working directory; everything
/// else is the static per-platform table.
#[must_use]
pub fn candidates(platform: Platform) -> Vec<Candidate> {
    candidates_with(
        platform,
        env::var_os(LIB_OVERRIDE_ENV).map(PathBuf::from),
        env::current_dir().ok(),
        Path::new(DARWIN_CELLAR),
    )
}

/// Deterministic core of [`candidates`]; inputs injected for tests.
pub fn candidates_with(
    platform: Platform,
    override_path: Option<PathBuf>,
    cwd: Option<PathBuf>,
    cellar: &Path,
) -> Vec<Candidate> {
    let mut out = Vec::new();

    if let Some(path) = override_path {
        out.push(Candidate::File(path));
    }

    match platform {
        Platform::Linux => {
            for soname in LINUX_SONAMES {
                if let Some(dir) = &cwd {
                    out.push(Candidate::File(dir.join(soname)));
                }
                out.push(Candidate::Name((*soname).to_owned()));
                out.push(Candidate::LinkerCache(soname));
            }
        }
        Platform::MacOs => {
            let mut dirs: Vec<PathBuf> = Vec::new();
            dirs.extend(cwd.clone());
            dirs.extend(DARWIN_LIB_DIRS.iter().map(PathBuf::from));
            dirs.extend(cellar_lib_dirs(cellar));
            for dir in dirs {
                out.push(Candidate::File(dir.join("libmagic.dylib")));
            }
            out.push(Candidate::Name("libmagic.dylib".to_owned()));
        }
        Platform::Windows => {
            for name in WINDOWS_DLL_NAMES {
                if let Some(dir) = &cwd {
                    out.push(Candidate::File(dir.join(name)));
                }
                // LoadLibrary searches %PATH% but not the working directory.
                out.push(Candidate::Name((*name).to_owned()));
            }
        }
        Platform::Other => {
            out.push(Candidate::Name("libmagic.so".to_owned()));
        }
    }

    out
}

/// `<cellar>/<version>/lib` for every installed keg version, sorted for a
/// stable search order.
fn cellar_lib_dirs(cellar: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(cellar) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path().join("lib"))
        .collect();
    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_cellar() -> PathBuf {
        PathBuf::from("/nonexistent-cellar")
    }

    #[test]
    fn test_override_comes_first() {
        for platform in [
            Platform::Linux,
            Platform::MacOs,
            Platform::Windows,
            Platform::Other,
        ] {
            let c = candidates_with(
                platform,
                Some(PathBuf::from("/opt/custom/libmagic.so")),
                None,
                &no_cellar(),
            );
            assert_eq!(
                c[0],
                Candidate::File(PathBuf::from("/opt/custom/libmagic.so"))
            );
        }
    }

    #[test]
    fn test_linux_prefers_versioned_soname() {
        let c = candidates_with(Platform::Linux, None, Some(PathBuf::from("/work")), &no_cellar());
        assert_eq!(c[0], Candidate::File(PathBuf::from("/work/libmagic.so.1")));
        assert_eq!(c[1], Candidate::Name("libmagic.so.1".to_owned()));
        assert_eq!(c[2], Candidate::LinkerCache("libmagic.so.1"));
        // The unversioned name is still in the tail of the sequence.
        assert!(c.contains(&Candidate::Name("libmagic.so".to_owned())));
    }

    #[test]
    fn test_macos_conventional_dirs() {
        let c = candidates_with(Platform::MacOs, None, None, &no_cellar());
        for dir in ["/opt/local/lib", "/usr/local/lib", "/opt/homebrew/lib"] {
            let expect = Candidate::File(Path::new(dir).join("libmagic.dylib"));
            assert!(c.contains(&expect), "missing {expect:?}");
        }
        assert_eq!(c.last(), Some(&Candidate::Name("libmagic.dylib".to_owned())));
    }

    #[test]
    fn test_macos_scans_cellar_versions() {
        let cellar = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(cellar.path().join("5.45/lib")).unwrap();
        std::fs::create_dir_all(cellar.path().join("5.41/lib")).unwrap();
        let c = candidates_with(Platform::MacOs, None, None, cellar.path());
        let expect = Candidate::File(cellar.path().join("5.41/lib/libmagic.dylib"));
        assert!(c.contains(&expect));
        let newer = Candidate::File(cellar.path().join("5.45/lib/libmagic.dylib"));
        assert!(c.contains(&newer));
    }

    #[test]
    fn test_windows_tries_cwd_then_search_path() {
        let c = candidates_with(
            Platform::Windows,
            None,
            Some(PathBuf::from(r"C:\work")),
            &no_cellar(),
        );
        assert_eq!(
            c[0],
            Candidate::File(PathBuf::from(r"C:\work").join("libmagic.dll"))
        );
        assert_eq!(c[1], Candidate::Name("libmagic.dll".to_owned()));
        assert!(c.contains(&Candidate::Name("cygmagic-1.dll".to_owned())));
    }

    #[test]
    fn test_every_platform_yields_candidates() {
        // Even with no cwd, no override, and no cellar the sequence is
        // non-empty, so the loader always reaches its own exhaustion error
        // rather than failing on an empty iterator.
        for platform in [
            Platform::Linux,
            Platform::MacOs,
            Platform::Windows,
            Platform::Other,
        ] {
            assert!(!candidates_with(platform, None, None, &no_cellar()).is_empty());
        }
    }
}
